//! Root TLD list download and parsing.
//!
//! IANA publishes the authoritative list of delegated TLDs as a flat text
//! file: a `#`-prefixed version header followed by one TLD per line. This
//! module keeps a cached copy on disk, re-downloading it when it goes stale,
//! and parses it into the sorted known-TLD set.

use crate::error::IanaError;
use crate::types::RootTldSet;
use std::fs;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::time::{Duration, SystemTime};
use tracing::debug;

/// Canonical source of the root TLD list.
pub const ROOT_LIST_URL: &str = "https://data.iana.org/TLD/tlds-alpha-by-domain.txt";

/// Downloads and parses the IANA root TLD list.
///
/// The fetcher is conditional: the cached file is only re-downloaded when it
/// is missing, older than the configured maximum age, or a refresh is
/// forced. Network errors propagate to the caller; there is no retry at
/// this level.
pub struct RootListFetcher {
    /// HTTP client for the (single) list download
    http: reqwest::Client,
    /// Source URL, overridable for tests
    url: String,
    /// Reference point for the staleness check, captured at construction
    started: SystemTime,
}

impl RootListFetcher {
    /// Create a fetcher pointing at the canonical IANA URL.
    pub fn new() -> Self {
        Self::with_url(ROOT_LIST_URL)
    }

    /// Create a fetcher pointing at a custom URL.
    pub fn with_url<U: Into<String>>(url: U) -> Self {
        Self {
            http: reqwest::Client::new(),
            url: url.into(),
            started: SystemTime::now(),
        }
    }

    /// Make sure the cached root list at `path` is usable.
    ///
    /// Re-downloads and overwrites the file when `force` is set, when the
    /// file does not exist, or when its modification time is more than
    /// `max_age` before the fetcher's start time. Otherwise the file is
    /// left untouched.
    pub async fn ensure_fresh(
        &self,
        path: &Path,
        force: bool,
        max_age: Duration,
    ) -> Result<(), IanaError> {
        if !force && !self.is_stale(path, max_age) {
            debug!(path = %path.display(), "root list is fresh, skipping download");
            return Ok(());
        }

        debug!(url = %self.url, "downloading root TLD list");
        let body = self.http.get(&self.url).send().await?.text().await?;
        fs::write(path, &body)
            .map_err(|e| IanaError::file_error(path.display().to_string(), e.to_string()))?;
        Ok(())
    }

    /// Whether the cached file is missing or older than `max_age`.
    fn is_stale(&self, path: &Path, max_age: Duration) -> bool {
        let modified = match fs::metadata(path).and_then(|m| m.modified()) {
            Ok(modified) => modified,
            Err(_) => return true,
        };
        // A file modified "in the future" counts as fresh.
        match self.started.duration_since(modified) {
            Ok(age) => age > max_age,
            Err(_) => false,
        }
    }

    /// Parse the cached root list into the known-TLD set.
    ///
    /// Reads the file line by line, trims trailing whitespace, skips blank
    /// lines and `#`-prefixed comments (which is what excludes the version
    /// header, wherever it appears), lowercases the rest, and collects into
    /// a sorted set.
    pub fn list_known_tlds(path: &Path) -> Result<RootTldSet, IanaError> {
        let file = fs::File::open(path)
            .map_err(|e| IanaError::file_error(path.display().to_string(), e.to_string()))?;

        let mut tlds = RootTldSet::new();
        for line in BufReader::new(file).lines() {
            let line = line?;
            let label = line.trim_end();
            if label.is_empty() || label.starts_with('#') {
                continue;
            }
            tlds.insert(label.to_lowercase());
        }
        Ok(tlds)
    }
}

impl Default for RootListFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const SAMPLE_LIST: &str = "# Version 2024020100, Last Updated Thu Feb  1 07:07:01 2024 UTC\n\
                               AAA\nCOM\nNL\nXN--P1AI\n";

    fn write_list(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn parses_sorted_lowercase_and_skips_header() {
        let file = write_list(SAMPLE_LIST);
        let tlds = RootListFetcher::list_known_tlds(file.path()).unwrap();

        let expected: Vec<&str> = vec!["aaa", "com", "nl", "xn--p1ai"];
        assert_eq!(tlds.iter().map(String::as_str).collect::<Vec<_>>(), expected);
        assert!(tlds.iter().all(|t| !t.starts_with('#')));
    }

    #[test]
    fn header_is_skipped_by_prefix_not_position() {
        // Comment lines anywhere in the file must be excluded, so the rule
        // stays correct if the header format ever changes.
        let file = write_list("COM\n# a comment in the middle\nNL\n");
        let tlds = RootListFetcher::list_known_tlds(file.path()).unwrap();
        assert_eq!(tlds.len(), 2);
        assert!(tlds.contains("com"));
        assert!(tlds.contains("nl"));
    }

    #[test]
    fn trailing_whitespace_and_blank_lines_ignored() {
        let file = write_list("# header\nCOM  \n\nNL\n\n");
        let tlds = RootListFetcher::list_known_tlds(file.path()).unwrap();
        assert_eq!(tlds.iter().cloned().collect::<Vec<_>>(), vec!["com", "nl"]);
    }

    #[test]
    fn duplicate_labels_collapse() {
        let file = write_list("# header\nCOM\ncom\nCom\n");
        let tlds = RootListFetcher::list_known_tlds(file.path()).unwrap();
        assert_eq!(tlds.len(), 1);
    }

    #[tokio::test]
    async fn fresh_file_is_not_downloaded() {
        // The URL is unroutable, so any network attempt would error out;
        // a freshly written cache file must short-circuit before that.
        let file = write_list(SAMPLE_LIST);
        let fetcher = RootListFetcher::with_url("http://127.0.0.1:1/tlds.txt");

        fetcher
            .ensure_fresh(file.path(), false, Duration::from_secs(86400))
            .await
            .unwrap();

        let content = fs::read_to_string(file.path()).unwrap();
        assert_eq!(content, SAMPLE_LIST);
    }

    #[tokio::test]
    async fn forced_refresh_hits_the_network() {
        let file = write_list(SAMPLE_LIST);
        let fetcher = RootListFetcher::with_url("http://127.0.0.1:1/tlds.txt");

        let err = fetcher
            .ensure_fresh(file.path(), true, Duration::from_secs(86400))
            .await
            .unwrap_err();
        assert!(err.is_retryable(), "expected a network error, got: {}", err);
    }

    #[tokio::test]
    async fn missing_file_counts_as_stale() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tlds-alpha-by-domain.txt");
        let fetcher = RootListFetcher::with_url("http://127.0.0.1:1/tlds.txt");

        let err = fetcher
            .ensure_fresh(&path, false, Duration::from_secs(86400))
            .await
            .unwrap_err();
        assert!(err.is_retryable());
    }
}
