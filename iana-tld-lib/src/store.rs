//! Durable storage for scraped records.
//!
//! Two files live under the configured directory: `tldlist.txt`, a UTF-8
//! text file with one `" -- "`-delimited record per line, and `tld.json`,
//! the pretty-printed index keyed by domain-management name. The text file
//! is the source of truth: records are appended to it as they are scraped
//! (so a crash mid-run loses at most the in-progress record) and the JSON
//! index is rebuilt from it by replay.

use crate::error::IanaError;
use crate::types::{ResultIndex, TldRecord, NULL_SENTINEL};
use std::fs;
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

/// File name of the delimited record store.
pub const RESULTS_FILENAME: &str = "tldlist.txt";

/// File name of the cached root list.
pub const ROOT_LIST_FILENAME: &str = "tlds-alpha-by-domain.txt";

/// File name of the exported JSON index.
pub const JSON_FILENAME: &str = "tld.json";

/// Append-only record store with JSON export.
pub struct ResultStore {
    results_path: PathBuf,
    json_path: PathBuf,
}

impl ResultStore {
    /// Create a store rooted at `directory`.
    pub fn new<P: AsRef<Path>>(directory: P) -> Self {
        let directory = directory.as_ref();
        Self {
            results_path: directory.join(RESULTS_FILENAME),
            json_path: directory.join(JSON_FILENAME),
        }
    }

    /// Path of the delimited store file.
    pub fn results_path(&self) -> &Path {
        &self.results_path
    }

    /// Path of the JSON export file.
    pub fn json_path(&self) -> &Path {
        &self.json_path
    }

    /// Whether the delimited store file already exists on disk.
    pub fn results_file_exists(&self) -> bool {
        self.results_path.exists()
    }

    /// Truncate the store file (or create it empty).
    ///
    /// Called once at the start of a full eager run.
    pub fn truncate(&self) -> Result<(), IanaError> {
        fs::File::create(&self.results_path).map_err(|e| {
            IanaError::file_error(self.results_path.display().to_string(), e.to_string())
        })?;
        Ok(())
    }

    /// Append one record as a single line.
    ///
    /// This is the only durable write path during eager processing.
    pub fn append(&self, record: &TldRecord) -> Result<(), IanaError> {
        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.results_path)
            .map_err(|e| {
                IanaError::file_error(self.results_path.display().to_string(), e.to_string())
            })?;
        writeln!(file, "{}", record.to_line())?;
        Ok(())
    }

    /// Replay the store file into an in-memory index keyed by `dm`.
    ///
    /// Every line must split into exactly eight fields; a malformed line is
    /// a hard error. Duplicate keys overwrite silently, so the last write
    /// for a given `dm` wins.
    pub fn reload(&self) -> Result<ResultIndex, IanaError> {
        let file = fs::File::open(&self.results_path).map_err(|e| {
            IanaError::file_error(self.results_path.display().to_string(), e.to_string())
        })?;

        let mut index = ResultIndex::new();
        for (number, line) in BufReader::new(file).lines().enumerate() {
            let line = line?;
            let line = line.trim_end();
            if line.is_empty() {
                continue;
            }
            let record = TldRecord::from_line(line, number + 1)?;
            index.insert(record.dm.clone(), record);
        }
        debug!(records = index.len(), "reloaded result store");
        Ok(index)
    }

    /// Serialize `index` to the JSON file, overwriting it.
    ///
    /// The `"NULL"`-keyed entry, an artifact of pages with no extractable
    /// title, is dropped first. Output is pretty-printed with 2-space
    /// indentation and non-ASCII characters are written literally, so the
    /// same index always exports to byte-identical output.
    pub fn export_json(&self, index: &ResultIndex) -> Result<(), IanaError> {
        let exportable: ResultIndex = index
            .iter()
            .filter(|(dm, _)| dm.as_str() != NULL_SENTINEL)
            .map(|(dm, record)| (dm.clone(), record.clone()))
            .collect();

        let json = serde_json::to_string_pretty(&exportable)?;
        fs::write(&self.json_path, json)
            .map_err(|e| IanaError::file_error(self.json_path.display().to_string(), e.to_string()))?;
        Ok(())
    }
}
