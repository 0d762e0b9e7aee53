//! Per-TLD delegation page fetching and field extraction.
//!
//! Each delegated TLD has an HTML details page at
//! `https://www.iana.org/domains/root/db/{tld}.html`. The page is
//! semi-structured, so fields are pulled out with a fixed table of regular
//! expressions rather than an HTML parser. The patterns and their
//! first-match-wins semantics are part of the observable behavior and must
//! not change; the `PageExtractor` trait isolates the page-format assumption
//! so the pipeline itself never touches a regex.

use crate::error::IanaError;
use crate::types::{TldRecord, TldType, NULL_SENTINEL};
use lazy_static::lazy_static;
use regex::Regex;
use tracing::warn;

/// Base URL for per-TLD delegation pages.
pub const DELEGATION_BASE_URL: &str = "https://www.iana.org/domains/root/db";

/// A fetch failure on the same TLD past this many attempts is fatal for
/// that TLD.
const MAX_FETCH_ATTEMPTS: u32 = 10;

lazy_static! {
    /// Page title, which doubles as the domain-management name (UTF-8,
    /// keeps its leading dot: ".com", ".рф").
    static ref DM_RE: Regex =
        Regex::new(r"<title>(.*) Domain Delegation Data</title>").unwrap();

    /// Registrar name from the registration-services anchor text.
    static ref NIC_RE: Regex =
        Regex::new(r#"<b>URL for registration services:</b> <a href="[^"]+">(.*)</a><br/>"#)
            .unwrap();

    /// WHOIS server hostname.
    static ref WHOIS_RE: Regex = Regex::new(r"<b>WHOIS Server:</b>\s*([\w.-]+)\s*").unwrap();

    /// Labeled ISO dates at the bottom of the page.
    static ref LAST_UPDATE_RE: Regex =
        Regex::new(r"Record last updated\s+(\d{4}-\d{2}-\d{2})").unwrap();
    static ref REGISTRATION_RE: Regex =
        Regex::new(r"Registration date\s+(\d{4}-\d{2}-\d{2})").unwrap();
}

/// Extraction of a structured record from raw delegation page text.
///
/// The default implementation is regex-based; the trait exists so the page
/// format assumption can be swapped without touching the pipeline.
pub trait PageExtractor {
    /// Build a complete record for `tld` from the page body.
    ///
    /// Never fails: fields that cannot be extracted hold the `"NULL"`
    /// sentinel.
    fn extract(&self, tld: &str, page: &str) -> TldRecord;
}

/// Regex-backed extractor matching the published delegation page layout.
#[derive(Debug, Clone, Copy, Default)]
pub struct RegexExtractor;

impl RegexExtractor {
    /// First capture of `re` in `page`, or the sentinel.
    fn first_match(re: &Regex, page: &str) -> String {
        re.captures(page)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_string())
            .unwrap_or_else(|| NULL_SENTINEL.to_string())
    }

    /// Like `first_match`, but lowercases an actual match. The sentinel is
    /// never post-processed and keeps its exact casing.
    fn first_match_lowercase(re: &Regex, page: &str) -> String {
        match re.captures(page).and_then(|c| c.get(1)) {
            Some(m) => m.as_str().to_lowercase(),
            None => NULL_SENTINEL.to_string(),
        }
    }

    /// Classify the TLD by testing three literal phrases in priority order.
    ///
    /// Sponsored TLDs are deliberately reported as generic (e.g. `.asia`);
    /// anything matching none of the phrases is a country code.
    fn classify(page: &str) -> TldType {
        if page.contains("Generic top-level domain") {
            TldType::Generic
        } else if page.contains("Infrastructure top-level domain") {
            TldType::Infrastructure
        } else if page.contains("Sponsored top-level domain") {
            TldType::Generic
        } else {
            TldType::CountryCode
        }
    }
}

impl PageExtractor for RegexExtractor {
    fn extract(&self, tld: &str, page: &str) -> TldRecord {
        let whois = match WHOIS_RE.captures(page).and_then(|c| c.get(1)) {
            Some(m) => m.as_str().trim_end().to_lowercase(),
            None => NULL_SENTINEL.to_string(),
        };

        TldRecord {
            tld: tld.to_string(),
            dm: Self::first_match(&DM_RE, page),
            is_idn: tld.starts_with("xn--"),
            tld_type: Self::classify(page),
            nic: Self::first_match(&NIC_RE, page),
            whois,
            last_update: Self::first_match_lowercase(&LAST_UPDATE_RE, page),
            registration_date: Self::first_match_lowercase(&REGISTRATION_RE, page),
        }
    }
}

/// Fetches and parses one delegation page at a time.
///
/// Fetching retries on transport errors with no backoff; past
/// [`MAX_FETCH_ATTEMPTS`] consecutive failures the scraper gives up on that
/// TLD with [`IanaError::RetryExhausted`] and lets the caller decide whether
/// to abort the run. Non-2xx responses are not errors here: the body is
/// returned and parsed like any other page, yielding sentinel fields.
pub struct TldPageScraper<E: PageExtractor = RegexExtractor> {
    http: reqwest::Client,
    base_url: String,
    extractor: E,
}

impl TldPageScraper<RegexExtractor> {
    /// Create a scraper pointing at the canonical IANA database.
    pub fn new() -> Self {
        Self::with_base_url(DELEGATION_BASE_URL)
    }

    /// Create a scraper pointing at a custom page base URL.
    pub fn with_base_url<U: Into<String>>(base_url: U) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            extractor: RegexExtractor,
        }
    }
}

impl<E: PageExtractor> TldPageScraper<E> {
    /// URL of the delegation page for `tld`.
    pub fn page_url(&self, tld: &str) -> String {
        format!("{}/{}.html", self.base_url, tld)
    }

    /// Fetch the raw delegation page text for one TLD.
    pub async fn fetch(&self, tld: &str) -> Result<String, IanaError> {
        let url = self.page_url(tld);

        let mut attempts: u32 = 0;
        loop {
            attempts += 1;
            match self.request_text(&url).await {
                Ok(body) => return Ok(body),
                Err(err) => {
                    warn!(tld, attempts, "fetch failed: {}", err);
                    if attempts > MAX_FETCH_ATTEMPTS {
                        return Err(IanaError::retry_exhausted(tld, url, attempts));
                    }
                }
            }
        }
    }

    async fn request_text(&self, url: &str) -> Result<String, IanaError> {
        Ok(self.http.get(url).send().await?.text().await?)
    }

    /// Parse a fetched page into a structured record.
    pub fn parse(&self, tld: &str, page: &str) -> TldRecord {
        self.extractor.extract(tld, page)
    }

    /// Fetch and parse in one step.
    pub async fn scrape(&self, tld: &str) -> Result<TldRecord, IanaError> {
        let page = self.fetch(tld).await?;
        Ok(self.parse(tld, &page))
    }
}

impl Default for TldPageScraper<RegexExtractor> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(body: &str) -> String {
        format!("<html><head>{}</head><body></body></html>", body)
    }

    const NL_PAGE: &str = r#"<title>.nl Domain Delegation Data</title>
<p>Country-code top-level domain</p>
<b>URL for registration services:</b> <a href="https://www.sidn.nl/">SIDN</a><br/>
<b>WHOIS Server:</b> WHOIS.DOMAIN-REGISTRY.NL
<p>Record last updated 2024-02-01. Registration date 1986-04-25.</p>"#;

    #[test]
    fn extracts_all_fields() {
        let scraper = TldPageScraper::new();
        let record = scraper.parse("nl", &page(NL_PAGE));

        assert_eq!(record.tld, "nl");
        assert_eq!(record.dm, ".nl");
        assert!(!record.is_idn);
        assert_eq!(record.tld_type, TldType::CountryCode);
        assert_eq!(record.nic, "SIDN");
        // WHOIS hostname is lowercased
        assert_eq!(record.whois, "whois.domain-registry.nl");
        assert_eq!(record.last_update, "2024-02-01");
        assert_eq!(record.registration_date, "1986-04-25");
    }

    #[test]
    fn missing_whois_yields_sentinel_others_populated() {
        let body = r#"<title>.example Domain Delegation Data</title>
<p>Generic top-level domain</p>
<p>Record last updated 2023-12-31. Registration date 2014-01-01.</p>"#;
        let record = RegexExtractor.extract("example", &page(body));

        assert_eq!(record.whois, NULL_SENTINEL);
        assert_eq!(record.nic, NULL_SENTINEL);
        assert_eq!(record.dm, ".example");
        assert_eq!(record.tld_type, TldType::Generic);
        assert_eq!(record.last_update, "2023-12-31");
    }

    #[test]
    fn empty_page_is_all_sentinels_cctld() {
        let record = RegexExtractor.extract("zz", "");
        assert_eq!(record.dm, NULL_SENTINEL);
        assert_eq!(record.nic, NULL_SENTINEL);
        assert_eq!(record.whois, NULL_SENTINEL);
        assert_eq!(record.last_update, NULL_SENTINEL);
        assert_eq!(record.registration_date, NULL_SENTINEL);
        // No phrase matches, so the fallback bucket applies
        assert_eq!(record.tld_type, TldType::CountryCode);
    }

    #[test]
    fn absent_dates_keep_sentinel_casing() {
        // Lowercasing is a post-processor for matched dates only; a missing
        // field must stay the exact literal "NULL", never "null".
        let body = "<title>.example Domain Delegation Data</title>";
        let record = RegexExtractor.extract("example", body);
        assert_eq!(record.last_update, "NULL");
        assert_eq!(record.registration_date, "NULL");

        // A present date still goes through the lowercase step
        let record =
            RegexExtractor.extract("example", "Record last updated 2024-02-01");
        assert_eq!(record.last_update, "2024-02-01");
        assert_eq!(record.registration_date, "NULL");
    }

    #[test]
    fn classification_priority_order() {
        assert_eq!(
            RegexExtractor::classify("Generic top-level domain"),
            TldType::Generic
        );
        assert_eq!(
            RegexExtractor::classify("Infrastructure top-level domain"),
            TldType::Infrastructure
        );
        // Generic wins even when the infrastructure phrase is also present
        assert_eq!(
            RegexExtractor::classify(
                "Generic top-level domain and Infrastructure top-level domain"
            ),
            TldType::Generic
        );
        assert_eq!(RegexExtractor::classify("something else"), TldType::CountryCode);
    }

    #[test]
    fn sponsored_maps_to_generic() {
        // Quirk kept for compatibility: .asia and friends report as gTLD.
        let record = RegexExtractor.extract("asia", "Sponsored top-level domain");
        assert_eq!(record.tld_type, TldType::Generic);
    }

    #[test]
    fn idn_detection_is_structural() {
        assert!(RegexExtractor.extract("xn--p1ai", "").is_idn);
        assert!(!RegexExtractor.extract("com", "").is_idn);
        // Derived from the label, never from page content
        assert!(!RegexExtractor.extract("com", "xn-- mentioned in text").is_idn);
    }

    #[test]
    fn idn_title_keeps_unicode() {
        let body = "<title>.рф Domain Delegation Data</title>";
        let record = RegexExtractor.extract("xn--p1ai", body);
        assert_eq!(record.dm, ".рф");
        assert!(record.is_idn);
    }

    #[test]
    fn first_match_wins_on_duplicates() {
        let body = "Record last updated 2020-01-01 Record last updated 2021-06-30";
        let record = RegexExtractor.extract("zz", body);
        assert_eq!(record.last_update, "2020-01-01");
    }

    #[test]
    fn page_url_template() {
        let scraper = TldPageScraper::new();
        assert_eq!(
            scraper.page_url("xn--p1ai"),
            "https://www.iana.org/domains/root/db/xn--p1ai.html"
        );
    }

    #[tokio::test]
    async fn fetch_gives_up_after_retries() {
        // Unroutable address: every attempt fails at the transport level.
        let scraper = TldPageScraper::with_base_url("http://127.0.0.1:1");
        let err = scraper.fetch("nl").await.unwrap_err();
        match err {
            IanaError::RetryExhausted { tld, attempts, .. } => {
                assert_eq!(tld, "nl");
                assert_eq!(attempts, MAX_FETCH_ATTEMPTS + 1);
            }
            other => panic!("expected RetryExhausted, got: {}", other),
        }
    }
}
