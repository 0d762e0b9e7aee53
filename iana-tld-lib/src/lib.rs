//! # IANA TLD Library
//!
//! Fetches IANA's root list of top-level domains, scrapes each TLD's
//! registry delegation page into a structured record, and caches the
//! results as a delimited text store plus a JSON index.
//!
//! The pipeline is strictly sequential: the root list is refreshed first
//! (subject to a 24-hour staleness check), then TLD pages are fetched one
//! at a time in sorted order. Two modes are supported: an eager run that
//! processes every known TLD up front, and a lazy mode that scrapes
//! individual TLDs on demand and caches them in memory.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use iana_tld_lib::{ClientConfig, IanaClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ClientConfig::default().with_directory("data");
//!     let mut client = IanaClient::with_config(config);
//!     client.init().await?;
//!
//!     if let Some(record) = client.lookup(".nl").await? {
//!         println!("{}: whois {}", record.dm, record.whois);
//!     }
//!     Ok(())
//! }
//! ```

// Re-export main public API types and functions
pub use client::IanaClient;
pub use error::IanaError;
pub use root_list::{RootListFetcher, ROOT_LIST_URL};
pub use scraper::{PageExtractor, RegexExtractor, TldPageScraper, DELEGATION_BASE_URL};
pub use store::{ResultStore, JSON_FILENAME, RESULTS_FILENAME, ROOT_LIST_FILENAME};
pub use types::{
    ClientConfig, ResultIndex, RootTldSet, TldRecord, TldType, FIELD_SEPARATOR, NULL_SENTINEL,
};
pub use utils::normalize_tld;

// Internal modules
mod client;
mod error;
mod root_list;
mod scraper;
mod store;
mod types;
mod utils;

// Type alias for convenience
pub type Result<T> = std::result::Result<T, IanaError>;

// Library version metadata
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
