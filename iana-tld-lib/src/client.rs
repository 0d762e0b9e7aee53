//! Main client implementation gluing the pipeline together.
//!
//! This module provides the primary `IanaClient` struct that coordinates the
//! root-list fetcher, the page scraper, and the result store into the two
//! supported modes: an eager run over every known TLD, and lazy on-demand
//! lookup of single TLDs.

use crate::error::IanaError;
use crate::root_list::RootListFetcher;
use crate::scraper::TldPageScraper;
use crate::store::{ResultStore, ROOT_LIST_FILENAME};
use crate::types::{ClientConfig, ResultIndex, RootTldSet, TldRecord};
use crate::utils::normalize_tld;
use std::fs;
use std::path::PathBuf;
use tracing::{debug, info};

/// Client that coordinates the fetch/parse/cache pipeline.
///
/// Execution is strictly sequential: one network request at a time, TLDs
/// processed in sorted order, so the store's line order is deterministic
/// for a fixed root list.
///
/// # Example
///
/// ```rust,no_run
/// use iana_tld_lib::{ClientConfig, IanaClient};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let config = ClientConfig::default().with_directory("/tmp/iana_data");
///     let mut client = IanaClient::with_config(config);
///     client.init().await?;
///
///     match client.lookup(".nl").await? {
///         Some(record) => println!("{} is managed by {}", record.dm, record.nic),
///         None => println!("not a delegated TLD"),
///     }
///     Ok(())
/// }
/// ```
pub struct IanaClient {
    /// Immutable configuration for this client instance
    config: ClientConfig,
    /// Conditional downloader for the root TLD list
    fetcher: RootListFetcher,
    /// Per-TLD delegation page scraper
    scraper: TldPageScraper,
    /// Durable delimited store and JSON export
    store: ResultStore,
    /// Known TLD labels from the root list, loaded by `init`
    known: RootTldSet,
    /// In-memory record index keyed by domain-management name
    index: ResultIndex,
}

impl IanaClient {
    /// Create a client with default configuration.
    pub fn new() -> Self {
        Self::with_config(ClientConfig::default())
    }

    /// Create a client with custom configuration.
    pub fn with_config(config: ClientConfig) -> Self {
        let store = ResultStore::new(&config.directory);
        Self {
            config,
            fetcher: RootListFetcher::new(),
            scraper: TldPageScraper::new(),
            store,
            known: RootTldSet::new(),
            index: ResultIndex::new(),
        }
    }

    /// Prepare the data directory and load the known-TLD set.
    ///
    /// Creates the base directory if missing, re-downloads the root list
    /// when it is stale (or a refresh is forced), and parses it. Always
    /// call this before `run_eager` or `lookup`.
    pub async fn init(&mut self) -> Result<(), IanaError> {
        fs::create_dir_all(&self.config.directory).map_err(|e| {
            IanaError::file_error(self.config.directory.display().to_string(), e.to_string())
        })?;

        let root_list_path = self.root_list_path();
        self.fetcher
            .ensure_fresh(
                &root_list_path,
                self.config.force_refresh,
                self.config.max_root_list_age,
            )
            .await?;

        self.known = RootListFetcher::list_known_tlds(&root_list_path)?;
        debug!(tlds = self.known.len(), "loaded root TLD set");
        Ok(())
    }

    /// Scrape every known TLD and rebuild the durable stores.
    ///
    /// Truncates the delimited store once, then fetches, parses, and appends
    /// one record per TLD in sorted order. A fetch that exhausts its retry
    /// budget aborts the run with `RetryExhausted`; records appended before
    /// the failure survive on disk. Finishes by reloading the store and
    /// exporting the JSON index.
    pub async fn run_eager(&mut self) -> Result<(), IanaError> {
        self.store.truncate()?;

        let tlds: Vec<String> = self.known.iter().cloned().collect();
        for tld in &tlds {
            let record = self.scraper.scrape(tld).await?;
            if self.config.verbose {
                info!("{}", record.to_line());
            }
            self.store.append(&record)?;
        }

        self.export_existing()
    }

    /// Rebuild the in-memory index from the store and export it as JSON.
    ///
    /// Also the path taken when an eager run is declined at the overwrite
    /// prompt: whatever the store currently holds is still exported.
    pub fn export_existing(&mut self) -> Result<(), IanaError> {
        self.index = self.store.reload()?;
        self.store.export_json(&self.index)
    }

    /// Look up one TLD, scraping it on demand if necessary.
    ///
    /// The input is normalized (lowercased, one leading dot stripped). A
    /// label absent from the root list is a normal negative result and
    /// causes no network traffic. A known label is served from the
    /// in-memory index when present; otherwise it is scraped once and
    /// cached in memory only — the durable store is not appended on this
    /// path.
    pub async fn lookup(&mut self, tld: &str) -> Result<Option<TldRecord>, IanaError> {
        let tld = normalize_tld(tld);
        if !self.known.contains(&tld) {
            debug!(%tld, "not in root list, skipping fetch");
            return Ok(None);
        }

        if let Some(record) = self.index.values().find(|r| r.tld == tld) {
            return Ok(Some(record.clone()));
        }

        let record = self.scraper.scrape(&tld).await?;
        self.index.insert(record.dm.clone(), record.clone());
        Ok(Some(record))
    }

    /// The known-TLD set loaded from the root list.
    pub fn known_tlds(&self) -> &RootTldSet {
        &self.known
    }

    /// The current in-memory record index.
    pub fn index(&self) -> &ResultIndex {
        &self.index
    }

    /// The configuration this client was built with.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Whether the delimited results file already exists on disk.
    ///
    /// Used by callers to decide whether an eager run needs overwrite
    /// confirmation.
    pub fn results_file_exists(&self) -> bool {
        self.store.results_file_exists()
    }

    /// Path of the delimited results file.
    pub fn results_path(&self) -> PathBuf {
        self.store.results_path().to_path_buf()
    }

    fn root_list_path(&self) -> PathBuf {
        self.config.directory.join(ROOT_LIST_FILENAME)
    }
}

impl Default for IanaClient {
    fn default() -> Self {
        Self::new()
    }
}
