//! Core data types for the TLD scraping pipeline.
//!
//! This module defines the main data structures used throughout the library:
//! scraped registry records, the TLD classification enum, and the client
//! configuration.

use crate::error::IanaError;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;
use std::time::Duration;

/// Literal sentinel stored for any page field with no match.
///
/// Every field of a record is always present; missing data is this string,
/// never an absent key.
pub const NULL_SENTINEL: &str = "NULL";

/// Separator between the eight fields of one store line.
pub const FIELD_SEPARATOR: &str = " -- ";

/// Sorted, deduplicated set of known TLD labels loaded from the root list.
pub type RootTldSet = BTreeSet<String>;

/// In-memory index of scraped records, keyed by domain-management name.
///
/// A BTreeMap keeps serialization order deterministic, so exporting the same
/// index twice produces byte-identical JSON.
pub type ResultIndex = BTreeMap<String, TldRecord>;

/// One parsed registry entry for a single TLD.
///
/// Produced by scraping the TLD's delegation page. String fields that could
/// not be extracted hold the literal `"NULL"`; `is_idn` is derived from the
/// label itself, never from page content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TldRecord {
    /// ASCII/punycode label, lowercase (e.g. "com", "xn--p1ai")
    pub tld: String,

    /// Human-readable title from the page, dot included (e.g. ".com", ".рф").
    /// May contain non-ASCII text. Used as the JSON index key.
    pub dm: String,

    /// Whether the label is an internationalized domain name
    /// (true iff `tld` starts with "xn--")
    #[serde(rename = "isIdn")]
    pub is_idn: bool,

    /// Registry classification derived from page phrases
    #[serde(rename = "tldType")]
    pub tld_type: TldType,

    /// Registrar/registry name, or "NULL"
    pub nic: String,

    /// WHOIS server hostname, lowercased, or "NULL"
    pub whois: String,

    /// ISO date of the last record update, or "NULL"
    #[serde(rename = "lastUpdate")]
    pub last_update: String,

    /// ISO date of the original delegation, or "NULL"
    #[serde(rename = "registrationDate")]
    pub registration_date: String,
}

impl TldRecord {
    /// Render the record as one store line: eight fields joined by `" -- "`
    /// in fixed order.
    pub fn to_line(&self) -> String {
        [
            self.tld.as_str(),
            self.dm.as_str(),
            if self.is_idn { "true" } else { "false" },
            self.tld_type.as_str(),
            self.nic.as_str(),
            self.whois.as_str(),
            self.last_update.as_str(),
            self.registration_date.as_str(),
        ]
        .join(FIELD_SEPARATOR)
    }

    /// Parse one store line back into a record.
    ///
    /// The line must split on the separator into exactly eight fields;
    /// anything else is a hard format error carrying `line_number` for
    /// diagnostics.
    pub fn from_line(line: &str, line_number: usize) -> Result<Self, IanaError> {
        let fields: Vec<&str> = line.split(FIELD_SEPARATOR).collect();
        if fields.len() != 8 {
            return Err(IanaError::store_format(
                line_number,
                format!("expected 8 fields, found {}", fields.len()),
            ));
        }

        let is_idn = if fields[2].eq_ignore_ascii_case("true") {
            true
        } else if fields[2].eq_ignore_ascii_case("false") {
            false
        } else {
            return Err(IanaError::store_format(
                line_number,
                format!("invalid boolean '{}'", fields[2]),
            ));
        };

        let tld_type = TldType::parse(fields[3])
            .ok_or_else(|| IanaError::store_format(line_number, format!("unknown TLD type '{}'", fields[3])))?;

        Ok(Self {
            tld: fields[0].to_string(),
            dm: fields[1].to_string(),
            is_idn,
            tld_type,
            nic: fields[4].to_string(),
            whois: fields[5].to_string(),
            last_update: fields[6].to_string(),
            registration_date: fields[7].to_string(),
        })
    }
}

/// Registry classification of a TLD.
///
/// Derived by testing the delegation page against three literal phrases in
/// priority order; sponsored TLDs are deliberately folded into the generic
/// bucket (e.g. `.asia`), and anything matching no phrase is a country code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TldType {
    /// Generic (and sponsored) top-level domain
    #[serde(rename = "gTLD")]
    Generic,

    /// Infrastructure top-level domain (`.arpa`)
    #[serde(rename = "iTLD")]
    Infrastructure,

    /// Country-code top-level domain
    #[serde(rename = "ccTLD")]
    CountryCode,
}

impl TldType {
    /// Fixed text used in both the store line format and the JSON export.
    pub fn as_str(&self) -> &'static str {
        match self {
            TldType::Generic => "gTLD",
            TldType::Infrastructure => "iTLD",
            TldType::CountryCode => "ccTLD",
        }
    }

    /// Parse the store-line representation back into a variant.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "gTLD" => Some(TldType::Generic),
            "iTLD" => Some(TldType::Infrastructure),
            "ccTLD" => Some(TldType::CountryCode),
            _ => None,
        }
    }
}

impl std::fmt::Display for TldType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Configuration options for a scraping client.
///
/// An immutable value passed to the client at construction; there are no
/// ambient/global flags. Builder-style `with_*` methods allow fluent setup.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base directory for all files (delimited store, cached root list,
    /// JSON export). Default: "data"
    pub directory: PathBuf,

    /// Emit each scraped record line as a diagnostic on the error stream
    /// Default: false
    pub verbose: bool,

    /// Overwrite the results file without confirmation
    /// Default: false
    pub overwrite_results: bool,

    /// Ask before overwriting when `overwrite_results` is false
    /// Default: true
    pub interactive: bool,

    /// Process every known TLD up front (eager) instead of scraping
    /// lazily on lookup. Default: false
    pub eager: bool,

    /// Re-download the root list even if the cached copy is fresh
    /// Default: false
    pub force_refresh: bool,

    /// Maximum age of the cached root list before it is re-downloaded
    /// Default: 24 hours
    pub max_root_list_age: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("data"),
            verbose: false,
            overwrite_results: false,
            interactive: true,
            eager: false,
            force_refresh: false,
            max_root_list_age: Duration::from_secs(24 * 3600),
        }
    }
}

impl ClientConfig {
    /// Set the base directory for all files.
    pub fn with_directory<P: Into<PathBuf>>(mut self, directory: P) -> Self {
        self.directory = directory.into();
        self
    }

    /// Enable or disable verbose diagnostics.
    pub fn with_verbose(mut self, enabled: bool) -> Self {
        self.verbose = enabled;
        self
    }

    /// Enable or disable unconditional overwriting of the results file.
    pub fn with_overwrite_results(mut self, enabled: bool) -> Self {
        self.overwrite_results = enabled;
        self
    }

    /// Enable or disable the interactive overwrite confirmation.
    pub fn with_interactive(mut self, enabled: bool) -> Self {
        self.interactive = enabled;
        self
    }

    /// Choose eager (process everything up front) or lazy mode.
    pub fn with_eager(mut self, enabled: bool) -> Self {
        self.eager = enabled;
        self
    }

    /// Bypass the staleness check and always re-download the root list.
    pub fn with_force_refresh(mut self, enabled: bool) -> Self {
        self.force_refresh = enabled;
        self
    }

    /// Set a custom staleness threshold for the cached root list.
    pub fn with_max_root_list_age(mut self, max_age: Duration) -> Self {
        self.max_root_list_age = max_age;
        self
    }
}
