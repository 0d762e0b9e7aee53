//! Error handling for the TLD scraping pipeline.
//!
//! This module defines a comprehensive error type that covers all the
//! different ways the pipeline can fail, from network issues to a corrupt
//! result store on disk.

use std::fmt;

/// Main error type for TLD scraping operations.
///
/// This enum covers all possible failure modes in the fetch/parse/cache
/// pipeline, providing detailed context for debugging and user-friendly
/// error messages.
///
/// Two conditions are deliberately NOT errors:
/// - A delegation page missing an expected field yields the `"NULL"`
///   sentinel in the record, not an error.
/// - Looking up a TLD that is absent from the root list is a normal
///   negative result (`None`), not an error.
#[derive(Debug, Clone)]
pub enum IanaError {
    /// Network-related errors (connection, timeout, etc.)
    Network {
        message: String,
        source: Option<String>,
    },

    /// A single TLD page could not be fetched after repeated attempts.
    ///
    /// Callers decide whether this aborts the whole run or skips one item;
    /// the CLI maps it to exit code 101.
    RetryExhausted {
        tld: String,
        url: String,
        attempts: u32,
    },

    /// A line in the delimited result store did not split into exactly
    /// eight fields.
    StoreFormat {
        line_number: usize,
        message: String,
    },

    /// File I/O errors for the store, the cached root list, or the JSON
    /// export
    File {
        path: String,
        message: String,
    },

    /// Configuration errors (invalid settings, etc.)
    Config {
        message: String,
    },

    /// Generic internal errors that don't fit other categories
    Internal {
        message: String,
    },
}

impl IanaError {
    /// Create a new network error.
    pub fn network<M: Into<String>>(message: M) -> Self {
        Self::Network {
            message: message.into(),
            source: None,
        }
    }

    /// Create a new network error with source information.
    pub fn network_with_source<M: Into<String>, S: Into<String>>(message: M, source: S) -> Self {
        Self::Network {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// Create a new retry-exhausted error for a single TLD fetch.
    pub fn retry_exhausted<T: Into<String>, U: Into<String>>(
        tld: T,
        url: U,
        attempts: u32,
    ) -> Self {
        Self::RetryExhausted {
            tld: tld.into(),
            url: url.into(),
            attempts,
        }
    }

    /// Create a new store format error for a malformed line.
    pub fn store_format<M: Into<String>>(line_number: usize, message: M) -> Self {
        Self::StoreFormat {
            line_number,
            message: message.into(),
        }
    }

    /// Create a new file error.
    pub fn file_error<P: Into<String>, M: Into<String>>(path: P, message: M) -> Self {
        Self::File {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a new configuration error.
    pub fn config<M: Into<String>>(message: M) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new internal error.
    pub fn internal<M: Into<String>>(message: M) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Check if this error suggests the operation should be retried.
    ///
    /// Only transport-level failures are retryable; a corrupt store or an
    /// exhausted retry budget is final.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Network { .. })
    }
}

impl fmt::Display for IanaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Network { message, source } => {
                if let Some(source) = source {
                    write!(f, "Network error: {} (source: {})", message, source)
                } else {
                    write!(f, "Network error: {}", message)
                }
            }
            Self::RetryExhausted { tld, url, attempts } => {
                write!(
                    f,
                    "Fetching '{}' from {} failed {} times without success",
                    tld, url, attempts
                )
            }
            Self::StoreFormat {
                line_number,
                message,
            } => {
                write!(f, "Malformed store line {}: {}", line_number, message)
            }
            Self::File { path, message } => {
                write!(f, "File error at '{}': {}", path, message)
            }
            Self::Config { message } => {
                write!(f, "Configuration error: {}", message)
            }
            Self::Internal { message } => {
                write!(f, "Internal error: {}", message)
            }
        }
    }
}

impl std::error::Error for IanaError {}

// Implement From conversions for common error types
impl From<reqwest::Error> for IanaError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::network_with_source("HTTP request timed out", err.to_string())
        } else if err.is_connect() {
            Self::network_with_source("Connection failed", err.to_string())
        } else {
            Self::network_with_source("HTTP request failed", err.to_string())
        }
    }
}

impl From<std::io::Error> for IanaError {
    fn from(err: std::io::Error) -> Self {
        Self::Internal {
            message: format!("I/O error: {}", err),
        }
    }
}

impl From<serde_json::Error> for IanaError {
    fn from(err: serde_json::Error) -> Self {
        Self::Internal {
            message: format!("JSON serialization failed: {}", err),
        }
    }
}
