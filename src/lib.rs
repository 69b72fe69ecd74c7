//! Genewiki-Priority: a worklist builder for under-covered gene articles
//!
//! This crate correlates a knowledge graph (gene/protein/article existence),
//! wiki content metrics (article length, pageviews) and a biomedical literature
//! index (publications and authors per gene) into a ranked list of genes whose
//! Wikipedia articles are short relative to their publication volume.

pub mod config;
pub mod fetch;
pub mod merge;
pub mod output;
pub mod pipeline;
pub mod quarantine;
pub mod records;
pub mod score;
pub mod state;
pub mod storage;

use thiserror::Error;

/// Main error type for pipeline operations
#[derive(Debug, Error)]
pub enum GeneWikiError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{stage} stage incomplete; failed: {}", .failed.join(", "))]
    Incomplete { stage: Stage, failed: Vec<String> },
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Missing credential: {0}")]
    MissingCredential(String),
}

/// Per-item fetch errors
///
/// Every variant names the item it was fetching so a quarantined failure can
/// be reported without extra bookkeeping.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Connection, timeout or 5xx failure that survived every retry
    #[error("transient failure for {item}: {reason}")]
    Transient { item: String, reason: String },

    /// HTTP 429 that survived every retry
    #[error("rate limited while fetching {item}")]
    RateLimited { item: String },

    /// The upstream answered but had nothing usable for this item
    #[error("no result for {item}: {reason}")]
    NotFoundOrEmpty { item: String, reason: String },

    /// The response body could not be decoded
    #[error("malformed response for {item}: {reason}")]
    Malformed { item: String, reason: String },
}

impl FetchError {
    /// Returns the key of the item that failed
    pub fn item(&self) -> &str {
        match self {
            Self::Transient { item, .. }
            | Self::RateLimited { item }
            | Self::NotFoundOrEmpty { item, .. }
            | Self::Malformed { item, .. } => item,
        }
    }

    /// Returns true if another attempt could plausibly succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transient { .. } | Self::RateLimited { .. })
    }

    /// Re-labels the error with a different item key
    ///
    /// The HTTP layer only knows URLs; source adapters swap in the gene ID,
    /// title or PMID that the quarantine tracks.
    pub fn for_item(self, item: impl Into<String>) -> Self {
        let item = item.into();
        match self {
            Self::Transient { reason, .. } => Self::Transient { item, reason },
            Self::RateLimited { .. } => Self::RateLimited { item },
            Self::NotFoundOrEmpty { reason, .. } => Self::NotFoundOrEmpty { item, reason },
            Self::Malformed { reason, .. } => Self::Malformed { item, reason },
        }
    }
}

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, GeneWikiError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for single-item fetches
pub type FetchResult<T> = std::result::Result<T, FetchError>;

// Re-export commonly used types
pub use config::Config;
pub use merge::normalize_title;
pub use quarantine::{run_pass, Accumulator, PassOutcome};
pub use state::{RunStatus, Stage};
