/// Centralized error types for repo-overlap using thiserror
///
/// Provides domain-specific error types for better error handling and user-facing messages.
use thiserror::Error;

/// Main error type for the overlap system
#[derive(Error, Debug)]
pub enum OverlapError {
    #[error("Source error: {0}")]
    Source(#[from] SourceError),

    #[error("Listing error: {0}")]
    Listing(#[from] ListingError),

    #[error("Crawl error: {0}")]
    Crawl(#[from] CrawlError),

    #[error("Chunking error: {0}")]
    Chunking(#[from] ChunkingError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

/// Failures reported by a remote repository capability
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SourceError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Transient failure: {0}")]
    Transient(String),

    #[error("Malformed response: {0}")]
    Malformed(String),
}

/// Errors from listing a directory of a remote repository
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ListingError {
    /// The repository root could not be listed; the crawl cannot proceed
    #[error("Failed to list repository root '{repository}': {source}")]
    Root {
        repository: String,
        #[source]
        source: SourceError,
    },

    /// A nested directory could not be listed; its subtree is skipped
    #[error("Failed to list directory '{path}': {source}")]
    Directory {
        path: String,
        #[source]
        source: SourceError,
    },
}

/// A single file could not be fetched; always non-fatal
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Failed to fetch '{path}': {source}")]
pub struct FetchError {
    pub path: String,
    #[source]
    pub source: SourceError,
}

/// Errors that abort a single repository crawl
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CrawlError {
    #[error(transparent)]
    Listing(#[from] ListingError),

    #[error("Crawl was cancelled")]
    Cancelled,
}

/// Errors related to corpus chunking
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChunkingError {
    #[error("Invalid bound size: {0} (must be greater than 0)")]
    InvalidBoundSize(usize),
}

/// Errors related to configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration file: {0}")]
    LoadFailed(String),

    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),

    #[error("Invalid configuration value for '{key}': {reason}")]
    InvalidValue { key: String, reason: String },

    #[error("Failed to save configuration: {0}")]
    SaveFailed(String),

    #[error("Configuration file not found: {0}")]
    FileNotFound(String),
}

/// Errors related to input validation
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Invalid repository reference: {0}")]
    InvalidRepository(String),

    #[error("{field} must be {constraint}, got {actual}")]
    ConstraintViolation {
        field: String,
        constraint: String,
        actual: String,
    },

    #[error("Empty {0}")]
    Empty(String),
}

impl From<anyhow::Error> for OverlapError {
    fn from(err: anyhow::Error) -> Self {
        OverlapError::Other(format!("{:#}", err))
    }
}

impl OverlapError {
    /// Create a new error from a string message
    pub fn other(msg: impl Into<String>) -> Self {
        OverlapError::Other(msg.into())
    }

    /// Convert to a user-facing error string suitable for MCP responses
    pub fn to_user_string(&self) -> String {
        format!("{}", self)
    }

    /// Check if this is a user error (validation, bad config) vs system error
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            OverlapError::Validation(_)
                | OverlapError::Chunking(ChunkingError::InvalidBoundSize(_))
                | OverlapError::Config(ConfigError::InvalidValue { .. })
        )
    }

    /// Check if this error is retryable
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            OverlapError::Source(SourceError::Transient(_))
                | OverlapError::Listing(ListingError::Root {
                    source: SourceError::Transient(_),
                    ..
                })
                | OverlapError::Crawl(CrawlError::Listing(ListingError::Root {
                    source: SourceError::Transient(_),
                    ..
                }))
                | OverlapError::Io(_)
        )
    }
}
