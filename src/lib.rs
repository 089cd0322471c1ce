//! Sumi-Quill: a resilient article extractor
//!
//! This crate fetches web pages (directly or through a headless browser),
//! retries with rotating identities and exponential backoff, parses the result
//! into an article record, and serves extractions over HTTP.

pub mod article;
pub mod config;
pub mod extractor;
pub mod fetch;
pub mod identity;
pub mod report;
pub mod server;

use thiserror::Error;

/// Main error type for Sumi-Quill process-level operations
///
/// Extraction failures are not represented here: they are values
/// ([`extractor::ExtractionError`]) returned by the pipeline, never faults.
#[derive(Debug, Error)]
pub enum QuillError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Fetch strategy '{0}' is not available in this build (enable the `headless` feature)")]
    UnsupportedStrategy(config::StrategyKind),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
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
}

/// Result type alias for Sumi-Quill operations
pub type Result<T> = std::result::Result<T, QuillError>;

// Re-export commonly used types
pub use article::{ArticleParser, ArticleRecord, HtmlArticleParser};
pub use config::Config;
pub use extractor::{BatchCoordinator, BatchItem, ExtractionError, ExtractionPipeline, ExtractionResult};
pub use fetch::{FetchError, Fetcher};
pub use identity::{FetchIdentity, IdentityRotator};
