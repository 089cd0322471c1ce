//! Extraction orchestration
//!
//! This module contains the decision logic between fetching and parsing:
//! - The per-URL pipeline with retries, backoff and proxy escalation
//! - The batch coordinator with sequential, paced processing
//! - The error taxonomy every failure is converted into

mod backoff;
mod coordinator;
mod pipeline;


pub use backoff::Backoff;
pub use coordinator::{BatchCoordinator, BatchItem};
pub use pipeline::{validate_url, ExtractionPipeline};

use crate::article::{ArticleRecord, ParseError};
use crate::fetch::FetchError;
use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Message used when a single extraction request carries no URL
pub const NO_URL_PROVIDED: &str = "No URL provided";

/// Message used when a batch request carries no usable URL list
pub const NO_URL_LIST_PROVIDED: &str = "Please provide a list of URLs";

/// Every way an extraction can fail
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractionError {
    /// Caller-supplied input was unusable; never retried
    #[error("{0}")]
    InvalidInput(String),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    /// All attempts failed; carries the error of the final attempt
    #[error("Failed after {attempts} attempts: {last}")]
    RetriesExhausted {
        attempts: u32,
        last: Box<ExtractionError>,
    },
}

impl ExtractionError {
    /// True when the failure was caused by the caller's input
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::InvalidInput(_))
    }

    /// Short machine-readable name of the error kind
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidInput(_) => "invalid_input",
            Self::Fetch(e) => e.kind(),
            Self::Parse(e) => e.kind(),
            Self::RetriesExhausted { .. } => "retries_exhausted",
        }
    }
}

/// Outcome of extracting one URL
pub type ExtractionResult = Result<ArticleRecord, ExtractionError>;

/// Suspends the current task between retries and between batch items
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Sleeps on the tokio timer
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}
