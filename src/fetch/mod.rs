//! Fetch strategies for obtaining raw HTML
//!
//! This module contains the two interchangeable ways of getting a page:
//! - Direct HTTP GET through reqwest
//! - Rendered capture through a headless browser session
//!
//! Both implement [`Fetcher`], so the extraction pipeline never needs to know
//! which one it is driving.

mod direct;
mod rendered;

#[cfg(feature = "headless")]
mod chromium;

pub use direct::{build_http_client, DirectFetcher};
pub use rendered::{BrowserLauncher, BrowserSession, RenderedFetcher};

#[cfg(feature = "headless")]
pub use chromium::ChromiumLauncher;

use crate::config::{FetchConfig, StrategyKind};
use crate::identity::FetchIdentity;
use crate::QuillError;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use url::Url;

/// Errors produced while fetching a page
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// Non-2xx response, or a network failure before any response (`status` is `None`)
    #[error("HTTP error: {message}")]
    Http {
        status: Option<u16>,
        message: String,
    },

    #[error("Timeout: {message}")]
    Timeout { message: String },

    /// The rendered session could not load the page
    #[error("Navigation failed: {message}")]
    Navigation { message: String },
}

impl FetchError {
    /// HTTP status code carried by the error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => *status,
            _ => None,
        }
    }

    /// Short machine-readable name of the error kind
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Http { .. } => "http",
            Self::Timeout { .. } => "timeout",
            Self::Navigation { .. } => "navigation",
        }
    }
}

/// Raw HTML obtained by a fetch strategy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedPage {
    /// Document content
    pub html: String,

    /// Strategy that produced the content
    pub strategy: StrategyKind,

    /// True when a rendered capture was taken without the readiness signal
    pub degraded: bool,
}

/// Outcome of a single fetch
pub type FetchOutcome = Result<FetchedPage, FetchError>;

/// A way of obtaining raw HTML for a URL under a given identity
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetches `url` presenting `identity`
    async fn fetch(&self, url: &Url, identity: &FetchIdentity) -> FetchOutcome;

    /// Which strategy this fetcher implements
    fn strategy(&self) -> StrategyKind;
}

/// Builds the fetcher selected by configuration
///
/// # Returns
///
/// * `Ok(Arc<dyn Fetcher>)` - The configured strategy
/// * `Err(QuillError::UnsupportedStrategy)` - Rendered fetching was requested
///   but the crate was built without the `headless` feature
pub fn build_fetcher(config: &FetchConfig) -> Result<Arc<dyn Fetcher>, QuillError> {
    match config.strategy {
        StrategyKind::Direct => Ok(Arc::new(DirectFetcher::new(config.timeout()))),
        StrategyKind::Rendered => build_rendered_fetcher(config),
    }
}

#[cfg(feature = "headless")]
fn build_rendered_fetcher(config: &FetchConfig) -> Result<Arc<dyn Fetcher>, QuillError> {
    Ok(Arc::new(RenderedFetcher::new(ChromiumLauncher::new(), config)))
}

#[cfg(not(feature = "headless"))]
fn build_rendered_fetcher(config: &FetchConfig) -> Result<Arc<dyn Fetcher>, QuillError> {
    Err(QuillError::UnsupportedStrategy(config.strategy))
}
