//! Rendered fetch strategy
//!
//! Pages that build their content with scripts are loaded in an isolated
//! browser session, given a bounded time to show a readiness marker, and then
//! captured. The session lifecycle is:
//!
//! 1. Launch a session scoped to one identity
//! 2. Navigate (bounded; failure ends the attempt)
//! 3. Wait for the readiness selector (bounded; failure only degrades the capture)
//! 4. Capture the full document
//! 5. Close the session, on every path

use crate::config::{FetchConfig, StrategyKind};
use crate::fetch::{FetchError, FetchOutcome, FetchedPage, Fetcher};
use crate::identity::FetchIdentity;
use async_trait::async_trait;
use std::time::Duration;
use tokio::time::timeout;
use url::Url;

/// Starts isolated browser sessions
#[async_trait]
pub trait BrowserLauncher: Send + Sync {
    /// Launches a fresh session presenting `identity`
    async fn launch(&self, identity: &FetchIdentity) -> Result<Box<dyn BrowserSession>, FetchError>;
}

/// One browser session, used for exactly one attempt
///
/// Timeouts are enforced by [`RenderedFetcher`]; implementations may block
/// for as long as the underlying browser does.
#[async_trait]
pub trait BrowserSession: Send {
    /// Loads `url` in the session's page
    async fn navigate(&mut self, url: &Url) -> Result<(), FetchError>;

    /// Resolves once an element matching `selector` is present
    async fn wait_for(&mut self, selector: &str) -> Result<(), FetchError>;

    /// Returns the full rendered document
    async fn content(&mut self) -> Result<String, FetchError>;

    /// Tears the session down
    async fn close(self: Box<Self>) -> Result<(), FetchError>;
}

/// Fetches pages through a headless browser
pub struct RenderedFetcher<L> {
    launcher: L,
    navigation_timeout: Duration,
    ready_timeout: Duration,
    ready_selector: String,
}

impl<L: BrowserLauncher> RenderedFetcher<L> {
    /// Creates a rendered fetcher using the configured timeouts and selector
    pub fn new(launcher: L, config: &FetchConfig) -> Self {
        Self::with_timeouts(
            launcher,
            config.navigation_timeout(),
            config.ready_timeout(),
            config.ready_selector.clone(),
        )
    }

    /// Creates a rendered fetcher with explicit timeouts
    pub fn with_timeouts(
        launcher: L,
        navigation_timeout: Duration,
        ready_timeout: Duration,
        ready_selector: impl Into<String>,
    ) -> Self {
        Self {
            launcher,
            navigation_timeout,
            ready_timeout,
            ready_selector: ready_selector.into(),
        }
    }

    /// Navigates, waits for readiness and captures, without closing the session
    async fn capture(
        &self,
        session: &mut Box<dyn BrowserSession>,
        url: &Url,
    ) -> Result<FetchedPage, FetchError> {
        match timeout(self.navigation_timeout, session.navigate(url)).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => return Err(e),
            Err(_) => {
                return Err(FetchError::Navigation {
                    message: format!(
                        "navigation to {} timed out after {:?}",
                        url, self.navigation_timeout
                    ),
                })
            }
        }

        let degraded = match timeout(self.ready_timeout, session.wait_for(&self.ready_selector))
            .await
        {
            Ok(Ok(())) => false,
            Ok(Err(e)) => {
                tracing::warn!(
                    "Readiness selector '{}' failed on {}: {}; capturing current content",
                    self.ready_selector,
                    url,
                    e
                );
                true
            }
            Err(_) => {
                tracing::warn!(
                    "Readiness selector '{}' not found on {} within {:?}; capturing current content",
                    self.ready_selector,
                    url,
                    self.ready_timeout
                );
                true
            }
        };

        let html = session.content().await?;

        Ok(FetchedPage {
            html,
            strategy: StrategyKind::Rendered,
            degraded,
        })
    }
}

#[async_trait]
impl<L: BrowserLauncher> Fetcher for RenderedFetcher<L> {
    async fn fetch(&self, url: &Url, identity: &FetchIdentity) -> FetchOutcome {
        let mut session = self.launcher.launch(identity).await?;

        let result = self.capture(&mut session, url).await;

        if let Err(e) = session.close().await {
            tracing::warn!("Failed to close browser session for {}: {}", url, e);
        }

        result
    }

    fn strategy(&self) -> StrategyKind {
        StrategyKind::Rendered
    }
}
