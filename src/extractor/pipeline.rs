//! Per-URL extraction pipeline
//!
//! One extraction is a bounded sequence of attempts. Each attempt draws a fresh
//! identity, fetches, and parses; failed attempts are followed by an
//! exponential backoff pause, and a 403 may be escalated once to a proxied
//! identity within the same attempt.

use crate::article::{ArticleParser, ArticleRecord, HtmlArticleParser};
use crate::config::Config;
use crate::extractor::{
    Backoff, ExtractionError, ExtractionResult, Sleeper, TokioSleeper, NO_URL_PROVIDED,
};
use crate::fetch::{build_fetcher, FetchOutcome, Fetcher};
use crate::identity::{FetchIdentity, IdentityRotator};
use crate::QuillError;
use std::sync::Arc;
use url::Url;

const FORBIDDEN: u16 = 403;

/// Fetches and parses a single URL with retries
pub struct ExtractionPipeline {
    fetcher: Arc<dyn Fetcher>,
    parser: Arc<dyn ArticleParser>,
    rotator: IdentityRotator,
    backoff: Backoff,
    max_retries: u32,
    sleeper: Arc<dyn Sleeper>,
}

impl ExtractionPipeline {
    /// Creates a pipeline around explicit fetch and parse collaborators
    pub fn new(config: &Config, fetcher: Arc<dyn Fetcher>, parser: Arc<dyn ArticleParser>) -> Self {
        Self {
            fetcher,
            parser,
            rotator: IdentityRotator::new(&config.identity),
            backoff: Backoff::from_config(&config.pipeline),
            max_retries: config.pipeline.max_retries,
            sleeper: Arc::new(TokioSleeper),
        }
    }

    /// Creates a pipeline using the configured fetch strategy and the HTML parser
    ///
    /// # Returns
    ///
    /// * `Ok(ExtractionPipeline)` - Ready to extract
    /// * `Err(QuillError)` - The configured strategy is not available
    pub fn from_config(config: &Config) -> Result<Self, QuillError> {
        let fetcher = build_fetcher(&config.fetch)?;
        Ok(Self::new(config, fetcher, Arc::new(HtmlArticleParser::new())))
    }

    /// Replaces the sleeper used for backoff pauses
    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    /// Sleeper shared with the batch coordinator for its between-item pauses
    pub fn sleeper(&self) -> Arc<dyn Sleeper> {
        Arc::clone(&self.sleeper)
    }

    /// Extracts the article at `raw_url`
    ///
    /// Every failure is returned as a value. Invalid input fails before any
    /// network activity and is never retried.
    pub async fn extract(&self, raw_url: &str) -> ExtractionResult {
        let url = validate_url(raw_url)?;
        let attempts = self.max_retries.max(1);
        let mut attempt = 1;

        loop {
            tracing::debug!(
                "Extracting {} (attempt {}/{}, strategy: {})",
                url,
                attempt,
                attempts,
                self.fetcher.strategy()
            );

            let error = match self.attempt(&url).await {
                Ok(record) => return Ok(record),
                Err(e) => e,
            };

            tracing::warn!(
                "Attempt {}/{} for {} failed: {}",
                attempt,
                attempts,
                url,
                error
            );

            if attempt >= attempts {
                return Err(ExtractionError::RetriesExhausted {
                    attempts,
                    last: Box::new(error),
                });
            }

            let pause = self.backoff.delay(attempt);
            tracing::debug!("Backing off {:.2}s before retrying {}", pause.as_secs_f64(), url);
            self.sleeper.sleep(pause).await;
            attempt += 1;
        }
    }

    async fn attempt(&self, url: &Url) -> ExtractionResult {
        let identity = self.rotator.next();
        let page = self.fetch_with_escalation(url, &identity).await?;

        if page.degraded {
            tracing::debug!("Parsing degraded capture of {}", url);
        }

        let parsed = self.parser.parse(&page.html, url)?;
        Ok(ArticleRecord::from(parsed))
    }

    /// Fetches once, re-fetching through a proxy if the first response is a 403
    async fn fetch_with_escalation(&self, url: &Url, identity: &FetchIdentity) -> FetchOutcome {
        let outcome = self.fetcher.fetch(url, identity).await;

        let forbidden = matches!(&outcome, Err(e) if e.status() == Some(FORBIDDEN));
        if !forbidden || identity.proxy.is_some() || !self.rotator.proxy_escalation_enabled() {
            return outcome;
        }

        let Some(proxied) = self.rotator.next_proxied() else {
            return outcome;
        };

        tracing::warn!(
            "403 from {}, retrying through proxy {}",
            url,
            proxied.proxy_label()
        );

        match self.fetcher.fetch(url, &proxied).await {
            Ok(page) => Ok(page),
            Err(e) => {
                tracing::debug!("Proxied fetch of {} failed: {}", url, e);
                outcome
            }
        }
    }
}

/// Validates caller input as an absolute http(s) URL
pub fn validate_url(raw: &str) -> Result<Url, ExtractionError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ExtractionError::InvalidInput(NO_URL_PROVIDED.to_string()));
    }

    let url = Url::parse(trimmed)
        .map_err(|e| ExtractionError::InvalidInput(format!("Invalid URL '{}': {}", trimmed, e)))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(ExtractionError::InvalidInput(format!(
            "Invalid URL '{}': unsupported scheme '{}'",
            trimmed,
            url.scheme()
        )));
    }

    if url.host_str().map_or(true, str::is_empty) {
        return Err(ExtractionError::InvalidInput(format!(
            "Invalid URL '{}': missing host",
            trimmed
        )));
    }

    Ok(url)
}
