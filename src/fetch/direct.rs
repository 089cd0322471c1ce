//! Direct HTTP fetch strategy
//!
//! This module handles plain HTTP requests, including:
//! - Building an HTTP client scoped to one fetch identity
//! - Sending the identity's headers and routing through its proxy
//! - Classifying failures into HTTP and timeout errors

use crate::config::StrategyKind;
use crate::fetch::{FetchError, FetchOutcome, FetchedPage, Fetcher};
use crate::identity::FetchIdentity;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Proxy};
use std::time::Duration;
use url::Url;

/// Fetches pages with a single HTTP GET per attempt
#[derive(Debug, Clone)]
pub struct DirectFetcher {
    timeout: Duration,
}

impl DirectFetcher {
    /// Creates a direct fetcher with the given per-request timeout
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

/// Builds an HTTP client presenting the given identity
///
/// A client is built per attempt so that proxy and headers never leak from
/// one identity into another.
///
/// # Arguments
///
/// * `identity` - User agent, proxy and headers to present
/// * `timeout` - Total request timeout
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client (e.g. unusable proxy URL)
///
/// # Example
///
/// ```no_run
/// use std::time::Duration;
/// use sumi_quill::fetch::build_http_client;
/// use sumi_quill::identity::FetchIdentity;
///
/// let identity = FetchIdentity {
///     user_agent: "Mozilla/5.0".to_string(),
///     proxy: None,
///     headers: vec![("Accept-Language".to_string(), "en-US".to_string())],
/// };
///
/// let client = build_http_client(&identity, Duration::from_secs(10)).unwrap();
/// ```
pub fn build_http_client(
    identity: &FetchIdentity,
    timeout: Duration,
) -> Result<Client, reqwest::Error> {
    let mut builder = Client::builder()
        .user_agent(identity.user_agent.as_str())
        .default_headers(header_map(identity))
        .timeout(timeout)
        .connect_timeout(timeout.min(Duration::from_secs(10)))
        .gzip(true)
        .brotli(true);

    if let Some(proxy) = &identity.proxy {
        builder = builder.proxy(Proxy::all(proxy.as_str())?);
    }

    builder.build()
}

/// Converts identity headers into a header map, skipping unusable entries
fn header_map(identity: &FetchIdentity) -> HeaderMap {
    let mut headers = HeaderMap::new();

    for (name, value) in &identity.headers {
        match (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            (Ok(name), Ok(value)) => {
                headers.insert(name, value);
            }
            _ => tracing::warn!("Skipping invalid header {}: {}", name, value),
        }
    }

    headers
}

#[async_trait]
impl Fetcher for DirectFetcher {
    async fn fetch(&self, url: &Url, identity: &FetchIdentity) -> FetchOutcome {
        let client = build_http_client(identity, self.timeout).map_err(|e| FetchError::Http {
            status: None,
            message: format!("Failed to build HTTP client: {}", e),
        })?;

        tracing::debug!(
            "GET {} (proxy: {})",
            url,
            identity.proxy_label()
        );

        let response = client
            .get(url.as_str())
            .send()
            .await
            .map_err(|e| classify_error(e, url, self.timeout))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Http {
                status: Some(status.as_u16()),
                message: format!("{} for url: {}", status, url),
            });
        }

        let html = response
            .text()
            .await
            .map_err(|e| classify_error(e, url, self.timeout))?;

        Ok(FetchedPage {
            html,
            strategy: StrategyKind::Direct,
            degraded: false,
        })
    }

    fn strategy(&self) -> StrategyKind {
        StrategyKind::Direct
    }
}

/// Maps a reqwest failure onto the fetch error taxonomy
fn classify_error(error: reqwest::Error, url: &Url, timeout: Duration) -> FetchError {
    if error.is_timeout() {
        FetchError::Timeout {
            message: format!("no response from {} within {}s", url, timeout.as_secs()),
        }
    } else if error.is_connect() {
        FetchError::Http {
            status: None,
            message: format!("Connection failed for {}: {}", url, error),
        }
    } else {
        FetchError::Http {
            status: error.status().map(|s| s.as_u16()),
            message: format!("Request to {} failed: {}", url, error),
        }
    }
}
