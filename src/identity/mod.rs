//! Identity rotation for fetch attempts
//!
//! Every attempt presents an identity: a user agent, an optional proxy and a
//! fixed header set. Identities are drawn at random from the configured pool so
//! that consecutive attempts against the same site tend to look different.

use crate::config::IdentityConfig;
use rand::seq::IndexedRandom;
use url::Url;

/// Used only when the rotator is built from an empty pool
const FALLBACK_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

const ACCEPT: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";

/// The identity presented for one fetch attempt
///
/// Immutable once drawn; a retry draws a new one instead of mutating this.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchIdentity {
    /// User-Agent header value
    pub user_agent: String,

    /// Proxy endpoint the attempt is routed through, if any
    pub proxy: Option<String>,

    /// Additional request headers, in send order
    pub headers: Vec<(String, String)>,
}

impl FetchIdentity {
    /// Looks up a header by case-insensitive name
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Proxy endpoint safe to log: scheme, host and port only, or `none`
    pub fn proxy_label(&self) -> String {
        self.proxy
            .as_deref()
            .map_or_else(|| "none".to_string(), redact_proxy)
    }
}

/// Strips credentials, path and query from a proxy URL
pub fn redact_proxy(proxy: &str) -> String {
    let Ok(url) = Url::parse(proxy) else {
        return "<unparseable proxy>".to_string();
    };

    let host = url.host_str().unwrap_or_default();
    match url.port_or_known_default() {
        Some(port) => format!("{}://{}:{}", url.scheme(), host, port),
        None => format!("{}://{}", url.scheme(), host),
    }
}

/// Draws fetch identities from a static pool
#[derive(Debug, Clone)]
pub struct IdentityRotator {
    user_agents: Vec<String>,
    proxies: Vec<String>,
    use_proxy: bool,
    proxy_every_attempt: bool,
    headers: Vec<(String, String)>,
}

impl IdentityRotator {
    /// Creates a rotator over the configured user agents and proxies
    pub fn new(config: &IdentityConfig) -> Self {
        let mut headers = vec![
            ("Accept".to_string(), ACCEPT.to_string()),
            (
                "Accept-Language".to_string(),
                config.accept_language.clone(),
            ),
        ];
        if let Some(referer) = &config.referer {
            headers.push(("Referer".to_string(), referer.clone()));
        }
        headers.push(("Connection".to_string(), "keep-alive".to_string()));

        Self {
            user_agents: config.user_agents.clone(),
            proxies: config.proxies.clone(),
            use_proxy: config.use_proxy,
            proxy_every_attempt: config.proxy_every_attempt,
            headers,
        }
    }

    /// Returns a randomly drawn identity
    ///
    /// A proxy is attached only when every attempt is proxied. Repeats across
    /// consecutive calls are possible.
    pub fn next(&self) -> FetchIdentity {
        let proxy = if self.proxy_every_attempt {
            self.pick_proxy()
        } else {
            None
        };
        self.build(proxy)
    }

    /// Returns a randomly drawn identity that always carries a proxy
    ///
    /// `None` when no proxies are configured.
    pub fn next_proxied(&self) -> Option<FetchIdentity> {
        let proxy = self.pick_proxy()?;
        Some(self.build(Some(proxy)))
    }

    /// Whether a 403 may be escalated to a proxied retry
    pub fn proxy_escalation_enabled(&self) -> bool {
        self.use_proxy && !self.proxies.is_empty()
    }

    fn pick_proxy(&self) -> Option<String> {
        self.proxies.choose(&mut rand::rng()).cloned()
    }

    fn build(&self, proxy: Option<String>) -> FetchIdentity {
        let user_agent = self
            .user_agents
            .choose(&mut rand::rng())
            .cloned()
            .unwrap_or_else(|| FALLBACK_USER_AGENT.to_string());

        FetchIdentity {
            user_agent,
            proxy,
            headers: self.headers.clone(),
        }
    }
}
