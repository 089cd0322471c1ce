use serde::Deserialize;
use std::time::Duration;

/// Longest pause ever taken between attempts or batch items
pub const MAX_PAUSE: Duration = Duration::from_secs(3600);

/// Converts a pause in seconds into a `Duration`, clamped to `[0, MAX_PAUSE]`
pub fn pause_from_secs(seconds: f64) -> Duration {
    Duration::try_from_secs_f64(seconds.max(0.0)).map_or(MAX_PAUSE, |pause| pause.min(MAX_PAUSE))
}

/// Main configuration structure for Sumi-Quill
///
/// Built once at process start and shared read-only by every request.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub pipeline: PipelineConfig,
    #[serde(default)]
    pub batch: BatchConfig,
    #[serde(default)]
    pub fetch: FetchConfig,
    pub identity: IdentityConfig,
}

/// HTTP listener configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Retry and backoff behavior of the extraction pipeline
#[derive(Debug, Clone, Deserialize)]
pub struct PipelineConfig {
    /// Total number of attempts per URL
    #[serde(rename = "max-retries", default = "default_max_retries")]
    pub max_retries: u32,

    /// Base of the exponential backoff, in seconds
    #[serde(rename = "backoff-base", default = "default_backoff_base")]
    pub backoff_base: f64,

    /// Lower bound of the random jitter added to each backoff (seconds)
    #[serde(rename = "jitter-min", default = "default_jitter_min")]
    pub jitter_min: f64,

    /// Upper bound of the random jitter added to each backoff (seconds)
    #[serde(rename = "jitter-max", default = "default_jitter_max")]
    pub jitter_max: f64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            backoff_base: default_backoff_base(),
            jitter_min: default_jitter_min(),
            jitter_max: default_jitter_max(),
        }
    }
}

/// Batch pacing configuration
#[derive(Debug, Clone, Deserialize)]
pub struct BatchConfig {
    /// Pause between two consecutive batch items (seconds)
    #[serde(rename = "delay-seconds", default = "default_batch_delay")]
    pub delay_seconds: f64,
}

impl BatchConfig {
    pub fn delay(&self) -> Duration {
        pause_from_secs(self.delay_seconds)
    }
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            delay_seconds: default_batch_delay(),
        }
    }
}

/// Which fetch strategy the pipeline runs with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrategyKind {
    /// Plain HTTP GET
    Direct,
    /// Headless browser navigation and capture
    Rendered,
}

impl std::fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Direct => write!(f, "direct"),
            Self::Rendered => write!(f, "rendered"),
        }
    }
}

/// Fetch strategy selection and timeouts
#[derive(Debug, Clone, Deserialize)]
pub struct FetchConfig {
    #[serde(default = "default_strategy")]
    pub strategy: StrategyKind,

    /// Timeout of a direct HTTP request
    #[serde(rename = "timeout-secs", default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Timeout of a rendered navigation
    #[serde(
        rename = "navigation-timeout-secs",
        default = "default_navigation_timeout_secs"
    )]
    pub navigation_timeout_secs: u64,

    /// Timeout of the readiness wait after navigation
    #[serde(rename = "ready-timeout-secs", default = "default_ready_timeout_secs")]
    pub ready_timeout_secs: u64,

    /// CSS selector whose presence marks a rendered page as ready
    #[serde(rename = "ready-selector", default = "default_ready_selector")]
    pub ready_selector: String,
}

impl FetchConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn navigation_timeout(&self) -> Duration {
        Duration::from_secs(self.navigation_timeout_secs)
    }

    pub fn ready_timeout(&self) -> Duration {
        Duration::from_secs(self.ready_timeout_secs)
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            strategy: default_strategy(),
            timeout_secs: default_timeout_secs(),
            navigation_timeout_secs: default_navigation_timeout_secs(),
            ready_timeout_secs: default_ready_timeout_secs(),
            ready_selector: default_ready_selector(),
        }
    }
}

/// Pool of identities presented to target sites
#[derive(Debug, Clone, Deserialize)]
pub struct IdentityConfig {
    /// User agent strings drawn from at random for each attempt
    #[serde(rename = "user-agents")]
    pub user_agents: Vec<String>,

    /// Whether an HTTP 403 may be retried once through a proxy
    #[serde(rename = "use-proxy", default)]
    pub use_proxy: bool,

    /// Route every attempt through a randomly drawn proxy, not only 403 retries
    #[serde(rename = "proxy-every-attempt", default)]
    pub proxy_every_attempt: bool,

    /// Proxy endpoints (e.g. "http://10.0.0.1:8080")
    #[serde(default)]
    pub proxies: Vec<String>,

    #[serde(rename = "accept-language", default = "default_accept_language")]
    pub accept_language: String,

    /// Referer header sent with direct fetches, if any
    #[serde(default)]
    pub referer: Option<String>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_max_retries() -> u32 {
    3
}

fn default_backoff_base() -> f64 {
    2.0
}

fn default_jitter_min() -> f64 {
    0.5
}

fn default_jitter_max() -> f64 {
    1.5
}

fn default_batch_delay() -> f64 {
    3.0
}

fn default_strategy() -> StrategyKind {
    StrategyKind::Direct
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_navigation_timeout_secs() -> u64 {
    60
}

fn default_ready_timeout_secs() -> u64 {
    15
}

fn default_ready_selector() -> String {
    "article, main, body".to_string()
}

fn default_accept_language() -> String {
    "en-US,en;q=0.9".to_string()
}
