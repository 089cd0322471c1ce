use crate::config::types::{
    BatchConfig, Config, FetchConfig, IdentityConfig, PipelineConfig, ServerConfig, MAX_PAUSE,
};
use crate::ConfigError;
use url::Url;

/// Largest accepted backoff base
const MAX_BACKOFF_BASE: f64 = 10.0;

/// Proxy schemes reqwest and Chromium both understand
const PROXY_SCHEMES: &[&str] = &["http", "https", "socks5"];

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_server_config(&config.server)?;
    validate_pipeline_config(&config.pipeline)?;
    validate_batch_config(&config.batch)?;
    validate_fetch_config(&config.fetch)?;
    validate_identity_config(&config.identity)?;
    Ok(())
}

fn validate_server_config(config: &ServerConfig) -> Result<(), ConfigError> {
    if config.host.is_empty() {
        return Err(ConfigError::Validation("host cannot be empty".to_string()));
    }

    if config.port == 0 {
        return Err(ConfigError::Validation("port must be non-zero".to_string()));
    }

    Ok(())
}

/// Validates retry and backoff settings
fn validate_pipeline_config(config: &PipelineConfig) -> Result<(), ConfigError> {
    if config.max_retries < 1 || config.max_retries > 10 {
        return Err(ConfigError::Validation(format!(
            "max_retries must be between 1 and 10, got {}",
            config.max_retries
        )));
    }

    if !config.backoff_base.is_finite()
        || config.backoff_base < 1.0
        || config.backoff_base > MAX_BACKOFF_BASE
    {
        return Err(ConfigError::Validation(format!(
            "backoff_base must be between 1.0 and {}, got {}",
            MAX_BACKOFF_BASE, config.backoff_base
        )));
    }

    if !config.jitter_min.is_finite() || config.jitter_min < 0.0 {
        return Err(ConfigError::Validation(format!(
            "jitter_min must be >= 0, got {}",
            config.jitter_min
        )));
    }

    if !config.jitter_max.is_finite() || config.jitter_max < config.jitter_min {
        return Err(ConfigError::Validation(format!(
            "jitter_max ({}) must be >= jitter_min ({})",
            config.jitter_max, config.jitter_min
        )));
    }

    if config.jitter_max > MAX_PAUSE.as_secs_f64() {
        return Err(ConfigError::Validation(format!(
            "jitter_max must be <= {}, got {}",
            MAX_PAUSE.as_secs(),
            config.jitter_max
        )));
    }

    Ok(())
}

fn validate_batch_config(config: &BatchConfig) -> Result<(), ConfigError> {
    if !config.delay_seconds.is_finite()
        || config.delay_seconds < 0.0
        || config.delay_seconds > MAX_PAUSE.as_secs_f64()
    {
        return Err(ConfigError::Validation(format!(
            "delay_seconds must be between 0 and {}, got {}",
            MAX_PAUSE.as_secs(),
            config.delay_seconds
        )));
    }

    Ok(())
}

/// Validates fetch timeouts and the readiness selector
fn validate_fetch_config(config: &FetchConfig) -> Result<(), ConfigError> {
    let timeouts = [
        ("timeout_secs", config.timeout_secs),
        ("navigation_timeout_secs", config.navigation_timeout_secs),
        ("ready_timeout_secs", config.ready_timeout_secs),
    ];

    for (name, value) in timeouts {
        if value < 1 {
            return Err(ConfigError::Validation(format!(
                "{} must be >= 1, got {}",
                name, value
            )));
        }
    }

    if config.ready_selector.trim().is_empty() {
        return Err(ConfigError::Validation(
            "ready_selector cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates the user agent pool and proxy list
fn validate_identity_config(config: &IdentityConfig) -> Result<(), ConfigError> {
    if config.user_agents.is_empty() {
        return Err(ConfigError::Validation(
            "user_agents must contain at least one entry".to_string(),
        ));
    }

    if config.user_agents.iter().any(|ua| ua.trim().is_empty()) {
        return Err(ConfigError::Validation(
            "user_agents cannot contain empty entries".to_string(),
        ));
    }

    for proxy in &config.proxies {
        validate_proxy(proxy)?;
    }

    if (config.use_proxy || config.proxy_every_attempt) && config.proxies.is_empty() {
        return Err(ConfigError::Validation(
            "proxying is enabled but no proxies are configured".to_string(),
        ));
    }

    if let Some(referer) = &config.referer {
        Url::parse(referer)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid referer '{}': {}", referer, e)))?;
    }

    Ok(())
}

fn validate_proxy(proxy: &str) -> Result<(), ConfigError> {
    let url = Url::parse(proxy)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid proxy '{}': {}", proxy, e)))?;

    if !PROXY_SCHEMES.contains(&url.scheme()) {
        return Err(ConfigError::InvalidUrl(format!(
            "Proxy '{}' must use one of {:?}",
            proxy, PROXY_SCHEMES
        )));
    }

    if url.host_str().is_none() {
        return Err(ConfigError::InvalidUrl(format!(
            "Proxy '{}' is missing a host",
            proxy
        )));
    }

    Ok(())
}
