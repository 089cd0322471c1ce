use crate::config::{pause_from_secs, PipelineConfig};
use rand::Rng;
use std::time::Duration;

/// Exponential backoff with uniform random jitter
///
/// The pause after failed attempt `n` is `base^n + jitter` seconds, with
/// `jitter` drawn uniformly from `[jitter_min, jitter_max]`, capped at
/// [`MAX_PAUSE`](crate::config::MAX_PAUSE).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Backoff {
    base: f64,
    jitter_min: f64,
    jitter_max: f64,
}

impl Backoff {
    pub fn new(base: f64, jitter_min: f64, jitter_max: f64) -> Self {
        Self {
            base,
            jitter_min,
            jitter_max,
        }
    }

    pub fn from_config(config: &PipelineConfig) -> Self {
        Self::new(config.backoff_base, config.jitter_min, config.jitter_max)
    }

    /// Pause to observe after failed attempt `attempt` (1-based)
    pub fn delay(&self, attempt: u32) -> Duration {
        let jitter = if self.jitter_max > self.jitter_min {
            rand::rng().random_range(self.jitter_min..=self.jitter_max)
        } else {
            self.jitter_min
        };

        let exponent = i32::try_from(attempt).unwrap_or(i32::MAX);
        pause_from_secs(self.base.powi(exponent) + jitter)
    }
}
