//! Configuration module for Sumi-Quill
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use sumi_quill::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("quill.toml")).unwrap();
//! println!("Attempts per URL: {}", config.pipeline.max_retries);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    pause_from_secs, BatchConfig, Config, FetchConfig, IdentityConfig, PipelineConfig,
    ServerConfig, StrategyKind, MAX_PAUSE,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
