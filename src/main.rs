//! Sumi-Quill main entry point
//!
//! This is the command-line interface for the Sumi-Quill article extractor.

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use sumi_quill::config::{load_config_with_hash, Config};
use sumi_quill::identity::redact_proxy;
use sumi_quill::report::{report, report_batch};
use sumi_quill::server::{serve, AppState};
use tracing_subscriber::EnvFilter;

/// Sumi-Quill: a resilient article extractor
///
/// Sumi-Quill fetches news pages with rotating identities, retries failures
/// with exponential backoff, and returns the parsed article as JSON. By
/// default it serves extractions over HTTP.
#[derive(Parser, Debug)]
#[command(name = "sumi-quill")]
#[command(version = "1.0.0")]
#[command(about = "A resilient article extractor", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show the effective settings without serving
    #[arg(long, conflicts_with = "extract")]
    dry_run: bool,

    /// Extract the given URLs once, print the result as JSON and exit
    #[arg(long, value_name = "URL", num_args = 1.., conflicts_with = "dry_run")]
    extract: Vec<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("Failed to load configuration from {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    if cli.dry_run {
        handle_dry_run(&config);
        return Ok(ExitCode::SUCCESS);
    }

    let state = AppState::from_config(&config).context("Failed to build extraction pipeline")?;

    if !cli.extract.is_empty() {
        return handle_extract(&state, &cli.extract).await;
    }

    serve(&config.server, state)
        .await
        .context("Server error")?;

    Ok(ExitCode::SUCCESS)
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("sumi_quill=info,tower_http=info,warn"),
            1 => EnvFilter::new("sumi_quill=debug,tower_http=debug,info"),
            2 => EnvFilter::new("sumi_quill=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    // Logs go to stderr so that --extract output on stdout stays parseable
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: shows the effective configuration
fn handle_dry_run(config: &Config) {
    println!("=== Sumi-Quill Dry Run ===\n");

    println!("Server:");
    println!("  Address: {}:{}", config.server.host, config.server.port);

    println!("\nPipeline:");
    println!("  Max retries: {}", config.pipeline.max_retries);
    println!("  Backoff base: {}", config.pipeline.backoff_base);
    println!(
        "  Jitter: {}s - {}s",
        config.pipeline.jitter_min, config.pipeline.jitter_max
    );
    println!("  Batch delay: {}s", config.batch.delay_seconds);

    println!("\nFetch:");
    println!("  Strategy: {}", config.fetch.strategy);
    println!("  Timeout: {}s", config.fetch.timeout_secs);
    println!(
        "  Navigation timeout: {}s",
        config.fetch.navigation_timeout_secs
    );
    println!("  Ready timeout: {}s", config.fetch.ready_timeout_secs);
    println!("  Ready selector: {}", config.fetch.ready_selector);

    println!("\nUser Agents ({}):", config.identity.user_agents.len());
    for agent in &config.identity.user_agents {
        println!("  - {}", agent);
    }

    println!("\nProxies ({}):", config.identity.proxies.len());
    for proxy in &config.identity.proxies {
        println!("  - {}", redact_proxy(proxy));
    }
    println!("  Escalate on 403: {}", config.identity.use_proxy);
    println!("  Every attempt: {}", config.identity.proxy_every_attempt);

    println!("\n✓ Configuration is valid");
}

/// Handles the --extract mode: one URL is a single extraction, several a batch
async fn handle_extract(state: &AppState, urls: &[String]) -> anyhow::Result<ExitCode> {
    if let [url] = urls {
        let result = state.pipeline.extract(url).await;
        let (_, payload) = report(&result);
        println!(
            "{}",
            serde_json::to_string_pretty(&payload).context("Failed to serialize result")?
        );

        return Ok(if result.is_ok() {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        });
    }

    let outcome = state.coordinator.run_batch(urls).await;
    let (_, batch) = report_batch(&outcome);
    println!(
        "{}",
        serde_json::to_string_pretty(&batch).context("Failed to serialize results")?
    );

    Ok(if outcome.is_ok() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
