//! HTTP service exposing single and batch extraction
//!
//! Routes:
//! - `POST /extract` with `{"url": "..."}`
//! - `POST /extract/batch` with `{"urls": ["...", ...]}`
//! - `GET /health`

mod routes;

pub use routes::{extract_batch_handler, extract_handler, health_handler};

use crate::config::{Config, ServerConfig};
use crate::extractor::{BatchCoordinator, ExtractionPipeline};
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// State shared by every request handler
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<ExtractionPipeline>,
    pub coordinator: Arc<BatchCoordinator>,
}

impl AppState {
    /// Wraps a pipeline and builds the batch coordinator around it
    pub fn new(pipeline: ExtractionPipeline, config: &Config) -> Self {
        let pipeline = Arc::new(pipeline);
        let coordinator = Arc::new(BatchCoordinator::new(Arc::clone(&pipeline), &config.batch));
        Self {
            pipeline,
            coordinator,
        }
    }

    /// Builds state from configuration alone
    pub fn from_config(config: &Config) -> crate::Result<Self> {
        Ok(Self::new(ExtractionPipeline::from_config(config)?, config))
    }
}

/// Builds the application router
pub fn build_app(state: AppState) -> Router {
    Router::new()
        .route("/extract", post(extract_handler))
        .route("/extract/batch", post(extract_batch_handler))
        .route("/health", get(health_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Binds the configured address and serves until the process is stopped
pub async fn serve(config: &ServerConfig, state: AppState) -> crate::Result<()> {
    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, build_app(state)).await?;
    Ok(())
}
