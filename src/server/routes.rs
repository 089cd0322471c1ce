//! Request handlers
//!
//! Bodies are read as raw bytes and decoded leniently: an absent or non-JSON
//! body is treated the same as a body without the expected field.

use crate::extractor::NO_URL_PROVIDED;
use crate::report::{report, report_batch, BatchReport, ErrorPayload, Payload};
use crate::server::AppState;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;
use serde_json::Value;

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
}

/// Health check endpoint
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

/// Extracts a single article
pub async fn extract_handler(
    State(state): State<AppState>,
    body: Bytes,
) -> (StatusCode, Json<Payload>) {
    let Some(url) = decode_body(&body).and_then(|value| field_as_url(&value, "url")) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(Payload::Error(ErrorPayload {
                error: NO_URL_PROVIDED.to_string(),
            })),
        );
    };

    let result = state.pipeline.extract(&url).await;
    if let Err(e) = &result {
        tracing::warn!("Extraction of {} failed: {}", url, e);
    }

    let (status, payload) = report(&result);
    (status, Json(payload))
}

/// Extracts every URL of a list, sequentially
pub async fn extract_batch_handler(
    State(state): State<AppState>,
    body: Bytes,
) -> (StatusCode, Json<BatchReport>) {
    let urls: Vec<String> = decode_body(&body)
        .as_ref()
        .and_then(|value| value.get("urls"))
        .and_then(Value::as_array)
        .map(|items| items.iter().map(value_as_url).collect())
        .unwrap_or_default();

    let outcome = state.coordinator.run_batch(&urls).await;
    let (status, report) = report_batch(&outcome);
    (status, Json(report))
}

fn decode_body(body: &Bytes) -> Option<Value> {
    match serde_json::from_slice::<Value>(body) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::debug!("Ignoring undecodable request body: {}", e);
            None
        }
    }
}

/// The named field as URL input, `None` when missing or null
fn field_as_url(value: &Value, field: &str) -> Option<String> {
    match value.get(field)? {
        Value::Null => None,
        other => Some(value_as_url(other)),
    }
}

/// Non-string values are passed through in their JSON form so the pipeline
/// rejects them as invalid input
fn value_as_url(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
