//! Result and error reporting
//!
//! Converts extraction outcomes into the JSON payloads and HTTP statuses
//! returned to callers. Both the server and the CLI go through here, so a
//! result looks the same no matter how it was requested.

use crate::article::ArticleRecord;
use crate::extractor::{BatchItem, ExtractionError, ExtractionResult};
use axum::http::StatusCode;
use serde::Serialize;

/// Body of a failed request or item
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorPayload {
    pub error: String,
}

impl From<&ExtractionError> for ErrorPayload {
    fn from(error: &ExtractionError) -> Self {
        Self {
            error: error.to_string(),
        }
    }
}

/// Body of a single extraction response
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Payload {
    Article(ArticleRecord),
    Error(ErrorPayload),
}

impl From<&ExtractionResult> for Payload {
    fn from(result: &ExtractionResult) -> Self {
        match result {
            Ok(record) => Self::Article(record.clone()),
            Err(e) => Self::Error(ErrorPayload::from(e)),
        }
    }
}

/// One element of a batch response: the item payload plus its URL
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchEntry {
    pub url: String,

    #[serde(flatten)]
    pub payload: Payload,
}

impl From<&BatchItem> for BatchEntry {
    fn from(item: &BatchItem) -> Self {
        Self {
            url: item.url.clone(),
            payload: Payload::from(&item.result),
        }
    }
}

/// HTTP status for a failed extraction
///
/// Input problems are the caller's fault; everything else is ours.
pub fn status_for(error: &ExtractionError) -> StatusCode {
    if error.is_client_error() {
        StatusCode::BAD_REQUEST
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

/// Reports a single extraction
pub fn report(result: &ExtractionResult) -> (StatusCode, Payload) {
    let status = match result {
        Ok(_) => StatusCode::OK,
        Err(e) => status_for(e),
    };
    (status, Payload::from(result))
}

/// Reports a batch run
///
/// A batch that ran always reports 200, whatever its items' outcomes; only a
/// rejected batch carries an error status.
pub fn report_batch(
    outcome: &Result<Vec<BatchItem>, ExtractionError>,
) -> (StatusCode, BatchReport) {
    match outcome {
        Ok(items) => (
            StatusCode::OK,
            BatchReport::Entries(items.iter().map(BatchEntry::from).collect()),
        ),
        Err(e) => (status_for(e), BatchReport::Rejected(ErrorPayload::from(e))),
    }
}

/// Body of a batch response
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum BatchReport {
    Entries(Vec<BatchEntry>),
    Rejected(ErrorPayload),
}
