//! Error types for the store and the request handlers.
//!
//! Callers never see a classification of these errors. Store failures are
//! written into the JSON response body as-is; a failed page fetch fails the
//! scrape request with `502 Bad Gateway`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

/// Failures raised by [`crate::store::Store`].
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("note body is not valid JSON: {0}")]
    Body(#[from] serde_json::Error),

    #[error("store connection lock was poisoned")]
    Poisoned,
}

/// Top-level error for request handlers and the ingest workflow.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("failed to fetch source page: {0}")]
    Fetch(#[from] reqwest::Error),

    #[error("ingest task did not complete: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::Store(e) => {
                tracing::error!(error = %e, "Store operation failed");
                Json(json!({ "error": e.to_string() })).into_response()
            }
            Error::Fetch(e) => {
                tracing::error!(error = %e, "Source page fetch failed");
                (StatusCode::BAD_GATEWAY, format!("Scrape failed: {e}")).into_response()
            }
            Error::Task(e) => {
                tracing::error!(error = %e, "Ingest task aborted");
                (StatusCode::INTERNAL_SERVER_ERROR, "Scrape failed").into_response()
            }
        }
    }
}
