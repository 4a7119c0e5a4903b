//! Response mapping.
//!
//! # Responsibilities
//! - Success → 200 with the upstream payload
//! - Any breaker failure (open circuit or upstream error) → 503 `{"error": <message>}`

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::Value;

use crate::resilience::BreakerError;
use crate::upstream::UpstreamError;

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

pub fn success(payload: Value) -> Response {
    (StatusCode::OK, Json(payload)).into_response()
}

pub fn failure(endpoint: &str, err: &BreakerError<UpstreamError>) -> Response {
    match err {
        BreakerError::Open(_) => {
            tracing::debug!(endpoint = %endpoint, "Rejected by open circuit");
        }
        BreakerError::Upstream(e) => {
            tracing::warn!(endpoint = %endpoint, error = %e, "Upstream call failed");
        }
    }
    let body = ErrorBody {
        error: err.to_string(),
    };
    (StatusCode::SERVICE_UNAVAILABLE, Json(body)).into_response()
}
