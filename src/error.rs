// SPDX-FileCopyrightText: 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Boundary error mapping.
//!
//! Every failure in the request path converges on [`ApiError`], which renders
//! a sanitized JSON body. Internal causes (database failures, panics) are
//! logged server-side and surface to the client only as the fixed
//! `{"detail": "Internal server error"}` response.

use crate::store::StoreError;
use crate::validator::ValidationError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::time::Duration;
use thiserror::Error;
use tracing::error;

/// Request-path error taxonomy.
#[derive(Debug, Error)]
pub enum ApiError {
    /// One or more field constraints were violated.
    #[error("validation failed")]
    Validation(Vec<ValidationError>),

    /// No record with the requested identifier. The body does not say
    /// whether it was deleted or never existed.
    #[error("task not found")]
    NotFound,

    /// The (IP, path) key exceeded its fixed-window budget.
    #[error("rate limit exceeded")]
    RateLimited { retry_after: Duration },

    /// Anything unexpected; the cause has already been logged.
    #[error("internal server error")]
    Internal,
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => Self::NotFound,
            StoreError::Database(cause) => {
                error!(error = %cause, "database operation failed");
                Self::Internal
            }
        }
    }
}

impl From<Vec<ValidationError>> for ApiError {
    fn from(violations: Vec<ValidationError>) -> Self {
        Self::Validation(violations)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            Self::Validation(violations) => {
                let detail: Vec<_> = violations
                    .iter()
                    .map(|v| json!({"field": v.field(), "message": v.to_string()}))
                    .collect();
                (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    Json(json!({"detail": detail})),
                )
                    .into_response()
            }
            Self::NotFound => (
                StatusCode::NOT_FOUND,
                Json(json!({"detail": "Task not found"})),
            )
                .into_response(),
            Self::RateLimited { retry_after } => (
                StatusCode::TOO_MANY_REQUESTS,
                [("Retry-After", retry_after.as_secs().max(1).to_string())],
                Json(json!({"detail": "Rate limit exceeded. Please try again later."})),
            )
                .into_response(),
            Self::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"detail": "Internal server error"})),
            )
                .into_response(),
        }
    }
}

/// Panic backstop for `CatchPanicLayer`; same sanitized 500 as any other
/// internal failure.
pub fn handle_panic(_err: Box<dyn std::any::Any + Send + 'static>) -> Response {
    error!("request handler panicked");
    ApiError::Internal.into_response()
}
