//! HTTP error bodies: `{"detail": ..., "error": ...}`.

use std::any::Any;

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::db::DbError;
use crate::embedding::EmbeddingError;
use crate::skills::SkillError;

/// An error ready to be sent to the client.
///
/// `detail` is always safe to show. `error` holds the internal message and is
/// only kept when the server runs with `debug = true`.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub detail: String,
    pub error: Option<String>,
}

impl ApiError {
    pub fn new(status: StatusCode, detail: impl Into<String>) -> Self {
        Self {
            status,
            detail: detail.into(),
            error: None,
        }
    }

    pub fn internal(err: impl std::fmt::Display) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            detail: "Internal server error".into(),
            error: Some(err.to_string()),
        }
    }

    /// Drop the internal message unless `debug` is set.
    pub fn redact(mut self, debug: bool) -> Self {
        if !debug {
            self.error = None;
        }
        self
    }
}

impl From<EmbeddingError> for ApiError {
    fn from(err: EmbeddingError) -> Self {
        match &err {
            EmbeddingError::UnsupportedProvider { .. } => {
                Self::new(StatusCode::BAD_REQUEST, err.to_string())
            }
            EmbeddingError::Provider { .. } | EmbeddingError::MalformedResponse(_) => {
                Self::new(StatusCode::BAD_GATEWAY, err.to_string())
            }
            EmbeddingError::Transport(_) => Self {
                status: StatusCode::GATEWAY_TIMEOUT,
                detail: "embedding provider unreachable".into(),
                error: Some(err.to_string()),
            },
        }
    }
}

impl From<SkillError> for ApiError {
    fn from(err: SkillError) -> Self {
        match err {
            SkillError::NotFound(msg) => Self::new(StatusCode::NOT_FOUND, msg),
            SkillError::Conflict(msg) => Self::new(StatusCode::CONFLICT, msg),
            SkillError::Database(e) => Self::from(e),
        }
    }
}

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        tracing::error!(error = %err, "database error");
        Self::internal(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::new(rejection.status(), rejection.body_text())
    }
}

/// Body for a handler that panicked: a 500 in the usual error shape.
pub fn panic_response(panic: Box<dyn Any + Send + 'static>, debug: bool) -> Response {
    let message = if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "handler panicked".to_string()
    };
    tracing::error!(error = %message, "unhandled panic in request handler");
    ApiError::internal(message).redact(debug).into_response()
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({
            "detail": self.detail,
            "error": self.error,
        });
        (self.status, Json(body)).into_response()
    }
}
