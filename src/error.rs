// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application error types with consistent tool responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Application error type shared by the session, telemetry and tool layers.
///
/// Each variant carries a stable taxonomy code (see [`AppError::code`]) that
/// the tool host reports alongside the human-readable message.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// The identity provider rejected the account credentials.
    #[error("WHOOP authentication failed: {0}")]
    Authentication(String),

    /// The identity exchange failed for a network-level reason.
    #[error("WHOOP authentication temporarily unavailable: {0}")]
    TransientAuth(String),

    #[error("WHOOP API unavailable: {0}")]
    UpstreamUnavailable(String),

    #[error("Unexpected WHOOP payload: {0}")]
    DataFormat(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Authentication required")]
    Unauthorized,

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Stable machine-readable code for the error kind.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Authentication(_) => "authentication_error",
            AppError::TransientAuth(_) => "transient_auth_error",
            AppError::UpstreamUnavailable(_) => "upstream_unavailable",
            AppError::DataFormat(_) => "data_format_error",
            AppError::InvalidArgument(_) => "invalid_argument",
            AppError::UnknownTool(_) => "unknown_tool",
            AppError::Unauthorized => "unauthorized",
            AppError::Internal(_) => "internal_error",
        }
    }

    /// Whether a caller may retry the operation that produced this error.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            AppError::TransientAuth(_) | AppError::UpstreamUnavailable(_)
        )
    }

    fn status(&self) -> StatusCode {
        match self {
            AppError::Authentication(_) | AppError::DataFormat(_) => StatusCode::BAD_GATEWAY,
            AppError::TransientAuth(_) | AppError::UpstreamUnavailable(_) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            AppError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            AppError::UnknownTool(_) => StatusCode::NOT_FOUND,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// JSON error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
}

impl From<&AppError> for ErrorResponse {
    fn from(err: &AppError) -> Self {
        let message = match err {
            // Internal details stay in the logs.
            AppError::Internal(_) => "Internal server error".to_string(),
            other => other.to_string(),
        };
        Self {
            code: err.code().to_string(),
            message,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match &self {
            AppError::Internal(err) => {
                tracing::error!(error = %err, "Internal server error");
            }
            AppError::Authentication(msg) => {
                tracing::error!(error = %msg, "WHOOP credentials rejected");
            }
            other if other.is_transient() => {
                tracing::warn!(code = other.code(), error = %other, "Upstream failure");
            }
            _ => {}
        }

        let body = ErrorResponse::from(&self);
        (self.status(), Json(body)).into_response()
    }
}

/// Result type alias for handlers
pub type Result<T> = std::result::Result<T, AppError>;
