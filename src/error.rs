// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application error types with consistent API responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Application error type that converts to HTTP responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Authentication required")]
    Unauthorized,

    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("Amazon account not connected")]
    NotConnected,

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Channel not supported: {0}")]
    UnsupportedChannel(String),

    /// LWA rejected an authorization-code exchange. Carries the raw
    /// response body from the token endpoint.
    #[error("LWA code exchange failed: {0}")]
    AuthExchange(String),

    /// LWA rejected a refresh-token grant. Carries the raw response body.
    #[error("LWA token refresh failed: {0}")]
    TokenRefresh(String),

    /// Non-2xx response from an SP-API resource call.
    #[error("SP-API error on {path}: HTTP {status}")]
    SpApi {
        path: String,
        status: u16,
        body: String,
    },

    /// Request never reached SP-API, or the response body failed to parse.
    #[error("SP-API request failed: {0}")]
    SpApiRequest(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Whether this error means the user needs to (re)authorize with Amazon.
    pub fn is_auth_error(&self) -> bool {
        matches!(
            self,
            AppError::NotConnected | AppError::AuthExchange(_) | AppError::TokenRefresh(_)
        )
    }
}

/// JSON error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, details) = match &self {
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "unauthorized", None),
            AppError::InvalidToken => (StatusCode::UNAUTHORIZED, "invalid_token", None),
            AppError::NotConnected => (StatusCode::UNAUTHORIZED, "amazon_not_connected", None),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", Some(msg.clone())),
            AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, "bad_request", Some(msg.clone()))
            }
            AppError::UnsupportedChannel(msg) => (
                StatusCode::NOT_IMPLEMENTED,
                "channel_not_supported",
                Some(msg.clone()),
            ),
            AppError::AuthExchange(body) => {
                tracing::warn!(body = %body, "LWA code exchange rejected");
                (StatusCode::BAD_GATEWAY, "lwa_exchange_failed", None)
            }
            AppError::TokenRefresh(body) => {
                tracing::warn!(body = %body, "LWA refresh rejected");
                (StatusCode::BAD_GATEWAY, "lwa_refresh_failed", None)
            }
            AppError::SpApi { path, status, body } => {
                tracing::warn!(path = %path, status, body = %body, "SP-API error");
                (
                    StatusCode::BAD_GATEWAY,
                    "amazon_api_error",
                    Some(format!("{} returned HTTP {}", path, status)),
                )
            }
            AppError::SpApiRequest(msg) => (
                StatusCode::BAD_GATEWAY,
                "amazon_api_error",
                Some(msg.clone()),
            ),
            AppError::Database(msg) => {
                tracing::error!(error = %msg, "Database error");
                (StatusCode::INTERNAL_SERVER_ERROR, "database_error", None)
            }
            AppError::Internal(err) => {
                tracing::error!(error = %err, "Internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", None)
            }
        };

        let body = ErrorResponse {
            error: error.to_string(),
            details,
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for handlers
pub type Result<T> = std::result::Result<T, AppError>;
