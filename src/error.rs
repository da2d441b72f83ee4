// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application error types with consistent API responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Errors returned by the identity directory (Appwrite) client.
#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    #[error("Appwrite request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Appwrite returned HTTP {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Invalid Appwrite response: {0}")]
    Decode(String),

    #[error("Invalid directory settings: {0}")]
    Settings(String),
}

/// Application error type that converts to HTTP responses.
///
/// Any error here aborts the whole scan and maps to the
/// `{ "success": false, "error": ... }` body with a 500 status.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    Directory(#[from] DirectoryError),
}

/// JSON error response body
#[derive(Serialize)]
struct ErrorResponse {
    success: bool,
    error: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let message = self.to_string();
        tracing::error!(error = %message, "Failed to process users");

        let body = ErrorResponse {
            success: false,
            error: message,
        };

        (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
    }
}

/// Result type alias for handlers
pub type Result<T> = std::result::Result<T, AppError>;
