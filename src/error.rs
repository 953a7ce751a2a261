//! Error types.

use std::path::PathBuf;

use axum::{
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde_json::json;

/// Errors raised while handling a request.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// The requested key does not name a session field.
    #[error("unknown session key: {0}")]
    UnknownKey(String),

    /// The response body could not be encoded.
    #[error("failed to encode response: {0}")]
    Encode(#[from] serde_json::Error),
}

impl AppError {
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::UnknownKey(_) => StatusCode::NOT_FOUND,
            Self::Encode(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        } else {
            tracing::debug!(error = %self, "Request rejected");
        }

        // Built by hand so an encoding failure can't recurse back here.
        let body = json!({ "error": self.to_string() });
        let body = serde_json::to_string_pretty(&body).unwrap_or_else(|_| "{}".to_string());
        (status, [(header::CONTENT_TYPE, "application/json")], body).into_response()
    }
}

/// Errors raised while resolving the cookie signing key.
#[derive(Debug, thiserror::Error)]
pub enum SecretError {
    #[error("failed to read secret file {}: {source}", .path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("secret is not valid base64: {0}")]
    Decode(#[from] base64::DecodeError),

    #[error("secret must decode to at least {min} bytes, got {len}")]
    TooShort { len: usize, min: usize },
}
