//! HTTP API.

pub mod sessions;

use axum::{
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::error::AppError;

/// JSON response rendered multi-line rather than compact.
#[derive(Debug, Clone, Copy)]
pub struct PrettyJson<T>(pub T);

impl<T: Serialize> PrettyJson<T> {
    /// Encode the body, surfacing serialization failures as [`AppError`].
    pub fn try_into_response(self) -> Result<Response, AppError> {
        let mut body = serde_json::to_string_pretty(&self.0)?;
        body.push('\n');
        Ok((
            StatusCode::OK,
            [(header::CONTENT_TYPE, "application/json")],
            body,
        )
            .into_response())
    }
}

impl<T: Serialize> IntoResponse for PrettyJson<T> {
    fn into_response(self) -> Response {
        self.try_into_response()
            .unwrap_or_else(IntoResponse::into_response)
    }
}
