//! Structured `(status, message)` responses for the request layer.
//!
//! Success payloads belong to the individual endpoints; failures (and the
//! informational login/logout outcomes) all flow through [`ApiMessage`] so
//! clients see one shape.

use crate::error::AuthFlowError;
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// JSON body carried by every non-opaque response.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MessageBody {
    pub message: String,
}

/// A status code plus message, returned wherever an operation does not
/// produce a domain payload.
#[derive(Debug)]
pub struct ApiMessage {
    pub status: StatusCode,
    pub message: String,
}

impl ApiMessage {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn ok(message: impl Into<String>) -> Self {
        Self::new(StatusCode::OK, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    /// The one answer for a denied mutation. Deliberately generic: the
    /// caller learns nothing about the resource or its owner.
    pub fn not_authorized() -> Self {
        Self::new(StatusCode::FORBIDDEN, "Not authorized")
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn server_error() -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
    }
}

impl IntoResponse for ApiMessage {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(MessageBody {
                message: self.message,
            }),
        )
            .into_response()
    }
}

impl From<AuthFlowError> for ApiMessage {
    fn from(error: AuthFlowError) -> Self {
        match &error {
            AuthFlowError::InvalidState => {
                ApiMessage::unauthorized("Invalid state parameter")
            }
            AuthFlowError::Exchange(e) => {
                ApiMessage::unauthorized(format!("Failed to exchange authorization grant: {e}"))
            }
            AuthFlowError::Profile(e) => {
                ApiMessage::unauthorized(format!("Failed to fetch user profile: {e}"))
            }
            AuthFlowError::AlreadyConnected => {
                ApiMessage::ok("Current user already connected")
            }
            AuthFlowError::NotConnected => {
                ApiMessage::bad_request("Current user not connected")
            }
            AuthFlowError::Store(e) => {
                tracing::error!(error = %e, "Identity store error during login flow");
                ApiMessage::server_error()
            }
        }
    }
}
