//! Gateway error taxonomy and HTTP mapping
//!
//! Two categories cover everything the client can observe:
//! - `Conflict` (duplicate registration) → 409
//! - `Auth` (bad credentials, invalid/expired/unresolvable token,
//!   provider failure or timeout) → 401
//!
//! Anything unexpected collapses into `Auth` before reaching a handler,
//! so provider internals never leak to the client. Logout failures never
//! become errors at all — they are logged and swallowed in the service.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// Client-visible gateway errors.
#[derive(Error, Debug)]
pub enum Error {
    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Auth(String),
}

impl Error {
    pub fn auth(message: impl Into<String>) -> Self {
        Self::Auth(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict(message.into())
    }
}

/// Result alias using gateway Error
pub type Result<T> = std::result::Result<T, Error>;

/// Token failures are always a generic 401 — the client learns nothing
/// about whether the signature, expiry, or payload was at fault.
impl From<token::Error> for Error {
    fn from(e: token::Error) -> Self {
        match e {
            token::Error::Expired => Error::auth("Token expired"),
            _ => Error::auth("Invalid token"),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, kind) = match &self {
            Error::Conflict(_) => (StatusCode::CONFLICT, "conflict"),
            Error::Auth(_) => (StatusCode::UNAUTHORIZED, "auth_error"),
        };
        let body = serde_json::json!({
            "error": {
                "type": kind,
                "message": self.to_string(),
            }
        });
        (
            status,
            [(axum::http::header::CONTENT_TYPE, "application/json")],
            body.to_string(),
        )
            .into_response()
    }
}
