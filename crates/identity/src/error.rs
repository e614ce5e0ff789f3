//! Error types for identity provider operations

/// Errors from identity provider operations.
///
/// `EmailTaken` is the only variant the gateway surfaces distinctly
/// (HTTP 409); everything else collapses into a generic 401 so provider
/// internals never leak to clients.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("email already registered")]
    EmailTaken,

    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("user not found: {0}")]
    UserNotFound(String),

    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("provider error: {0}")]
    Provider(String),
}

/// Result alias for provider operations.
pub type Result<T> = std::result::Result<T, Error>;
