//! Error types for token operations

/// Errors from signing or verifying bearer tokens.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("token signing failed: {0}")]
    Sign(String),

    #[error("token expired")]
    Expired,

    #[error("invalid token: {0}")]
    Invalid(String),
}

/// Result alias for token operations.
pub type Result<T> = std::result::Result<T, Error>;
