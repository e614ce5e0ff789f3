//! Startup-phase error type
//!
//! Covers everything that can go wrong before the gateway accepts
//! traffic: reading and parsing the config file, validating its values,
//! and resolving the three required secrets. Request-path errors use the
//! gateway's own client-facing taxonomy, not this type.

use thiserror::Error;

/// Errors from configuration loading and secret resolution.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    /// A required secret (JWT signing secret, provider anon or
    /// service-role key) could not be resolved from the environment or a
    /// key file. Always fatal at startup.
    #[error("{what}: {reason}")]
    Secret { what: String, reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl Error {
    pub fn secret(what: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Secret {
            what: what.into(),
            reason: reason.into(),
        }
    }
}

/// Result alias using common Error
pub type Result<T> = std::result::Result<T, Error>;
