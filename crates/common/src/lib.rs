//! Common types for the auth gateway

mod error;
mod secret;

pub use error::{Error, Result};
pub use secret::SecretString;
