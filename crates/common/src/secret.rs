//! Secret wrapper for sensitive string values
//!
//! The gateway handles three secrets: the JWT signing secret and the
//! provider's anon and service-role API keys. All of them pass through
//! this wrapper so they never appear in Debug output or log lines, and
//! the underlying bytes are wiped on drop.

use std::fmt;
use zeroize::Zeroize;

/// Sensitive string - redacted in Debug/Display/logs, zeroed on drop
#[derive(Clone)]
pub struct SecretString(String);

impl SecretString {
    /// Create a new secret value
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Expose the inner value (use sparingly)
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Whether the secret is empty after trimming whitespace
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Debug for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[REDACTED]")
    }
}

impl fmt::Display for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[REDACTED]")
    }
}

impl Drop for SecretString {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secret_redacts_debug() {
        let secret = SecretString::new("jwt-signing-key");
        let debug = format!("{:?}", secret);
        assert_eq!(debug, "[REDACTED]");
        assert!(!debug.contains("jwt-signing-key"));
    }

    #[test]
    fn test_secret_redacts_display() {
        let secret = SecretString::new("service-role-key");
        assert_eq!(format!("{secret}"), "[REDACTED]");
    }

    #[test]
    fn test_secret_exposes_value() {
        let secret = SecretString::new("jwt-signing-key");
        assert_eq!(secret.expose(), "jwt-signing-key");
    }

    #[test]
    fn test_blank_detection() {
        assert!(SecretString::new("  \n ").is_blank());
        assert!(SecretString::new("").is_blank());
        assert!(!SecretString::new("key").is_blank());
    }
}
