//! Provider user record
//!
//! The shape the auth backend returns for a user. The gateway never
//! originates or mutates these fields — it forwards them.

use serde::{Deserialize, Serialize};

/// A user record as reported by the identity provider.
///
/// `email` defaults to empty when the provider omits it (some backends
/// elide it for phone-only accounts); the gateway treats empty as "no
/// email" rather than failing deserialization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderUser {
    /// Opaque provider-assigned identifier (token subject)
    pub id: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub user_metadata: UserMetadata,
}

/// Profile metadata attached at sign-up.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
}
