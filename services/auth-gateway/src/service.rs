//! Credential exchange and token issuance
//!
//! The pipeline behind every auth route: delegate credential verification
//! to the identity provider, normalize its responses into the gateway's
//! error taxonomy, and mint/validate bearer tokens. No state lives here —
//! each call is one or two provider round-trips plus a signature.
//!
//! Validation deliberately re-resolves the subject upstream on every call
//! rather than trusting the token's embedded claims: an account deleted
//! provider-side is rejected even while its token is unexpired.

use std::sync::Arc;

use identity::{IdentityProvider, ProviderUser, SignUp};
use serde::Serialize;
use token::TokenSigner;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::metrics;

/// The resolved identity attached to a request after validation.
///
/// Sourced entirely from the provider's user record; the gateway never
/// originates or mutates these fields.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticatedUser {
    pub id: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

impl AuthenticatedUser {
    /// Build from a provider record, falling back to the submitted names
    /// when the provider did not echo metadata, then to empty strings.
    fn from_provider(
        user: ProviderUser,
        fallback_first: Option<&str>,
        fallback_last: Option<&str>,
    ) -> Self {
        let first_name = user
            .user_metadata
            .first_name
            .or_else(|| fallback_first.map(str::to_owned))
            .unwrap_or_default();
        let last_name = user
            .user_metadata
            .last_name
            .or_else(|| fallback_last.map(str::to_owned))
            .unwrap_or_default();
        Self {
            id: user.id,
            email: user.email,
            first_name,
            last_name,
        }
    }
}

/// Stateless auth orchestrator shared across handlers.
pub struct AuthService {
    provider: Arc<dyn IdentityProvider>,
    signer: TokenSigner,
}

impl AuthService {
    pub fn new(provider: Arc<dyn IdentityProvider>, signer: TokenSigner) -> Self {
        Self { provider, signer }
    }

    /// Provider identifier for the health endpoint.
    pub fn provider_id(&self) -> &str {
        self.provider.id()
    }

    /// Create an account with the provider and mint a bearer token.
    ///
    /// Duplicate email → `Conflict`; any other provider failure or a
    /// response missing the user → generic `Auth`. The provider's sign-up
    /// result is trusted directly — no existence double-check.
    pub async fn register(&self, signup: SignUp) -> Result<(AuthenticatedUser, String)> {
        let user = match self.provider.sign_up(&signup).await {
            Ok(user) => user,
            Err(identity::Error::EmailTaken) => {
                debug!(email = %signup.email, "registration rejected: email taken");
                return Err(Error::conflict("User already exists"));
            }
            Err(e) => {
                warn!(error = %e, "provider sign-up failed");
                metrics::record_provider_error("sign_up");
                return Err(Error::auth("Registration failed"));
            }
        };

        // Some backends elide the email until confirmation; the submitted
        // one is authoritative in that window
        let email = if user.email.is_empty() {
            signup.email.clone()
        } else {
            user.email.clone()
        };

        let access_token = self.signer.issue(&user.id, &email).map_err(|e| {
            warn!(error = %e, "token signing failed after sign-up");
            Error::auth("Registration failed")
        })?;

        let mut user = AuthenticatedUser::from_provider(
            user,
            signup.first_name.as_deref(),
            signup.last_name.as_deref(),
        );
        user.email = email;

        Ok((user, access_token))
    }

    /// Verify credentials with the provider and mint a bearer token.
    ///
    /// Every provider-side failure collapses into one generic error so
    /// wrong-password and unknown-email are indistinguishable.
    pub async fn login(&self, email: &str, password: &str) -> Result<(AuthenticatedUser, String)> {
        let user = self
            .provider
            .sign_in_with_password(email, password)
            .await
            .map_err(|e| {
                if !matches!(e, identity::Error::InvalidCredentials) {
                    warn!(error = %e, "provider sign-in failed");
                    metrics::record_provider_error("sign_in");
                }
                Error::auth("Invalid credentials")
            })?;

        let access_token = self.signer.issue(&user.id, &user.email).map_err(|e| {
            warn!(error = %e, "token signing failed after sign-in");
            Error::auth("Login failed")
        })?;

        Ok((AuthenticatedUser::from_provider(user, None, None), access_token))
    }

    /// Best-effort provider sign-out. Never fails: the gateway holds no
    /// provider session to revoke, so upstream rejection is the expected
    /// outcome for most backends. Failures are logged at debug and kept
    /// out of the provider-error counter to avoid drowning real faults.
    pub async fn logout(&self, user_id: &str) {
        if let Err(e) = self.provider.sign_out(user_id).await {
            debug!(user_id, error = %e, "provider sign-out failed, ignoring");
        }
    }

    /// Confirm the subject still exists upstream, then mint a fresh token.
    pub async fn refresh(&self, subject_id: &str) -> Result<String> {
        let user = self.provider.get_user_by_id(subject_id).await.map_err(|e| {
            if !matches!(e, identity::Error::UserNotFound(_)) {
                metrics::record_provider_error("get_user");
            }
            warn!(subject_id, error = %e, "refresh lookup failed");
            Error::auth("Token refresh failed")
        })?;

        self.signer.issue(&user.id, &user.email).map_err(|e| {
            warn!(error = %e, "token signing failed during refresh");
            Error::auth("Token refresh failed")
        })
    }

    /// Verify a bearer token and re-resolve its subject upstream.
    ///
    /// Returns the provider's current user record, not the token's
    /// embedded claims.
    pub async fn validate(&self, bearer: &str) -> Result<AuthenticatedUser> {
        let claims = self.signer.verify(bearer)?;

        let user = self
            .provider
            .admin_get_user_by_id(&claims.sub)
            .await
            .map_err(|e| {
                if !matches!(e, identity::Error::UserNotFound(_)) {
                    metrics::record_provider_error("admin_get_user");
                }
                debug!(subject = %claims.sub, error = %e, "token subject did not resolve");
                Error::auth("User not found")
            })?;

        Ok(AuthenticatedUser::from_provider(user, None, None))
    }
}
