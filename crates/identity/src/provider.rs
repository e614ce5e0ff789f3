//! Identity provider abstraction
//!
//! Defines the `IdentityProvider` trait that decouples the gateway's
//! credential exchange from the hosted auth backend. The production
//! implementation is `HttpIdentityProvider`; tests implement the same
//! trait in memory.
//!
//! Uses `Pin<Box<dyn Future>>` return types for dyn-compatibility
//! (`Arc<dyn IdentityProvider>`).

use std::future::Future;
use std::pin::Pin;

use crate::Result;
use crate::user::ProviderUser;

/// Boxed future alias for the trait's async operations.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Sign-up request: credentials plus optional profile metadata.
///
/// Transient — credentials pass through to the provider and are never
/// stored by the gateway.
#[derive(Debug, Clone)]
pub struct SignUp {
    pub email: String,
    pub password: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

/// Abstraction over the hosted auth backend.
///
/// The gateway delegates all credential verification to the provider:
/// - `sign_up` / `sign_in_with_password` exchange credentials for a user record
/// - `sign_out` is best-effort; the gateway swallows its failures
/// - `get_user_by_id` / `admin_get_user_by_id` are elevated-privilege
///   lookups used by token refresh and validation respectively
pub trait IdentityProvider: Send + Sync {
    /// Identifier for logging and health reporting (e.g. "gotrue")
    fn id(&self) -> &str;

    /// Create a user with the given credentials and profile metadata.
    ///
    /// Returns `Error::EmailTaken` when the provider reports the email
    /// already registered; any other failure maps to its own variant.
    fn sign_up<'a>(&'a self, signup: &'a SignUp) -> BoxFuture<'a, Result<ProviderUser>>;

    /// Verify an email/password pair, returning the user record on success.
    ///
    /// Implementations report every failure mode as
    /// `Error::InvalidCredentials` — wrong password and unknown email are
    /// indistinguishable to prevent account enumeration.
    fn sign_in_with_password<'a>(
        &'a self,
        email: &'a str,
        password: &'a str,
    ) -> BoxFuture<'a, Result<ProviderUser>>;

    /// Invalidate the user's provider-side session, if any.
    fn sign_out<'a>(&'a self, user_id: &'a str) -> BoxFuture<'a, Result<()>>;

    /// Elevated lookup used at token refresh time to confirm the subject
    /// still exists.
    fn get_user_by_id<'a>(&'a self, user_id: &'a str) -> BoxFuture<'a, Result<ProviderUser>>;

    /// Admin lookup used on every token validation to re-resolve the
    /// subject. `Error::UserNotFound` when the account no longer exists.
    fn admin_get_user_by_id<'a>(&'a self, user_id: &'a str)
    -> BoxFuture<'a, Result<ProviderUser>>;
}
