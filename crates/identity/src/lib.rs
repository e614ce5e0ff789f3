//! Identity provider client library
//!
//! Abstracts the hosted auth backend behind the `IdentityProvider` trait so
//! the gateway never hardcodes the vendor SDK: handlers take an
//! `Arc<dyn IdentityProvider>` and tests inject an in-memory double.
//! `HttpIdentityProvider` is the production implementation speaking the
//! GoTrue-style REST surface.
//!
//! Credential flow:
//! 1. Gateway calls `sign_up()` / `sign_in_with_password()` with the
//!    submitted credentials
//! 2. The provider verifies them and returns its user record
//! 3. Protected routes call `admin_get_user_by_id()` to re-resolve the
//!    token subject on every validation
//!
//! This crate is a standalone library with no dependency on the gateway
//! binary — it can be tested and used independently.

pub mod error;
pub mod gotrue;
pub mod provider;
pub mod user;

pub use error::{Error, Result};
pub use gotrue::HttpIdentityProvider;
pub use provider::{BoxFuture, IdentityProvider, SignUp};
pub use user::{ProviderUser, UserMetadata};
