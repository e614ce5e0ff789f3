//! Bearer token issuing and verification
//!
//! Mints the short-lived HS256 JWTs the gateway hands out at
//! register/login/refresh time and verifies them on protected routes.
//! Tokens are stateless: expiry is enforced by signature verification
//! alone, there is no revocation list. The signing secret and lifetime
//! are process configuration, fixed at construction.
//!
//! Token flow:
//! 1. Gateway authenticates credentials against the identity provider
//! 2. `TokenSigner::issue()` signs `{sub, email, iat, exp}`
//! 3. Protected routes call `TokenSigner::verify()` on the bearer token
//! 4. The gateway re-resolves the subject upstream before trusting it

pub mod error;
pub mod signer;

pub use error::{Error, Result};
pub use signer::{Claims, TokenSigner};
