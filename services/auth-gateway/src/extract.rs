//! Bearer-token extractor for protected routes.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;

use crate::error::Error;
use crate::handlers::AppState;
use crate::service::AuthenticatedUser;

/// The validated caller. Adding this to a handler's arguments makes the
/// route require a `Authorization: Bearer <token>` header; the token is
/// verified and its subject re-resolved with the provider before the
/// handler body runs.
pub struct CurrentUser(pub AuthenticatedUser);

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Error> {
        let token = bearer_token(parts).ok_or_else(|| Error::auth("Missing bearer token"))?;
        let user = state.auth.validate(token).await?;
        Ok(CurrentUser(user))
    }
}

fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}
