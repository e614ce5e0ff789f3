//! GoTrue-style HTTP provider implementation
//!
//! Speaks the hosted auth backend's REST surface:
//! - `POST /auth/v1/signup` — create a user (anon key)
//! - `POST /auth/v1/token?grant_type=password` — verify credentials (anon key)
//! - `POST /auth/v1/logout` — best-effort session invalidation (anon key)
//! - `GET /auth/v1/admin/users/{id}` — elevated user lookup (service-role key)
//!
//! Every call is attempted once; the caller's reqwest client carries the
//! request-level timeout. Provider error bodies are folded into the error
//! variants and never forwarded to gateway clients verbatim.

use serde_json::{Value, json};
use tracing::debug;

use crate::error::{Error, Result};
use crate::provider::{BoxFuture, IdentityProvider, SignUp};
use crate::user::ProviderUser;

/// HTTP client for the hosted auth backend.
///
/// Holds two keys: the anon key for user-facing calls and the
/// service-role key for admin lookups. Both elevated lookups resolve the
/// same auth record — the provider's auth API is the single source of
/// truth, never a parallel table.
pub struct HttpIdentityProvider {
    client: reqwest::Client,
    base_url: String,
    anon_key: String,
    service_role_key: String,
}

impl HttpIdentityProvider {
    pub fn new(
        client: reqwest::Client,
        base_url: impl Into<String>,
        anon_key: impl Into<String>,
        service_role_key: impl Into<String>,
    ) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_owned();
        Self {
            client,
            base_url,
            anon_key: anon_key.into(),
            service_role_key: service_role_key.into(),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn do_sign_up(&self, signup: &SignUp) -> Result<ProviderUser> {
        let mut metadata = serde_json::Map::new();
        if let Some(first) = &signup.first_name {
            metadata.insert("first_name".into(), json!(first));
        }
        if let Some(last) = &signup.last_name {
            metadata.insert("last_name".into(), json!(last));
        }

        let response = self
            .client
            .post(self.endpoint("/auth/v1/signup"))
            .header("apikey", &self.anon_key)
            .json(&json!({
                "email": signup.email,
                "password": signup.password,
                "data": metadata,
            }))
            .send()
            .await
            .map_err(|e| Error::Http(format!("sign-up request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| String::from("<no body>"));

            // The backend signals duplicates in the message text or, on
            // newer versions, a structured error code
            if body.contains("already registered") || body.contains("user_already_exists") {
                return Err(Error::EmailTaken);
            }

            return Err(Error::Provider(format!(
                "sign-up returned {status}: {body}"
            )));
        }

        let value: Value = response
            .json()
            .await
            .map_err(|e| Error::Provider(format!("invalid sign-up response: {e}")))?;
        parse_user(value).ok_or_else(|| Error::Provider("sign-up response missing user".into()))
    }

    async fn do_sign_in(&self, email: &str, password: &str) -> Result<ProviderUser> {
        let response = self
            .client
            .post(self.endpoint("/auth/v1/token?grant_type=password"))
            .header("apikey", &self.anon_key)
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await
            .map_err(|e| Error::Http(format!("sign-in request failed: {e}")))?;

        if !response.status().is_success() {
            // Deliberately uniform: wrong password and unknown email are
            // indistinguishable to the caller
            debug!(status = %response.status(), "password grant rejected");
            return Err(Error::InvalidCredentials);
        }

        let value: Value = response
            .json()
            .await
            .map_err(|_| Error::InvalidCredentials)?;
        parse_user(value).ok_or(Error::InvalidCredentials)
    }

    /// The logout endpoint expects the end user's provider session token,
    /// which a stateless caller holding only API keys never has — most
    /// backends reject this call. Callers must treat failure as non-fatal.
    async fn do_sign_out(&self, user_id: &str) -> Result<()> {
        let response = self
            .client
            .post(self.endpoint("/auth/v1/logout"))
            .header("apikey", &self.anon_key)
            .send()
            .await
            .map_err(|e| Error::Http(format!("sign-out request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Provider(format!(
                "sign-out for {user_id} returned {status}"
            )));
        }
        Ok(())
    }

    async fn fetch_user(&self, user_id: &str) -> Result<ProviderUser> {
        let response = self
            .client
            .get(self.endpoint(&format!("/auth/v1/admin/users/{user_id}")))
            .header("apikey", &self.service_role_key)
            .header(
                reqwest::header::AUTHORIZATION,
                format!("Bearer {}", self.service_role_key),
            )
            .send()
            .await
            .map_err(|e| Error::Http(format!("user lookup request failed: {e}")))?;

        let status = response.status();
        if status.as_u16() == 404 {
            return Err(Error::UserNotFound(user_id.to_owned()));
        }
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| String::from("<no body>"));
            return Err(Error::Provider(format!(
                "user lookup returned {status}: {body}"
            )));
        }

        response
            .json::<ProviderUser>()
            .await
            .map_err(|e| Error::Provider(format!("invalid user lookup response: {e}")))
    }
}

/// Extract the user record from a provider response.
///
/// Sign-up responds with either the bare user object (confirmation
/// pending) or a session wrapping it under `"user"`; the password grant
/// always uses the session shape. Returns None when neither parses.
fn parse_user(value: Value) -> Option<ProviderUser> {
    let nested = value.get("user").filter(|u| !u.is_null()).cloned();
    serde_json::from_value(nested.unwrap_or(value)).ok()
}

impl IdentityProvider for HttpIdentityProvider {
    fn id(&self) -> &str {
        "gotrue"
    }

    fn sign_up<'a>(&'a self, signup: &'a SignUp) -> BoxFuture<'a, Result<ProviderUser>> {
        Box::pin(self.do_sign_up(signup))
    }

    fn sign_in_with_password<'a>(
        &'a self,
        email: &'a str,
        password: &'a str,
    ) -> BoxFuture<'a, Result<ProviderUser>> {
        Box::pin(self.do_sign_in(email, password))
    }

    fn sign_out<'a>(&'a self, user_id: &'a str) -> BoxFuture<'a, Result<()>> {
        Box::pin(self.do_sign_out(user_id))
    }

    fn get_user_by_id<'a>(&'a self, user_id: &'a str) -> BoxFuture<'a, Result<ProviderUser>> {
        Box::pin(self.fetch_user(user_id))
    }

    fn admin_get_user_by_id<'a>(
        &'a self,
        user_id: &'a str,
    ) -> BoxFuture<'a, Result<ProviderUser>> {
        Box::pin(self.fetch_user(user_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::Json;
    use axum::extract::Path;
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::{get, post};

    const SERVICE_KEY: &str = "service-role-test-key";

    /// Start a mock auth backend implementing the GoTrue surface the
    /// client speaks.
    async fn start_mock_backend() -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let app = axum::Router::new()
            .route(
                "/auth/v1/signup",
                post(|Json(body): Json<Value>| async move {
                    let email = body["email"].as_str().unwrap_or("");
                    if email == "taken@x.com" {
                        return (
                            StatusCode::UNPROCESSABLE_ENTITY,
                            Json(json!({"code": 422, "msg": "User already registered"})),
                        );
                    }
                    let user = json!({
                        "id": "u-1",
                        "email": email,
                        "user_metadata": body["data"],
                    });
                    if email == "session@x.com" {
                        // Auto-confirm path: sign-up responds with a session
                        return (
                            StatusCode::OK,
                            Json(json!({"access_token": "at", "user": user})),
                        );
                    }
                    (StatusCode::OK, Json(user))
                }),
            )
            .route(
                "/auth/v1/token",
                post(|Json(body): Json<Value>| async move {
                    if body["email"] == "a@x.com" && body["password"] == "pw123456" {
                        (
                            StatusCode::OK,
                            Json(json!({
                                "access_token": "provider-at",
                                "user": {
                                    "id": "u-1",
                                    "email": "a@x.com",
                                    "user_metadata": {"first_name": "Ana", "last_name": "Li"},
                                }
                            })),
                        )
                    } else {
                        (
                            StatusCode::BAD_REQUEST,
                            Json(json!({"error_description": "Invalid login credentials"})),
                        )
                    }
                }),
            )
            .route("/auth/v1/logout", post(|| async { StatusCode::NO_CONTENT }))
            .route(
                "/auth/v1/admin/users/{id}",
                get(|Path(id): Path<String>, headers: HeaderMap| async move {
                    let auth = headers
                        .get("authorization")
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or("");
                    if auth != format!("Bearer {SERVICE_KEY}") {
                        return (StatusCode::UNAUTHORIZED, Json(json!({"msg": "bad key"})));
                    }
                    if id == "u-1" {
                        (
                            StatusCode::OK,
                            Json(json!({
                                "id": "u-1",
                                "email": "a@x.com",
                                "user_metadata": {"first_name": "Ana", "last_name": "Li"},
                            })),
                        )
                    } else {
                        (StatusCode::NOT_FOUND, Json(json!({"msg": "User not found"})))
                    }
                }),
            );

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    async fn test_provider() -> HttpIdentityProvider {
        let url = start_mock_backend().await;
        HttpIdentityProvider::new(reqwest::Client::new(), url, "anon-test-key", SERVICE_KEY)
    }

    fn signup(email: &str) -> SignUp {
        SignUp {
            email: email.into(),
            password: "pw123456".into(),
            first_name: Some("Ana".into()),
            last_name: Some("Li".into()),
        }
    }

    #[tokio::test]
    async fn sign_up_returns_user_with_metadata() {
        let provider = test_provider().await;
        let user = provider.sign_up(&signup("new@x.com")).await.unwrap();
        assert_eq!(user.id, "u-1");
        assert_eq!(user.email, "new@x.com");
        assert_eq!(user.user_metadata.first_name.as_deref(), Some("Ana"));
    }

    #[tokio::test]
    async fn sign_up_unwraps_session_shaped_response() {
        let provider = test_provider().await;
        let user = provider.sign_up(&signup("session@x.com")).await.unwrap();
        assert_eq!(user.id, "u-1");
        assert_eq!(user.email, "session@x.com");
    }

    #[tokio::test]
    async fn duplicate_sign_up_is_email_taken() {
        let provider = test_provider().await;
        match provider.sign_up(&signup("taken@x.com")).await {
            Err(Error::EmailTaken) => {}
            other => panic!("expected EmailTaken, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn sign_in_returns_user() {
        let provider = test_provider().await;
        let user = provider
            .sign_in_with_password("a@x.com", "pw123456")
            .await
            .unwrap();
        assert_eq!(user.id, "u-1");
        assert_eq!(user.email, "a@x.com");
    }

    #[tokio::test]
    async fn wrong_password_and_unknown_email_are_indistinguishable() {
        let provider = test_provider().await;
        let wrong_password = provider
            .sign_in_with_password("a@x.com", "wrong")
            .await
            .unwrap_err();
        let unknown_email = provider
            .sign_in_with_password("ghost@x.com", "pw123456")
            .await
            .unwrap_err();
        assert!(matches!(wrong_password, Error::InvalidCredentials));
        assert!(matches!(unknown_email, Error::InvalidCredentials));
        assert_eq!(wrong_password.to_string(), unknown_email.to_string());
    }

    #[tokio::test]
    async fn admin_lookup_resolves_existing_user() {
        let provider = test_provider().await;
        let user = provider.admin_get_user_by_id("u-1").await.unwrap();
        assert_eq!(user.email, "a@x.com");
        assert_eq!(user.user_metadata.last_name.as_deref(), Some("Li"));
    }

    #[tokio::test]
    async fn admin_lookup_missing_user_is_not_found() {
        let provider = test_provider().await;
        match provider.admin_get_user_by_id("deleted-user").await {
            Err(Error::UserNotFound(id)) => assert_eq!(id, "deleted-user"),
            other => panic!("expected UserNotFound, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn admin_lookup_requires_service_role_key() {
        let url = start_mock_backend().await;
        let provider =
            HttpIdentityProvider::new(reqwest::Client::new(), url, "anon-test-key", "wrong-key");
        match provider.admin_get_user_by_id("u-1").await {
            Err(Error::Provider(msg)) => assert!(msg.contains("401"), "got: {msg}"),
            other => panic!("expected Provider error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn refresh_lookup_uses_same_auth_record() {
        // get_user_by_id and admin_get_user_by_id must agree — one source
        // of truth for user existence
        let provider = test_provider().await;
        let a = provider.get_user_by_id("u-1").await.unwrap();
        let b = provider.admin_get_user_by_id("u-1").await.unwrap();
        assert_eq!(a.id, b.id);
        assert_eq!(a.email, b.email);
    }

    #[tokio::test]
    async fn sign_out_succeeds() {
        let provider = test_provider().await;
        assert!(provider.sign_out("u-1").await.is_ok());
    }

    #[tokio::test]
    async fn unreachable_backend_is_http_error() {
        let provider = HttpIdentityProvider::new(
            reqwest::Client::new(),
            "http://127.0.0.1:1",
            "anon",
            "service",
        );
        match provider.sign_in_with_password("a@x.com", "pw").await {
            Err(Error::Http(_)) => {}
            other => panic!("expected Http error, got {other:?}"),
        }
    }

    #[test]
    fn base_url_trailing_slash_is_normalized() {
        let provider = HttpIdentityProvider::new(
            reqwest::Client::new(),
            "https://auth.example.com/",
            "anon",
            "service",
        );
        assert_eq!(
            provider.endpoint("/auth/v1/signup"),
            "https://auth.example.com/auth/v1/signup"
        );
    }

    #[test]
    fn parse_user_prefers_nested_user_object() {
        let session = json!({"access_token": "at", "user": {"id": "u-9", "email": "s@x.com"}});
        let user = parse_user(session).unwrap();
        assert_eq!(user.id, "u-9");

        let bare = json!({"id": "u-8", "email": "b@x.com"});
        assert_eq!(parse_user(bare).unwrap().id, "u-8");

        assert!(parse_user(json!({"msg": "no user here"})).is_none());
    }
}
