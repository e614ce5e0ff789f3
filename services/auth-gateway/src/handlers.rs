//! HTTP surface of the gateway
//!
//! Routes:
//! - `POST /auth/register` — create an account, 201 with token + user
//! - `POST /auth/login`    — verify credentials, 200 with token + user
//! - `POST /auth/logout`   — best-effort provider sign-out (bearer required)
//! - `POST /auth/refresh`  — mint a fresh token (bearer required)
//! - `GET  /auth/profile`  — echo the validated caller (bearer required)
//! - `GET  /health`        — liveness probe
//! - `GET  /metrics`       — Prometheus exposition
//!
//! Handlers stay thin: deserialize, call `AuthService`, shape the response.
//! All error-to-status mapping lives in `error::Error`.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use identity::SignUp;
use metrics_exporter_prometheus::PrometheusHandle;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tower::limit::ConcurrencyLimitLayer;
use tracing::info;

use crate::error::Result;
use crate::extract::CurrentUser;
use crate::metrics;
use crate::service::{AuthService, AuthenticatedUser};

#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<AuthService>,
    pub prometheus: PrometheusHandle,
    pub started_at: Instant,
    pub requests_served: Arc<AtomicU64>,
}

/// Request body for `POST /auth/register`. Field names are camelCase on
/// the wire.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterBody {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginBody {
    pub email: String,
    pub password: String,
}

/// Response for register and login.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub user: AuthenticatedUser,
}

pub fn build_router(state: AppState, max_connections: usize) -> Router {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout))
        .route("/auth/refresh", post(refresh))
        .route("/auth/profile", get(profile))
        .route("/health", get(health))
        .route("/metrics", get(prometheus_metrics))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            metrics::track_request,
        ))
        .layer(ConcurrencyLimitLayer::new(max_connections))
        .with_state(state)
}

async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterBody>,
) -> Result<impl IntoResponse> {
    let (user, access_token) = state
        .auth
        .register(SignUp {
            email: body.email,
            password: body.password,
            first_name: body.first_name,
            last_name: body.last_name,
        })
        .await?;
    info!(user_id = %user.id, "user registered");
    Ok((StatusCode::CREATED, Json(AuthResponse { access_token, user })))
}

async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginBody>,
) -> Result<Json<AuthResponse>> {
    let (user, access_token) = state.auth.login(&body.email, &body.password).await?;
    info!(user_id = %user.id, "user logged in");
    Ok(Json(AuthResponse { access_token, user }))
}

async fn logout(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Json<serde_json::Value> {
    state.auth.logout(&user.id).await;
    info!(user_id = %user.id, "user logged out");
    Json(json!({"message": "Logged out successfully"}))
}

async fn refresh(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<serde_json::Value>> {
    let access_token = state.auth.refresh(&user.id).await?;
    Ok(Json(json!({"access_token": access_token})))
}

async fn profile(CurrentUser(user): CurrentUser) -> Json<serde_json::Value> {
    Json(json!({"user": user}))
}

async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(json!({
        "status": "healthy",
        "provider": state.auth.provider_id(),
        "uptime_seconds": state.started_at.elapsed().as_secs(),
        "requests_served": state.requests_served.load(Ordering::Relaxed),
    }))
}

async fn prometheus_metrics(State(state): State<AppState>) -> String {
    state.prometheus.render()
}
