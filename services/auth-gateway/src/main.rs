//! Authentication gateway
//!
//! Thin HTTP front for a hosted identity provider: forwards credentials
//! upstream, mints short-lived HS256 bearer tokens signed with a local
//! secret, and re-resolves every token's subject with the provider before
//! trusting it. Holds no user data of its own.

mod config;
mod error;
mod extract;
mod handlers;
mod metrics;
mod service;
#[cfg(test)]
mod testing;

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::handlers::AppState;
use crate::service::AuthService;
use identity::HttpIdentityProvider;
use token::TokenSigner;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .json()
        .with_env_filter(
            EnvFilter::try_from_env("LOG_LEVEL")
                .or_else(|_| EnvFilter::try_from_default_env())
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("starting auth-gateway");

    let prometheus = metrics::install_recorder();

    let cli_path = parse_config_arg();
    let path = Config::resolve_path(cli_path.as_deref());
    let config = Config::load(&path)
        .with_context(|| format!("failed to load configuration from {}", path.display()))?;

    info!(
        listen_addr = %config.server.listen_addr,
        provider_url = %config.provider.url,
        token_expiry_secs = config.token.expiry_secs,
        "configuration loaded"
    );

    // One client for all provider calls; the request timeout here is the
    // only deadline — no retries
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.provider.timeout_secs))
        .build()
        .context("failed to build HTTP client")?;

    let provider = Arc::new(HttpIdentityProvider::new(
        client,
        config.provider.url.clone(),
        config.provider.anon_key.expose(),
        config.provider.service_key.expose(),
    ));

    let signer = TokenSigner::new(
        config.token.secret.expose().as_bytes(),
        Duration::from_secs(config.token.expiry_secs),
    );

    let state = AppState {
        auth: Arc::new(AuthService::new(provider, signer)),
        prometheus,
        started_at: Instant::now(),
        requests_served: Arc::default(),
    };

    let app = handlers::build_router(state, config.server.max_connections);

    let listener = TcpListener::bind(config.server.listen_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.server.listen_addr))?;
    info!(addr = %config.server.listen_addr, "accepting requests");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("shutdown complete");
    Ok(())
}

/// Extract `--config <path>` from argv, if present.
fn parse_config_arg() -> Option<String> {
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        if arg == "--config" {
            return args.next();
        }
    }
    None
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install ctrl-c handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => tracing::error!(error = %e, "failed to install SIGTERM handler"),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("received ctrl-c, shutting down"),
        _ = terminate => info!("received SIGTERM, shutting down"),
    }
}
