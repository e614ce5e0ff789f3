//! Configuration types and loading
//!
//! Config precedence: CLI args > env vars > config file > defaults.
//! Secrets (JWT signing secret, provider anon and service-role keys) are
//! loaded from env vars or `*_file` paths, never stored in the TOML
//! directly to avoid leaking them. All three are required: a missing
//! secret is a fatal startup error, never a per-request error.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use common::SecretString;
use serde::Deserialize;

/// Env var carrying the JWT signing secret
pub const JWT_SECRET_ENV: &str = "JWT_SECRET";
/// Env var carrying the provider anon key
pub const ANON_KEY_ENV: &str = "PROVIDER_ANON_KEY";
/// Env var carrying the provider service-role key
pub const SERVICE_KEY_ENV: &str = "PROVIDER_SERVICE_KEY";

/// Root configuration, fully resolved and validated.
#[derive(Debug)]
pub struct Config {
    pub server: ServerConfig,
    pub provider: ProviderConfig,
    pub token: TokenConfig,
}

/// HTTP listener settings
#[derive(Debug)]
pub struct ServerConfig {
    pub listen_addr: SocketAddr,
    pub max_connections: usize,
}

/// Identity provider connection settings
#[derive(Debug)]
pub struct ProviderConfig {
    pub url: String,
    /// Request-level timeout for every provider call; a timed-out call
    /// surfaces to the client as a generic auth failure
    pub timeout_secs: u64,
    pub anon_key: SecretString,
    pub service_key: SecretString,
}

/// Bearer token settings
#[derive(Debug)]
pub struct TokenConfig {
    pub expiry_secs: u64,
    pub secret: SecretString,
}

/// On-disk TOML shape before secret resolution.
#[derive(Debug, Deserialize)]
struct RawConfig {
    server: RawServer,
    provider: RawProvider,
    token: RawToken,
}

#[derive(Debug, Deserialize)]
struct RawServer {
    listen_addr: SocketAddr,
    #[serde(default = "default_max_connections")]
    max_connections: usize,
}

#[derive(Debug, Deserialize)]
struct RawProvider {
    url: String,
    #[serde(default = "default_timeout")]
    timeout_secs: u64,
    #[serde(default)]
    anon_key_file: Option<PathBuf>,
    #[serde(default)]
    service_key_file: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
struct RawToken {
    expiry_secs: u64,
    #[serde(default)]
    secret_file: Option<PathBuf>,
}

fn default_timeout() -> u64 {
    10
}

fn default_max_connections() -> usize {
    1000
}

impl Config {
    /// Load configuration from a TOML file, then overlay environment
    /// variables for secrets.
    ///
    /// Secret resolution order for each key: env var, then `*_file` path
    /// from the config. A secret resolvable from neither is fatal.
    pub fn load(path: &Path) -> common::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let raw: RawConfig = toml::from_str(&contents)?;

        if !raw.provider.url.starts_with("http://") && !raw.provider.url.starts_with("https://") {
            return Err(common::Error::Config(format!(
                "provider url must start with http:// or https://, got: {}",
                raw.provider.url
            )));
        }

        if raw.provider.timeout_secs == 0 {
            return Err(common::Error::Config(
                "provider timeout_secs must be greater than 0".into(),
            ));
        }

        if raw.server.max_connections == 0 {
            return Err(common::Error::Config(
                "max_connections must be greater than 0".into(),
            ));
        }

        if raw.token.expiry_secs == 0 {
            return Err(common::Error::Config(
                "token expiry_secs must be greater than 0".into(),
            ));
        }

        let secret = resolve_secret(JWT_SECRET_ENV, raw.token.secret_file.as_deref(), "JWT secret")?;
        let anon_key = resolve_secret(
            ANON_KEY_ENV,
            raw.provider.anon_key_file.as_deref(),
            "provider anon key",
        )?;
        let service_key = resolve_secret(
            SERVICE_KEY_ENV,
            raw.provider.service_key_file.as_deref(),
            "provider service-role key",
        )?;

        Ok(Config {
            server: ServerConfig {
                listen_addr: raw.server.listen_addr,
                max_connections: raw.server.max_connections,
            },
            provider: ProviderConfig {
                url: raw.provider.url,
                timeout_secs: raw.provider.timeout_secs,
                anon_key,
                service_key,
            },
            token: TokenConfig {
                expiry_secs: raw.token.expiry_secs,
                secret,
            },
        })
    }

    /// Resolve config file path from CLI arg or CONFIG_PATH env var.
    pub fn resolve_path(cli_path: Option<&str>) -> PathBuf {
        if let Some(p) = cli_path {
            return PathBuf::from(p);
        }
        if let Ok(p) = std::env::var("CONFIG_PATH") {
            return PathBuf::from(p);
        }
        PathBuf::from("auth-gateway.toml")
    }
}

/// Resolve a secret: env var takes precedence over file; blank values
/// count as absent.
fn resolve_secret(
    env_var: &str,
    key_file: Option<&Path>,
    what: &str,
) -> common::Result<SecretString> {
    if let Ok(value) = std::env::var(env_var) {
        let secret = SecretString::new(value.trim());
        if !secret.is_blank() {
            return Ok(secret);
        }
    }

    if let Some(path) = key_file {
        let value = std::fs::read_to_string(path).map_err(|e| {
            common::Error::secret(what, format!("failed to read key file {}: {e}", path.display()))
        })?;
        let secret = SecretString::new(value.trim());
        if !secret.is_blank() {
            return Ok(secret);
        }
    }

    Err(common::Error::secret(
        what,
        format!("not defined: set {env_var} or configure a key file"),
    ))
}
