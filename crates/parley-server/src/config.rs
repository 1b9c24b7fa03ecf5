use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result, bail};

use parley_api::completion::CompletionConfig;

/// Placeholder JWT secrets that MUST NOT be used.
const PLACEHOLDER_SECRETS: &[&str] = &[
    "change-me-to-a-random-string",
    "dev-secret-change-me",
    "YOUR_SECRET_KEY",
];

fn var_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_var<T>(key: &str, default: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    var_or(key, default)
        .parse()
        .with_context(|| format!("{key} is not valid"))
}

fn socket_addr(host_key: &str, port_key: &str, default_port: &str) -> Result<SocketAddr> {
    let host = var_or(host_key, "0.0.0.0");
    let port: u16 = parse_var(port_key, default_port)?;
    format!("{}:{}", host, port)
        .parse()
        .with_context(|| format!("{host_key}/{port_key} do not form a socket address"))
}

/// Chat backend settings, read from the environment.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub addr: SocketAddr,
    pub jwt_secret: String,
    pub db_path: PathBuf,
    pub token_ttl: chrono::Duration,
    pub completions: CompletionConfig,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self> {
        let jwt_secret = std::env::var("PARLEY_JWT_SECRET").unwrap_or_default();
        check_secret(&jwt_secret)?;

        let ttl_secs: i64 = parse_var("PARLEY_TOKEN_TTL_SECS", "3600")?;
        if ttl_secs <= 0 {
            bail!("PARLEY_TOKEN_TTL_SECS must be positive");
        }

        let defaults = CompletionConfig::default();
        let completions = CompletionConfig {
            url: var_or("PARLEY_COMPLETIONS_URL", &defaults.url),
            api_key: var_or("PARLEY_COMPLETIONS_API_KEY", ""),
            model: var_or("PARLEY_COMPLETIONS_MODEL", &defaults.model),
            max_tokens: parse_var("PARLEY_COMPLETIONS_MAX_TOKENS", "150")?,
            timeout: Duration::from_secs(parse_var("PARLEY_UPSTREAM_TIMEOUT_SECS", "30")?),
        };

        Ok(Self {
            addr: socket_addr("PARLEY_HOST", "PARLEY_PORT", "3000")?,
            jwt_secret,
            db_path: var_or("PARLEY_DB_PATH", "parley.db").into(),
            token_ttl: chrono::Duration::seconds(ttl_secs),
            completions,
        })
    }
}

/// Visualizer feed settings, read from the environment.
#[derive(Debug, Clone)]
pub struct VisualizerConfig {
    pub addr: SocketAddr,
    pub static_dir: Option<PathBuf>,
}

impl VisualizerConfig {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            addr: socket_addr("PARLEY_VISUALIZER_HOST", "PARLEY_VISUALIZER_PORT", "8000")?,
            static_dir: std::env::var_os("PARLEY_VISUALIZER_STATIC_DIR").map(PathBuf::from),
        })
    }
}

fn check_secret(secret: &str) -> Result<()> {
    if secret.is_empty() || PLACEHOLDER_SECRETS.contains(&secret) {
        bail!("PARLEY_JWT_SECRET is unset or still a placeholder");
    }
    Ok(())
}
