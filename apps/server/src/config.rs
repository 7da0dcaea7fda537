use std::{net::SocketAddr, str::FromStr, time::Duration};

use anyhow::Context;

pub struct Config {
    pub listen_addr: SocketAddr,
    pub db_path: String,
    pub cors_allow: Vec<String>,
    pub request_timeout: Duration,
    /// Raw `GS_SECRET_KEY`; decoded by [`crate::auth::decode_secret_key`].
    pub secret_key: String,
    pub session_ttl: Duration,
    pub cookie_secure: bool,
    pub analytics_retention_days: u32,
    pub retention_interval: Duration,
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("Invalid {key}: {raw:?}")),
        None => Ok(default),
    }
}

impl Config {
    /// Loads `.env` (if present) and reads the `GS_*` variables.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let listen_addr: SocketAddr =
            parse_or(&lookup, "GS_LISTEN_ADDR", SocketAddr::from(([0, 0, 0, 0], 8080)))?;
        let db_path = lookup("GS_DB_PATH").unwrap_or_else(|| "./db/app.db".into());
        let cors_allow = lookup("GS_CORS_ALLOW_ORIGINS")
            .unwrap_or_else(|| "*".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        let timeout_ms: u64 = parse_or(&lookup, "GS_REQUEST_TIMEOUT_MS", 30_000)?;
        let secret_key = lookup("GS_SECRET_KEY")
            .filter(|s| !s.trim().is_empty())
            .context("GS_SECRET_KEY is required (base64 encoded 32 bytes)")?;
        let session_ttl_secs: u64 = parse_or(&lookup, "GS_SESSION_TTL_SECS", 30 * 24 * 60 * 60)?;
        let cookie_secure: bool = parse_or(&lookup, "GS_COOKIE_SECURE", true)?;
        let analytics_retention_days: u32 =
            parse_or(&lookup, "GS_ANALYTICS_RETENTION_DAYS", 90)?;
        let retention_interval_secs: u64 =
            parse_or(&lookup, "GS_RETENTION_INTERVAL_SECS", 24 * 60 * 60)?;
        if retention_interval_secs == 0 {
            anyhow::bail!("GS_RETENTION_INTERVAL_SECS must be greater than zero");
        }

        Ok(Self {
            listen_addr,
            db_path,
            cors_allow,
            request_timeout: Duration::from_millis(timeout_ms),
            secret_key,
            session_ttl: Duration::from_secs(session_ttl_secs),
            cookie_secure,
            analytics_retention_days,
            retention_interval: Duration::from_secs(retention_interval_secs),
        })
    }
}
