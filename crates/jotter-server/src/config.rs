//! Server configuration loaded from environment variables.
//!
//! All settings have sensible defaults so the server can start with zero
//! configuration for local development.  The signing secret MUST be set in
//! any real deployment; the default exists only so `cargo run` works out of
//! the box, and startup logs a loud warning when it is in use.

use std::net::SocketAddr;
use std::path::PathBuf;

/// Fallback signing secret for local development.
pub const DEV_SECRET: &str = "insecure-dev-secret-change-me";

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Socket address for the HTTP (axum) API server.
    /// Env: `HTTP_ADDR`
    /// Default: `0.0.0.0:8080`
    pub http_addr: SocketAddr,

    /// Filesystem path of the SQLite database.
    /// Env: `DATABASE_PATH`
    /// Default: `./jotter.db`
    pub database_path: PathBuf,

    /// Shared HMAC secret used to sign access and refresh tokens.
    /// Env: `SECRET_KEY`
    /// Default: [`DEV_SECRET`] (development only).
    pub secret_key: String,

    /// Access-token lifetime in seconds.
    /// Env: `ACCESS_TOKEN_TTL_SECS`
    /// Default: `300` (5 minutes)
    pub access_ttl_secs: i64,

    /// Refresh-token lifetime in seconds.
    /// Env: `REFRESH_TOKEN_TTL_SECS`
    /// Default: `86400` (1 day)
    pub refresh_ttl_secs: i64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            http_addr: ([0, 0, 0, 0], 8080).into(),
            database_path: PathBuf::from("./jotter.db"),
            secret_key: DEV_SECRET.to_string(),
            access_ttl_secs: jotter_auth::token::DEFAULT_ACCESS_TTL_SECS,
            refresh_ttl_secs: jotter_auth::token::DEFAULT_REFRESH_TTL_SECS,
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(addr) = std::env::var("HTTP_ADDR") {
            if let Ok(parsed) = addr.parse::<SocketAddr>() {
                config.http_addr = parsed;
            } else {
                tracing::warn!(
                    value = %addr,
                    "Invalid HTTP_ADDR, using default"
                );
            }
        }

        if let Ok(path) = std::env::var("DATABASE_PATH") {
            config.database_path = PathBuf::from(path);
        }

        if let Ok(secret) = std::env::var("SECRET_KEY") {
            if !secret.is_empty() {
                config.secret_key = secret;
            }
        }

        if let Ok(val) = std::env::var("ACCESS_TOKEN_TTL_SECS") {
            match val.parse::<i64>() {
                Ok(n) if n > 0 => config.access_ttl_secs = n,
                _ => tracing::warn!(value = %val, "Invalid ACCESS_TOKEN_TTL_SECS, using default"),
            }
        }

        if let Ok(val) = std::env::var("REFRESH_TOKEN_TTL_SECS") {
            match val.parse::<i64>() {
                Ok(n) if n > 0 => config.refresh_ttl_secs = n,
                _ => tracing::warn!(value = %val, "Invalid REFRESH_TOKEN_TTL_SECS, using default"),
            }
        }

        // RUST_LOG is handled directly by tracing-subscriber's EnvFilter,
        // so we do not store it here.

        config
    }

    /// Whether the server is still running on the built-in dev secret.
    pub fn using_dev_secret(&self) -> bool {
        self.secret_key == DEV_SECRET
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ServerConfig::default();
        assert_eq!(config.http_addr, ([0, 0, 0, 0], 8080).into());
        assert_eq!(config.access_ttl_secs, 300);
        assert_eq!(config.refresh_ttl_secs, 86400);
        assert!(config.using_dev_secret());
    }
}
