//! # jotter-server
//!
//! HTTP backend for the jotter note-taking service.
//!
//! This binary provides:
//! - **User registration and JWT login** (access + refresh token pairs)
//! - **Per-user note CRUD** over a local SQLite database, with every query
//!   scoped to the authenticated owner
//! - **Bearer-token middleware** guarding all resource routes
//! - **REST API** (axum) with a route listing and health check

mod api;
mod auth;
mod config;
mod error;

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use jotter_auth::{PasswordPolicy, TokenConfig, TokenService};
use jotter_store::Database;

use crate::api::AppState;
use crate::config::ServerConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // -----------------------------------------------------------------------
    // 1. Initialize tracing (respects RUST_LOG env var)
    // -----------------------------------------------------------------------
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,jotter_server=debug")),
        )
        .init();

    info!("Starting jotter server v{}", env!("CARGO_PKG_VERSION"));

    // -----------------------------------------------------------------------
    // 2. Load configuration
    // -----------------------------------------------------------------------
    let config = ServerConfig::from_env();
    info!(
        http_addr = %config.http_addr,
        database = %config.database_path.display(),
        access_ttl_secs = config.access_ttl_secs,
        refresh_ttl_secs = config.refresh_ttl_secs,
        "Loaded configuration"
    );

    if config.using_dev_secret() {
        warn!("SECRET_KEY is not set; tokens are signed with the built-in dev secret");
    }

    // -----------------------------------------------------------------------
    // 3. Initialize subsystems
    // -----------------------------------------------------------------------
    let db = Database::open_at(&config.database_path)?;

    let tokens = TokenService::new(TokenConfig {
        secret: config.secret_key.clone(),
        access_ttl_secs: config.access_ttl_secs,
        refresh_ttl_secs: config.refresh_ttl_secs,
    });

    let state = AppState {
        db: Arc::new(Mutex::new(db)),
        tokens: Arc::new(tokens),
        policy: PasswordPolicy::default(),
    };

    // -----------------------------------------------------------------------
    // 4. Run the HTTP API server (blocks until shutdown)
    // -----------------------------------------------------------------------
    let http_addr = config.http_addr;

    tokio::select! {
        result = api::serve(state, http_addr) => {
            if let Err(e) = result {
                tracing::error!(error = %e, "HTTP server failed");
                return Err(e);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down");
        }
    }

    Ok(())
}
