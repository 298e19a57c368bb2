//! Spotify Dashboard
//!
//! Single-binary web service that:
//! 1. Redirects the browser through Spotify's OAuth2 authorization flow
//! 2. Keeps the resulting credential server-side, keyed by a signed cookie
//! 3. Re-exposes a curated slice of the Spotify Web API with the credential
//!    validated (and refreshed inline when expiring) on every call

mod config;
mod cookies;
mod error;
mod gateway;
mod genres;
mod metrics;
mod pages;
mod routes;

use std::sync::Arc;
use std::sync::atomic::AtomicU64;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use spotify_auth::OAuthConfig;
use spotify_session::{CredentialManager, SessionStore};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;
use crate::gateway::Gateway;
use crate::routes::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing with JSON output and LOG_LEVEL / RUST_LOG support
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_env("LOG_LEVEL")
                .or_else(|_| EnvFilter::try_from_default_env())
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    info!("starting spotify-dashboard");

    // Install Prometheus metrics recorder before any metrics are emitted
    let prometheus_handle = metrics::install_recorder();

    // CLI: simple --config flag parsing
    let args: Vec<String> = std::env::args().collect();
    let cli_config_path = args
        .iter()
        .position(|a| a == "--config")
        .and_then(|i| args.get(i + 1))
        .map(|s| s.as_str());

    let config_path = Config::resolve_path(cli_config_path);
    info!(path = %config_path.display(), "loading configuration");

    let config = Config::load(&config_path)
        .with_context(|| format!("failed to load config from {}", config_path.display()))?;

    info!(
        listen_addr = %config.server.listen_addr,
        redirect_uri = %config.redirect_uri,
        timeout_secs = config.server.timeout_secs,
        "configuration loaded"
    );

    // One shared HTTP client; the bounded timeout applies to every outbound
    // call, token refreshes included
    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.server.timeout_secs))
        .build()
        .context("failed to build HTTP client")?;

    let oauth = OAuthConfig::new(
        config.client_id.clone(),
        config.client_secret.clone(),
        config.redirect_uri.clone(),
        spotify_auth::SCOPES,
    );

    let store = Arc::new(SessionStore::new(config.session_secret.clone()));
    let manager = Arc::new(CredentialManager::new(
        store.clone(),
        oauth.clone(),
        http.clone(),
    ));
    let gateway = Arc::new(Gateway::new(manager.clone(), http));

    let state = AppState {
        store,
        manager,
        gateway,
        oauth,
        prometheus: prometheus_handle,
        requests_total: Arc::new(AtomicU64::new(0)),
        started_at: Instant::now(),
    };

    let app = routes::build_router(state, config.server.max_connections);

    let listener = TcpListener::bind(config.server.listen_addr)
        .await
        .with_context(|| format!("failed to bind to {}", config.server.listen_addr))?;

    info!(addr = %config.server.listen_addr, "accepting requests");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("shutdown complete");
    Ok(())
}

/// Wait for SIGTERM or SIGINT for graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("received SIGINT, shutting down"),
        _ = terminate => info!("received SIGTERM, shutting down"),
    }
}
