//! Shopify install service
//!
//! Single-binary service that:
//! 1. Loads and validates its configuration from the environment
//! 2. Redirects merchants to the Shopify consent screen (`GET /auth`)
//! 3. Verifies the callback and stores the shop's access token (`GET /auth/callback`)

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use shopify_install::server::{build_router, AppState};
use shopify_install::store::{InMemoryStateStore, InMemoryTokenStore};
use shopify_install::{AppConfig, InstallFlow};

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let config = AppConfig::from_env().context("failed to load configuration")?;

    info!(
        port = config.port,
        host = %config.shopify.host().as_ref(),
        scopes = %config.shopify.scopes(),
        access_mode = ?config.shopify.access_mode(),
        exchange_timeout_secs = config.shopify.exchange_timeout().as_secs(),
        state_ttl_secs = config.shopify.state_ttl().as_secs(),
        "configuration loaded"
    );

    let flow = InstallFlow::new(
        config.shopify,
        Arc::new(InMemoryStateStore::new()),
        Arc::new(InMemoryTokenStore::new()),
    )
    .context("failed to build token exchange client")?;

    let app = build_router(AppState::new(flow));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind to {addr}"))?;
    info!(%addr, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("shutdown complete");
    Ok(())
}

/// JSON logs by default, human-readable with `LOG_FORMAT=pretty`.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let pretty = std::env::var("LOG_FORMAT").is_ok_and(|f| f.eq_ignore_ascii_case("pretty"));

    let registry = tracing_subscriber::registry().with(filter);
    if pretty {
        registry.with(tracing_subscriber::fmt::layer()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    }
}

/// Wait for SIGTERM or SIGINT for graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("received SIGINT, shutting down"),
        () = terminate => info!("received SIGTERM, shutting down"),
    }
}
