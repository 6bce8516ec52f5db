//! Anonymous product voting backend.
//!
//! Clients mint a session (`POST /api/v1/session`, returned in the
//! `session_id` cookie, valid for one hour), score products from 1 to 5 and
//! read back their own votes or the public per-product average.
//!
//! Votes are unique per (session, product); voting again overwrites the
//! previous score. Averages are recomputed from the stored votes on every
//! request.
//!
//! # Configuration
//!
//! | Variable | Default |
//! |---|---|
//! | `SERVICE_PORT` | `8080` |
//! | `SERVICE_SHUTDOWN_TIMEOUT` | `15s` |
//! | `STORE_URI` | required, `postgres://...` or `memory://` |
//! | `STORE_PING_TIMEOUT` | `5s` |
//! | `STORE_DATABASE` | `foodtinder` |
//!
//! A `.env` file in the working directory is read first if present.
use std::{sync::Arc, time::Duration};

use anyhow::Context;
use axum::Router;
use tokio::{
    net::TcpListener,
    signal::{self, ctrl_c},
    sync::Notify,
    time::timeout,
};
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, EnvFilter};

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod services;
pub mod utils;

use config::Config;
use models::AppState;

pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    fmt().with_env_filter(filter).init();
}

pub async fn start_server() -> anyhow::Result<()> {
    info!("Loading configuration...");
    let config = Config::load().context("cannot load configuration")?;

    info!("Initializing store...");
    let store = db::connect(&config.store)
        .await
        .context("cannot initialize store")?;
    let state = Arc::new(AppState::new(store));

    let app = api::router(state);

    let address = format!("0.0.0.0:{}", config.service.port);
    info!("Binding to {address}");

    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("cannot bind {address}"))?;
    info!("Server running on {address}");

    serve(listener, app, config.service.shutdown_timeout).await
}

/// Runs until a shutdown signal, then gives in-flight requests `grace` to
/// finish before dropping them.
async fn serve(listener: TcpListener, app: Router, grace: Duration) -> anyhow::Result<()> {
    let stop = Arc::new(Notify::new());

    let server = axum::serve(listener, app).with_graceful_shutdown({
        let stop = stop.clone();
        async move { stop.notified().await }
    });
    let mut server = tokio::spawn(async move { server.await });

    tokio::select! {
        result = &mut server => return Ok(result??),
        _ = shutdown_signal() => {},
    }

    stop.notify_one();

    match timeout(grace, &mut server).await {
        Ok(result) => result??,
        Err(_) => {
            warn!("Shutdown grace period of {grace:?} elapsed, closing remaining connections");
            server.abort();
        }
    }

    info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }

        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                error!("Failed to install signal handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
