//! Salonbook - booking availability and terminal payment service
//!
//! Main entry point for the HTTP server.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use salonbook_api::{router, utils, AppContext};
use salonbook_infra::config;
use tokio::net::TcpListener;
use tracing::{debug, info, warn};

const SESSION_SWEEP_INTERVAL: Duration = Duration::from_secs(5 * 60);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env must be applied before the config loader reads the environment.
    let dotenv = dotenvy::dotenv();

    let config = config::load().context("failed to load configuration")?;
    utils::init_logging(&config.logging)?;
    match dotenv {
        Ok(path) => info!(path = %path.display(), "loaded .env"),
        Err(err) => debug!(error = %err, "no .env file applied"),
    }

    let bind_address = config.server.bind_address.clone();
    let ctx = Arc::new(AppContext::new(config).context("failed to initialise application context")?);
    spawn_session_sweeper(ctx.clone());

    let listener = TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("failed to bind {bind_address}"))?;
    info!(%bind_address, "salonbook listening");

    axum::serve(listener, router(ctx))
        .with_graceful_shutdown(async {
            if let Err(err) = tokio::signal::ctrl_c().await {
                warn!(error = %err, "failed to listen for shutdown signal");
            }
            info!("shutdown signal received");
        })
        .await
        .context("server error")?;

    Ok(())
}

/// Periodic sweep on top of the opportunistic one done on every session put.
fn spawn_session_sweeper(ctx: Arc<AppContext>) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(SESSION_SWEEP_INTERVAL);
        ticker.tick().await;
        loop {
            ticker.tick().await;
            match ctx.payments.sweep_sessions().await {
                Ok(0) => {}
                Ok(swept) => info!(swept, "expired terminal sessions swept"),
                Err(err) => warn!(error = %err, "terminal session sweep failed"),
            }
        }
    });
}
