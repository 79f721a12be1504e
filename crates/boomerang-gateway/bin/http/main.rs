mod cli;
mod telemetry;

use crate::cli::CLI;
use anyhow::Context;
use boomerang_gateway::{App, AppState, GatewaySettings};
use boomerang_pool::PoolConfig;
use boomerang_shortener::{Reaper, ReaperConfig, RetryPolicy};
use clap::Parser;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = CLI::try_parse()?;
    telemetry::init(config.log_format);

    info!(
        listen_addr = %config.listen_addr,
        base_url = %config.base_url,
        reclaim_interval_secs = config.reclaim_interval_secs,
        id_capacity = config.id_capacity,
        retry_attempts = config.retry_attempts,
        log_format = %config.log_format,
        "starting gateway HTTP server"
    );

    let settings = GatewaySettings::builder()
        .base_url(config.base_url)
        .pool(PoolConfig::builder().capacity(config.id_capacity).build())
        .retry(
            RetryPolicy::builder()
                .max_attempts(config.retry_attempts)
                .build(),
        )
        .build();
    let (state, shortener) = AppState::in_memory(settings);

    let reaper = Reaper::new(
        shortener,
        ReaperConfig::builder()
            .interval(Duration::from_secs(config.reclaim_interval_secs))
            .build(),
    )
    .spawn();

    let listener = TcpListener::bind(config.listen_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.listen_addr))?;

    axum::serve(listener, App::router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("http server failed")?;

    info!("http server drained, stopping expiration reaper");
    reaper
        .shutdown()
        .await
        .context("expiration reaper panicked")?;

    Ok(())
}

/// Resolves on Ctrl-C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            error!(error = %err, "failed to install Ctrl+C handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(err) => error!(error = %err, "failed to install SIGTERM handler"),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("received SIGINT, shutting down"),
        _ = terminate => info!("received SIGTERM, shutting down"),
    }
}
