//! inletd — Inlet streaming ingestion daemon.

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;

use inlet_core::config::InletConfig;
use inlet_services::{LogSink, UploadLimits, UploadService};

/// How often the janitor sweeps for idle sessions.
const JANITOR_INTERVAL: Duration = Duration::from_secs(10);

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    // Load config
    if let Err(e) = InletConfig::write_default_if_missing() {
        tracing::warn!(error = %e, "failed to write default config");
    }
    let config = InletConfig::load().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "failed to load config, using defaults");
        InletConfig::default()
    });

    tracing::info!(
        port = config.api.port,
        max_chunk_bytes = config.limits.max_chunk_bytes,
        max_session_bytes = config.limits.max_session_bytes,
        idle_timeout_secs = config.limits.idle_timeout_secs,
        "inletd starting"
    );

    let limits = UploadLimits::from(&config.limits);
    let service = Arc::new(UploadService::new(
        Arc::new(LogSink),
        limits,
        config.limits.records_per_user,
    ));

    // Janitor — expire idle sessions so abandoned streams always
    // reach a terminal result.
    {
        let service = service.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(JANITOR_INTERVAL);
            loop {
                interval.tick().await;
                let expired = service.expire_idle().await;
                if expired > 0 {
                    tracing::info!(expired, "idle sessions expired");
                }
            }
        });
    }

    let (shutdown_tx, _) = tokio::sync::broadcast::channel(1);

    // Ctrl-C triggers the same graceful shutdown as the API endpoint.
    {
        let shutdown_tx = shutdown_tx.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("interrupt received, shutting down");
                let _ = shutdown_tx.send(());
            }
        });
    }

    let state = inlet_api::ApiState {
        service,
        started_at: Instant::now(),
        shutdown_tx,
    };

    inlet_api::serve(state, config.api.port).await?;
    tracing::info!("inletd stopped");
    Ok(())
}
