//! AstraGuard HTTP Server
//!
//! Main entry point for one resilience instance.

use std::time::Duration;

use infrastructure::{AppConfig, LogFormat, init_logging};
use presentation_http::{Runtime, routes, tasks::shutdown_requested};
use tokio::{net::TcpListener, signal, sync::watch};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let (config, load_error) = match AppConfig::load() {
        Ok(config) => (config, None),
        Err(e) => (AppConfig::default(), Some(e)),
    };

    let format = config.server.log_format.parse().unwrap_or(LogFormat::Text);
    init_logging(format, &config.server.log_filter)?;

    if let Some(e) = load_error {
        warn!(error = %e, "Failed to load config, using defaults");
    }
    info!("AstraGuard v{} starting", env!("CARGO_PKG_VERSION"));
    info!(
        host = %config.server.host,
        port = config.server.port,
        instance_id = %config.cluster.instance_id,
        peers = config.cluster.peers.len(),
        "Configuration loaded"
    );

    let addr = config.server.bind_addr();
    let shutdown_timeout = Duration::from_secs(config.server.shutdown_timeout_secs);

    let runtime = Runtime::build(config)?;
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let tasks = runtime.spawn_tasks(&shutdown_rx);

    let app = routes::create_router(runtime.state.clone());
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on http://{}", addr);

    let mut server_shutdown = shutdown_rx.clone();
    let server = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async move { shutdown_requested(&mut server_shutdown).await })
            .await
    });

    shutdown_signal().await;
    shutdown_tx.send_replace(true);

    info!("Waiting up to {:?} for connections and tasks to finish", shutdown_timeout);
    let drain = async {
        for task in tasks {
            if let Err(e) = task.await {
                warn!(error = %e, "Background task ended abnormally");
            }
        }
        server.await
    };
    match tokio::time::timeout(shutdown_timeout, drain).await {
        Ok(Ok(result)) => result?,
        Ok(Err(e)) => warn!(error = %e, "Server task ended abnormally"),
        Err(_) => warn!("Shutdown timeout elapsed, exiting"),
    }

    info!("Server shutdown complete");
    Ok(())
}

/// Wait for SIGINT or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            },
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            },
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received Ctrl+C, initiating graceful shutdown");
        }
        () = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
