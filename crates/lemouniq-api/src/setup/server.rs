//! Server startup and graceful shutdown

use anyhow::Result;
use axum::Router;
use lemouniq_core::Config;
use tokio_util::sync::CancellationToken;

/// Start the server with graceful shutdown
///
/// `shutdown` is cancelled when a termination signal arrives, which also stops any
/// mockup poll still running inside an upload request.
pub async fn start_server(config: &Config, app: Router, shutdown: CancellationToken) -> Result<()> {
    let addr = format!("0.0.0.0:{}", config.server.port);
    tracing::info!(addr = %addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!(
        max_file_mb = config.server.max_file_size_bytes / 1024 / 1024,
        extensions = %config.server.allowed_extensions.join(","),
        print_edge_px = config.print.target_edge_px(),
        upload_dir = %config.storage.upload_dir.display(),
        resized_dir = %config.storage.resized_dir.display(),
        "Server ready and accepting connections"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown))
        .await?;

    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM, or when `shutdown` is cancelled elsewhere.
async fn shutdown_signal(shutdown: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
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
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            tracing::info!("Received terminate signal");
        },
        _ = shutdown.cancelled() => {},
    }

    tracing::info!("Shutting down gracefully...");
    shutdown.cancel();
}
