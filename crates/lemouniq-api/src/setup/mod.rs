//! Application setup and initialization

pub mod routes;
pub mod server;
pub mod services;

use crate::state::AppState;
use anyhow::{Context, Result};
use lemouniq_core::Config;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Initialize the entire application
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    crate::telemetry::init_telemetry();

    config.validate().context("Configuration validation failed")?;
    tracing::info!(
        environment = %config.server.environment,
        "Configuration loaded and validated successfully"
    );

    let missing = config.missing_credentials();
    if !missing.is_empty() {
        tracing::warn!(
            missing = %missing.join(","),
            "External service credentials missing; the matching stages will fail per file"
        );
    }

    let state = services::initialize_services(&config, CancellationToken::new()).await?;
    let router = routes::setup_routes(&config, state.clone())?;

    Ok((state, router))
}
