//! Construction of the pipeline and its external service clients

use anyhow::{Context, Result};
use lemouniq_core::Config;
use lemouniq_services::{
    build_http_client, CopyWriter, ImageHost, ImgBbClient, MockupGenerator, MockupRenderer,
    OpenAiChatClient, PollSettings, PrintfulClient, TextGenerator,
};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::services::upload::UploadPipeline;
use crate::state::AppState;

/// Create the storage directories and wire every stage into the application state.
pub async fn initialize_services(
    config: &Config,
    shutdown: CancellationToken,
) -> Result<Arc<AppState>> {
    let storage = &config.storage;
    for dir in [
        &storage.upload_dir,
        &storage.resized_dir,
        &storage.mockup_dir,
        &storage.description_dir,
    ] {
        tokio::fs::create_dir_all(dir)
            .await
            .with_context(|| format!("Failed to create directory {}", dir.display()))?;
    }

    let http = build_http_client(config.server.http_timeout_secs)?;

    let host: Arc<dyn ImageHost> = Arc::new(ImgBbClient::new(
        http.clone(),
        config.image_host.clone(),
    ));
    let renderer: Arc<dyn MockupRenderer> =
        Arc::new(PrintfulClient::new(http.clone(), config.mockup.clone()));
    let poll = PollSettings::new(
        Duration::from_secs(config.mockup.poll_interval_secs),
        config.mockup.poll_max_attempts,
    );
    let mockups = Arc::new(MockupGenerator::new(
        host,
        renderer,
        storage.mockup_dir.clone(),
        poll,
    ));

    let generator: Arc<dyn TextGenerator> =
        Arc::new(OpenAiChatClient::new(http, config.copy.clone()));
    let copy = Arc::new(CopyWriter::new(generator, storage.description_dir.clone()));

    tracing::info!(
        poll_interval_secs = config.mockup.poll_interval_secs,
        poll_max_attempts = config.mockup.poll_max_attempts,
        model = %config.copy.model,
        "Pipeline services initialized"
    );

    let pipeline = UploadPipeline::from_config(config, mockups, copy);
    Ok(Arc::new(AppState::new(config.clone(), pipeline, shutdown)))
}
