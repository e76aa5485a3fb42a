//! Application state shared by every handler.

use lemouniq_core::Config;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::services::upload::UploadPipeline;

pub struct AppState {
    pub config: Config,
    pub pipeline: Arc<UploadPipeline>,
    /// Cancelled on SIGINT/SIGTERM so in-flight mockup polls stop.
    pub shutdown: CancellationToken,
}

impl AppState {
    pub fn new(config: Config, pipeline: UploadPipeline, shutdown: CancellationToken) -> Self {
        Self {
            config,
            pipeline: Arc::new(pipeline),
            shutdown,
        }
    }
}
