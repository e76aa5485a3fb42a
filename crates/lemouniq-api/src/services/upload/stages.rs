//! Enrichment stages the pipeline calls through trait objects.

use async_trait::async_trait;
use lemouniq_core::{ImageAsset, PipelineResult};
use lemouniq_services::{CopyWriter, MockupGenerator, MockupReport};
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;

/// Mockup rendering for one print.
#[async_trait]
pub trait MockupStage: Send + Sync {
    async fn run(
        &self,
        asset: &ImageAsset,
        cancel: &CancellationToken,
    ) -> PipelineResult<MockupReport>;
}

/// Description writing for one keyword; returns the written file.
#[async_trait]
pub trait CopyStage: Send + Sync {
    async fn run(&self, keyword: &str) -> PipelineResult<PathBuf>;
}

#[async_trait]
impl MockupStage for MockupGenerator {
    async fn run(
        &self,
        asset: &ImageAsset,
        cancel: &CancellationToken,
    ) -> PipelineResult<MockupReport> {
        self.generate(asset, cancel).await
    }
}

#[async_trait]
impl CopyStage for CopyWriter {
    async fn run(&self, keyword: &str) -> PipelineResult<PathBuf> {
        let (_, path) = self.write(keyword).await?;
        Ok(path)
    }
}
