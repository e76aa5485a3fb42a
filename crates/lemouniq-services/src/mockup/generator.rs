//! Mockup generation for one print: publish, submit both templates, poll, download.

use lemouniq_core::{ImageAsset, MockupOutcome, MockupSummary, PipelineError, PipelineResult};
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use super::client::{MockupRenderer, RenderedMockups};
use super::poll::{poll_until_terminal, PollOutcome, PollSettings, TaskState, TaskStatusSource};
use super::templates::{ProductTemplate, TEMPLATES};
use crate::image_host::ImageHost;

/// Per-template results plus the non-fatal errors met along the way.
#[derive(Debug, Default)]
pub struct MockupReport {
    pub summaries: Vec<MockupSummary>,
    pub errors: Vec<PipelineError>,
}

struct RendererStatus<'a> {
    renderer: &'a dyn MockupRenderer,
}

#[async_trait::async_trait]
impl TaskStatusSource for RendererStatus<'_> {
    type Output = RenderedMockups;

    async fn fetch_status(&self, task_key: &str) -> PipelineResult<TaskState<RenderedMockups>> {
        self.renderer.task_status(task_key).await
    }
}

pub struct MockupGenerator {
    host: Arc<dyn ImageHost>,
    renderer: Arc<dyn MockupRenderer>,
    output_dir: PathBuf,
    poll: PollSettings,
}

impl MockupGenerator {
    pub fn new(
        host: Arc<dyn ImageHost>,
        renderer: Arc<dyn MockupRenderer>,
        output_dir: impl Into<PathBuf>,
        poll: PollSettings,
    ) -> Self {
        Self {
            host,
            renderer,
            output_dir: output_dir.into(),
            poll,
        }
    }

    /// Render every template for `asset`.
    ///
    /// Only a failed publish or a shutdown before publishing is returned as `Err`;
    /// everything that goes wrong for a single template is reported in the
    /// [`MockupReport`].
    pub async fn generate(
        &self,
        asset: &ImageAsset,
        cancel: &CancellationToken,
    ) -> PipelineResult<MockupReport> {
        if cancel.is_cancelled() {
            return Err(PipelineError::Cancelled);
        }

        let image_url = self.host.publish(asset.path()).await.map_err(|e| {
            tracing::warn!(
                file = %asset.filename(),
                error = %e,
                "Image host upload failed, skipping mockups"
            );
            e
        })?;

        let mut report = MockupReport::default();
        for template in TEMPLATES.iter() {
            let product_type = template.product_type(asset.stem());
            let (summary, errors) = self
                .render_template(template, &product_type, &image_url, asset, cancel)
                .await;
            report.summaries.push(summary);
            report.errors.extend(errors);
        }

        Ok(report)
    }

    async fn render_template(
        &self,
        template: &ProductTemplate,
        product_type: &str,
        image_url: &str,
        asset: &ImageAsset,
        cancel: &CancellationToken,
    ) -> (MockupSummary, Vec<PipelineError>) {
        let summary = |outcome: MockupOutcome, files: Vec<String>| MockupSummary {
            product_type: product_type.to_string(),
            outcome,
            files,
        };

        // no new remote tasks once shutdown has started
        if cancel.is_cancelled() {
            return (
                summary(MockupOutcome::Cancelled, Vec::new()),
                vec![PipelineError::Cancelled],
            );
        }

        let task_key = match self
            .renderer
            .create_task(template, image_url, asset.orientation())
            .await
        {
            Ok(key) => key,
            Err(e) => {
                tracing::warn!(product_type = %product_type, error = %e, "Mockup task creation failed");
                return (summary(MockupOutcome::Failed, Vec::new()), vec![e]);
            }
        };

        let source = RendererStatus {
            renderer: self.renderer.as_ref(),
        };
        let outcome = match poll_until_terminal(&source, &task_key, self.poll, cancel).await {
            Ok(outcome) => outcome,
            Err(e) => return (summary(MockupOutcome::Failed, Vec::new()), vec![e]),
        };

        match outcome {
            PollOutcome::Completed(rendered) => {
                let (files, errors) = self.save_all(product_type, &rendered).await;
                tracing::info!(
                    product_type = %product_type,
                    saved = files.len(),
                    failed = errors.len(),
                    "Mockups saved"
                );
                (summary(MockupOutcome::Completed, files), errors)
            }
            PollOutcome::Failed(reason) => {
                let reason = reason.unwrap_or_else(|| "no reason given".to_string());
                tracing::warn!(
                    product_type = %product_type,
                    task_key = %task_key,
                    reason = %reason,
                    "Mockup task failed"
                );
                (
                    summary(MockupOutcome::Failed, Vec::new()),
                    vec![PipelineError::TaskFailed { task_key, reason }],
                )
            }
            PollOutcome::TimedOut { attempts } => (
                summary(MockupOutcome::TimedOut, Vec::new()),
                vec![PipelineError::TaskTimedOut { task_key, attempts }],
            ),
            PollOutcome::Cancelled => (
                summary(MockupOutcome::Cancelled, Vec::new()),
                vec![PipelineError::Cancelled],
            ),
        }
    }

    /// Download the default mockup and every extra; a failed download skips that file only.
    async fn save_all(
        &self,
        product_type: &str,
        rendered: &RenderedMockups,
    ) -> (Vec<String>, Vec<PipelineError>) {
        let targets = std::iter::once((
            rendered.default_url.as_str(),
            format!("{}_default_mockup.jpg", product_type),
        ))
        .chain(
            rendered
                .extra_urls
                .iter()
                .enumerate()
                .map(|(i, url)| (url.as_str(), format!("{}_mockup_{}.jpg", product_type, i + 1))),
        );

        let mut files = Vec::new();
        let mut errors = Vec::new();
        for (url, name) in targets {
            let dest = self.output_dir.join(&name);
            match self.renderer.download(url, &dest).await {
                Ok(()) => files.push(dest.to_string_lossy().into_owned()),
                Err(e) => {
                    tracing::warn!(url = %url, file = %name, error = %e, "Mockup download failed");
                    errors.push(e);
                }
            }
        }
        (files, errors)
    }
}
