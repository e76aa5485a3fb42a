//! Printful-compatible mockup generator API.

use async_trait::async_trait;
use lemouniq_core::{MockupConfig, Orientation, PipelineError, PipelineResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

use super::poll::TaskState;
use super::templates::{placement, Placement, ProductTemplate};
use crate::http::{ensure_success, missing_key, transport_error};

const SERVICE: &str = "mockup service";

/// URLs of a finished rendering task: one default mockup plus the extras.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedMockups {
    pub default_url: String,
    pub extra_urls: Vec<String>,
}

/// Remote mockup rendering operations.
#[async_trait]
pub trait MockupRenderer: Send + Sync {
    /// Submit a rendering task and return its key.
    async fn create_task(
        &self,
        template: &ProductTemplate,
        image_url: &str,
        orientation: Orientation,
    ) -> PipelineResult<String>;

    async fn task_status(&self, task_key: &str) -> PipelineResult<TaskState<RenderedMockups>>;

    /// Download one rendered file to `dest`.
    async fn download(&self, url: &str, dest: &Path) -> PipelineResult<()>;
}

#[derive(Debug, Serialize)]
struct CreateTaskRequest<'a> {
    variant_ids: [u32; 1],
    format: &'static str,
    files: [TaskFile<'a>; 1],
    option_groups: &'static [&'static str],
}

#[derive(Debug, Serialize)]
struct TaskFile<'a> {
    placement: &'static str,
    image_url: &'a str,
    position: Placement,
}

#[derive(Debug, Deserialize)]
struct ApiEnvelope<T> {
    result: T,
}

#[derive(Debug, Deserialize)]
struct CreatedTask {
    task_key: String,
}

#[derive(Debug, Deserialize)]
struct TaskStatusBody {
    status: String,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    mockups: Vec<MockupEntry>,
}

#[derive(Debug, Deserialize)]
struct MockupEntry {
    mockup_url: String,
    #[serde(default)]
    extra: Vec<ExtraMockup>,
}

#[derive(Debug, Deserialize)]
struct ExtraMockup {
    url: String,
}

pub struct PrintfulClient {
    http: reqwest::Client,
    config: MockupConfig,
}

impl PrintfulClient {
    pub fn new(http: reqwest::Client, config: MockupConfig) -> Self {
        Self { http, config }
    }

    fn bearer(&self) -> PipelineResult<String> {
        self.config
            .api_key
            .as_deref()
            .map(|key| format!("Bearer {}", key))
            .ok_or_else(|| missing_key(SERVICE, "PRINTFUL_TOKEN"))
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }
}

fn parse_error(err: reqwest::Error) -> PipelineError {
    PipelineError::unavailable(SERVICE, format!("unexpected response: {}", err))
}

fn interpret_status(body: TaskStatusBody) -> TaskState<RenderedMockups> {
    match body.status.as_str() {
        "completed" => match body.mockups.into_iter().next() {
            Some(first) => TaskState::Completed(RenderedMockups {
                default_url: first.mockup_url,
                extra_urls: first.extra.into_iter().map(|e| e.url).collect(),
            }),
            None => TaskState::Failed(Some("completed without mockups".to_string())),
        },
        "failed" => TaskState::Failed(body.error),
        _ => TaskState::Pending,
    }
}

#[async_trait]
impl MockupRenderer for PrintfulClient {
    async fn create_task(
        &self,
        template: &ProductTemplate,
        image_url: &str,
        orientation: Orientation,
    ) -> PipelineResult<String> {
        let auth = self.bearer()?;
        let request = CreateTaskRequest {
            variant_ids: [template.variant_id(orientation)],
            format: "jpg",
            files: [TaskFile {
                placement: "default",
                image_url,
                position: placement(orientation),
            }],
            option_groups: template.option_groups,
        };

        let response = self
            .http
            .post(self.url(&format!(
                "/mockup-generator/create-task/{}",
                template.product_id
            )))
            .header("Authorization", auth)
            .json(&request)
            .send()
            .await
            .map_err(transport_error(SERVICE))?;

        let created: ApiEnvelope<CreatedTask> = ensure_success(SERVICE, response)
            .await?
            .json()
            .await
            .map_err(parse_error)?;

        tracing::info!(
            template = template.name,
            orientation = %orientation,
            task_key = %created.result.task_key,
            "Mockup task created"
        );
        Ok(created.result.task_key)
    }

    async fn task_status(&self, task_key: &str) -> PipelineResult<TaskState<RenderedMockups>> {
        let auth = self.bearer()?;
        let response = self
            .http
            .get(self.url("/mockup-generator/task"))
            .query(&[("task_key", task_key)])
            .header("Authorization", auth)
            .send()
            .await
            .map_err(transport_error(SERVICE))?;

        let body: ApiEnvelope<TaskStatusBody> = ensure_success(SERVICE, response)
            .await?
            .json()
            .await
            .map_err(parse_error)?;

        Ok(interpret_status(body.result))
    }

    async fn download(&self, url: &str, dest: &Path) -> PipelineResult<()> {
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(transport_error(SERVICE))?;
        let bytes = ensure_success(SERVICE, response)
            .await?
            .bytes()
            .await
            .map_err(transport_error(SERVICE))?;

        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(dest, &bytes).await?;

        tracing::debug!(url = %url, path = %dest.display(), size = bytes.len(), "Mockup saved");
        Ok(())
    }
}
