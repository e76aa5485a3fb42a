//! Public image host used to hand the print to the mockup service by URL.

use async_trait::async_trait;
use base64::Engine;
use lemouniq_core::{ImageHostConfig, PipelineError, PipelineResult};
use serde::Deserialize;
use std::path::Path;

use crate::http::{ensure_success, missing_key, transport_error};

const SERVICE: &str = "image host";

/// Uploads a local image and returns a publicly reachable URL.
#[async_trait]
pub trait ImageHost: Send + Sync {
    async fn publish(&self, path: &Path) -> PipelineResult<String>;
}

/// imgbb-compatible upload client.
pub struct ImgBbClient {
    http: reqwest::Client,
    config: ImageHostConfig,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    data: UploadData,
}

#[derive(Debug, Deserialize)]
struct UploadData {
    url: String,
}

impl ImgBbClient {
    pub fn new(http: reqwest::Client, config: ImageHostConfig) -> Self {
        Self { http, config }
    }
}

#[async_trait]
impl ImageHost for ImgBbClient {
    async fn publish(&self, path: &Path) -> PipelineResult<String> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or_else(|| missing_key(SERVICE, "IMG_BB_TOKEN"))?;

        let data = tokio::fs::read(path).await?;
        let encoded = base64::engine::general_purpose::STANDARD.encode(&data);
        let expiration = self.config.expiration_secs.to_string();

        tracing::debug!(
            path = %path.display(),
            size = data.len(),
            "Uploading image to public host"
        );

        let response = self
            .http
            .post(&self.config.upload_url)
            .form(&[
                ("key", api_key),
                ("image", encoded.as_str()),
                ("expiration", expiration.as_str()),
            ])
            .send()
            .await
            .map_err(transport_error(SERVICE))?;

        let body: UploadResponse = ensure_success(SERVICE, response)
            .await?
            .json()
            .await
            .map_err(|e| {
                PipelineError::unavailable(SERVICE, format!("unexpected response: {}", e))
            })?;

        tracing::info!(path = %path.display(), url = %body.data.url, "Image published");
        Ok(body.data.url)
    }
}
