//! Marketing copy generation.

use async_trait::async_trait;
use lemouniq_core::{CopyConfig, DescriptionPair, PipelineError, PipelineResult};
use serde::Deserialize;
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;

use crate::http::{ensure_success, missing_key, transport_error};

const SERVICE: &str = "text generation";
const META_DESCRIPTION_MAX_CHARS: usize = 150;

const META_SYSTEM_PROMPT: &str =
    "You are a highly-skilled SEO marketer who is focused on amazing meta descriptions.";
const PRODUCT_SYSTEM_PROMPT: &str =
    "You are a highly-skilled SEO marketer who is focused on amazing SEO descriptions.";

fn meta_prompt(keyword: &str) -> String {
    format!(
        "Write a general meta description for a keyword '{}' for a downloadable digital print. \
         No longer than {} characters.",
        keyword, META_DESCRIPTION_MAX_CHARS
    )
}

fn product_prompt(keyword: &str) -> String {
    format!(
        "Write a lengthy description for a keyword '{}' for a downloadable digital print created by AI. \
         It should be a minimum of 400 words. Do not overuse the keyword, but use it enough times. \
         The print will have 300dpi with the shorter edge of maximum 20 inches. \
         Do not mention dimensions otherwise as some prints might be square or rectangular \
         and I'm using this description for all of them. Use a natural, human-like writing style.",
        keyword
    )
}

/// Single-turn text completion.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn complete(&self, system: &str, user: &str) -> PipelineResult<String>;
}

/// OpenAI-compatible chat completions client.
pub struct OpenAiChatClient {
    http: reqwest::Client,
    config: CopyConfig,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Message,
}

#[derive(Debug, Deserialize)]
struct Message {
    content: Option<String>,
}

impl OpenAiChatClient {
    pub fn new(http: reqwest::Client, config: CopyConfig) -> Self {
        Self { http, config }
    }
}

#[async_trait]
impl TextGenerator for OpenAiChatClient {
    async fn complete(&self, system: &str, user: &str) -> PipelineResult<String> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or_else(|| missing_key(SERVICE, "OPENAI_API_KEY"))?;

        let url = format!(
            "{}/chat/completions",
            self.config.base_url.trim_end_matches('/')
        );
        let request_body = json!({
            "model": self.config.model,
            "messages": [
                {"role": "system", "content": system},
                {"role": "user", "content": user}
            ]
        });

        tracing::debug!(model = %self.config.model, "Sending chat completion request");

        let response = self
            .http
            .post(&url)
            .header("Authorization", format!("Bearer {}", api_key))
            .json(&request_body)
            .send()
            .await
            .map_err(transport_error(SERVICE))?;

        let chat_response: ChatCompletionResponse = ensure_success(SERVICE, response)
            .await?
            .json()
            .await
            .map_err(|e| {
                PipelineError::unavailable(SERVICE, format!("unexpected response: {}", e))
            })?;

        chat_response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| PipelineError::unavailable(SERVICE, "empty completion"))
    }
}

/// Generates and stores the description pair for a print.
pub struct CopyWriter {
    generator: Arc<dyn TextGenerator>,
    output_dir: PathBuf,
}

impl CopyWriter {
    pub fn new(generator: Arc<dyn TextGenerator>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            generator,
            output_dir: output_dir.into(),
        }
    }

    /// Where the description file for `keyword` is written.
    pub fn output_path(&self, keyword: &str) -> PathBuf {
        self.output_dir.join(format!("{}.txt", keyword))
    }

    pub async fn generate(&self, keyword: &str) -> PipelineResult<DescriptionPair> {
        let meta_description = self
            .generator
            .complete(META_SYSTEM_PROMPT, &meta_prompt(keyword))
            .await?;
        if meta_description.chars().count() > META_DESCRIPTION_MAX_CHARS {
            tracing::warn!(
                keyword = %keyword,
                length = meta_description.chars().count(),
                "Meta description longer than requested"
            );
        }

        let product_description = self
            .generator
            .complete(PRODUCT_SYSTEM_PROMPT, &product_prompt(keyword))
            .await?;

        Ok(DescriptionPair {
            keyword: keyword.to_string(),
            meta_description,
            product_description,
        })
    }

    /// Generate the copy for `keyword` and write it to its text file.
    pub async fn write(&self, keyword: &str) -> PipelineResult<(DescriptionPair, PathBuf)> {
        let pair = self.generate(keyword).await?;
        let path = self.output_path(keyword);
        tokio::fs::create_dir_all(&self.output_dir).await?;
        tokio::fs::write(&path, pair.render()).await?;

        tracing::info!(keyword = %keyword, path = %path.display(), "Descriptions written");
        Ok((pair, path))
    }
}
