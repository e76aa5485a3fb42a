//! Shared HTTP plumbing for the outbound clients.

use anyhow::{Context, Result};
use lemouniq_core::{PipelineError, PipelineResult};
use std::time::Duration;

/// Build the `reqwest` client shared by all outbound services.
pub fn build_http_client(timeout_secs: u64) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .user_agent(concat!("lemouniq/", env!("CARGO_PKG_VERSION")))
        .build()
        .context("Failed to create HTTP client")
}

/// Turn a transport failure into a pipeline error for `service`.
pub(crate) fn transport_error(service: &'static str) -> impl Fn(reqwest::Error) -> PipelineError {
    move |err| PipelineError::unavailable(service, err.to_string())
}

/// Pass successful responses through; otherwise read the body into the error.
pub(crate) async fn ensure_success(
    service: &'static str,
    response: reqwest::Response,
) -> PipelineResult<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let error_text = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string());
    Err(PipelineError::unavailable(
        service,
        format!("{} - {}", status, error_text),
    ))
}

/// Error for a service whose API key is not configured.
pub(crate) fn missing_key(service: &'static str, variable: &str) -> PipelineError {
    PipelineError::unavailable(service, format!("{} is not configured", variable))
}
