//! HTTP client for the measurement provider.

use crate::domain::{ProviderClient, ProviderParams, ProviderResult};
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, instrument};

/// Posts provider commands as JSON to `{base_url}/{method}`.
pub struct HttpProviderClient {
    http: Client,
    base_url: String,
}

impl HttpProviderClient {
    /// `timeout` bounds the whole exchange and should exceed the command
    /// timeout sent to the provider.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            http,
            base_url: base_url.into(),
        })
    }

    pub fn endpoint(&self, method: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            method.trim_start_matches('/')
        )
    }
}

#[async_trait]
impl ProviderClient for HttpProviderClient {
    #[instrument(skip(self, params), fields(method = %method, req_id = %params.req_id))]
    async fn send_post(&self, method: &str, params: &ProviderParams) -> Result<ProviderResult> {
        let url = self.endpoint(method);

        let response = self
            .http
            .post(&url)
            .json(params)
            .send()
            .await
            .with_context(|| format!("Failed to reach provider at {}", url))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .with_context(|| format!("Failed to read provider response from {}", url))?;
        debug!(status = status.as_u16(), body_size = body.len(), "provider responded");

        Ok(provider_result(status, &body))
    }
}

/// The status becomes the result code and the body its message, parsed as
/// JSON when possible. Non-200 results carry the status reason.
pub fn provider_result(status: StatusCode, body: &str) -> ProviderResult {
    let message = serde_json::from_str::<Value>(body)
        .unwrap_or_else(|_| Value::String(body.to_string()));
    let result = ProviderResult::new(i64::from(status.as_u16()), message);

    match status {
        StatusCode::OK => result,
        _ => result.with_description(status.canonical_reason().unwrap_or_default()),
    }
}
