// src/transport/http.rs

use reqwest::Client;
use reqwest::header::CONTENT_TYPE;
use std::time::Instant;

use crate::config::ClientConfig;
use crate::errors::{Result, TesterError};
use crate::models::{ExecuteResponse, ExecutionRequest};
use crate::transport::ExecuteTransport;

/// Posts execution requests to `{api_base}/api/execute` over HTTP.
#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
    url: String,
}

impl HttpTransport {
    /// Creates a new `HttpTransport` for the configured service.
    pub fn new(client: Client, config: &ClientConfig) -> Self {
        Self {
            client,
            url: config.execute_url(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl ExecuteTransport for HttpTransport {
    async fn execute(&self, request: &ExecutionRequest) -> Result<ExecuteResponse> {
        log::info!("📡 POST {}", self.url);

        let body = serde_json::to_vec(request)?;
        let start = Instant::now();

        let resp = self
            .client
            .post(&self.url)
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await?;

        let status = resp.status();
        let latency_ms = start.elapsed().as_millis() as u64;

        log::info!("📥 Execute response status: {} ({}ms)", status, latency_ms);

        if !status.is_success() {
            let error_body = resp.text().await.unwrap_or_default();
            return Err(TesterError::ApiError {
                status: status.as_u16(),
                body: error_body,
            });
        }

        let text = resp.text().await?;
        let parsed: ExecuteResponse = serde_json::from_str(&text)?;
        Ok(parsed)
    }
}
