// SPDX-FileCopyrightText: 2026 Maestro Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Thin client over the Messages endpoint.
//!
//! Authentication headers are fixed at construction. A transient status
//! gets exactly one more attempt.

use std::time::Duration;

use maestro_core::MaestroError;
use reqwest::StatusCode;
use reqwest::header::{HeaderMap, HeaderValue};
use tracing::{debug, warn};

use crate::types::{ApiErrorResponse, MessageRequest, MessageResponse};

/// Default Messages endpoint.
pub const MESSAGES_URL: &str = "https://api.anthropic.com/v1/messages";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(300);
const RETRY_DELAY: Duration = Duration::from_secs(1);

/// Client bound to one API key, API version, and model.
#[derive(Debug, Clone)]
pub struct AnthropicClient {
    http: reqwest::Client,
    model: String,
    endpoint: String,
    retries: u32,
}

/// What a single POST produced.
enum Attempt {
    Done(MessageResponse),
    Retryable(MaestroError),
}

impl AnthropicClient {
    /// Builds a client. Fails if the key or version is not a valid header value.
    pub fn new(api_key: String, api_version: String, model: String) -> Result<Self, MaestroError> {
        let mut headers = HeaderMap::new();
        headers.insert("x-api-key", header_value(&api_key, "API key")?);
        headers.insert("anthropic-version", header_value(&api_version, "API version")?);
        headers.insert("content-type", HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| MaestroError::Provider {
                message: format!("could not build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            http,
            model,
            endpoint: MESSAGES_URL.to_string(),
            retries: 1,
        })
    }

    pub fn default_model(&self) -> &str {
        &self.model
    }

    /// Sends requests to `url` instead of [`MESSAGES_URL`].
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.endpoint = url.into();
        self
    }

    /// Posts one Messages request.
    ///
    /// Statuses 429, 500, 503 and 529 are retried once after a one second
    /// pause. Every other failure is returned as-is.
    pub async fn complete_message(
        &self,
        request: &MessageRequest,
    ) -> Result<MessageResponse, MaestroError> {
        let mut attempt = 0;
        loop {
            match self.attempt(request, attempt).await? {
                Attempt::Done(response) => return Ok(response),
                Attempt::Retryable(err) if attempt < self.retries => {
                    warn!(attempt, error = %err, "transient API failure, retrying");
                    attempt += 1;
                    tokio::time::sleep(RETRY_DELAY).await;
                }
                Attempt::Retryable(err) => return Err(err),
            }
        }
    }

    async fn attempt(&self, request: &MessageRequest, attempt: u32) -> Result<Attempt, MaestroError> {
        let response = self
            .http
            .post(&self.endpoint)
            .json(request)
            .send()
            .await
            .map_err(|e| MaestroError::Provider {
                message: format!("request to {} failed: {e}", self.endpoint),
                source: Some(Box::new(e)),
            })?;

        let status = response.status();
        debug!(%status, attempt, "messages endpoint replied");

        let body = response.text().await.map_err(|e| MaestroError::Provider {
            message: format!("could not read response body: {e}"),
            source: Some(Box::new(e)),
        })?;

        if status.is_success() {
            return serde_json::from_str(&body)
                .map(Attempt::Done)
                .map_err(|e| MaestroError::Provider {
                    message: format!("malformed Messages response: {e}"),
                    source: Some(Box::new(e)),
                });
        }

        let err = api_error(status, &body);
        if is_transient(status) {
            Ok(Attempt::Retryable(err))
        } else {
            Err(err)
        }
    }
}

fn header_value(value: &str, what: &str) -> Result<HeaderValue, MaestroError> {
    HeaderValue::from_str(value)
        .map_err(|e| MaestroError::Config(format!("{what} is not a valid header value: {e}")))
}

/// Uses the API's structured error body when there is one.
fn api_error(status: StatusCode, body: &str) -> MaestroError {
    let message = match serde_json::from_str::<ApiErrorResponse>(body) {
        Ok(parsed) => format!(
            "Anthropic API error ({}): {}",
            parsed.error.type_, parsed.error.message
        ),
        Err(_) => format!("API returned {status}: {body}"),
    };
    MaestroError::Provider {
        message,
        source: None,
    }
}

fn is_transient(status: StatusCode) -> bool {
    matches!(status.as_u16(), 429 | 500 | 503 | 529)
}
