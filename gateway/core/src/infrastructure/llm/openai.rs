// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// OpenAI Chat Connector
//
// Anti-Corruption Layer for the OpenAI chat completions API.
// Also works with OpenAI-compatible APIs (LM Studio, vLLM, etc.)

use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;

use crate::domain::backend::{BackendConnector, BackendError};
use crate::domain::chat::{ChatCompletionRequest, RawChatCompletion};

/// Upper bound on how much of an upstream error body is kept in messages.
const MAX_ERROR_BODY: usize = 512;

pub struct OpenAiChatConnector {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl OpenAiChatConnector {
    pub fn new(
        base_url: &str,
        api_key: String,
        connect_timeout: Duration,
        request_timeout: Duration,
    ) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(connect_timeout)
            .timeout(request_timeout)
            .build()?;
        Ok(Self {
            client,
            endpoint: completions_url(base_url),
            api_key,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

/// `<base>/v1/chat/completions`, tolerating bases that already end in `/v1`.
fn completions_url(base_url: &str) -> String {
    let base = base_url.trim_end_matches('/');
    if base.ends_with("/v1") {
        format!("{base}/chat/completions")
    } else {
        format!("{base}/v1/chat/completions")
    }
}

fn truncate_body(mut body: String) -> String {
    if body.len() > MAX_ERROR_BODY {
        let mut end = MAX_ERROR_BODY;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        body.truncate(end);
    }
    body
}

fn transport_error(err: reqwest::Error) -> BackendError {
    if err.is_timeout() {
        BackendError::Timeout
    } else {
        BackendError::Unreachable(err.to_string())
    }
}

#[async_trait]
impl BackendConnector<ChatCompletionRequest> for OpenAiChatConnector {
    type Output = RawChatCompletion;

    fn name(&self) -> &str {
        "openai"
    }

    async fn invoke(
        &self,
        request: &ChatCompletionRequest,
    ) -> Result<RawChatCompletion, BackendError> {
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let message = truncate_body(response.text().await.unwrap_or_default());
            tracing::warn!(
                status = status.as_u16(),
                body = %message,
                "Upstream chat completion failed"
            );
            return Err(BackendError::Rejected {
                status: status.as_u16(),
                message: if message.is_empty() {
                    "Upstream model error".to_string()
                } else {
                    message
                },
            });
        }

        let bytes = response.bytes().await.map_err(transport_error)?;
        let payload: Value = serde_json::from_slice(&bytes).map_err(|e| {
            BackendError::InvalidResponse(format!("Failed to parse response: {}", e))
        })?;

        Ok(RawChatCompletion {
            payload,
            received_at: chrono::Utc::now().timestamp(),
        })
    }
}
