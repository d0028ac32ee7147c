// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use async_trait::async_trait;
use serde_json::json;

use crate::domain::backend::{BackendConnector, BackendError};
use crate::domain::chat::{ChatCompletionRequest, MessageRole, RawChatCompletion};

/// Canned-response chat backend, selected with `upstream.chat.mode: demo`.
#[derive(Debug, Default)]
pub struct DemoChatConnector;

#[async_trait]
impl BackendConnector<ChatCompletionRequest> for DemoChatConnector {
    type Output = RawChatCompletion;

    fn name(&self) -> &str {
        "demo"
    }

    async fn invoke(
        &self,
        request: &ChatCompletionRequest,
    ) -> Result<RawChatCompletion, BackendError> {
        let last_user = request
            .messages
            .iter()
            .rev()
            .find(|m| m.role == MessageRole::User)
            .map(|m| m.content.as_str())
            .unwrap_or_default();
        let reply = format!(
            "[demo] Policy allowed this request. Echoing {} characters of input.",
            last_user.chars().count()
        );

        Ok(RawChatCompletion {
            payload: json!({
                "object": "chat.completion",
                "model": request.model,
                "choices": [
                    {"index": 0, "message": {"role": "assistant", "content": reply}}
                ],
                "usage": {"prompt_tokens": 0, "completion_tokens": 0, "total_tokens": 0}
            }),
            received_at: chrono::Utc::now().timestamp(),
        })
    }
}
