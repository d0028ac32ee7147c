// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use serde_json::{json, Value};
use uuid::Uuid;

use super::RequestAdapter;
use crate::domain::chat::{
    ChatCompletionChoice, ChatCompletionRequest, ChatCompletionResponse, ChatMessage, MessageRole,
    RawChatCompletion, UsageMetrics, DEFAULT_FINISH_REASON,
};
use crate::domain::error::GatewayError;
use crate::domain::security_event::{
    Actor, EventContext, EventOperation, EventResource, EventSource, SecurityEvent,
};

const COMPLETION_OBJECT: &str = "chat.completion";

/// Namespace for identifiers generated when the upstream omits one.
const GENERATED_ID_NAMESPACE: Uuid = Uuid::from_u128(0x6173_622d_6761_7465_7761_792d_6368_6174);

pub struct ChatAdapter {
    source: EventSource,
    provider: String,
    include_message_content: bool,
}

impl ChatAdapter {
    pub fn new(
        source: EventSource,
        provider: impl Into<String>,
        include_message_content: bool,
    ) -> Self {
        Self {
            source,
            provider: provider.into(),
            include_message_content,
        }
    }

    fn generated_id(payload: &Value) -> String {
        let bytes = serde_json::to_vec(payload).unwrap_or_default();
        format!("asb-{}", Uuid::new_v5(&GENERATED_ID_NAMESPACE, &bytes))
    }

    fn map_choice(position: usize, choice: &Value) -> ChatCompletionChoice {
        let index = choice
            .get("index")
            .and_then(Value::as_u64)
            .and_then(|i| u32::try_from(i).ok())
            .unwrap_or(position as u32);
        let message = choice.get("message");
        let role = message
            .and_then(|m| m.get("role"))
            .and_then(Value::as_str)
            .and_then(MessageRole::parse)
            .unwrap_or(MessageRole::Assistant);
        let content = message
            .and_then(|m| m.get("content"))
            .and_then(Value::as_str)
            .unwrap_or_default();
        let finish_reason = choice
            .get("finish_reason")
            .and_then(Value::as_str)
            .unwrap_or(DEFAULT_FINISH_REASON);

        ChatCompletionChoice {
            index,
            message: ChatMessage::new(role, content),
            finish_reason: finish_reason.to_string(),
        }
    }

    fn map_usage(usage: Option<&Value>) -> UsageMetrics {
        let field = |name: &str| {
            usage
                .and_then(|u| u.get(name))
                .and_then(Value::as_u64)
                .unwrap_or(0)
        };
        UsageMetrics {
            prompt_tokens: field("prompt_tokens"),
            completion_tokens: field("completion_tokens"),
            total_tokens: field("total_tokens"),
        }
    }
}

impl RequestAdapter for ChatAdapter {
    type Request = ChatCompletionRequest;
    type Response = ChatCompletionResponse;
    type Raw = RawChatCompletion;

    fn capability(&self) -> &'static str {
        "chat"
    }

    fn precheck(&self, request: &ChatCompletionRequest) -> Result<(), GatewayError> {
        if request.stream {
            return Err(GatewayError::UnsupportedRequest(
                "Streaming responses are not supported by this gateway".to_string(),
            ));
        }
        Ok(())
    }

    fn to_event(&self, request: &ChatCompletionRequest, actor: &Actor) -> SecurityEvent {
        let roles: Vec<&str> = request.messages.iter().map(|m| m.role.as_str()).collect();

        let operation = EventOperation::new("chat_completion", "llm_proxy")
            .with_attribute("category", "llm_completion")
            .with_attribute("direction", "input")
            .with_attribute("stage", "pre")
            .with_attribute(
                "model",
                json!({ "name": request.model, "provider": self.provider, "mode": "chat" }),
            );

        let mut resource = EventResource::new("llm", request.model.as_str())
            .with_attribute("message_roles", json!(roles))
            .with_attribute("message_count", request.messages.len());
        if self.include_message_content {
            resource = resource.with_attribute("messages", json!(request.messages));
        }

        let mut context = EventContext::new();
        context
            .insert("temperature", request.temperature)
            .insert_opt("max_tokens", request.max_tokens)
            .insert("message_count", request.messages.len())
            .tag("capability", "chat");

        SecurityEvent::builder(&self.source, operation, resource)
            .actor(actor)
            .context(context)
            .build()
    }

    fn from_backend_result(
        &self,
        raw: &RawChatCompletion,
        request: &ChatCompletionRequest,
    ) -> Result<ChatCompletionResponse, GatewayError> {
        let payload = raw.payload.as_object().ok_or_else(|| GatewayError::UpstreamError {
            status: 502,
            message: "Upstream returned a non-object chat completion".to_string(),
        })?;

        let id = payload
            .get("id")
            .and_then(Value::as_str)
            .filter(|id| !id.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| Self::generated_id(&raw.payload));

        let choices = payload
            .get("choices")
            .and_then(Value::as_array)
            .map(|choices| {
                choices
                    .iter()
                    .enumerate()
                    .map(|(position, choice)| Self::map_choice(position, choice))
                    .collect()
            })
            .unwrap_or_default();

        Ok(ChatCompletionResponse {
            id,
            object: payload
                .get("object")
                .and_then(Value::as_str)
                .unwrap_or(COMPLETION_OBJECT)
                .to_string(),
            created: payload
                .get("created")
                .and_then(Value::as_i64)
                .unwrap_or(raw.received_at),
            model: payload
                .get("model")
                .and_then(Value::as_str)
                .unwrap_or(&request.model)
                .to_string(),
            choices,
            usage: Self::map_usage(payload.get("usage")),
        })
    }
}
