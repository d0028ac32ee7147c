// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use serde_json::json;
use std::collections::{BTreeMap, BTreeSet};

use super::RequestAdapter;
use crate::domain::agent::{AgentActionRequest, AgentActionResponse, ToolOutput, STATUS_SUCCESS};
use crate::domain::error::GatewayError;
use crate::domain::security_event::{
    Actor, ContextValue, EventContext, EventOperation, EventResource, EventSource, SecurityEvent,
};

pub struct AgentAdapter {
    source: EventSource,
    allowed_tools: BTreeSet<String>,
}

impl AgentAdapter {
    pub fn new<I, S>(source: EventSource, allowed_tools: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            source,
            allowed_tools: allowed_tools.into_iter().map(Into::into).collect(),
        }
    }

    pub fn is_allowed(&self, tool: &str) -> bool {
        self.allowed_tools.contains(tool)
    }
}

impl RequestAdapter for AgentAdapter {
    type Request = AgentActionRequest;
    type Response = AgentActionResponse;
    type Raw = ToolOutput;

    fn capability(&self) -> &'static str {
        "tool"
    }

    fn precheck(&self, request: &AgentActionRequest) -> Result<(), GatewayError> {
        if !self.is_allowed(&request.tool) {
            return Err(GatewayError::denied(format!(
                "Tool '{}' is not allowed",
                request.tool
            )));
        }
        Ok(())
    }

    fn to_event(&self, request: &AgentActionRequest, actor: &Actor) -> SecurityEvent {
        let input = request.input_or_empty();
        let input_keys: Vec<&String> = input.keys().collect();

        let operation = EventOperation::new("execute", "agent_gateway")
            .with_attribute("category", "tool_call");
        let resource = EventResource::new("tool", request.tool.as_str())
            .with_attribute("input_keys", json!(input_keys));

        let payload: BTreeMap<String, ContextValue> = input
            .iter()
            .map(|(k, v)| (k.clone(), ContextValue::from(v.as_str())))
            .collect();
        let mut context = EventContext::new();
        context.insert("input", payload).tag("capability", "tool");

        SecurityEvent::builder(&self.source, operation, resource)
            .actor(actor)
            .context(context)
            .build()
    }

    fn from_backend_result(
        &self,
        raw: &ToolOutput,
        request: &AgentActionRequest,
    ) -> Result<AgentActionResponse, GatewayError> {
        Ok(AgentActionResponse {
            tool: request.tool.clone(),
            output: raw.clone(),
            status: STATUS_SUCCESS.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn adapter() -> AgentAdapter {
        AgentAdapter::new(EventSource::new("ASB Secure Gateway", None), ["ping", "whoami"])
    }

    #[test]
    fn test_allow_list_precheck() {
        let a = adapter();
        assert!(a.precheck(&AgentActionRequest::new("ping")).is_ok());

        let err = a
            .precheck(&AgentActionRequest::new("delete_everything"))
            .unwrap_err();
        assert_eq!(err, GatewayError::denied("Tool 'delete_everything' is not allowed"));
    }

    #[test]
    fn test_event_carries_input_payload() {
        let mut req = AgentActionRequest::new("ping");
        req.input = Some(BTreeMap::from([
            ("host".to_string(), "db-1".to_string()),
            ("count".to_string(), "3".to_string()),
        ]));
        let event = adapter().to_event(&req, &Actor::user("ops"));

        assert_eq!(event.operation().action, "execute");
        assert_eq!(event.operation().component, "agent_gateway");
        assert_eq!(event.resource().kind, "tool");
        assert_eq!(event.resource().name, "ping");
        assert_eq!(event.resource().attributes["input_keys"], json!(["count", "host"]));

        let wire = serde_json::to_value(&event).unwrap();
        assert_eq!(wire["context"]["metadata"]["input"]["host"], "db-1");
        assert_eq!(wire["context"]["tags"]["capability"], "tool");
    }

    #[test]
    fn test_missing_input_is_empty_map() {
        let event = adapter().to_event(&AgentActionRequest::new("whoami"), &Actor::anonymous());
        let wire = serde_json::to_value(&event).unwrap();
        assert_eq!(wire["context"]["metadata"]["input"], json!({}));
    }

    #[test]
    fn test_response_mapping() {
        let output = ToolOutput::from([("message".to_string(), "pong".to_string())]);
        let response = adapter()
            .from_backend_result(&output, &AgentActionRequest::new("ping"))
            .unwrap();
        assert_eq!(response.tool, "ping");
        assert_eq!(response.output["message"], "pong");
        assert_eq!(response.status, "success");
    }
}
