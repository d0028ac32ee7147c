// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Local Tool Executors
//!
//! Named handlers the agent gateway may run once policy allows it. The
//! registry is the tool capability's backend connector. Being registered here
//! does not make a tool callable: it must also be on `agent.allowed_tools`.

use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use std::collections::HashMap;
use std::sync::Arc;

use crate::domain::agent::{AgentActionRequest, ToolInput, ToolOutput};
use crate::domain::backend::{BackendConnector, BackendError};

#[async_trait]
pub trait ToolHandler: Send + Sync {
    fn name(&self) -> &str;

    async fn run(&self, input: &ToolInput) -> Result<ToolOutput, BackendError>;
}

/// Liveness check that reports the gateway clock.
pub struct PingTool;

#[async_trait]
impl ToolHandler for PingTool {
    fn name(&self) -> &str {
        "ping"
    }

    async fn run(&self, _input: &ToolInput) -> Result<ToolOutput, BackendError> {
        Ok(ToolOutput::from([
            ("message".to_string(), "pong".to_string()),
            (
                "gateway_time".to_string(),
                Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            ),
        ]))
    }
}

/// Reports which service answered and which decision point guards it.
pub struct WhoamiTool {
    service: String,
    policy_backend: String,
}

impl WhoamiTool {
    pub fn new(service: impl Into<String>, policy_backend: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            policy_backend: policy_backend.into(),
        }
    }
}

#[async_trait]
impl ToolHandler for WhoamiTool {
    fn name(&self) -> &str {
        "whoami"
    }

    async fn run(&self, _input: &ToolInput) -> Result<ToolOutput, BackendError> {
        Ok(ToolOutput::from([
            ("service".to_string(), self.service.clone()),
            ("policy_backend".to_string(), self.policy_backend.clone()),
        ]))
    }
}

#[derive(Default)]
pub struct ToolRegistry {
    handlers: HashMap<String, Arc<dyn ToolHandler>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with `ping` and `whoami`.
    pub fn with_builtins(service: &str, policy_backend: &str) -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(PingTool));
        registry.register(Arc::new(WhoamiTool::new(service, policy_backend)));
        registry
    }

    pub fn register(&mut self, handler: Arc<dyn ToolHandler>) {
        self.handlers.insert(handler.name().to_string(), handler);
    }

    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

#[async_trait]
impl BackendConnector<AgentActionRequest> for ToolRegistry {
    type Output = ToolOutput;

    fn name(&self) -> &str {
        "tool_registry"
    }

    async fn invoke(&self, request: &AgentActionRequest) -> Result<ToolOutput, BackendError> {
        let handler = self
            .handlers
            .get(&request.tool)
            .ok_or_else(|| BackendError::Rejected {
                status: 501,
                message: format!("Tool '{}' is not implemented", request.tool),
            })?;
        handler.run(&request.input_or_empty()).await
    }
}
