// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Tool action request/response pair.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub type ToolInput = BTreeMap<String, String>;
pub type ToolOutput = BTreeMap<String, String>;

pub const STATUS_SUCCESS: &str = "success";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentActionRequest {
    pub tool: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input: Option<ToolInput>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
}

impl AgentActionRequest {
    pub fn new(tool: impl Into<String>) -> Self {
        Self {
            tool: tool.into(),
            input: None,
            user: None,
        }
    }

    pub fn input_or_empty(&self) -> ToolInput {
        self.input.clone().unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentActionResponse {
    pub tool: String,
    pub output: ToolOutput,
    pub status: String,
}
