// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use std::sync::Arc;

use super::adapters::AgentAdapter;
use super::mediation::Mediator;
use crate::domain::agent::{AgentActionRequest, AgentActionResponse};
use crate::domain::backend::ToolConnector;
use crate::domain::decision::PolicyPath;
use crate::domain::error::GatewayError;
use crate::domain::security_event::Actor;

/// Policy-gated tool execution.
pub struct AgentService {
    adapter: AgentAdapter,
    mediator: Arc<Mediator>,
    policy: PolicyPath,
    tools: Arc<ToolConnector>,
}

impl AgentService {
    pub fn new(
        adapter: AgentAdapter,
        mediator: Arc<Mediator>,
        policy: PolicyPath,
        tools: Arc<ToolConnector>,
    ) -> Self {
        Self {
            adapter,
            mediator,
            policy,
            tools,
        }
    }

    pub async fn execute(
        &self,
        request: AgentActionRequest,
        actor: Actor,
    ) -> Result<AgentActionResponse, GatewayError> {
        let actor = actor.with_user_override(request.user.as_deref());
        self.mediator
            .mediate(
                &self.adapter,
                &self.policy,
                &request,
                &actor,
                Some(self.tools.as_ref()),
            )
            .await
    }
}
