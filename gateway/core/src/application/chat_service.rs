// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use std::sync::Arc;

use super::adapters::ChatAdapter;
use super::mediation::Mediator;
use crate::domain::backend::ChatConnector;
use crate::domain::chat::{ChatCompletionRequest, ChatCompletionResponse};
use crate::domain::decision::PolicyPath;
use crate::domain::error::GatewayError;
use crate::domain::security_event::Actor;

/// Policy-gated chat completions.
pub struct ChatService {
    adapter: ChatAdapter,
    mediator: Arc<Mediator>,
    policy: PolicyPath,
    connector: Option<Arc<ChatConnector>>,
}

impl ChatService {
    pub fn new(
        adapter: ChatAdapter,
        mediator: Arc<Mediator>,
        policy: PolicyPath,
        connector: Option<Arc<ChatConnector>>,
    ) -> Self {
        Self {
            adapter,
            mediator,
            policy,
            connector,
        }
    }

    pub fn connector(&self) -> Option<&Arc<ChatConnector>> {
        self.connector.as_ref()
    }

    pub async fn complete(
        &self,
        request: ChatCompletionRequest,
        actor: Actor,
    ) -> Result<ChatCompletionResponse, GatewayError> {
        let actor = actor.with_user_override(request.user.as_deref());
        self.mediator
            .mediate(
                &self.adapter,
                &self.policy,
                &request,
                &actor,
                self.connector.as_deref(),
            )
            .await
    }
}
