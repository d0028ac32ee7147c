// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use std::sync::Arc;

use super::adapters::SearchAdapter;
use super::mediation::Mediator;
use crate::domain::backend::SearchConnector;
use crate::domain::decision::PolicyPath;
use crate::domain::error::GatewayError;
use crate::domain::search::{SearchRequest, SearchResponse};
use crate::domain::security_event::Actor;

/// Policy-gated knowledge search.
pub struct SearchService {
    adapter: SearchAdapter,
    mediator: Arc<Mediator>,
    policy: PolicyPath,
    connector: Option<Arc<SearchConnector>>,
}

impl SearchService {
    pub fn new(
        adapter: SearchAdapter,
        mediator: Arc<Mediator>,
        policy: PolicyPath,
        connector: Option<Arc<SearchConnector>>,
    ) -> Self {
        Self {
            adapter,
            mediator,
            policy,
            connector,
        }
    }

    pub fn connector(&self) -> Option<&Arc<SearchConnector>> {
        self.connector.as_ref()
    }

    /// The connector always receives a request with `top_k` filled in. Out of
    /// range values are left for the precheck to reject.
    pub async fn search(
        &self,
        mut request: SearchRequest,
        actor: Actor,
    ) -> Result<SearchResponse, GatewayError> {
        if let Ok(top_k) = self.adapter.resolve_top_k(&request) {
            request.top_k = Some(top_k);
        }
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
