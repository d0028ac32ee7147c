// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// OPA Decision Client
//
// Anti-Corruption Layer for the Open Policy Agent data API:
// POST <base>/v1/data/<policy-path> with {"input": <event>}
// and a {"result": ...} response body.

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info};

use super::lazy::{AcquireError, LazyResource};
use crate::domain::decision::{DecisionError, PolicyDecision, PolicyDecisionPoint, PolicyPath};
use crate::domain::gateway_config::PolicyConfig;
use crate::domain::security_event::SecurityEvent;

#[derive(Serialize)]
struct DecisionRequest<'a> {
    input: &'a SecurityEvent,
}

pub struct OpaClient {
    base_url: String,
    connect_timeout: Duration,
    request_timeout: Duration,
    client: LazyResource<reqwest::Client>,
}

impl OpaClient {
    pub fn new(
        base_url: impl Into<String>,
        connect_timeout: Duration,
        request_timeout: Duration,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            connect_timeout,
            request_timeout,
            client: LazyResource::new(),
        }
    }

    pub fn from_config(config: &PolicyConfig) -> Self {
        Self::new(
            config.url.clone(),
            config.connect_timeout,
            config.request_timeout,
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn decision_url(&self, path: &PolicyPath) -> String {
        format!("{}/v1/data/{}", self.base_url.trim_end_matches('/'), path)
    }

    async fn http(&self) -> Result<reqwest::Client, DecisionError> {
        let (connect_timeout, request_timeout) = (self.connect_timeout, self.request_timeout);
        self.client
            .get_or_try_init(|| async move {
                debug!("Initializing decision point HTTP client");
                reqwest::Client::builder()
                    .connect_timeout(connect_timeout)
                    .timeout(request_timeout)
                    .build()
                    .map_err(|e| DecisionError::Transport(e.to_string()))
            })
            .await
            .map_err(|e| match e {
                AcquireError::Closed => DecisionError::Closed,
                AcquireError::Init(err) => err,
            })
    }

    pub async fn is_closed(&self) -> bool {
        self.client.is_closed().await
    }
}

fn transport_error(err: reqwest::Error) -> DecisionError {
    if err.is_timeout() {
        DecisionError::Timeout
    } else {
        DecisionError::Transport(err.to_string())
    }
}

#[async_trait]
impl PolicyDecisionPoint for OpaClient {
    async fn evaluate(
        &self,
        path: &PolicyPath,
        event: &SecurityEvent,
    ) -> Result<PolicyDecision, DecisionError> {
        let client = self.http().await?;
        let url = self.decision_url(path);

        let response = client
            .post(&url)
            .json(&DecisionRequest { input: event })
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(DecisionError::Status(status.as_u16()));
        }

        let bytes = response.bytes().await.map_err(transport_error)?;
        let body: Value = serde_json::from_slice(&bytes)
            .map_err(|e| DecisionError::InvalidBody(e.to_string()))?;

        let decision = PolicyDecision::from_response_body(&body);
        debug!(
            policy = %path,
            event_id = %event.event_id(),
            allow = decision.allow,
            "Decision point answered"
        );
        Ok(decision)
    }

    /// Release the pooled HTTP client. Later calls are no-ops and later
    /// evaluations fail with [`DecisionError::Closed`].
    async fn close(&self) {
        if self.client.release().await.is_some() {
            info!("Decision point client closed");
        }
    }
}
