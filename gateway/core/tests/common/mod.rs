// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Recording fakes shared by the integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use serde_json::Value;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use asb_core::domain::agent::{AgentActionRequest, ToolOutput};
use asb_core::domain::backend::{
    BackendConnector, BackendError, ChatConnector, SearchConnector, ToolConnector,
};
use asb_core::domain::chat::{ChatCompletionRequest, RawChatCompletion};
use asb_core::domain::decision::{DecisionError, PolicyDecision, PolicyDecisionPoint, PolicyPath};
use asb_core::domain::gateway_config::GatewayConfig;
use asb_core::domain::search::{RawSearchRecord, SearchRequest};
use asb_core::domain::security_event::SecurityEvent;
use asb_core::infrastructure::tools::ToolRegistry;
use asb_core::infrastructure::GatewayContext;

/// Decision point that answers from a fixed response body and remembers
/// every event it was asked about.
pub struct RecordingPdp {
    answer: Result<Value, DecisionError>,
    delay: Option<Duration>,
    pub events: Mutex<Vec<(String, SecurityEvent)>>,
    pub closed: AtomicUsize,
}

impl RecordingPdp {
    pub fn answering(body: Value) -> Arc<Self> {
        Arc::new(Self {
            answer: Ok(body),
            delay: None,
            events: Mutex::new(Vec::new()),
            closed: AtomicUsize::new(0),
        })
    }

    pub fn failing(err: DecisionError) -> Arc<Self> {
        Arc::new(Self {
            answer: Err(err),
            delay: None,
            events: Mutex::new(Vec::new()),
            closed: AtomicUsize::new(0),
        })
    }

    pub fn slow(body: Value, delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            answer: Ok(body),
            delay: Some(delay),
            events: Mutex::new(Vec::new()),
            closed: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.events.lock().unwrap().len()
    }

    pub fn last_event(&self) -> Option<(String, SecurityEvent)> {
        self.events.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl PolicyDecisionPoint for RecordingPdp {
    async fn evaluate(
        &self,
        path: &PolicyPath,
        event: &SecurityEvent,
    ) -> Result<PolicyDecision, DecisionError> {
        self.events
            .lock()
            .unwrap()
            .push((path.to_string(), event.clone()));
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.answer
            .clone()
            .map(|body| PolicyDecision::from_response_body(&body))
    }

    async fn close(&self) {
        self.closed.fetch_add(1, Ordering::SeqCst);
    }
}

pub struct RecordingChat {
    result: Result<Value, BackendError>,
    delay: Option<Duration>,
    pub calls: AtomicUsize,
}

impl RecordingChat {
    pub fn returning(payload: Value) -> Arc<Self> {
        Arc::new(Self {
            result: Ok(payload),
            delay: None,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn failing(err: BackendError) -> Arc<Self> {
        Arc::new(Self {
            result: Err(err),
            delay: None,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn slow(payload: Value, delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            result: Ok(payload),
            delay: Some(delay),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BackendConnector<ChatCompletionRequest> for RecordingChat {
    type Output = RawChatCompletion;

    fn name(&self) -> &str {
        "recording"
    }

    async fn invoke(
        &self,
        _request: &ChatCompletionRequest,
    ) -> Result<RawChatCompletion, BackendError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.result.clone().map(|payload| RawChatCompletion {
            payload,
            received_at: 1_700_000_000,
        })
    }
}

pub struct RecordingSearch {
    records: Vec<RawSearchRecord>,
    pub calls: AtomicUsize,
    pub last_top_k: Mutex<Option<u32>>,
}

impl RecordingSearch {
    pub fn returning(records: Vec<RawSearchRecord>) -> Arc<Self> {
        Arc::new(Self {
            records,
            calls: AtomicUsize::new(0),
            last_top_k: Mutex::new(None),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BackendConnector<SearchRequest> for RecordingSearch {
    type Output = Vec<RawSearchRecord>;

    fn name(&self) -> &str {
        "recording"
    }

    async fn invoke(&self, request: &SearchRequest) -> Result<Vec<RawSearchRecord>, BackendError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_top_k.lock().unwrap() = request.top_k;
        Ok(self.records.clone())
    }
}

/// Built-in tool registry that counts every invocation reaching it.
pub struct RecordingTools {
    registry: ToolRegistry,
    pub calls: AtomicUsize,
}

impl RecordingTools {
    pub fn builtins(config: &GatewayConfig) -> Arc<Self> {
        Arc::new(Self {
            registry: ToolRegistry::with_builtins(
                &config.spec.service.name,
                &config.spec.policy.url,
            ),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BackendConnector<AgentActionRequest> for RecordingTools {
    type Output = ToolOutput;

    fn name(&self) -> &str {
        "recording"
    }

    async fn invoke(&self, request: &AgentActionRequest) -> Result<ToolOutput, BackendError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.registry.invoke(request).await
    }
}

pub fn record(id: &str, score: f64) -> RawSearchRecord {
    RawSearchRecord {
        id: id.to_string(),
        content: Some(format!("document {id}")),
        score,
        metadata: Some(serde_json::json!({"source": "test"})),
    }
}

pub fn context(
    config: GatewayConfig,
    pdp: Arc<RecordingPdp>,
    chat: Option<Arc<RecordingChat>>,
    search: Option<Arc<RecordingSearch>>,
) -> GatewayContext {
    let tools = RecordingTools::builtins(&config);
    context_with_tools(config, pdp, chat, search, tools)
}

pub fn context_with_tools(
    config: GatewayConfig,
    pdp: Arc<RecordingPdp>,
    chat: Option<Arc<RecordingChat>>,
    search: Option<Arc<RecordingSearch>>,
    tools: Arc<RecordingTools>,
) -> GatewayContext {
    let chat = chat.map(|c| c as Arc<ChatConnector>);
    let search = search.map(|s| s as Arc<SearchConnector>);
    GatewayContext::with_components(config, pdp, chat, search, tools as Arc<ToolConnector>)
}
