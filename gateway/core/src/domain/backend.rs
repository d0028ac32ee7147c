// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Backend Connectors (Anti-Corruption Layer)
//!
//! Domain interface for the systems that perform the requested work once a
//! request is allowed: the chat-completion API, the vector store and the local
//! tool executors. Implementations live in `crate::infrastructure`.
//!
//! A connector receives the original domain request, never the security event,
//! and returns its raw result for the capability adapter to map.

use async_trait::async_trait;
use thiserror::Error;

use super::agent::{AgentActionRequest, ToolOutput};
use super::chat::{ChatCompletionRequest, RawChatCompletion};
use super::search::{RawSearchRecord, SearchRequest};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackendError {
    /// Reachable, but answered with a structured failure status.
    #[error("upstream rejected the call with HTTP {status}: {message}")]
    Rejected { status: u16, message: String },

    #[error("upstream unreachable: {0}")]
    Unreachable(String),

    #[error("upstream timed out")]
    Timeout,

    #[error("upstream returned an invalid payload: {0}")]
    InvalidResponse(String),
}

#[async_trait]
pub trait BackendConnector<Req>: Send + Sync
where
    Req: Send + Sync + 'static,
{
    type Output: Send;

    /// Short identifier used in logs (e.g. "openai", "pgvector", "demo").
    fn name(&self) -> &str;

    async fn invoke(&self, request: &Req) -> Result<Self::Output, BackendError>;

    /// Release pooled resources. Called once at process shutdown.
    async fn close(&self) {}
}

pub type ChatConnector = dyn BackendConnector<ChatCompletionRequest, Output = RawChatCompletion>;
pub type SearchConnector = dyn BackendConnector<SearchRequest, Output = Vec<RawSearchRecord>>;
pub type ToolConnector = dyn BackendConnector<AgentActionRequest, Output = ToolOutput>;
