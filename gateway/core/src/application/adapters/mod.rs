// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Request Adapters
//!
//! One adapter per capability. An adapter turns a domain request into a
//! [`SecurityEvent`] and turns a backend's raw result into the domain
//! response. Adapters hold only configuration: no I/O, no policy evaluation,
//! no state carried between requests.
//!
//! | Adapter | Request | Raw backend result |
//! |---------|---------|--------------------|
//! | [`ChatAdapter`] | `ChatCompletionRequest` | `RawChatCompletion` |
//! | [`SearchAdapter`] | `SearchRequest` | `Vec<RawSearchRecord>` |
//! | [`AgentAdapter`] | `AgentActionRequest` | `ToolOutput` |

pub mod agent;
pub mod chat;
pub mod search;

pub use agent::AgentAdapter;
pub use chat::ChatAdapter;
pub use search::SearchAdapter;

use crate::domain::error::GatewayError;
use crate::domain::security_event::{Actor, SecurityEvent};

pub trait RequestAdapter: Send + Sync {
    type Request: Send + Sync + 'static;
    type Response: Send;
    type Raw: Send;

    /// Label used for log fields and metrics ("chat", "search", "tool").
    fn capability(&self) -> &'static str;

    /// Cheap local checks that may reject a request before any network call.
    fn precheck(&self, _request: &Self::Request) -> Result<(), GatewayError> {
        Ok(())
    }

    fn to_event(&self, request: &Self::Request, actor: &Actor) -> SecurityEvent;

    fn from_backend_result(
        &self,
        raw: &Self::Raw,
        request: &Self::Request,
    ) -> Result<Self::Response, GatewayError>;
}
