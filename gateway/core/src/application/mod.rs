// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

pub mod adapters;
pub mod mediation;

pub mod agent_service;
pub mod chat_service;
pub mod search_service;

pub use agent_service::AgentService;
pub use chat_service::ChatService;
pub use mediation::Mediator;
pub use search_service::SearchService;
