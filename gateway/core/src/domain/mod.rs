// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Domain Layer
//!
//! Pure data and contracts: the canonical security event, policy decisions,
//! per-capability request/response pairs, backend connector interfaces, the
//! error taxonomy and the gateway configuration schema. Nothing in this layer
//! performs I/O.

pub mod agent;
pub mod backend;
pub mod chat;
pub mod decision;
pub mod error;
pub mod gateway_config;
pub mod search;
pub mod security_event;
