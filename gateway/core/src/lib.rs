// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # ASB Gateway Core
//!
//! Policy-enforced mediation for chat completion, knowledge search and tool
//! actions. Every request is translated into a [`domain::security_event::SecurityEvent`],
//! submitted to an external decision point, and forwarded to its backend only
//! when the decision allows it.
//!
//! # Architecture
//!
//! - **Layer:** Core System
//! - **Purpose:** Domain model, mediation control flow, connectors and HTTP surface

pub mod domain;
pub mod application;
pub mod infrastructure;
pub mod presentation;

pub use domain::*;
