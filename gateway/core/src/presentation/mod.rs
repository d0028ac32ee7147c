// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Presentation Layer (`asb-gateway-core`)
//!
//! HTTP surface that translates external requests into application service
//! calls. No policy logic lives here; every enforcing route delegates to a
//! service on the [`crate::infrastructure::GatewayContext`].
//!
//! | Module | Transport | Description |
//! |--------|-----------|-------------|
//! | [`api`] | HTTP (Axum) | Chat, search and tool endpoints plus a liveness probe |

pub mod api;
