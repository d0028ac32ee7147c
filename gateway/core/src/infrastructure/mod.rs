// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

pub mod context;
pub mod lazy;
pub mod llm;
pub mod opa_client;
pub mod tools;
pub mod vector_store;

pub use context::GatewayContext;
pub use opa_client::OpaClient;
