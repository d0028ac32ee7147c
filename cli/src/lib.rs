// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! ASB gateway CLI library - exposes testable components
//!
//! # Architecture
//!
//! - **Layer:** Interface / Presentation Layer
//! - **Purpose:** Process bootstrap (logging, metrics, server lifecycle) and
//!   configuration tooling around `asb_core`

pub mod commands;
pub mod telemetry;
