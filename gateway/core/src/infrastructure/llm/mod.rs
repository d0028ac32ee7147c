// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

pub mod demo;
pub mod openai;

pub use demo::DemoChatConnector;
pub use openai::OpenAiChatConnector;
