// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Policy Decisions
//!
//! Result of evaluating one [`SecurityEvent`] and the contract a decision point
//! implementation must satisfy. Parsing is fail-closed: anything that is not an
//! explicit `true` resolves to `allow = false`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use super::security_event::SecurityEvent;

/// Reason attached when the decision point answered without a usable result.
pub const NO_DECISION_REASON: &str = "Policy returned no decision";

#[derive(Debug, Clone, PartialEq)]
pub struct PolicyDecision {
    /// The only field mediation branches on.
    pub allow: bool,
    pub reason: Option<String>,
    /// Unmodified `result` payload, kept for diagnostics.
    pub raw: Value,
}

impl PolicyDecision {
    pub fn allow() -> Self {
        Self {
            allow: true,
            reason: None,
            raw: Value::Bool(true),
        }
    }

    pub fn deny(reason: Option<String>) -> Self {
        let raw = match &reason {
            Some(r) => serde_json::json!({ "allow": false, "reason": r }),
            None => Value::Bool(false),
        };
        Self {
            allow: false,
            reason,
            raw,
        }
    }

    /// Interpret the `result` member of a decision-point response.
    ///
    /// - bare boolean: taken as `allow`
    /// - object: `allow` must be a boolean `true` to allow; `reason` is kept
    ///   when it is a string
    /// - absent, `null` or any other shape: deny with [`NO_DECISION_REASON`]
    pub fn from_result(result: Option<&Value>) -> Self {
        match result {
            Some(Value::Bool(allow)) => Self {
                allow: *allow,
                reason: None,
                raw: Value::Bool(*allow),
            },
            Some(Value::Object(map)) => {
                let allow = matches!(map.get("allow"), Some(Value::Bool(true)));
                let reason = map
                    .get("reason")
                    .and_then(Value::as_str)
                    .map(str::to_string);
                Self {
                    allow,
                    reason,
                    raw: Value::Object(map.clone()),
                }
            }
            other => Self {
                allow: false,
                reason: Some(NO_DECISION_REASON.to_string()),
                raw: other.cloned().unwrap_or(Value::Null),
            },
        }
    }

    /// Interpret a full response body (`{"result": ...}`).
    pub fn from_response_body(body: &Value) -> Self {
        Self::from_result(body.get("result"))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PolicyPathError {
    #[error("policy path cannot be empty")]
    Empty,
    #[error("policy path '{0}' contains an empty segment")]
    EmptySegment(String),
    #[error("policy path '{0}' contains invalid characters")]
    InvalidCharacters(String),
}

/// Slash-segmented identifier of a policy rule under `/v1/data/`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PolicyPath(String);

impl PolicyPath {
    pub fn new(path: impl AsRef<str>) -> Result<Self, PolicyPathError> {
        let trimmed = path.as_ref().trim().trim_matches('/');
        if trimmed.is_empty() {
            return Err(PolicyPathError::Empty);
        }
        if trimmed.split('/').any(str::is_empty) {
            return Err(PolicyPathError::EmptySegment(trimmed.to_string()));
        }
        let valid = trimmed
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '/' | '_' | '-' | '.'));
        if !valid {
            return Err(PolicyPathError::InvalidCharacters(trimmed.to_string()));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Built-in paths that are known to be well formed.
    pub(crate) fn from_static(path: &'static str) -> Self {
        Self(path.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PolicyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for PolicyPath {
    type Err = PolicyPathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for PolicyPath {
    type Error = PolicyPathError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<PolicyPath> for String {
    fn from(value: PolicyPath) -> Self {
        value.0
    }
}

/// The decision point could not produce a verdict. Never a denial.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecisionError {
    #[error("decision point timed out")]
    Timeout,

    #[error("decision point unreachable: {0}")]
    Transport(String),

    #[error("decision point returned HTTP {0}")]
    Status(u16),

    #[error("decision point returned an unreadable body: {0}")]
    InvalidBody(String),

    #[error("decision client has been shut down")]
    Closed,
}

/// External policy decision point.
#[async_trait]
pub trait PolicyDecisionPoint: Send + Sync {
    /// Submit one event to one policy path. Implementations perform a single
    /// call and never retry.
    async fn evaluate(
        &self,
        path: &PolicyPath,
        event: &SecurityEvent,
    ) -> Result<PolicyDecision, DecisionError>;

    /// Release transport resources. Called once at process shutdown.
    async fn close(&self) {}
}
