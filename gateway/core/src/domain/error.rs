// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Gateway Error Taxonomy
//!
//! Every variant is a terminal outcome for its request. Callers branch on the
//! variant; nothing in the core retries.

use thiserror::Error;

use super::backend::BackendError;
use super::decision::DecisionError;

pub const DEFAULT_DENIAL_MESSAGE: &str = "Request blocked by policy";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    /// Explicit `allow = false`, or a precheck that short-circuited.
    #[error("{}", .reason.as_deref().unwrap_or(DEFAULT_DENIAL_MESSAGE))]
    PolicyDenied { reason: Option<String> },

    /// Decision point unreachable, timed out or answered with a non-2xx status.
    #[error("Policy evaluation failed: {0}")]
    PolicyUnavailable(String),

    #[error("Gateway misconfigured: {0}")]
    Misconfigured(String),

    #[error("{0}")]
    UnsupportedRequest(String),

    #[error("Upstream error (HTTP {status}): {message}")]
    UpstreamError { status: u16, message: String },

    #[error("Failed to reach upstream: {0}")]
    UpstreamUnavailable(String),
}

impl GatewayError {
    pub fn denied(reason: impl Into<String>) -> Self {
        GatewayError::PolicyDenied {
            reason: Some(reason.into()),
        }
    }

    /// Stable machine-readable identifier, used in metrics labels and error bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            GatewayError::PolicyDenied { .. } => "policy_denied",
            GatewayError::PolicyUnavailable(_) => "policy_unavailable",
            GatewayError::Misconfigured(_) => "misconfigured",
            GatewayError::UnsupportedRequest(_) => "unsupported_request",
            GatewayError::UpstreamError { .. } => "upstream_error",
            GatewayError::UpstreamUnavailable(_) => "upstream_unavailable",
        }
    }

    /// Caller-side failures (denials and refused request shapes).
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            GatewayError::PolicyDenied { .. } | GatewayError::UnsupportedRequest(_)
        )
    }
}

impl From<DecisionError> for GatewayError {
    fn from(err: DecisionError) -> Self {
        GatewayError::PolicyUnavailable(err.to_string())
    }
}

impl From<BackendError> for GatewayError {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::Rejected { status, message } => {
                GatewayError::UpstreamError { status, message }
            }
            BackendError::InvalidResponse(message) => GatewayError::UpstreamError {
                status: 502,
                message,
            },
            BackendError::Unreachable(message) => GatewayError::UpstreamUnavailable(message),
            BackendError::Timeout => {
                GatewayError::UpstreamUnavailable("upstream timed out".to_string())
            }
        }
    }
}
