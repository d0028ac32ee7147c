// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Mediation
//!
//! The allow/deny control flow every capability runs through:
//!
//! ```text
//! PRECHECK → BUILD_EVENT → EVALUATE → ALLOWED → INVOKE_BACKEND → MAP_RESPONSE → DONE
//!                                   → DENIED      → PolicyDenied
//!                                   → UNAVAILABLE → PolicyUnavailable
//!                   INVOKE_BACKEND  → FAILED      → UpstreamError / UpstreamUnavailable
//! ```
//!
//! The backend is invoked only after an explicit `allow = true`. Evaluation
//! and invocation are sequential awaits on the request's own task, so dropping
//! the request future cancels whichever call is in flight.

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, info, warn};

use super::adapters::RequestAdapter;
use crate::domain::backend::BackendConnector;
use crate::domain::decision::{PolicyDecisionPoint, PolicyPath};
use crate::domain::error::GatewayError;
use crate::domain::security_event::Actor;

pub const POLICY_DECISIONS_METRIC: &str = "asb_policy_decisions_total";
pub const MEDIATION_FAILURES_METRIC: &str = "asb_mediation_failures_total";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Precheck,
    BuildEvent,
    Evaluate,
    InvokeBackend,
    MapResponse,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Precheck => "precheck",
            Stage::BuildEvent => "build_event",
            Stage::Evaluate => "evaluate",
            Stage::InvokeBackend => "invoke_backend",
            Stage::MapResponse => "map_response",
        };
        f.write_str(name)
    }
}

pub struct Mediator {
    pdp: Arc<dyn PolicyDecisionPoint>,
    request_deadline: Option<Duration>,
}

impl Mediator {
    pub fn new(pdp: Arc<dyn PolicyDecisionPoint>) -> Self {
        Self {
            pdp,
            request_deadline: None,
        }
    }

    /// Bound each request (decision + backend) by an overall budget.
    pub fn with_request_deadline(mut self, deadline: Option<Duration>) -> Self {
        self.request_deadline = deadline;
        self
    }

    /// Run one request through the policy gate.
    ///
    /// `backend` is `None` when the capability has no connector configured; that
    /// is reported as [`GatewayError::Misconfigured`] after the adapter's
    /// precheck and before any event is built.
    pub async fn mediate<A, C>(
        &self,
        adapter: &A,
        policy: &PolicyPath,
        request: &A::Request,
        actor: &Actor,
        backend: Option<&C>,
    ) -> Result<A::Response, GatewayError>
    where
        A: RequestAdapter,
        C: BackendConnector<A::Request, Output = A::Raw> + ?Sized,
    {
        let capability = adapter.capability();
        let result = self.run(adapter, policy, request, actor, backend).await;
        if let Err(err) = &result {
            metrics::counter!(
                MEDIATION_FAILURES_METRIC,
                "capability" => capability,
                "kind" => err.kind()
            )
            .increment(1);
        }
        result
    }

    async fn run<A, C>(
        &self,
        adapter: &A,
        policy: &PolicyPath,
        request: &A::Request,
        actor: &Actor,
        backend: Option<&C>,
    ) -> Result<A::Response, GatewayError>
    where
        A: RequestAdapter,
        C: BackendConnector<A::Request, Output = A::Raw> + ?Sized,
    {
        let capability = adapter.capability();
        let deadline = self.request_deadline.map(|d| Instant::now() + d);

        debug!(capability, stage = %Stage::Precheck, "Mediation stage");
        if let Err(err) = adapter.precheck(request) {
            if let GatewayError::PolicyDenied { reason } = &err {
                info!(capability, reason = ?reason, "Request rejected by precheck");
                record_decision(capability, "precheck_denied");
            }
            return Err(err);
        }

        let Some(backend) = backend else {
            warn!(capability, "No backend connector configured");
            return Err(GatewayError::Misconfigured(format!(
                "No backend connector is configured for {capability} requests"
            )));
        };

        debug!(capability, stage = %Stage::BuildEvent, "Mediation stage");
        let event = adapter.to_event(request, actor);
        let event_id = event.event_id();

        debug!(
            capability,
            %event_id,
            stage = %Stage::Evaluate,
            policy = %policy,
            "Mediation stage"
        );
        let decision = match within(deadline, self.pdp.evaluate(policy, &event)).await {
            Some(Ok(decision)) => decision,
            Some(Err(err)) => {
                warn!(capability, %event_id, error = %err, "Policy evaluation failed");
                record_decision(capability, "unavailable");
                return Err(err.into());
            }
            None => {
                warn!(capability, %event_id, "Request deadline elapsed during policy evaluation");
                record_decision(capability, "unavailable");
                return Err(GatewayError::PolicyUnavailable(
                    "request deadline elapsed".to_string(),
                ));
            }
        };

        if !decision.allow {
            info!(capability, %event_id, reason = ?decision.reason, "Request denied by policy");
            record_decision(capability, "deny");
            return Err(GatewayError::PolicyDenied {
                reason: decision.reason,
            });
        }
        info!(capability, %event_id, backend = backend.name(), "Request allowed by policy");
        record_decision(capability, "allow");

        debug!(capability, %event_id, stage = %Stage::InvokeBackend, "Mediation stage");
        let raw = match within(deadline, backend.invoke(request)).await {
            Some(Ok(raw)) => raw,
            Some(Err(err)) => {
                warn!(
                    capability,
                    %event_id,
                    backend = backend.name(),
                    error = %err,
                    "Backend call failed"
                );
                return Err(err.into());
            }
            None => {
                warn!(
                    capability,
                    %event_id,
                    backend = backend.name(),
                    "Request deadline elapsed during backend call"
                );
                return Err(GatewayError::UpstreamUnavailable(
                    "request deadline elapsed".to_string(),
                ));
            }
        };

        debug!(capability, %event_id, stage = %Stage::MapResponse, "Mediation stage");
        adapter.from_backend_result(&raw, request)
    }
}

fn record_decision(capability: &'static str, outcome: &'static str) {
    metrics::counter!(
        POLICY_DECISIONS_METRIC,
        "capability" => capability,
        "outcome" => outcome
    )
    .increment(1);
}

/// `None` when the deadline elapsed first.
async fn within<F: Future>(deadline: Option<Instant>, fut: F) -> Option<F::Output> {
    match deadline {
        Some(at) => tokio::time::timeout_at(at, fut).await.ok(),
        None => Some(fut.await),
    }
}
