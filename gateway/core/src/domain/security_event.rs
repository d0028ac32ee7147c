// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Security Event Model
//!
//! Canonical, versioned record submitted to the policy decision point. The
//! shape is independent of the request kind: every capability describes *who*
//! acts ([`EventSubject`]), *what* is attempted ([`EventOperation`]), *on what*
//! ([`EventResource`]) and *with which context* ([`EventContext`]).
//!
//! Events are built once per request through [`SecurityEventBuilder`], are
//! immutable afterwards, and are never persisted by the core.
//!
//! # Architecture
//!
//! - **Layer:** Domain Layer
//! - **Purpose:** Pure data construction, no I/O

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicI64, Ordering};
use uuid::Uuid;

/// Fixed literal identifying the event shape.
pub const EVENT_SCHEMA: &str = "asb.security.event/0.2";

/// Sentinel used whenever no acting identity was supplied.
pub const ANONYMOUS_USER: &str = "anonymous";

pub const DEFAULT_PLATFORM: &str = "api";

static LAST_EVENT_MICROS: AtomicI64 = AtomicI64::new(i64::MIN);

/// Wall-clock timestamp that never goes backwards within the process.
fn next_timestamp() -> DateTime<Utc> {
    let now = Utc::now().timestamp_micros();
    let previous = LAST_EVENT_MICROS.fetch_max(now, Ordering::AcqRel);
    DateTime::from_timestamp_micros(previous.max(now)).unwrap_or_else(Utc::now)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(pub Uuid);

impl EventId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for EventId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Identity claimed by the caller of a request.
///
/// Nothing here is authenticated; the gateway forwards what it was given and
/// leaves the judgement to policy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Actor {
    pub user_id: Option<String>,
    pub token_id: Option<String>,
    pub tenant_id: Option<String>,
    pub platform: Option<String>,
}

impl Actor {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn user(user_id: impl Into<String>) -> Self {
        Self {
            user_id: Some(user_id.into()),
            ..Self::default()
        }
    }

    /// Replace the user id when `user_id` carries a non-blank value.
    pub fn with_user_override(mut self, user_id: Option<&str>) -> Self {
        if let Some(user) = user_id.filter(|u| !u.trim().is_empty()) {
            self.user_id = Some(user.to_string());
        }
        self
    }
}

/// Process-level identity stamped onto every event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventSource {
    pub service_name: String,
    pub environment: Option<String>,
}

impl EventSource {
    pub fn new(service_name: impl Into<String>, environment: Option<String>) -> Self {
        Self {
            service_name: service_name.into(),
            environment,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventSubject {
    pub user_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<String>,
    pub platform: String,
}

impl Default for EventSubject {
    fn default() -> Self {
        Self {
            user_id: ANONYMOUS_USER.to_string(),
            token_id: None,
            tenant_id: None,
            platform: DEFAULT_PLATFORM.to_string(),
        }
    }
}

impl EventSubject {
    /// Missing or blank identities collapse to [`ANONYMOUS_USER`].
    pub fn from_actor(actor: &Actor) -> Self {
        fn present(value: &Option<String>) -> Option<String> {
            value
                .as_deref()
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        }

        Self {
            user_id: present(&actor.user_id).unwrap_or_else(|| ANONYMOUS_USER.to_string()),
            token_id: present(&actor.token_id),
            tenant_id: present(&actor.tenant_id),
            platform: present(&actor.platform).unwrap_or_else(|| DEFAULT_PLATFORM.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventOperation {
    pub action: String,
    pub component: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, serde_json::Value>,
}

impl EventOperation {
    pub fn new(action: impl Into<String>, component: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            component: component.into(),
            attributes: BTreeMap::new(),
        }
    }

    pub fn with_attribute(
        mut self,
        key: impl Into<String>,
        value: impl Into<serde_json::Value>,
    ) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventResource {
    #[serde(rename = "type")]
    pub kind: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, serde_json::Value>,
}

impl EventResource {
    pub fn new(kind: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            name: name.into(),
            attributes: BTreeMap::new(),
        }
    }

    pub fn with_attribute(
        mut self,
        key: impl Into<String>,
        value: impl Into<serde_json::Value>,
    ) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }
}

/// Values admitted into [`EventContext::metadata`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ContextValue {
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
    Map(BTreeMap<String, ContextValue>),
}

impl ContextValue {
    /// Non-finite floats have no JSON representation and would reach the
    /// decision point as `null`.
    pub fn is_transmissible(&self) -> bool {
        match self {
            ContextValue::Float(f) => f.is_finite(),
            ContextValue::Map(map) => map.values().all(ContextValue::is_transmissible),
            _ => true,
        }
    }
}

impl From<bool> for ContextValue {
    fn from(value: bool) -> Self {
        ContextValue::Bool(value)
    }
}

impl From<i64> for ContextValue {
    fn from(value: i64) -> Self {
        ContextValue::Integer(value)
    }
}

impl From<u32> for ContextValue {
    fn from(value: u32) -> Self {
        ContextValue::Integer(i64::from(value))
    }
}

impl From<usize> for ContextValue {
    fn from(value: usize) -> Self {
        ContextValue::Integer(i64::try_from(value).unwrap_or(i64::MAX))
    }
}

impl From<f64> for ContextValue {
    fn from(value: f64) -> Self {
        ContextValue::Float(value)
    }
}

impl From<&str> for ContextValue {
    fn from(value: &str) -> Self {
        ContextValue::String(value.to_string())
    }
}

impl From<String> for ContextValue {
    fn from(value: String) -> Self {
        ContextValue::String(value)
    }
}

impl From<BTreeMap<String, String>> for ContextValue {
    fn from(value: BTreeMap<String, String>) -> Self {
        ContextValue::Map(
            value
                .into_iter()
                .map(|(k, v)| (k, ContextValue::String(v)))
                .collect(),
        )
    }
}

impl From<BTreeMap<String, ContextValue>> for ContextValue {
    fn from(value: BTreeMap<String, ContextValue>) -> Self {
        ContextValue::Map(value)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventContext {
    #[serde(default)]
    pub metadata: BTreeMap<String, ContextValue>,
    #[serde(default)]
    pub tags: BTreeMap<String, String>,
}

impl EventContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a metadata entry. Values that cannot be represented on the wire
    /// are dropped.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<ContextValue>) -> &mut Self {
        let value = value.into();
        if value.is_transmissible() {
            self.metadata.insert(key.into(), value);
        }
        self
    }

    /// Insert only when a value is present; absent values never become `null`.
    pub fn insert_opt<V: Into<ContextValue>>(
        &mut self,
        key: impl Into<String>,
        value: Option<V>,
    ) -> &mut Self {
        if let Some(value) = value {
            self.insert(key, value);
        }
        self
    }

    pub fn tag(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.tags.insert(key.into(), value.into());
        self
    }
}

/// Canonical record submitted to the decision point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SecurityEvent {
    schema_version: String,
    event_id: EventId,
    timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    app_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    env: Option<String>,
    subject: EventSubject,
    operation: EventOperation,
    resource: EventResource,
    #[serde(default)]
    context: EventContext,
}

impl SecurityEvent {
    pub fn builder(
        source: &EventSource,
        operation: EventOperation,
        resource: EventResource,
    ) -> SecurityEventBuilder {
        SecurityEventBuilder {
            app_id: Some(source.service_name.clone()).filter(|s| !s.is_empty()),
            env: source.environment.clone(),
            subject: EventSubject::default(),
            operation,
            resource,
            context: EventContext::default(),
        }
    }

    pub fn schema_version(&self) -> &str {
        &self.schema_version
    }

    pub fn event_id(&self) -> EventId {
        self.event_id
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn app_id(&self) -> Option<&str> {
        self.app_id.as_deref()
    }

    pub fn env(&self) -> Option<&str> {
        self.env.as_deref()
    }

    pub fn subject(&self) -> &EventSubject {
        &self.subject
    }

    pub fn operation(&self) -> &EventOperation {
        &self.operation
    }

    pub fn resource(&self) -> &EventResource {
        &self.resource
    }

    pub fn context(&self) -> &EventContext {
        &self.context
    }

    /// Equality over every field except the per-submission identity
    /// (`event_id`, `timestamp`).
    pub fn content_eq(&self, other: &SecurityEvent) -> bool {
        self.schema_version == other.schema_version
            && self.app_id == other.app_id
            && self.env == other.env
            && self.subject == other.subject
            && self.operation == other.operation
            && self.resource == other.resource
            && self.context == other.context
    }
}

pub struct SecurityEventBuilder {
    app_id: Option<String>,
    env: Option<String>,
    subject: EventSubject,
    operation: EventOperation,
    resource: EventResource,
    context: EventContext,
}

impl SecurityEventBuilder {
    pub fn subject(mut self, subject: EventSubject) -> Self {
        self.subject = subject;
        self
    }

    pub fn actor(self, actor: &Actor) -> Self {
        self.subject(EventSubject::from_actor(actor))
    }

    pub fn context(mut self, context: EventContext) -> Self {
        self.context = context;
        self
    }

    /// Stamp a fresh id and timestamp.
    pub fn build(self) -> SecurityEvent {
        SecurityEvent {
            schema_version: EVENT_SCHEMA.to_string(),
            event_id: EventId::new(),
            timestamp: next_timestamp(),
            app_id: self.app_id,
            env: self.env,
            subject: self.subject,
            operation: self.operation,
            resource: self.resource,
            context: self.context,
        }
    }
}
