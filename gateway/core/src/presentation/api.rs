// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::domain::agent::{AgentActionRequest, AgentActionResponse};
use crate::domain::chat::{ChatCompletionRequest, ChatCompletionResponse};
use crate::domain::error::GatewayError;
use crate::domain::search::{SearchRequest, SearchResponse};
use crate::domain::security_event::Actor;
use crate::infrastructure::GatewayContext;

pub const USER_HEADER: &str = "x-asb-user";
pub const TENANT_HEADER: &str = "x-asb-tenant";
pub const TOKEN_HEADER: &str = "x-asb-token-id";

pub fn app(context: Arc<GatewayContext>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/v1/chat/completions", post(chat_completions))
        .route("/v1/rag/search_safe", post(search_safe))
        .route("/v1/agent/action/execute", post(execute_action))
        .layer(TraceLayer::new_for_http())
        .with_state(context)
}

/// HTTP rendering of a [`GatewayError`].
#[derive(Debug)]
pub struct ApiError(pub GatewayError);

impl From<GatewayError> for ApiError {
    fn from(err: GatewayError) -> Self {
        Self(err)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            GatewayError::PolicyDenied { .. } => StatusCode::FORBIDDEN,
            GatewayError::UnsupportedRequest(_) => StatusCode::BAD_REQUEST,
            GatewayError::Misconfigured(_) => StatusCode::INTERNAL_SERVER_ERROR,
            GatewayError::PolicyUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            GatewayError::UpstreamError { status, .. } => StatusCode::from_u16(*status)
                .ok()
                .filter(|s| s.is_client_error() || s.is_server_error())
                .unwrap_or(StatusCode::BAD_GATEWAY),
            GatewayError::UpstreamUnavailable(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let mut detail = json!({
            "message": self.0.to_string(),
            "kind": self.0.kind(),
        });
        if let GatewayError::UpstreamError { status: upstream, .. } = &self.0 {
            detail["upstream_status"] = Value::from(*upstream);
        }
        (status, Json(json!({ "detail": detail }))).into_response()
    }
}

/// Claimed identity from the optional `x-asb-*` headers.
pub fn actor_from_headers(headers: &HeaderMap) -> Actor {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    };
    Actor {
        user_id: header(USER_HEADER),
        token_id: header(TOKEN_HEADER),
        tenant_id: header(TENANT_HEADER),
        platform: None,
    }
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

async fn chat_completions(
    State(context): State<Arc<GatewayContext>>,
    headers: HeaderMap,
    Json(request): Json<ChatCompletionRequest>,
) -> Result<Json<ChatCompletionResponse>, ApiError> {
    let response = context
        .chat()
        .complete(request, actor_from_headers(&headers))
        .await?;
    Ok(Json(response))
}

async fn search_safe(
    State(context): State<Arc<GatewayContext>>,
    headers: HeaderMap,
    Json(request): Json<SearchRequest>,
) -> Result<Json<SearchResponse>, ApiError> {
    let response = context
        .search()
        .search(request, actor_from_headers(&headers))
        .await?;
    Ok(Json(response))
}

async fn execute_action(
    State(context): State<Arc<GatewayContext>>,
    headers: HeaderMap,
    Json(request): Json<AgentActionRequest>,
) -> Result<Json<AgentActionResponse>, ApiError> {
    let response = context
        .agent()
        .execute(request, actor_from_headers(&headers))
        .await?;
    Ok(Json(response))
}
