// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Decision client against a live HTTP peer.
//!
//! Uses `mockito` for the decision point's data API and a bound-but-silent TCP
//! listener to exercise the request timeout.

use mockito::Matcher;
use serde_json::json;
use std::time::{Duration, Instant};

use asb_core::domain::decision::{
    DecisionError, PolicyDecisionPoint, PolicyPath, NO_DECISION_REASON,
};
use asb_core::domain::security_event::{
    Actor, EventContext, EventOperation, EventResource, EventSource, SecurityEvent,
};
use asb_core::infrastructure::OpaClient;

fn event() -> SecurityEvent {
    let mut context = EventContext::new();
    context.insert("top_k", 5u32).tag("capability", "search");
    SecurityEvent::builder(
        &EventSource::new("ASB Secure Gateway", Some("test".to_string())),
        EventOperation::new("search", "rag_gateway"),
        EventResource::new("collection", "documents"),
    )
    .actor(&Actor::user("carol"))
    .context(context)
    .build()
}

fn path() -> PolicyPath {
    PolicyPath::new("rag/allow").unwrap()
}

fn client(url: &str) -> OpaClient {
    OpaClient::new(url, Duration::from_secs(3), Duration::from_secs(5))
}

#[tokio::test]
async fn test_posts_event_as_input() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/v1/data/rag/allow")
        .match_header("content-type", "application/json")
        .match_body(Matcher::PartialJson(json!({
            "input": {
                "schema_version": "asb.security.event/0.2",
                "app_id": "ASB Secure Gateway",
                "env": "test",
                "subject": {"user_id": "carol", "platform": "api"},
                "operation": {"action": "search", "component": "rag_gateway"},
                "resource": {"type": "collection", "name": "documents"},
                "context": {"metadata": {"top_k": 5}, "tags": {"capability": "search"}}
            }
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"result": true}"#)
        .create_async()
        .await;

    let decision = client(&server.url()).evaluate(&path(), &event()).await.unwrap();
    assert!(decision.allow);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_structured_denial_keeps_reason() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/v1/data/rag/allow")
        .with_status(200)
        .with_body(r#"{"result": {"allow": false, "reason": "blocked: pii"}}"#)
        .create_async()
        .await;

    let decision = client(&server.url()).evaluate(&path(), &event()).await.unwrap();
    assert!(!decision.allow);
    assert_eq!(decision.reason.as_deref(), Some("blocked: pii"));
}

#[tokio::test]
async fn test_undefined_rule_fails_closed() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/v1/data/rag/allow")
        .with_status(200)
        .with_body("{}")
        .create_async()
        .await;

    let decision = client(&server.url()).evaluate(&path(), &event()).await.unwrap();
    assert!(!decision.allow);
    assert_eq!(decision.reason.as_deref(), Some(NO_DECISION_REASON));
}

#[tokio::test]
async fn test_non_success_status_is_an_error() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/v1/data/rag/allow")
        .with_status(500)
        .with_body(r#"{"result": true}"#)
        .create_async()
        .await;

    let err = client(&server.url()).evaluate(&path(), &event()).await.unwrap_err();
    assert_eq!(err, DecisionError::Status(500));
}

#[tokio::test]
async fn test_non_json_body_is_an_error() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/v1/data/rag/allow")
        .with_status(200)
        .with_body("<html>proxy error</html>")
        .create_async()
        .await;

    let err = client(&server.url()).evaluate(&path(), &event()).await.unwrap_err();
    assert!(matches!(err, DecisionError::InvalidBody(_)));
}

#[tokio::test]
async fn test_connection_refused_is_transport_error() {
    // Bind then drop to obtain a port with nothing listening.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = client(&format!("http://{addr}"))
        .evaluate(&path(), &event())
        .await
        .unwrap_err();
    assert!(matches!(err, DecisionError::Transport(_)));
}

#[tokio::test]
async fn test_silent_peer_times_out() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let accept = tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });

    let client = OpaClient::new(
        format!("http://{addr}"),
        Duration::from_millis(200),
        Duration::from_millis(300),
    );
    let started = Instant::now();
    let err = client.evaluate(&path(), &event()).await.unwrap_err();

    assert_eq!(err, DecisionError::Timeout);
    assert!(started.elapsed() < Duration::from_secs(3));
    accept.abort();
}

#[tokio::test]
async fn test_client_is_reused_across_calls() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/v1/data/rag/allow")
        .with_status(200)
        .with_body(r#"{"result": true}"#)
        .expect(3)
        .create_async()
        .await;

    let client = client(&server.url());
    for _ in 0..3 {
        assert!(client.evaluate(&path(), &event()).await.unwrap().allow);
    }
    mock.assert_async().await;

    client.close().await;
    let err = client.evaluate(&path(), &event()).await.unwrap_err();
    assert_eq!(err, DecisionError::Closed);
}
