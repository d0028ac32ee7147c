// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use serde_json::Value;
use std::collections::BTreeMap;

use super::RequestAdapter;
use crate::domain::error::GatewayError;
use crate::domain::search::{RawSearchRecord, SearchRequest, SearchResponse, SearchResult};
use crate::domain::security_event::{
    Actor, EventContext, EventOperation, EventResource, EventSource, SecurityEvent,
};

pub const STATUS_OK: &str = "ok";

pub struct SearchAdapter {
    source: EventSource,
    collection: String,
    top_k_default: u32,
    max_top_k: u32,
    include_query_text: bool,
}

impl SearchAdapter {
    pub fn new(
        source: EventSource,
        collection: impl Into<String>,
        top_k_default: u32,
        max_top_k: u32,
        include_query_text: bool,
    ) -> Self {
        Self {
            source,
            collection: collection.into(),
            top_k_default,
            max_top_k,
            include_query_text,
        }
    }

    /// Requested result count, or the configured default.
    pub fn resolve_top_k(&self, request: &SearchRequest) -> Result<u32, GatewayError> {
        match request.top_k {
            None => Ok(self.top_k_default),
            Some(0) => Err(GatewayError::UnsupportedRequest(
                "top_k must be a positive integer".to_string(),
            )),
            Some(k) if k > self.max_top_k => Err(GatewayError::UnsupportedRequest(format!(
                "top_k must not exceed {}",
                self.max_top_k
            ))),
            Some(k) => Ok(k),
        }
    }

    fn stringify_metadata(metadata: Option<&Value>) -> BTreeMap<String, String> {
        match metadata {
            Some(Value::Object(map)) => map
                .iter()
                .filter(|(_, v)| !v.is_null())
                .map(|(k, v)| {
                    let value = match v {
                        Value::String(s) => s.clone(),
                        other => other.to_string(),
                    };
                    (k.clone(), value)
                })
                .collect(),
            _ => BTreeMap::new(),
        }
    }
}

impl RequestAdapter for SearchAdapter {
    type Request = SearchRequest;
    type Response = SearchResponse;
    type Raw = Vec<RawSearchRecord>;

    fn capability(&self) -> &'static str {
        "search"
    }

    fn precheck(&self, request: &SearchRequest) -> Result<(), GatewayError> {
        self.resolve_top_k(request).map(|_| ())
    }

    fn to_event(&self, request: &SearchRequest, actor: &Actor) -> SecurityEvent {
        let operation = EventOperation::new("search", "rag_gateway")
            .with_attribute("category", "retrieval");
        let resource = EventResource::new("collection", self.collection.as_str());

        let top_k = self.resolve_top_k(request).unwrap_or(self.top_k_default);
        let mut context = EventContext::new();
        context
            .insert("top_k", top_k)
            .insert("query_length", request.query.chars().count())
            .insert("has_embedding", request.embedding.is_some())
            .tag("capability", "search");
        if self.include_query_text {
            context.insert("query", request.query.as_str());
        }

        SecurityEvent::builder(&self.source, operation, resource)
            .actor(actor)
            .context(context)
            .build()
    }

    fn from_backend_result(
        &self,
        raw: &Vec<RawSearchRecord>,
        request: &SearchRequest,
    ) -> Result<SearchResponse, GatewayError> {
        let top_k = self.resolve_top_k(request)? as usize;

        let mut results: Vec<SearchResult> = raw
            .iter()
            .map(|record| SearchResult {
                id: record.id.clone(),
                content: record.content.clone().unwrap_or_default(),
                score: record.score,
                metadata: Self::stringify_metadata(record.metadata.as_ref()),
            })
            .collect();
        results.sort_by(|a, b| b.score.total_cmp(&a.score));
        results.truncate(top_k);

        Ok(SearchResponse {
            results,
            status: STATUS_OK.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::security_event::ContextValue;
    use serde_json::json;

    fn adapter(include_query: bool) -> SearchAdapter {
        SearchAdapter::new(
            EventSource::new("ASB Secure Gateway", None),
            "documents",
            5,
            50,
            include_query,
        )
    }

    fn record(id: &str, score: f64) -> RawSearchRecord {
        RawSearchRecord {
            id: id.to_string(),
            content: Some(format!("content of {id}")),
            score,
            metadata: Some(json!({"source": "wiki", "page": 3, "draft": false, "gone": null})),
        }
    }

    #[test]
    fn test_top_k_resolution() {
        let a = adapter(false);
        let mut req = SearchRequest::new("pricing");
        assert_eq!(a.resolve_top_k(&req).unwrap(), 5);
        req.top_k = Some(12);
        assert_eq!(a.resolve_top_k(&req).unwrap(), 12);
        req.top_k = Some(0);
        assert!(matches!(a.precheck(&req), Err(GatewayError::UnsupportedRequest(_))));
        req.top_k = Some(51);
        assert!(matches!(a.precheck(&req), Err(GatewayError::UnsupportedRequest(_))));
    }

    #[test]
    fn test_event_hides_query_by_default() {
        let mut req = SearchRequest::new("salary of bob");
        req.top_k = Some(3);
        let event = adapter(false).to_event(&req, &Actor::anonymous());

        assert_eq!(event.operation().action, "search");
        assert_eq!(event.operation().component, "rag_gateway");
        assert_eq!(event.resource().kind, "collection");
        assert_eq!(event.resource().name, "documents");
        let metadata = &event.context().metadata;
        assert_eq!(metadata["top_k"], ContextValue::Integer(3));
        assert_eq!(metadata["query_length"], ContextValue::Integer(13));
        assert_eq!(metadata["has_embedding"], ContextValue::Bool(false));
        assert!(!metadata.contains_key("query"));
        assert_eq!(event.context().tags["capability"], "search");
    }

    #[test]
    fn test_event_includes_query_when_configured() {
        let event =
            adapter(true).to_event(&SearchRequest::new("salary of bob"), &Actor::anonymous());
        assert_eq!(
            event.context().metadata["query"],
            ContextValue::String("salary of bob".to_string())
        );
    }

    #[test]
    fn test_results_sorted_and_truncated() {
        let mut req = SearchRequest::new("q");
        req.top_k = Some(2);
        let raw = vec![record("a", 0.2), record("b", 0.9), record("c", 0.5)];

        let response = adapter(false).from_backend_result(&raw, &req).unwrap();
        let ids: Vec<&str> = response.results.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "c"]);
        assert_eq!(response.status, STATUS_OK);
    }

    #[test]
    fn test_metadata_is_stringified() {
        let response = adapter(false)
            .from_backend_result(&vec![record("a", 1.0)], &SearchRequest::new("q"))
            .unwrap();
        let metadata = &response.results[0].metadata;
        assert_eq!(metadata["source"], "wiki");
        assert_eq!(metadata["page"], "3");
        assert_eq!(metadata["draft"], "false");
        assert!(!metadata.contains_key("gone"));
    }

    #[test]
    fn test_missing_content_becomes_empty() {
        let raw = vec![RawSearchRecord {
            id: "x".to_string(),
            content: None,
            score: 0.1,
            metadata: None,
        }];
        let response = adapter(false)
            .from_backend_result(&raw, &SearchRequest::new("q"))
            .unwrap();
        assert_eq!(response.results[0].content, "");
        assert!(response.results[0].metadata.is_empty());
    }

    #[test]
    fn test_mapping_is_idempotent() {
        let raw = vec![record("a", 0.4), record("b", 0.4), record("c", 0.7)];
        let req = SearchRequest::new("q");
        let a = adapter(false);
        assert_eq!(
            a.from_backend_result(&raw, &req).unwrap(),
            a.from_backend_result(&raw, &req).unwrap()
        );
    }
}
