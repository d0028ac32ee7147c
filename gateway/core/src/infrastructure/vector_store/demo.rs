// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use async_trait::async_trait;
use serde_json::json;

use crate::domain::backend::{BackendConnector, BackendError};
use crate::domain::search::{RawSearchRecord, SearchRequest};

const MAX_DEMO_RESULTS: u32 = 3;

/// Synthetic knowledge base, selected with `rag.backend: demo`.
#[derive(Debug, Default)]
pub struct DemoSearchConnector;

#[async_trait]
impl BackendConnector<SearchRequest> for DemoSearchConnector {
    type Output = Vec<RawSearchRecord>;

    fn name(&self) -> &str {
        "demo"
    }

    async fn invoke(&self, request: &SearchRequest) -> Result<Vec<RawSearchRecord>, BackendError> {
        let count = request.top_k.unwrap_or(MAX_DEMO_RESULTS).min(MAX_DEMO_RESULTS);
        Ok((0..count)
            .map(|idx| RawSearchRecord {
                id: format!("demo-{idx}"),
                content: Some(format!(
                    "Demo knowledge base entry related to '{}' #{idx}",
                    request.query
                )),
                score: 1.0 - f64::from(idx) * 0.1,
                metadata: Some(json!({"source": "demo-fallback"})),
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_demo_results_are_bounded() {
        let mut request = SearchRequest::new("vacation policy");
        request.top_k = Some(10);
        let records = DemoSearchConnector.invoke(&request).await.unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].id, "demo-0");
        assert_eq!(records[2].metadata.as_ref().unwrap()["source"], "demo-fallback");

        request.top_k = Some(1);
        assert_eq!(DemoSearchConnector.invoke(&request).await.unwrap().len(), 1);
    }
}
