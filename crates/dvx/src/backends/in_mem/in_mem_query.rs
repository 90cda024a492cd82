//! 🔎 A query engine that already knows the answer. It walks a scripted list of
//! statuses, then hands back canned results.

use std::collections::VecDeque;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::backends::{QueryEngine, QueryRequest, QueryResults, QueryStatus};

#[derive(Debug, Default)]
struct Script {
    statuses: VecDeque<QueryStatus>,
    results: QueryResults,
    submitted: Vec<QueryRequest>,
}

#[derive(Debug, Default, Clone)]
pub(crate) struct InMemoryQueryEngine {
    inner: Arc<Mutex<Script>>,
}

impl InMemoryQueryEngine {
    /// 🎬 Polls return `statuses` in order, then `Succeeded` forever.
    pub(crate) fn scripted(statuses: impl IntoIterator<Item = QueryStatus>, results: QueryResults) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Script {
                statuses: statuses.into_iter().collect(),
                results,
                submitted: Vec::new(),
            })),
        }
    }

    pub(crate) async fn submitted(&self) -> Vec<QueryRequest> {
        self.inner.lock().await.submitted.clone()
    }
}

#[async_trait]
impl QueryEngine for InMemoryQueryEngine {
    async fn start_query(&self, request: &QueryRequest) -> Result<String> {
        let mut the_script = self.inner.lock().await;
        the_script.submitted.push(request.clone());
        Ok(format!("in-mem-query-{}", the_script.submitted.len()))
    }

    async fn query_status(&self, _execution_id: &str) -> Result<QueryStatus> {
        Ok(self
            .inner
            .lock()
            .await
            .statuses
            .pop_front()
            .unwrap_or(QueryStatus::Succeeded))
    }

    async fn query_results(&self, _execution_id: &str) -> Result<QueryResults> {
        Ok(self.inner.lock().await.results.clone())
    }
}
