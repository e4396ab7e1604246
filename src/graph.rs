//! Graph query port
//!
//! Abstracts the backend that executes openCypher traversals and returns
//! typed nodes/edges. The production client posts to the backend's REST
//! query endpoint; a scripted double stands in for unit tests and the
//! offline demo.

use crate::error::AgentError;
use crate::models::GraphResultSet;
use crate::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

#[async_trait]
pub trait GraphQueryPort: Send + Sync {
    /// Execute one query and return the discovered entities/relationships.
    async fn execute(&self, cypher: &str) -> Result<GraphResultSet>;
}

/// HTTP-backed graph client.
pub struct HttpGraphClient {
    client: Client,
    base_url: String,
}

impl HttpGraphClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let client = Client::builder()
            .pool_idle_timeout(Duration::from_secs(60))
            .pool_max_idle_per_host(8)
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl GraphQueryPort for HttpGraphClient {
    async fn execute(&self, cypher: &str) -> Result<GraphResultSet> {
        let url = format!("{}/api/v1/query/cypher", self.base_url);

        let response = self
            .client
            .post(url)
            .header("Content-Type", "application/json")
            .json(&json!({ "query": cypher }))
            .send()
            .await
            .map_err(|e| AgentError::GraphBackend(format!("query request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AgentError::GraphBackend(format!(
                "backend returned {}: {}",
                status, body
            )));
        }

        let results: GraphResultSet = response
            .json()
            .await
            .map_err(|e| AgentError::GraphBackend(format!("invalid backend response: {}", e)))?;

        Ok(results)
    }
}

//
// ================= Scripted double =================
//

/// Scripted graph double. Each call pops the next scripted result; an
/// empty script yields an empty result set.
pub struct MockGraphBackend {
    script: Mutex<VecDeque<Result<GraphResultSet>>>,
    calls: AtomicUsize,
}

impl MockGraphBackend {
    pub fn new() -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn push(&self, result: Result<GraphResultSet>) {
        self.script
            .lock()
            .expect("mock script lock poisoned")
            .push_back(result);
    }

    /// Number of queries executed so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Default for MockGraphBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl GraphQueryPort for MockGraphBackend {
    async fn execute(&self, _cypher: &str) -> Result<GraphResultSet> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.script
            .lock()
            .expect("mock script lock poisoned")
            .pop_front()
            .unwrap_or_else(|| Ok(GraphResultSet::default()))
    }
}
