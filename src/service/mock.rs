//! In-memory query services for headless mode and tests.

use async_trait::async_trait;
use serde_json::{json, Value as Json};
use std::sync::Mutex;
use std::time::Duration;

use super::QueryService;
use crate::error::{Result, WorkbenchError};

/// A query service that answers with canned payloads.
///
/// The payload is picked from the query text:
/// - `error` anywhere → sentinel error shape
/// - `malformed` → an empty `result`
/// - `typed` → typed header shape
/// - anything else → plain header shape with three unsorted rows
pub struct MockQueryService {
    delay: Duration,
    fixed: Option<Json>,
    received: Mutex<Vec<String>>,
}

impl MockQueryService {
    /// Creates a mock service that answers immediately.
    pub fn new() -> Self {
        Self {
            delay: Duration::ZERO,
            fixed: None,
            received: Mutex::new(Vec::new()),
        }
    }

    /// Delays every answer, to exercise the running state.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Answers every query with the given body.
    pub fn with_response(mut self, body: Json) -> Self {
        self.fixed = Some(body);
        self
    }

    /// Query texts received so far, in order.
    pub fn received(&self) -> Vec<String> {
        self.received
            .lock()
            .map(|q| q.clone())
            .unwrap_or_default()
    }

    fn canned(query: &str) -> Json {
        let lowered = query.to_lowercase();
        if lowered.contains("error") {
            json!({ "result": [[""], [format!("Mock error for: {query}")]] })
        } else if lowered.contains("malformed") {
            json!({ "result": [] })
        } else if lowered.contains("typed") {
            json!({
                "result": [
                    [
                        {"name": "id", "type": "number"},
                        {"name": "name", "type": "string"},
                        {"name": "running", "type": "boolean"}
                    ],
                    [2, "web", true],
                    [1, "db", false]
                ]
            })
        } else {
            json!({
                "result": [
                    ["id", "name", "status"],
                    [3, "gamma", "up"],
                    [1, "alpha", "down"],
                    [2, "beta", "up"]
                ]
            })
        }
    }
}

impl Default for MockQueryService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl QueryService for MockQueryService {
    async fn execute(&self, query: &str) -> Result<Json> {
        if let Ok(mut received) = self.received.lock() {
            received.push(query.to_string());
        }
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        Ok(self.fixed.clone().unwrap_or_else(|| Self::canned(query)))
    }

    fn describe(&self) -> String {
        "mock".to_string()
    }
}

/// A query service whose every request fails at the transport level.
pub struct FailingQueryService {
    message: String,
}

impl FailingQueryService {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl Default for FailingQueryService {
    fn default() -> Self {
        Self::new("Failed to connect to the query service")
    }
}

#[async_trait]
impl QueryService for FailingQueryService {
    async fn execute(&self, _query: &str) -> Result<Json> {
        Err(WorkbenchError::transport(self.message.clone()))
    }

    fn describe(&self) -> String {
        "unreachable".to_string()
    }
}
