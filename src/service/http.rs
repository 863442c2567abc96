//! HTTP client for the query-execution service.

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use tracing::{debug, warn};
use url::Url;

use super::QueryService;
use crate::config::ServiceConfig;
use crate::error::{Result, WorkbenchError};

/// Request body sent to the query endpoint.
#[derive(Debug, Serialize)]
struct QueryRequest<'a> {
    query: &'a str,
}

/// Query service reached over HTTP.
#[derive(Debug, Clone)]
pub struct HttpQueryService {
    client: Client,
    endpoint: Url,
    display: String,
}

impl HttpQueryService {
    /// Creates a client from the service configuration.
    pub fn new(config: &ServiceConfig) -> Result<Self> {
        let endpoint = config.query_url()?;
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| WorkbenchError::internal(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint,
            display: config.display_string(),
        })
    }

    /// Returns the full endpoint URL queries are posted to.
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl QueryService for HttpQueryService {
    async fn execute(&self, query: &str) -> Result<serde_json::Value> {
        debug!(endpoint = %self.endpoint, "Posting query");

        let response = self
            .client
            .post(self.endpoint.clone())
            .json(&QueryRequest { query })
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    WorkbenchError::transport("Request timed out. Try again.")
                } else if e.is_connect() {
                    WorkbenchError::transport(format!(
                        "Failed to connect to the query service at {}. Is it running?",
                        self.display
                    ))
                } else {
                    WorkbenchError::transport(format!("Request failed: {e}"))
                }
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| WorkbenchError::transport(format!("Failed to read response: {e}")))?;

        if !status.is_success() {
            warn!(%status, "Query service returned an error status");
            return Err(WorkbenchError::transport(format!(
                "Query service error ({status}): {}",
                body.trim()
            )));
        }

        serde_json::from_str(&body)
            .map_err(|e| WorkbenchError::transport(format!("Failed to parse response: {e}")))
    }

    fn describe(&self) -> String {
        self.display.clone()
    }
}
