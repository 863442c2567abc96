//! Query service abstraction.
//!
//! The workbench never interprets queries itself; it hands the text to a
//! remote query-execution service and gets back a JSON body whose `result`
//! field carries the rows. A trait keeps the HTTP client swappable for the
//! in-memory services used in headless mode and tests.

mod http;
mod mock;

pub use http::HttpQueryService;
pub use mock::{FailingQueryService, MockQueryService};

use crate::error::Result;
use async_trait::async_trait;

/// Interface to the remote query-execution service.
#[async_trait]
pub trait QueryService: Send + Sync {
    /// Sends the query text and returns the decoded response body.
    ///
    /// Transport problems (unreachable service, non-success status,
    /// undecodable body) are reported as `WorkbenchError::Transport`.
    async fn execute(&self, query: &str) -> Result<serde_json::Value>;

    /// Short description for the header bar.
    fn describe(&self) -> String;
}
