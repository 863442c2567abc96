//! HTTP query service tests against a local stub server.

use std::io::Read;
use std::thread::{self, JoinHandle};

use query_workbench::config::ServiceConfig;
use query_workbench::error::WorkbenchError;
use query_workbench::service::{HttpQueryService, QueryService};
use serde_json::json;
use tiny_http::{Header, Response, Server};

/// What the stub saw of the single request it served.
struct Received {
    method: String,
    url: String,
    body: String,
}

/// Serves one request with `status` and `body`, returning the request seen.
fn stub(status: u16, body: &'static str) -> (ServiceConfig, JoinHandle<Received>) {
    let server = Server::http("127.0.0.1:0").expect("start stub server");
    let config = ServiceConfig {
        url: format!("http://{}", server.server_addr()),
        endpoint: "/api/query".to_string(),
        timeout_secs: 5,
    };

    let handle = thread::spawn(move || {
        let mut request = server.recv().expect("request expected");
        let mut received = Received {
            method: request.method().to_string(),
            url: request.url().to_string(),
            body: String::new(),
        };
        request
            .as_reader()
            .read_to_string(&mut received.body)
            .expect("read request body");

        let response = Response::from_string(body)
            .with_status_code(status)
            .with_header(
                Header::from_bytes("Content-Type", "application/json")
                    .expect("valid content type header"),
            );
        request.respond(response).expect("response should succeed");
        received
    });

    (config, handle)
}

#[tokio::test]
async fn test_posts_query_and_returns_body() {
    let (config, handle) = stub(200, r#"{"result": [["n"], [1], [2]]}"#);
    let service = HttpQueryService::new(&config).unwrap();

    let body = service.execute("SELECT n FROM t").await.unwrap();
    assert_eq!(body, json!({"result": [["n"], [1], [2]]}));

    let received = handle.join().expect("stub thread should join");
    assert_eq!(received.method, "POST");
    assert_eq!(received.url, "/api/query");
    let sent: serde_json::Value = serde_json::from_str(&received.body).unwrap();
    assert_eq!(sent, json!({"query": "SELECT n FROM t"}));
}

#[tokio::test]
async fn test_error_status_is_transport_error() {
    let (config, handle) = stub(500, "internal failure");
    let service = HttpQueryService::new(&config).unwrap();

    let err = service.execute("SELECT 1").await.unwrap_err();
    handle.join().expect("stub thread should join");

    assert!(matches!(err, WorkbenchError::Transport(_)));
    assert!(err.to_string().contains("500"));
    assert!(err.to_string().contains("internal failure"));
}

#[tokio::test]
async fn test_invalid_json_is_transport_error() {
    let (config, handle) = stub(200, "not json at all");
    let service = HttpQueryService::new(&config).unwrap();

    let err = service.execute("SELECT 1").await.unwrap_err();
    handle.join().expect("stub thread should join");

    assert!(matches!(err, WorkbenchError::Transport(_)));
}

#[tokio::test]
async fn test_service_describes_host_and_port() {
    let (config, handle) = stub(200, r#"{"result": [[]]}"#);
    let service = HttpQueryService::new(&config).unwrap();
    assert!(service.describe().starts_with("127.0.0.1:"));

    // Serve the pending request so the stub thread finishes.
    service.execute("SELECT 1").await.unwrap();
    handle.join().expect("stub thread should join");
}
