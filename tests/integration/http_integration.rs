/// HTTP transport tests driven through the axum router
use std::sync::Arc;
use std::time::Duration;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use mcp_subfinder_server::*;
use serde_json::{json, Value};
use tower::ServiceExt;

use crate::support::{Reply, ScriptedProvider};

fn app() -> Router {
    let provider = ScriptedProvider::new()
        .reply("example.com", Reply::Hosts(vec!["www.example.com", "mail.example.com"]));
    SubfinderServer::new(Arc::new(provider))
        .with_request_timeout(Duration::from_secs(5))
        .router()
}

async fn post_mcp(app: Router, body: &str) -> (StatusCode, String) {
    let request = Request::builder()
        .method("POST")
        .uri("/mcp")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .expect("request builds");

    let response = app.oneshot(request).await.expect("router responds");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body readable");
    (status, String::from_utf8(bytes.to_vec()).expect("utf-8 body"))
}

#[tokio::test]
async fn test_health_endpoint() {
    let request = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .expect("request builds");

    let response = app().oneshot(request).await.expect("router responds");

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body, json!({"status": "ok"}));
}

#[tokio::test]
async fn test_initialize_over_http() {
    let (status, body) = post_mcp(
        app(),
        r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{"protocolVersion":"0.3"}}"#,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let body: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(body["result"]["name"], "MCP Subfinder Server");
    assert_eq!(body["result"]["protocolVersion"], "0.3");
}

#[tokio::test]
async fn test_protocol_errors_still_return_200() {
    let (status, body) = post_mcp(app(), "{not json").await;

    assert_eq!(status, StatusCode::OK);
    let body: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(body["error"]["code"], -32700);
}

#[tokio::test]
async fn test_notification_has_empty_body() {
    let (status, body) = post_mcp(app(), r#"{"jsonrpc":"2.0","method":"tools.list"}"#).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.is_empty());
}

#[tokio::test]
async fn test_batch_of_notifications_returns_empty_array() {
    let (status, body) = post_mcp(
        app(),
        r#"[{"jsonrpc":"2.0","method":"tools.list"},{"jsonrpc":"2.0","method":"nothing"}]"#,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(serde_json::from_str::<Value>(&body).unwrap(), json!([]));
}

#[tokio::test]
async fn test_tools_call_over_http() {
    let (status, body) = post_mcp(
        app(),
        r#"{"jsonrpc":"2.0","id":"call-1","method":"tools.call","params":{"name":"enumerateSubdomains","arguments":{"domain":"example.com"}}}"#,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let body: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(body["id"], "call-1");
    assert_eq!(body["result"]["content"][0]["text"], "Found 2 subdomains for example.com");
    assert_eq!(body["result"]["content"][1]["mimeType"], "text/plain");
}

#[tokio::test]
async fn test_huge_timeout_with_recursion_over_http() {
    let provider = ScriptedProvider::new()
        .reply("example.com", Reply::Hosts(vec!["www.example.com"]))
        .reply("www.example.com", Reply::Hosts(vec!["cdn.www.example.com"]));
    let app = SubfinderServer::new(Arc::new(provider)).router();

    let (status, body) = post_mcp(
        app,
        r#"{"jsonrpc":"2.0","id":4,"method":"tools.call","params":{"name":"enumerateSubdomains","arguments":{"domain":"example.com","timeout":18446744073709551615,"recursive":true,"maxDepth":2}}}"#,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let body: Value = serde_json::from_str(&body).unwrap();
    assert!(body.get("error").is_none());
    assert_eq!(
        body["result"]["content"][0]["text"],
        "Found 2 subdomains for example.com"
    );
}

#[tokio::test]
async fn test_shutdown_cancels_enumeration() {
    let server = SubfinderServer::new(Arc::new(
        ScriptedProvider::new().reply("example.com", Reply::Hosts(vec!["www.example.com"])),
    ));
    server.shutdown_token().cancel();

    let (status, body) = post_mcp(
        server.router(),
        r#"{"jsonrpc":"2.0","id":9,"method":"tools.call","params":{"name":"enumerateSubdomains","arguments":{"domain":"example.com"}}}"#,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let body: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(body["result"]["isError"], true);
    assert_eq!(
        body["result"]["content"][0]["text"],
        "Subdomain enumeration failed: enumeration stopped: context canceled"
    );
}
