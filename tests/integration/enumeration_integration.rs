/// End-to-end enumeration through the dispatcher
use std::sync::Arc;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use mcp_subfinder_server::*;
use serde_json::{json, Value};
use tokio::time::Instant;

use crate::support::{Reply, ScriptedProvider};

async fn call_tool(provider: Arc<ScriptedProvider>, arguments: Value) -> Value {
    let server = McpServer::new(provider);
    let payload = json!({
        "jsonrpc": "2.0",
        "id": 1,
        "method": "tools.call",
        "params": {"name": "enumerateSubdomains", "arguments": arguments}
    });

    let reply = server
        .handle_payload(payload.to_string().as_bytes(), &EnumerationContext::new())
        .await;
    serde_json::to_value(reply).expect("reply serializes")
}

fn decoded_blob(response: &Value) -> Vec<String> {
    let blob = response["result"]["content"][1]["blob"]
        .as_str()
        .expect("resource blob");
    let text = String::from_utf8(STANDARD.decode(blob).expect("valid base64")).expect("utf-8");
    text.lines().map(str::to_string).collect()
}

#[tokio::test(start_paused = true)]
async fn test_retries_until_provider_succeeds() {
    let provider = Arc::new(
        ScriptedProvider::new()
            .reply("example.com", Reply::Fail("rate limited"))
            .reply("example.com", Reply::Fail("rate limited"))
            .reply("example.com", Reply::Hosts(vec!["www.example.com", "api.example.com"])),
    );
    let started = Instant::now();

    let response = call_tool(provider.clone(), json!({"domain": "example.com"})).await;

    assert_eq!(provider.calls().len(), 3);
    assert!(started.elapsed() >= std::time::Duration::from_secs(4));
    assert_eq!(
        response["result"]["content"][0]["text"],
        "Found 2 subdomains for example.com"
    );
    assert_eq!(decoded_blob(&response), vec!["api.example.com", "www.example.com"]);
}

#[tokio::test(start_paused = true)]
async fn test_exhausted_retries_become_error_result() {
    let provider = Arc::new(ScriptedProvider::new().reply("example.com", Reply::Fail("boom")));

    let response = call_tool(provider.clone(), json!({"domain": "example.com"})).await;

    assert_eq!(provider.calls().len(), 3);
    assert!(response.get("error").is_none());
    assert_eq!(response["result"]["isError"], true);
    assert_eq!(
        response["result"]["content"][0]["text"],
        "Subdomain enumeration failed: enumeration error after 3 attempts: boom"
    );
}

#[tokio::test(start_paused = true)]
async fn test_empty_result_falls_back_to_suggestions() {
    let provider = Arc::new(ScriptedProvider::new());

    let response = call_tool(provider.clone(), json!({"domain": "empty.test"})).await;

    assert_eq!(provider.calls().len(), 3);
    assert_eq!(
        response["result"]["content"][0]["text"],
        "Found 10 subdomains for empty.test"
    );
    let suggestions = decoded_blob(&response);
    assert_eq!(suggestions.first().map(String::as_str), Some("www.empty.test"));
    assert_eq!(suggestions.last().map(String::as_str), Some("portal.empty.test"));
}

#[tokio::test(start_paused = true)]
async fn test_recursive_call_merges_probe_results() {
    let provider = Arc::new(
        ScriptedProvider::new()
            .reply("example.com", Reply::Hosts(vec!["dev.example.com", "Example.com"]))
            .reply("dev.example.com", Reply::Hosts(vec!["api.dev.example.com", "dev.example.com"])),
    );

    let response = call_tool(
        provider.clone(),
        json!({"domain": "example.com", "recursive": true, "maxDepth": 2, "timeout": 100}),
    )
    .await;

    assert_eq!(
        provider.calls(),
        vec![("example.com".to_string(), 100), ("dev.example.com".to_string(), 50)]
    );
    assert_eq!(decoded_blob(&response), vec!["api.dev.example.com", "dev.example.com"]);
}

#[tokio::test(start_paused = true)]
async fn test_recursive_flag_without_depth_does_not_recurse() {
    let provider = Arc::new(
        ScriptedProvider::new().reply("example.com", Reply::Hosts(vec!["dev.example.com"])),
    );

    let response = call_tool(provider.clone(), json!({"domain": "example.com", "recursive": true})).await;

    assert_eq!(provider.calls().len(), 1);
    assert_eq!(decoded_blob(&response), vec!["dev.example.com"]);
}

#[tokio::test(start_paused = true)]
async fn test_huge_timeout_runs_without_deadline() {
    let provider = Arc::new(
        ScriptedProvider::new()
            .reply("example.com", Reply::Hosts(vec!["dev.example.com"]))
            .reply("dev.example.com", Reply::Hosts(vec!["api.dev.example.com"])),
    );

    let response = call_tool(
        provider.clone(),
        json!({"domain": "example.com", "timeout": u64::MAX, "recursive": true, "maxDepth": 2}),
    )
    .await;

    assert_eq!(
        provider.calls(),
        vec![
            ("example.com".to_string(), u64::MAX),
            ("dev.example.com".to_string(), u64::MAX / 2)
        ]
    );
    assert_eq!(decoded_blob(&response), vec!["api.dev.example.com", "dev.example.com"]);
}
