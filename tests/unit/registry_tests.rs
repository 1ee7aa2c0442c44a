/// Tool registry and protocol surface
use mcp_subfinder_server::mcp::protocol::*;
use mcp_subfinder_server::tools::{self, ToolError, ENUMERATE_SUBDOMAINS};
use serde_json::json;

#[test]
fn test_tools_list_payload() {
    let listed = serde_json::to_value(ToolsListResult {
        tools: tools::registry(),
    })
    .unwrap();

    let tools = listed["tools"].as_array().unwrap();
    assert_eq!(tools.len(), 1);
    assert_eq!(tools[0]["name"], ENUMERATE_SUBDOMAINS);
    assert_eq!(tools[0]["title"], "Enumerate Subdomains");
    assert_eq!(tools[0]["inputSchema"]["required"], json!(["domain"]));
    assert_eq!(tools[0]["inputSchema"]["properties"]["recursive"]["type"], "boolean");
}

#[test]
fn test_tool_errors_map_to_protocol_codes() {
    assert_eq!(
        ToolError::UnknownTool("scan".to_string()).rpc_kind().code(),
        error_codes::METHOD_NOT_FOUND
    );
    assert_eq!(
        ToolError::MissingArgument("domain".to_string()).rpc_kind().code(),
        error_codes::INVALID_PARAMS
    );
    assert_eq!(ToolError::InvalidDomain.rpc_kind().code(), error_codes::INVALID_PARAMS);
}

#[test]
fn test_initialize_result_identity() {
    let result = InitializeResult::default();

    assert_eq!(result.name, SERVER_NAME);
    assert_eq!(result.version, "1.0.0");
    assert_eq!(result.protocol_version, MCP_VERSION);
}
