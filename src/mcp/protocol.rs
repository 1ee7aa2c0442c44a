/// MCP (Model Context Protocol) message structures and JSON-RPC handling
///
/// This module defines the JSON-RPC 2.0 envelope used by the subfinder
/// server, the fixed error table, and the payloads of the three supported
/// methods.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// MCP protocol version we support
pub const MCP_VERSION: &str = "0.3";

/// Name reported by `initialize`
pub const SERVER_NAME: &str = "MCP Subfinder Server";

/// Version reported by `initialize`
pub const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");

/// JSON-RPC version string carried by every envelope
pub const JSONRPC_VERSION: &str = "2.0";

fn default_jsonrpc() -> String {
    JSONRPC_VERSION.to_string()
}

/// JSON-RPC 2.0 request message
///
/// A request without an `id` (or with a `null` one) is a notification and
/// never gets a response.
#[derive(Debug, Clone, Deserialize)]
pub struct JsonRpcRequest {
    /// JSON-RPC version; defaults to "2.0" when omitted
    #[serde(default = "default_jsonrpc")]
    pub jsonrpc: String,
    /// Opaque correlation token, echoed verbatim in the response
    #[serde(default)]
    pub id: Option<Value>,
    /// The method to call (e.g., "tools.call")
    pub method: String,
    /// Parameters for the method call
    #[serde(default)]
    pub params: Option<Value>,
}

impl JsonRpcRequest {
    pub fn is_notification(&self) -> bool {
        self.id.is_none()
    }
}

/// JSON-RPC 2.0 response message
///
/// Exactly one of `result` and `error` is present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    /// JSON-RPC version (always "2.0")
    pub jsonrpc: String,
    /// Request ID that we're responding to; omitted when unknown
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    /// Successful result (if no error occurred)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    /// Error information (if something went wrong)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

/// JSON-RPC error information
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcError {
    /// Error code (standard JSON-RPC codes)
    pub code: i32,
    /// Human-readable error message
    pub message: String,
    /// Additional error details
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

// JSON-RPC error codes (standard codes)
pub mod error_codes {
    /// Parse error - Invalid JSON was received by the server
    pub const PARSE_ERROR: i32 = -32700;
    /// Invalid Request - The JSON sent is not a valid Request object
    pub const INVALID_REQUEST: i32 = -32600;
    /// Method not found - The requested method (or tool) doesn't exist
    pub const METHOD_NOT_FOUND: i32 = -32601;
    /// Invalid parameters - Method exists but parameters are wrong
    pub const INVALID_PARAMS: i32 = -32602;
    /// Internal error - Internal JSON-RPC error
    pub const INTERNAL_ERROR: i32 = -32603;
}

/// The fixed set of protocol-level failures.
///
/// Codes are stable and never reused for a different meaning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RpcErrorKind {
    Parse,
    InvalidRequest,
    MethodNotFound,
    InvalidParams,
    Internal,
}

impl RpcErrorKind {
    pub const ALL: [RpcErrorKind; 5] = [
        RpcErrorKind::Parse,
        RpcErrorKind::InvalidRequest,
        RpcErrorKind::MethodNotFound,
        RpcErrorKind::InvalidParams,
        RpcErrorKind::Internal,
    ];

    pub const fn code(self) -> i32 {
        match self {
            RpcErrorKind::Parse => error_codes::PARSE_ERROR,
            RpcErrorKind::InvalidRequest => error_codes::INVALID_REQUEST,
            RpcErrorKind::MethodNotFound => error_codes::METHOD_NOT_FOUND,
            RpcErrorKind::InvalidParams => error_codes::INVALID_PARAMS,
            RpcErrorKind::Internal => error_codes::INTERNAL_ERROR,
        }
    }

    pub const fn message(self) -> &'static str {
        match self {
            RpcErrorKind::Parse => "Parse error",
            RpcErrorKind::InvalidRequest => "Invalid Request",
            RpcErrorKind::MethodNotFound => "Method not found",
            RpcErrorKind::InvalidParams => "Invalid params",
            RpcErrorKind::Internal => "Internal error",
        }
    }

    /// The canonical error object for this kind
    pub fn error(self) -> JsonRpcError {
        JsonRpcError {
            code: self.code(),
            message: self.message().to_string(),
            data: None,
        }
    }
}

impl JsonRpcError {
    /// Error of the given kind with a custom message
    pub fn with_message(kind: RpcErrorKind, message: impl Into<String>) -> Self {
        Self {
            code: kind.code(),
            message: message.into(),
            data: None,
        }
    }

    /// Attach extra detail in the `data` field
    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }
}

impl From<RpcErrorKind> for JsonRpcError {
    fn from(kind: RpcErrorKind) -> Self {
        kind.error()
    }
}

impl JsonRpcResponse {
    /// Create a successful response
    pub fn success(id: Option<Value>, result: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    /// Create an error response
    pub fn error(id: Option<Value>, error: impl Into<JsonRpcError>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            result: None,
            error: Some(error.into()),
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

/// `initialize` parameters
#[derive(Debug, Deserialize)]
pub struct InitializeParams {
    /// MCP protocol version the client speaks
    #[serde(rename = "protocolVersion", default)]
    pub protocol_version: String,
}

/// `initialize` result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeResult {
    pub name: String,
    pub version: String,
    pub protocol_version: String,
}

impl Default for InitializeResult {
    fn default() -> Self {
        Self {
            name: SERVER_NAME.to_string(),
            version: SERVER_VERSION.to_string(),
            protocol_version: MCP_VERSION.to_string(),
        }
    }
}

/// MCP tool definition
///
/// This describes a tool the server exposes through `tools.list`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDefinition {
    /// Tool name used by `tools.call`
    pub name: &'static str,
    /// Short human-readable title
    pub title: &'static str,
    /// Human-readable description
    pub description: &'static str,
    /// JSON schema for the tool's input parameters
    pub input_schema: Value,
    /// Whether the tool may use credentials from the provider config
    #[serde(rename = "requiresAPIKeys", skip_serializing_if = "std::ops::Not::not")]
    pub requires_api_keys: bool,
}

impl ToolDefinition {
    /// Names listed under `required` in the input schema
    pub fn required_arguments(&self) -> Vec<&str> {
        self.input_schema
            .get("required")
            .and_then(Value::as_array)
            .map(|names| names.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default()
    }

    /// Default declared for an argument in the input schema
    pub fn argument_default(&self, argument: &str) -> Option<&Value> {
        self.input_schema
            .get("properties")
            .and_then(|properties| properties.get(argument))
            .and_then(|property| property.get("default"))
    }
}

/// `tools.list` result
#[derive(Debug, Serialize)]
pub struct ToolsListResult {
    pub tools: &'static [ToolDefinition],
}

/// MCP tool call parameters
#[derive(Debug, Deserialize)]
pub struct ToolCallParams {
    /// Name of the tool to call (e.g., "enumerateSubdomains")
    #[serde(default)]
    pub name: String,
    /// Arguments to pass to the tool
    #[serde(default)]
    pub arguments: Option<Map<String, Value>>,
}

/// Content returned by a tool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ToolContent {
    /// Plain text
    Text { text: String },
    /// Base64-encoded payload with a MIME type
    Resource {
        #[serde(rename = "mimeType")]
        mime_type: String,
        blob: String,
    },
}

/// MCP tool call result
///
/// `is_error` flags a failure of the tool's operation; protocol failures
/// are reported as JSON-RPC errors instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCallResult {
    /// Tool execution results
    pub content: Vec<ToolContent>,
    /// Whether this is an error result
    #[serde(rename = "isError", default, skip_serializing_if = "std::ops::Not::not")]
    pub is_error: bool,
}

impl ToolCallResult {
    /// Create a successful tool result from content items
    pub fn success(content: Vec<ToolContent>) -> Self {
        Self {
            content,
            is_error: false,
        }
    }

    /// Create an error tool result
    pub fn error(error_message: String) -> Self {
        Self {
            content: vec![ToolContent::Text {
                text: error_message,
            }],
            is_error: true,
        }
    }
}
