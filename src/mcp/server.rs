/// MCP request dispatcher
///
/// This module turns raw JSON-RPC payloads into responses:
/// 1. Detects single vs. batch payloads and parses them
/// 2. Routes each request to `initialize`, `tools.list` or `tools.call`
/// 3. Maps every failure to a JSON-RPC error, never to a panic
///
/// Notifications (requests without an `id`) are processed but never
/// answered.

use std::sync::Arc;

use futures::stream::{self, StreamExt};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Map, Value};
use tracing::{debug, error, info, warn};

use crate::enumeration::{EnumerationContext, SubdomainProvider};
use crate::mcp::protocol::*;
use crate::tools;

/// What the transport should send back for one payload
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RpcReply {
    /// Response to a single request
    Single(JsonRpcResponse),
    /// Responses to a batch, notifications omitted
    Batch(Vec<JsonRpcResponse>),
    /// Nothing to send (a single notification)
    #[serde(skip)]
    Empty,
}

impl RpcReply {
    pub fn is_empty(&self) -> bool {
        matches!(self, RpcReply::Empty)
    }
}

/// MCP server that dispatches JSON-RPC requests to the subfinder tool
///
/// Holds no mutable state, so one instance can serve concurrent requests.
pub struct McpServer {
    provider: Arc<dyn SubdomainProvider>,
}

impl McpServer {
    /// Create a new MCP server backed by `provider`
    pub fn new(provider: Arc<dyn SubdomainProvider>) -> Self {
        Self { provider }
    }

    /// Handle one raw payload (single request or batch)
    pub async fn handle_payload(&self, payload: &[u8], ctx: &EnumerationContext) -> RpcReply {
        let is_batch = payload
            .iter()
            .find(|byte| !byte.is_ascii_whitespace())
            .is_some_and(|byte| *byte == b'[');

        let parsed: Value = match serde_json::from_slice(payload) {
            Ok(value) => value,
            Err(e) => {
                error!(error = %e, batch = is_batch, "Failed to parse request payload");
                let response = JsonRpcResponse::error(None, RpcErrorKind::Parse);
                return if is_batch {
                    RpcReply::Batch(vec![response])
                } else {
                    RpcReply::Single(response)
                };
            }
        };

        match parsed {
            Value::Array(items) if is_batch => self.handle_batch(items, ctx).await,
            single => match self.handle_value(single, ctx).await {
                Some(response) => RpcReply::Single(response),
                None => RpcReply::Empty,
            },
        }
    }

    async fn handle_batch(&self, items: Vec<Value>, ctx: &EnumerationContext) -> RpcReply {
        if items.is_empty() {
            warn!("Received empty batch");
            return RpcReply::Single(JsonRpcResponse::error(None, RpcErrorKind::InvalidRequest));
        }

        debug!(size = items.len(), "Processing batch request");
        let responses: Vec<JsonRpcResponse> = stream::iter(items)
            .then(|item| self.handle_value(item, ctx))
            .filter_map(|response| async move { response })
            .collect()
            .await;

        RpcReply::Batch(responses)
    }

    /// Validate one request object and process it
    async fn handle_value(&self, value: Value, ctx: &EnumerationContext) -> Option<JsonRpcResponse> {
        match serde_json::from_value::<JsonRpcRequest>(value) {
            Ok(request) => self.process_request(request, ctx).await,
            Err(e) => {
                warn!(error = %e, "Invalid JSON-RPC request object");
                Some(
                    JsonRpcResponse::error(None, RpcErrorKind::InvalidRequest)
                        .with_detail(e.to_string()),
                )
            }
        }
    }

    /// Handle a JSON-RPC request, returning `None` for notifications
    pub async fn process_request(
        &self,
        request: JsonRpcRequest,
        ctx: &EnumerationContext,
    ) -> Option<JsonRpcResponse> {
        let notification = request.is_notification();
        let method = request.method.clone();

        let response = match method.as_str() {
            "initialize" => self.handle_initialize(request),
            "tools.list" => self.handle_tools_list(request),
            "tools.call" => self.handle_tools_call(request, ctx).await,
            method => {
                if notification {
                    debug!(method = %method, "Ignoring notification for unknown method");
                    return None;
                }
                warn!(method = %method, "Method not found");
                JsonRpcResponse::error(request.id, RpcErrorKind::MethodNotFound)
            }
        };

        if notification {
            debug!(is_error = response.is_error(), "Dropping response to notification");
            return None;
        }
        Some(response)
    }

    /// Handle MCP initialization request
    fn handle_initialize(&self, request: JsonRpcRequest) -> JsonRpcResponse {
        let params: InitializeParams = match decode_params(&request) {
            Ok(params) => params,
            Err(e) => {
                warn!(error = %e, "Failed to parse initialize params");
                return JsonRpcResponse::error(request.id, RpcErrorKind::Parse);
            }
        };

        if params.protocol_version != MCP_VERSION {
            warn!(
                requested = %params.protocol_version,
                supported = MCP_VERSION,
                "Unsupported protocol version"
            );
            return JsonRpcResponse::error(
                request.id,
                JsonRpcError::with_message(
                    RpcErrorKind::InvalidParams,
                    format!(
                        "Unsupported protocol version: {}. Server supports: {}",
                        params.protocol_version, MCP_VERSION
                    ),
                ),
            );
        }

        info!(protocol_version = MCP_VERSION, "MCP client initialized");
        encode_result(request.id, &InitializeResult::default())
    }

    /// Handle tools.list request
    fn handle_tools_list(&self, request: JsonRpcRequest) -> JsonRpcResponse {
        encode_result(
            request.id,
            &ToolsListResult {
                tools: tools::registry(),
            },
        )
    }

    /// Handle tools.call request
    async fn handle_tools_call(
        &self,
        request: JsonRpcRequest,
        ctx: &EnumerationContext,
    ) -> JsonRpcResponse {
        let params: ToolCallParams = match decode_params(&request) {
            Ok(params) => params,
            Err(e) => {
                error!(error = %e, "Failed to parse tools.call params");
                return JsonRpcResponse::error(request.id, RpcErrorKind::Parse);
            }
        };

        let Some(tool) = tools::find_tool(&params.name) else {
            warn!(requested_tool = %params.name, "Tool not found");
            return JsonRpcResponse::error(request.id, RpcErrorKind::MethodNotFound);
        };

        let arguments = params.arguments.unwrap_or_else(Map::new);
        match tools::call_tool(tool, self.provider.as_ref(), &arguments, ctx).await {
            Ok(result) => encode_result(request.id, &result),
            Err(e) => JsonRpcResponse::error(request.id, e.rpc_kind()).with_detail(e.to_string()),
        }
    }
}

impl JsonRpcResponse {
    /// Attach a human-readable detail to an error response
    fn with_detail(mut self, detail: String) -> Self {
        if let Some(error) = self.error.take() {
            self.error = Some(error.with_data(Value::String(detail)));
        }
        self
    }
}

fn decode_params<T: DeserializeOwned>(request: &JsonRpcRequest) -> Result<T, serde_json::Error> {
    serde_json::from_value(request.params.clone().unwrap_or(Value::Null))
}

fn encode_result<T: Serialize>(id: Option<Value>, result: &T) -> JsonRpcResponse {
    match serde_json::to_value(result) {
        Ok(value) => JsonRpcResponse::success(id, value),
        Err(e) => {
            error!(error = %e, "Failed to encode result");
            JsonRpcResponse::error(id, RpcErrorKind::Internal)
        }
    }
}

/// Body of the health endpoint
pub fn health_status() -> Value {
    json!({"status": "ok"})
}
