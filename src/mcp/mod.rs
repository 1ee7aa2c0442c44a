/// MCP protocol implementation
///
/// This module handles the Model Context Protocol communication,
/// including JSON-RPC parsing, method routing and the HTTP transport.

pub mod http;
pub mod protocol;
pub mod server;

// Re-export main types
pub use http::{router, DEFAULT_REQUEST_TIMEOUT};
pub use server::{McpServer, RpcReply};
