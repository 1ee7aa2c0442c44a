/// MCP tools exposed by the server
///
/// The registry is a process-wide, immutable list built once on first use.
/// `tools.list` serves it verbatim and `tools.call` resolves tool names and
/// required arguments against it.

pub mod enumerate;

pub use enumerate::*;

use std::sync::LazyLock;

use serde_json::{json, Map, Value};

use crate::enumeration::{EnumerationContext, SubdomainProvider};
use crate::mcp::protocol::{ToolCallResult, ToolDefinition};

/// Name of the subdomain enumeration tool
pub const ENUMERATE_SUBDOMAINS: &str = "enumerateSubdomains";

static REGISTRY: LazyLock<Vec<ToolDefinition>> =
    LazyLock::new(|| vec![enumerate_subdomains_definition()]);

fn enumerate_subdomains_definition() -> ToolDefinition {
    ToolDefinition {
        name: ENUMERATE_SUBDOMAINS,
        title: "Enumerate Subdomains",
        description: "Discovers subdomains for a given domain using passive sources via subfinder. \
                      When no subdomain is found, a list of common subdomain names \
                      (www, mail, api, ...) is returned as unverified suggestions.",
        input_schema: json!({
            "type": "object",
            "properties": {
                "domain": {
                    "type": "string",
                    "description": "The base domain to enumerate subdomains for (e.g., example.com)"
                },
                "timeout": {
                    "type": "integer",
                    "description": "Maximum time in seconds to run enumeration (default: 60)",
                    "default": 60
                },
                "maxDepth": {
                    "type": "integer",
                    "description": "Maximum depth to explore for subdomain enumeration (default: 1)",
                    "default": 1
                },
                "sourcesFilter": {
                    "type": "string",
                    "description": "Comma-separated list of sources to use (default: all sources)"
                },
                "excludeSourcesFilter": {
                    "type": "string",
                    "description": "Comma-separated list of sources to exclude"
                },
                "recursive": {
                    "type": "boolean",
                    "description": "Enable recursive subdomain discovery (default: false)",
                    "default": false
                }
            },
            "required": ["domain"]
        }),
        requires_api_keys: true,
    }
}

/// Every tool the server exposes
pub fn registry() -> &'static [ToolDefinition] {
    REGISTRY.as_slice()
}

/// Look up a tool by name
pub fn find_tool(name: &str) -> Option<&'static ToolDefinition> {
    registry().iter().find(|tool| tool.name == name)
}

/// Execute a registered tool.
///
/// Argument problems come back as `ToolError`; failures of the operation
/// itself are reported inside the returned `ToolCallResult`.
pub async fn call_tool<P>(
    tool: &ToolDefinition,
    provider: &P,
    arguments: &Map<String, Value>,
    ctx: &EnumerationContext,
) -> Result<ToolCallResult, ToolError>
where
    P: SubdomainProvider + ?Sized,
{
    match tool.name {
        ENUMERATE_SUBDOMAINS => call_enumerate_subdomains(tool, provider, arguments, ctx).await,
        other => Err(ToolError::UnknownTool(other.to_string())),
    }
}
