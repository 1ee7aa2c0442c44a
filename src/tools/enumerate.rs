/// Tool for enumerating subdomains
///
/// This module implements the enumerateSubdomains MCP tool: argument
/// decoding, the call into the orchestrator, and result formatting.

use std::fmt::Debug;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::enumeration::{
    enumerate_subdomains, EnumerationConfig, EnumerationContext, EnumerationError,
    SubdomainProvider,
};
use crate::mcp::protocol::{RpcErrorKind, ToolCallResult, ToolContent, ToolDefinition};

/// MIME type of the resource item carrying the full subdomain list
pub const RESULT_MIME_TYPE: &str = "text/plain";

/// Errors caused by the tool call itself rather than by the enumeration
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ToolError {
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Missing required argument: {0}")]
    MissingArgument(String),

    #[error("Invalid domain argument: expected a non-empty string")]
    InvalidDomain,
}

impl ToolError {
    /// Protocol error reported for this failure.
    ///
    /// An unknown tool is reported like an unknown method.
    pub fn rpc_kind(&self) -> RpcErrorKind {
        match self {
            ToolError::UnknownTool(_) => RpcErrorKind::MethodNotFound,
            ToolError::MissingArgument(_) | ToolError::InvalidDomain => RpcErrorKind::InvalidParams,
        }
    }
}

/// Validated arguments of an enumerateSubdomains call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumerateRequest {
    pub domain: String,
    pub config: EnumerationConfig,
}

/// Per-field decoder for optional arguments.
///
/// A present value of the wrong shape is logged and replaced by the
/// default instead of failing the call.
struct OptionalArguments<'a> {
    arguments: &'a Map<String, Value>,
}

impl OptionalArguments<'_> {
    fn decode<T: Debug>(&self, name: &str, default: T, extract: impl FnOnce(&Value) -> Option<T>) -> T {
        let Some(provided) = self.arguments.get(name) else {
            return default;
        };
        match extract(provided) {
            Some(value) => {
                debug!(argument = name, value = ?value, "Using custom argument");
                value
            }
            None => {
                warn!(
                    argument = name,
                    provided = %provided,
                    default = ?default,
                    "Invalid argument, using default"
                );
                default
            }
        }
    }
}

fn positive_integer(value: &Value) -> Option<u64> {
    value.as_u64().filter(|n| *n > 0).or_else(|| {
        value
            .as_f64()
            .filter(|n| n.is_finite() && *n >= 1.0)
            .map(|n| n as u64)
    })
}

fn non_empty_string(value: &Value) -> Option<Option<String>> {
    value
        .as_str()
        .filter(|s| !s.trim().is_empty())
        .map(|s| Some(s.to_string()))
}

/// Decode and validate enumerateSubdomains arguments.
///
/// Required arguments are checked strictly; optional ones fall back to
/// their defaults.
pub fn decode_enumerate_arguments(
    tool: &ToolDefinition,
    arguments: &Map<String, Value>,
) -> Result<EnumerateRequest, ToolError> {
    for required in tool.required_arguments() {
        if !arguments.contains_key(required) {
            warn!(argument = required, "Missing required argument");
            return Err(ToolError::MissingArgument(required.to_string()));
        }
    }

    let domain = match arguments.get("domain") {
        None => {
            warn!("Missing required domain parameter");
            return Err(ToolError::MissingArgument("domain".to_string()));
        }
        Some(value) => match value.as_str().map(str::trim) {
            Some(domain) if !domain.is_empty() => domain.to_string(),
            _ => {
                warn!(domain = %value, "Invalid domain parameter");
                return Err(ToolError::InvalidDomain);
            }
        },
    };

    let defaults = EnumerationConfig::default();
    let optional = OptionalArguments { arguments };
    let config = EnumerationConfig {
        timeout_secs: optional.decode("timeout", defaults.timeout_secs, positive_integer),
        max_depth: optional.decode("maxDepth", defaults.max_depth, |value| {
            positive_integer(value).and_then(|n| u32::try_from(n).ok())
        }),
        sources_filter: optional.decode("sourcesFilter", defaults.sources_filter, non_empty_string),
        exclude_sources_filter: optional.decode(
            "excludeSourcesFilter",
            defaults.exclude_sources_filter,
            non_empty_string,
        ),
        recursive: optional.decode("recursive", defaults.recursive, Value::as_bool),
    };

    Ok(EnumerateRequest { domain, config })
}

/// Turn an orchestrator outcome into the tool's result.
///
/// Success yields a short summary plus the newline-separated list as a
/// base64 `text/plain` resource. Failure yields one error-flagged text item.
pub fn enumeration_result(
    domain: &str,
    outcome: Result<Vec<String>, EnumerationError>,
) -> ToolCallResult {
    match outcome {
        Ok(subdomains) => {
            let payload = subdomains.join("\n");
            ToolCallResult::success(vec![
                ToolContent::Text {
                    text: format!("Found {} subdomains for {}", subdomains.len(), domain),
                },
                ToolContent::Resource {
                    mime_type: RESULT_MIME_TYPE.to_string(),
                    blob: STANDARD.encode(payload),
                },
            ])
        }
        Err(e) => {
            error!(domain = %domain, error = %e, "Subdomain enumeration failed");
            ToolCallResult::error(format!("Subdomain enumeration failed: {e}"))
        }
    }
}

/// Call the enumerateSubdomains tool
pub async fn call_enumerate_subdomains<P>(
    tool: &ToolDefinition,
    provider: &P,
    arguments: &Map<String, Value>,
    ctx: &EnumerationContext,
) -> Result<ToolCallResult, ToolError>
where
    P: SubdomainProvider + ?Sized,
{
    let request = decode_enumerate_arguments(tool, arguments)?;

    info!(domain = %request.domain, config = ?request.config, "Running subdomain enumeration");
    let outcome = enumerate_subdomains(provider, &request.domain, &request.config, ctx).await;

    Ok(enumeration_result(&request.domain, outcome))
}
