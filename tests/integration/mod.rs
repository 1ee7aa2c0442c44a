/// Integration tests for the MCP Subfinder server
mod support;

mod enumeration_integration;
mod http_integration;
