/// Main entry point for the MCP Subfinder server
///
/// This file sets up logging, parses command line arguments, prepares the
/// provider config and starts the HTTP server.

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use mcp_subfinder_server::config::{default_provider_config_path, ensure_provider_config};
use mcp_subfinder_server::{SubfinderCliProvider, SubfinderServer};

/// Longest accepted per-request budget (one day)
const MAX_REQUEST_TIMEOUT_SECS: u64 = 86_400;

/// Command line arguments for the MCP Subfinder server
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Address to listen on
    #[arg(long, default_value = "0.0.0.0")]
    host: IpAddr,

    /// Port to listen on
    #[arg(short, long, default_value_t = 8080)]
    port: u16,

    /// Path to subfinder's provider-config.yaml
    /// If not provided, uses provider-config.yaml in the working directory
    #[arg(long)]
    provider_config: Option<PathBuf>,

    /// subfinder executable to run
    #[arg(long, default_value = "subfinder")]
    subfinder_bin: PathBuf,

    /// Maximum seconds spent handling one HTTP request
    #[arg(
        long,
        default_value_t = 30,
        value_parser = clap::value_parser!(u64).range(1..=MAX_REQUEST_TIMEOUT_SECS)
    )]
    request_timeout: u64,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Enable verbose output (implies debug)
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Set up logging based on command line flags
    let log_level = if args.verbose {
        "debug"
    } else if args.debug {
        "info"
    } else {
        "warn"
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("mcp_subfinder_server={log_level}")));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    info!("Starting MCP Subfinder server");

    let provider_config = args
        .provider_config
        .unwrap_or_else(default_provider_config_path);
    ensure_provider_config(&provider_config)?;
    info!(path = %provider_config.display(), "Using provider config");

    let provider = SubfinderCliProvider::new(args.subfinder_bin, provider_config);
    let server = SubfinderServer::new(Arc::new(provider))
        .with_request_timeout(Duration::from_secs(args.request_timeout));

    server.run(SocketAddr::new(args.host, args.port)).await?;

    info!("MCP Subfinder server shutdown complete");
    Ok(())
}
