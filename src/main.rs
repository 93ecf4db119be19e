//
// Purpose:
//
// This Rust application implements an MCP (Model Context Protocol) server that acts as a
// bridge to a Splunk SOAR instance. It exposes a fixed set of SOAR REST endpoints as tools
// that can be invoked by MCP clients (e.g., AI assistants, automation scripts).
//
// Structure:
// - `main()`: Entry point of the application. Initializes logging (tracing), loads the
//   SOAR configuration from the environment, and starts either the stdio MCP server or
//   the HTTP transport.
//
// - `SoarToolsServer` (library `server` module): implements `rmcp::ServerHandler`,
//   answering `tools/list` from the tool registry and forwarding `tools/call` to the
//   dispatcher.
//
// - `Dispatcher` (library `dispatcher` module): resolves the tool, validates arguments,
//   calls SOAR through `SoarClient`, and turns every per-call failure into an error
//   response so the server keeps running.
//
// Workflow:
// 1. Server starts and listens for MCP requests on stdio.
// 2. MCP client sends a `call_tool` request.
// 3. The dispatcher looks the tool up, checks parameters and builds the SOAR request.
// 4. `SoarClient` performs the HTTP call with the configured token.
// 5. The JSON result (or a structured error) is packaged into a `CallToolResult`
//    and sent back to the MCP client.
//
// Configuration:
// The server requires `SPLUNK_SOAR_URL` and `SPLUNK_SOAR_TOKEN`. `SPLUNK_SOAR_VERIFY_SSL`
// and `SPLUNK_SOAR_TIMEOUT_SECS` are optional. Logging is controlled by `RUST_LOG`.

use anyhow::Context;
use clap::{Parser, ValueEnum};
use dotenv::dotenv;
use mcp_server_splunk_soar::{http, SoarConfig, SoarToolsServer};
use rmcp::{transport::stdio, ServiceExt};
use std::net::{IpAddr, SocketAddr};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Transport {
    Stdio,
    Http,
}

#[derive(Parser, Debug)]
#[command(name = "mcp-server-splunk-soar")]
#[command(about = "Splunk SOAR MCP Server")]
struct Args {
    /// Transport used to talk to the MCP client
    #[arg(long, value_enum, default_value_t = Transport::Stdio)]
    transport: Transport,

    /// Address the HTTP transport binds to
    #[arg(long, default_value = "127.0.0.1")]
    host: IpAddr,

    /// Port for the HTTP transport
    #[arg(long, env = "MCP_PORT", default_value_t = 8080)]
    port: u16,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    tracing::info!("Starting Splunk SOAR MCP Server...");

    let config = SoarConfig::from_env().inspect_err(|e| {
        tracing::error!("Invalid configuration: {}", e);
    })?;
    tracing::info!(base_url = %config.base_url, "Loaded SOAR configuration");

    let server = SoarToolsServer::new(&config).context("Error initializing Splunk SOAR tools server")?;

    match args.transport {
        Transport::Stdio => {
            tracing::info!("Using stdio transport");
            let service = server.serve(stdio()).await.inspect_err(|e| {
                tracing::error!("serving error: {:?}", e);
            })?;

            tokio::select! {
                quit = service.waiting() => {
                    let reason = quit?;
                    tracing::info!(?reason, "Input stream closed, shutting down");
                }
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("Shutdown signal received");
                }
            }
        }
        Transport::Http => {
            let addr = SocketAddr::new(args.host, args.port);
            tracing::info!(%addr, "Using HTTP transport");
            http::serve(server.dispatcher(), addr).await?;
        }
    }

    Ok(())
}
