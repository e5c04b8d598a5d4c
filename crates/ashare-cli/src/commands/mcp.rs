//! The `mcp` subcommand: run the MCP server over stdio.

use anyhow::{Context, Result};
use ashare_mcp::FundFlowServer;
use rmcp::{transport::stdio, ServiceExt};

/// Configure tracing to write only to stderr.
///
/// stdout carries the MCP protocol; a single log line on stdout corrupts
/// the JSON-RPC stream.
pub fn configure_tracing() -> Result<()> {
    use tracing_subscriber::{fmt, EnvFilter};

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;

    Ok(())
}

/// Public entrypoint orchestrating the MCP server lifecycle.
pub async fn run_mcp_server() -> Result<()> {
    configure_tracing()?;

    let server = FundFlowServer::new().context("failed to initialize market-data client")?;
    tracing::info!("starting MCP server over stdio");

    let service = server
        .serve(stdio())
        .await
        .context("failed to start MCP server")?;
    service.waiting().await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
