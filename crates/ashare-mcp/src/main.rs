use anyhow::{Context, Result};
use ashare_mcp::FundFlowServer;
use rmcp::{transport::stdio, ServiceExt};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Logging MUST go to stderr; stdout carries the MCP protocol.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("ashare_mcp=info".parse()?),
        )
        .init();

    let server = FundFlowServer::new().context("failed to initialize market-data client")?;
    info!("starting MCP server over stdio");

    let service = server
        .serve(stdio())
        .await
        .context("failed to start MCP server")?;
    service.waiting().await?;

    Ok(())
}
