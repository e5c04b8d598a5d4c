use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use ashare_cli::commands::{flow, mcp, screen};

#[derive(Parser, Debug)]
#[command(author, version, about = "A-share capital-flow analysis utilities")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Screen the market for decisive main-fund moves.
    Screen(screen::ScreenArgs),
    /// Summarize one stock's recent fund flow.
    Flow(flow::FlowArgs),
    /// Run the MCP server over stdio.
    Mcp,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        // The MCP server configures its own stderr-only tracing.
        Command::Mcp => mcp::run_mcp_server().await,
        Command::Screen(args) => {
            init_tracing();
            screen::run(args).await
        }
        Command::Flow(args) => {
            init_tracing();
            flow::run(args).await
        }
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(env_filter)
        .finish();

    let _ = tracing::subscriber::set_global_default(subscriber);
}
