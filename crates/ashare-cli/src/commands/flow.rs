//! The `flow` subcommand: per-stock N-day fund-flow summary.

use anyhow::{Context, Result};
use ashare_mcp::types::{StockFlowDetailInput, StockFlowDetailOutput};
use ashare_mcp::FundFlowServer;
use clap::Args;

#[derive(Args, Debug)]
pub struct FlowArgs {
    /// Six-digit stock code; exchange suffixes like ".SH" are accepted.
    pub code: String,

    /// Number of trailing trading days to summarize (1 to 60).
    #[arg(long, default_value_t = 5)]
    pub days: usize,

    /// Print the raw JSON response instead of a summary.
    #[arg(long)]
    pub json: bool,
}

pub async fn run(args: FlowArgs) -> Result<()> {
    let server = FundFlowServer::new().context("failed to initialize market-data client")?;
    let output = server
        .run_stock_flow_detail(StockFlowDetailInput {
            stock_code: args.code,
            days: args.days,
        })
        .await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    print_summary(&output);
    Ok(())
}

fn print_summary(output: &StockFlowDetailOutput) {
    let s = &output.summary;
    println!(
        "{}: last {} trading days (requested {})",
        output.stock_code, s.days_covered, output.days_requested
    );
    println!(
        "  main-fund net {:>+12.0} CNY  ({} inflow days, {} outflow days)",
        s.total_main_net, s.inflow_days, s.outflow_days
    );
    println!(
        "  avg main ratio {:>+6.2}%  cumulative change {:>+6.2}%  bias {:?}",
        s.avg_main_ratio_pct, s.cumulative_change_pct, s.bias
    );
    println!(
        "  by order size: small {:>+.0}  medium {:>+.0}  large {:>+.0}  xlarge {:>+.0}",
        s.small_net, s.medium_net, s.large_net, s.xlarge_net
    );

    for day in &s.days {
        println!(
            "  {}  close {:>8.2} {:>+6.2}%  main {:>+12.0} ({:>+6.2}%)",
            day.date, day.close, day.change_pct, day.main_net, day.main_ratio_pct
        );
    }
}
