//! The `screen` subcommand: run the large-fund-flow screen against live
//! data and print the hits.

use anyhow::{Context, Result};
use ashare_lib::FlowDirection;
use ashare_mcp::types::{LargeFundFlowInput, LargeFundFlowOutput};
use ashare_mcp::FundFlowServer;
use clap::Args;

#[derive(Args, Debug)]
pub struct ScreenArgs {
    /// Minimum |main-fund net inflow| in wan CNY.
    #[arg(long = "main-fund-wan", default_value_t = 5000.0)]
    pub main_fund_wan: f64,

    /// Minimum turnover as a percent of market cap.
    #[arg(long = "turnover-share", default_value_t = 6.0)]
    pub turnover_share_pct: f64,

    /// Minimum |price change| in percent.
    #[arg(long = "price-change", default_value_t = 3.0)]
    pub price_change_pct: f64,

    /// Minimum main-fund share of turnover in percent.
    #[arg(long = "main-fund-share", default_value_t = 10.0)]
    pub main_fund_share_pct: f64,

    /// Board to screen: all, sh_sz_a, sh_a, star, sz_a, chinext, sh_b, sz_b.
    #[arg(long, default_value = "all")]
    pub board: String,

    /// Maximum number of results (1 to 100).
    #[arg(long = "max-results", default_value_t = 10)]
    pub max_results: usize,

    /// Sort key: main_fund or turnover_share.
    #[arg(long = "sort-by", default_value = "main_fund")]
    pub sort_by: String,

    /// Also fetch institutional and shareholder holding trends (slower).
    #[arg(long)]
    pub holdings: bool,

    /// Print the raw JSON response instead of a table.
    #[arg(long)]
    pub json: bool,
}

pub async fn run(args: ScreenArgs) -> Result<()> {
    let input = LargeFundFlowInput {
        main_fund_threshold_wan: args.main_fund_wan,
        turnover_share_threshold_pct: args.turnover_share_pct,
        price_change_threshold_pct: args.price_change_pct,
        main_fund_share_threshold_pct: args.main_fund_share_pct,
        board: args.board,
        max_results: args.max_results,
        sort_by: args.sort_by,
        analyze_holdings: args.holdings,
        use_cache: true,
    };

    let server = FundFlowServer::new().context("failed to initialize market-data client")?;
    let output = server.run_large_fund_flow(input).await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    print_table(&output);
    Ok(())
}

fn print_table(output: &LargeFundFlowOutput) {
    println!(
        "Board {}: {} candidates, {} matched, showing {}",
        output.board,
        output.total_candidates,
        output.matched,
        output.stocks.len()
    );

    if output.stocks.is_empty() {
        println!("No stocks cleared the thresholds.");
        return;
    }

    for (rank, stock) in output.stocks.iter().enumerate() {
        let ind = &stock.indicators;
        let direction = match ind.direction {
            FlowDirection::Inflow => "inflow",
            FlowDirection::Outflow => "outflow",
        };
        println!(
            "{:>2}. {} {:<12} {:>9.2} {:>+7.2}%  main {:>11.0} wan ({})",
            rank + 1,
            ind.code,
            ind.name,
            ind.last_price,
            ind.change_pct,
            ind.main_net_inflow_wan,
            direction
        );
        println!(
            "    turnover {:>11.0} wan  turnover share {:>6.2}%  main-fund share {:>6.2}%",
            ind.turnover_wan, ind.turnover_share_pct, ind.main_fund_share_pct
        );
    }
}
