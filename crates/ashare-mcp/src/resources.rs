//! MCP resource implementations for analysis documentation
//!
//! This module defines the four resources exposed by the MCP server:
//! - resources://funds/analysis_guide: quantitative screening guide
//! - resources://funds/analysis_examples: worked example scenarios
//! - resources://funds/indicators_explanation: indicator definitions
//! - config://version: server version string

use crate::error::{Error, Result};

/// Descriptor for MCP resources exposed by the server
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceDescriptor {
    pub uri: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub mime_type: &'static str,
}

/// List all resources exposed by this server
pub fn list_resources() -> Vec<ResourceDescriptor> {
    vec![
        ResourceDescriptor {
            uri: "resources://funds/analysis_guide",
            title: "Fund Flow Analysis Guide",
            description: "How to screen for large-fund activity and read the results",
            mime_type: "text/markdown",
        },
        ResourceDescriptor {
            uri: "resources://funds/analysis_examples",
            title: "Fund Flow Analysis Examples",
            description: "Worked screening scenarios with parameter choices",
            mime_type: "text/markdown",
        },
        ResourceDescriptor {
            uri: "resources://funds/indicators_explanation",
            title: "Indicator Definitions",
            description: "Definitions of every indicator in tool outputs",
            mime_type: "text/markdown",
        },
        ResourceDescriptor {
            uri: "config://version",
            title: "Server Version",
            description: "ashare-mcp server version string",
            mime_type: "text/plain",
        },
    ]
}

/// Read a resource by URI
pub fn read_resource(uri: &str) -> Result<&'static str> {
    match uri {
        "resources://funds/analysis_guide" => Ok(ANALYSIS_GUIDE),
        "resources://funds/analysis_examples" => Ok(ANALYSIS_EXAMPLES),
        "resources://funds/indicators_explanation" => Ok(INDICATORS_EXPLANATION),
        "config://version" => Ok(env!("CARGO_PKG_VERSION")),
        other => Err(Error::not_found(format!("Unknown resource: {}", other))),
    }
}

const ANALYSIS_GUIDE: &str = r#"# Large Fund Flow Analysis Guide

The `analyze_large_fund_flow` tool screens the whole market (or one board)
for stocks where main funds (large and extra-large orders, the conventional
proxy for institutional money) moved decisively today.

## Screening conditions

A stock passes the screen only when all four hold:

1. |main-fund net inflow| >= main_fund_threshold_wan (wan CNY)
2. turnover / market cap >= turnover_share_threshold_pct (%)
3. |price change| >= price_change_threshold_pct (%)
4. |main-fund net inflow| / turnover >= main_fund_share_threshold_pct (%)

Inflow and outflow both count: a heavy outflow on volume is as much of a
signal as a heavy inflow. Use the `direction` field to tell them apart.

## Choosing thresholds

- Defaults (5000 wan / 6% / 3% / 10%) suit liquid mid-to-large caps.
- Raise the main-fund threshold to 10000+ wan to keep only heavyweight moves.
- Lower turnover share to 3% when screening large caps, whose turnover is a
  small fraction of their market cap even on busy days.
- The `board` parameter narrows the universe: "star" and "chinext" for
  growth boards, "sh_sz_a" to exclude B shares.

## Reading the results

Price direction versus flow direction is the key reading:

- Inflow with price up: consistent accumulation.
- Inflow with price down: possible absorption during a washout.
- Outflow with price up: possible distribution into strength. Caution.
- Outflow with price down: consistent withdrawal.

When `analyze_holdings` is enabled, each hit carries institutional and
top-shareholder trends from the latest published reports. A same-day flow
signal backed by a rising institutional ratio is a stronger signal than one
where institutions have been reducing.

Follow up on individual hits with `analyze_stock_fund_flow_detail` to see
whether today's move continues a multi-day pattern or stands alone.
"#;

const ANALYSIS_EXAMPLES: &str = r#"# Fund Flow Analysis Examples

## Example 1: default market-wide screen

Call `analyze_large_fund_flow` with no parameters. This screens every board
with the default thresholds and returns the top 10 stocks by |main-fund net
inflow|.

## Example 2: heavyweight accumulation on the STAR Market

```json
{
  "board": "star",
  "main_fund_threshold_wan": 10000,
  "price_change_threshold_pct": 5.0,
  "sort_by": "main_fund"
}
```

Only STAR Market stocks with at least one yi CNY of net main-fund movement
and a 5%+ price move.

## Example 3: high-turnover screen, holdings skipped

```json
{
  "sort_by": "turnover_share",
  "turnover_share_threshold_pct": 10.0,
  "analyze_holdings": false,
  "max_results": 20
}
```

Sorts by turnover share instead of flow size. Skipping holdings makes the
call considerably faster since no per-stock report lookups are needed.

## Example 4: single-stock follow-up

After a screen surfaces 600519, check whether the flow is sustained:

```json
{ "stock_code": "600519", "days": 10 }
```

via `analyze_stock_fund_flow_detail`. The `bias` field classifies the
10-day flow-versus-price relationship; `inflow_days` versus `outflow_days`
shows persistence.
"#;

const INDICATORS_EXPLANATION: &str = r#"# Indicator Definitions

## Units

- wan = 10,000 CNY
- yi = 100,000,000 CNY

## Screen result fields

- `main_net_inflow_wan`: main-fund net inflow in wan CNY, derived as
  turnover x main_net_ratio_pct / 100. Negative means net outflow.
- `main_net_ratio_pct`: main-fund net inflow as a percent of turnover, as
  published by the ranking source. Signed.
- `direction`: "inflow" or "outflow", the sign of the net flow.
- `turnover_wan`: today's turnover in wan CNY.
- `market_cap_yi`: total market capitalization in yi CNY.
- `turnover_share_pct`: turnover / market cap x 100. A liquidity measure;
  high values mean a large slice of the company changed hands today.
- `main_fund_share_pct`: |main-fund net inflow| / turnover x 100. How much
  of today's trading was directional main-fund money.

## Per-stock flow summary fields

- `total_main_net`: sum of daily main-fund net inflows over the window, CNY.
- `inflow_days` / `outflow_days`: count of net-inflow and net-outflow days.
- `avg_main_ratio_pct`: mean daily main-fund ratio over the window.
- `cumulative_change_pct`: compounded price change over the window.
- `small_net` / `medium_net` / `large_net` / `xlarge_net`: net flow by
  order size bucket, summed over the window, CNY.
- `bias`: flow-versus-price classification (`inflow_price_up`,
  `inflow_price_down`, `outflow_price_up`, `outflow_price_down`, `flat`).

## Holdings fields

- Institutional trend compares the two most recent published report
  periods: total ratio delta, org count delta, and how many orgs raised,
  cut, or held their positions.
- Shareholder trend compares the two most recent top-ten rosters:
  per-holder ratio changes on the intersection plus new and exited holders.
- Holdings data updates quarterly; it is cached for 24 hours.
"#;
