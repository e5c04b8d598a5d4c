//! Large-fund-flow screening over joined quote and fund-flow rows.
//!
//! The screen joins today's main-fund ratio ranking with the spot snapshot
//! by stock code, derives the capital-flow indicators, and keeps the stocks
//! that clear every threshold:
//!
//! 1. |main-fund net inflow| at or above a wan-CNY floor
//! 2. turnover share (turnover / market cap) at or above a percent floor
//! 3. |percent change| at or above a percent floor
//! 4. main-fund share of turnover at or above a percent floor
//!
//! Inflow and outflow are both signals, hence the absolute values on (1)
//! and (3).

use std::collections::HashMap;

use serde::Serialize;

use crate::flow::MainFundFlowRow;
use crate::spot::SpotQuote;

const WAN: f64 = 10_000.0;

/// Direction of the main-fund net flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowDirection {
    Inflow,
    Outflow,
}

/// Screening thresholds. All comparisons are `>=`.
#[derive(Debug, Clone, PartialEq)]
pub struct ScreenThresholds {
    /// |main-fund net inflow| floor, in wan CNY.
    pub main_fund_net_wan: f64,
    /// Turnover as a percent of total market cap.
    pub turnover_share_pct: f64,
    /// |percent change| floor.
    pub price_change_pct: f64,
    /// |main-fund net inflow| as a percent of turnover.
    pub main_fund_share_pct: f64,
}

impl Default for ScreenThresholds {
    fn default() -> Self {
        Self {
            main_fund_net_wan: 5_000.0,
            turnover_share_pct: 6.0,
            price_change_pct: 3.0,
            main_fund_share_pct: 10.0,
        }
    }
}

/// Sort key for screen results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortBy {
    /// Descending by |main-fund net inflow|.
    #[default]
    MainFund,
    /// Descending by turnover share.
    TurnoverShare,
}

/// Derived per-stock indicators for one screen hit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StockIndicators {
    pub code: String,
    pub name: String,
    pub last_price: f64,
    pub change_pct: f64,
    /// Main-fund net inflow in wan CNY; negative for outflow.
    pub main_net_inflow_wan: f64,
    /// Main-fund net inflow as a percent of turnover (signed, from the
    /// ranking endpoint).
    pub main_net_ratio_pct: f64,
    pub direction: FlowDirection,
    /// Turnover in wan CNY.
    pub turnover_wan: f64,
    /// Total market cap in yi (hundred-million) CNY.
    pub market_cap_yi: f64,
    /// Turnover as a percent of total market cap.
    pub turnover_share_pct: f64,
    /// |main-fund net inflow| as a percent of turnover.
    pub main_fund_share_pct: f64,
}

/// Join, derive, filter, sort, and truncate.
///
/// Rows missing a quote counterpart, or with a non-positive turnover or
/// market cap, are skipped so no derived ratio divides by zero.
pub fn screen_fund_flow(
    flows: &[MainFundFlowRow],
    quotes: &[SpotQuote],
    thresholds: &ScreenThresholds,
    sort_by: SortBy,
    max_results: usize,
) -> Vec<StockIndicators> {
    let quotes_by_code: HashMap<&str, &SpotQuote> =
        quotes.iter().map(|q| (q.code.as_str(), q)).collect();

    let mut hits: Vec<StockIndicators> = flows
        .iter()
        .filter_map(|flow| {
            let quote = quotes_by_code.get(flow.code.as_str())?;
            derive_indicators(flow, quote)
        })
        .filter(|row| passes(row, thresholds))
        .collect();

    match sort_by {
        SortBy::MainFund => hits.sort_by(|a, b| {
            b.main_net_inflow_wan
                .abs()
                .total_cmp(&a.main_net_inflow_wan.abs())
        }),
        SortBy::TurnoverShare => {
            hits.sort_by(|a, b| b.turnover_share_pct.total_cmp(&a.turnover_share_pct))
        }
    }

    hits.truncate(max_results);
    hits
}

fn derive_indicators(flow: &MainFundFlowRow, quote: &SpotQuote) -> Option<StockIndicators> {
    let ratio = flow.main_net_ratio_pct?;
    let turnover = quote.turnover.filter(|t| *t > 0.0)?;
    let market_cap = quote.market_cap.filter(|m| *m > 0.0)?;
    let last_price = quote.last_price?;
    let change_pct = quote.change_pct?;

    // The ranking endpoint only publishes the ratio; the absolute amount is
    // recovered from today's turnover.
    let main_net = turnover * ratio / 100.0;

    Some(StockIndicators {
        code: flow.code.clone(),
        name: flow.name.clone(),
        last_price,
        change_pct,
        main_net_inflow_wan: main_net / WAN,
        main_net_ratio_pct: ratio,
        direction: if main_net > 0.0 {
            FlowDirection::Inflow
        } else {
            FlowDirection::Outflow
        },
        turnover_wan: turnover / WAN,
        market_cap_yi: market_cap / 1e8,
        turnover_share_pct: turnover / market_cap * 100.0,
        main_fund_share_pct: main_net.abs() / turnover * 100.0,
    })
}

fn passes(row: &StockIndicators, t: &ScreenThresholds) -> bool {
    row.main_net_inflow_wan.abs() >= t.main_fund_net_wan
        && row.turnover_share_pct >= t.turnover_share_pct
        && row.change_pct.abs() >= t.price_change_pct
        && row.main_fund_share_pct >= t.main_fund_share_pct
}
