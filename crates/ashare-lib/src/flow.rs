//! Main-fund flow data: today's market-wide ranking and per-stock history.
//!
//! "Main fund" covers large and extra-large orders, the conventional proxy
//! for institutional money. The ranking endpoint only exposes the net-inflow
//! ratio (percent of turnover); absolute amounts are derived downstream by
//! multiplying with the spot turnover, see [`crate::screen`].

use serde_json::Value;
use tracing::info;

use crate::board::Board;
use crate::client::QuoteClient;
use crate::error::{Error, Result};
use crate::spot::{opt_f64, UT_TOKEN};
use crate::symbol;

/// One row of today's main-fund net-inflow ratio ranking.
#[derive(Debug, Clone, PartialEq)]
pub struct MainFundFlowRow {
    pub code: String,
    pub name: String,
    /// Main-fund net inflow as a percent of turnover. Negative means net
    /// outflow. `None` when the stock has not traded today.
    pub main_net_ratio_pct: Option<f64>,
}

/// One day of a stock's fund-flow history, net amounts in CNY.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct DailyFundFlow {
    /// Trading date, `YYYY-MM-DD`.
    pub date: String,
    pub main_net: f64,
    pub small_net: f64,
    pub medium_net: f64,
    pub large_net: f64,
    pub xlarge_net: f64,
    pub main_ratio_pct: f64,
    pub small_ratio_pct: f64,
    pub medium_ratio_pct: f64,
    pub large_ratio_pct: f64,
    pub xlarge_ratio_pct: f64,
    pub close: f64,
    pub change_pct: f64,
}

impl QuoteClient {
    /// Fetch today's main-fund net-inflow ratio ranking for `board`,
    /// descending by ratio.
    pub async fn main_fund_flow(&self, board: Board) -> Result<Vec<MainFundFlowRow>> {
        let url = format!("{}/api/qt/clist/get", self.push2_base());
        let payload = self
            .get_json(
                &url,
                &[
                    ("pn", "1"),
                    ("pz", "10000"),
                    ("po", "1"),
                    ("np", "1"),
                    ("ut", UT_TOKEN),
                    ("fltt", "2"),
                    ("invt", "2"),
                    ("fid", "f184"),
                    ("fs", board.selector()),
                    ("fields", "f12,f14,f184"),
                ],
            )
            .await?;

        let rows = parse_fund_flow_payload(&payload)?;
        info!(board = %board, rows = rows.len(), "fetched main fund flow ranking");
        Ok(rows)
    }

    /// Fetch the daily fund-flow history for one stock, oldest first.
    pub async fn daily_fund_flow(&self, code: &str) -> Result<Vec<DailyFundFlow>> {
        let secid = symbol::secid(code)?;
        let url = format!("{}/api/qt/stock/fflow/daykline/get", self.push2his_base());
        let payload = self
            .get_json(
                &url,
                &[
                    ("lmt", "0"),
                    ("klt", "101"),
                    ("secid", &secid),
                    ("ut", UT_TOKEN),
                    ("fields1", "f1,f2,f3,f7"),
                    (
                        "fields2",
                        "f51,f52,f53,f54,f55,f56,f57,f58,f59,f60,f61,f62,f63,f64,f65",
                    ),
                ],
            )
            .await?;

        let rows = parse_daily_flow_payload(&payload)?;
        info!(code, rows = rows.len(), "fetched daily fund flow history");
        Ok(rows)
    }
}

pub(crate) fn parse_fund_flow_payload(payload: &Value) -> Result<Vec<MainFundFlowRow>> {
    let diff = payload["data"]["diff"]
        .as_array()
        .ok_or(Error::EmptyPayload {
            endpoint: "push2 fund flow ranking",
        })?;

    let mut rows = Vec::with_capacity(diff.len());
    for item in diff {
        let code = match item["f12"].as_str() {
            Some(code) => code.to_string(),
            None => continue,
        };
        rows.push(MainFundFlowRow {
            code,
            name: item["f14"].as_str().unwrap_or_default().to_string(),
            main_net_ratio_pct: opt_f64(&item["f184"]),
        });
    }

    Ok(rows)
}

pub(crate) fn parse_daily_flow_payload(payload: &Value) -> Result<Vec<DailyFundFlow>> {
    let klines = payload["data"]["klines"]
        .as_array()
        .ok_or(Error::EmptyPayload {
            endpoint: "push2his fflow daykline",
        })?;

    klines
        .iter()
        .map(|line| {
            let line = line.as_str().ok_or_else(|| Error::UnexpectedPayload {
                endpoint: "push2his fflow daykline",
                message: "kline entry is not a string".to_string(),
            })?;
            parse_kline(line)
        })
        .collect()
}

/// Parse one comma-joined kline record. Field order: date, then net amounts
/// (main, small, medium, large, extra-large), then the matching ratios, then
/// close and percent change.
fn parse_kline(line: &str) -> Result<DailyFundFlow> {
    let fields: Vec<&str> = line.split(',').collect();
    if fields.len() < 13 {
        return Err(Error::UnexpectedPayload {
            endpoint: "push2his fflow daykline",
            message: format!("expected at least 13 fields, got {}", fields.len()),
        });
    }

    let num = |idx: usize| fields[idx].parse::<f64>().unwrap_or(0.0);

    Ok(DailyFundFlow {
        date: fields[0].to_string(),
        main_net: num(1),
        small_net: num(2),
        medium_net: num(3),
        large_net: num(4),
        xlarge_net: num(5),
        main_ratio_pct: num(6),
        small_ratio_pct: num(7),
        medium_ratio_pct: num(8),
        large_ratio_pct: num(9),
        xlarge_ratio_pct: num(10),
        close: num(11),
        change_pct: num(12),
    })
}

/// Relationship between main-fund direction and price movement over the
/// window, the reading the analysis guide resource documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowPriceBias {
    /// Net inflow with the price up: consistent accumulation.
    InflowPriceUp,
    /// Net inflow with the price down: possible absorption or washout.
    InflowPriceDown,
    /// Net outflow with the price up: possible distribution into strength.
    OutflowPriceUp,
    /// Net outflow with the price down: consistent withdrawal.
    OutflowPriceDown,
    /// No meaningful net flow or price movement.
    Flat,
}

/// Aggregate view over the last N days of a stock's fund flow.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct FlowWindowSummary {
    /// Days actually covered; fewer than requested when history is short.
    pub days_covered: usize,
    /// Sum of daily main-fund net inflows over the window (CNY).
    pub total_main_net: f64,
    pub inflow_days: usize,
    pub outflow_days: usize,
    /// Mean of the daily main-fund ratios over the window.
    pub avg_main_ratio_pct: f64,
    /// Compounded percent change over the window.
    pub cumulative_change_pct: f64,
    /// Net amounts by order size, summed over the window (CNY).
    pub small_net: f64,
    pub medium_net: f64,
    pub large_net: f64,
    pub xlarge_net: f64,
    pub bias: FlowPriceBias,
    /// Daily records in the window, oldest first.
    pub days: Vec<DailyFundFlow>,
}

/// Summarize the trailing `days` records of a fund-flow history.
pub fn summarize_flow_window(history: &[DailyFundFlow], days: usize) -> FlowWindowSummary {
    let start = history.len().saturating_sub(days);
    let window = &history[start..];

    let total_main_net: f64 = window.iter().map(|d| d.main_net).sum();
    let inflow_days = window.iter().filter(|d| d.main_net > 0.0).count();
    let outflow_days = window.iter().filter(|d| d.main_net < 0.0).count();
    let avg_main_ratio_pct = if window.is_empty() {
        0.0
    } else {
        window.iter().map(|d| d.main_ratio_pct).sum::<f64>() / window.len() as f64
    };
    let cumulative_change_pct = (window
        .iter()
        .map(|d| 1.0 + d.change_pct / 100.0)
        .product::<f64>()
        - 1.0)
        * 100.0;

    let bias = classify_bias(total_main_net, cumulative_change_pct);

    FlowWindowSummary {
        days_covered: window.len(),
        total_main_net,
        inflow_days,
        outflow_days,
        avg_main_ratio_pct,
        cumulative_change_pct,
        small_net: window.iter().map(|d| d.small_net).sum(),
        medium_net: window.iter().map(|d| d.medium_net).sum(),
        large_net: window.iter().map(|d| d.large_net).sum(),
        xlarge_net: window.iter().map(|d| d.xlarge_net).sum(),
        bias,
        days: window.to_vec(),
    }
}

fn classify_bias(total_main_net: f64, cumulative_change_pct: f64) -> FlowPriceBias {
    // Below one wan of net flow or a tenth of a percent of movement the
    // window carries no signal worth labeling.
    let flow_significant = total_main_net.abs() >= 10_000.0;
    let price_significant = cumulative_change_pct.abs() >= 0.1;

    if !flow_significant || !price_significant {
        return FlowPriceBias::Flat;
    }

    match (total_main_net > 0.0, cumulative_change_pct > 0.0) {
        (true, true) => FlowPriceBias::InflowPriceUp,
        (true, false) => FlowPriceBias::InflowPriceDown,
        (false, true) => FlowPriceBias::OutflowPriceUp,
        (false, false) => FlowPriceBias::OutflowPriceDown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn day(date: &str, main_net: f64, change_pct: f64) -> DailyFundFlow {
        DailyFundFlow {
            date: date.to_string(),
            main_net,
            small_net: -main_net / 2.0,
            medium_net: -main_net / 2.0,
            large_net: main_net / 2.0,
            xlarge_net: main_net / 2.0,
            main_ratio_pct: 10.0,
            small_ratio_pct: -5.0,
            medium_ratio_pct: -5.0,
            large_ratio_pct: 5.0,
            xlarge_ratio_pct: 5.0,
            close: 10.0,
            change_pct,
        }
    }

    #[test]
    fn parse_fund_flow_ranking() {
        let payload = json!({
            "data": {
                "diff": [
                    {"f12": "600519", "f14": "Kweichow Moutai", "f184": 15.2},
                    {"f12": "000001", "f14": "Ping An Bank", "f184": "-"}
                ]
            }
        });

        let rows = parse_fund_flow_payload(&payload).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].main_net_ratio_pct, Some(15.2));
        assert_eq!(rows[1].main_net_ratio_pct, None);
    }

    #[test]
    fn parse_kline_maps_field_order() {
        let line = "2026-08-28,1.2e8,-3.0e7,-2.0e7,5.0e7,7.0e7,12.5,-3.1,-2.1,5.2,7.3,18.45,4.21,0.0,0.0";
        let row = parse_kline(line).unwrap();
        assert_eq!(row.date, "2026-08-28");
        assert_eq!(row.main_net, 1.2e8);
        assert_eq!(row.xlarge_net, 7.0e7);
        assert_eq!(row.main_ratio_pct, 12.5);
        assert_eq!(row.close, 18.45);
        assert_eq!(row.change_pct, 4.21);
    }

    #[test]
    fn parse_kline_rejects_truncated_records() {
        assert!(parse_kline("2026-08-28,1.0,2.0").is_err());
    }

    #[test]
    fn parse_daily_flow_payload_requires_klines() {
        let payload = json!({"data": null});
        assert!(matches!(
            parse_daily_flow_payload(&payload),
            Err(Error::EmptyPayload { .. })
        ));
    }

    #[test]
    fn summary_counts_direction_days() {
        let history = vec![
            day("2026-08-24", 5.0e7, 1.0),
            day("2026-08-25", -2.0e7, -0.5),
            day("2026-08-26", 3.0e7, 2.0),
        ];
        let summary = summarize_flow_window(&history, 3);
        assert_eq!(summary.days_covered, 3);
        assert_eq!(summary.inflow_days, 2);
        assert_eq!(summary.outflow_days, 1);
        assert!((summary.total_main_net - 6.0e7).abs() < 1.0);
        assert_eq!(summary.bias, FlowPriceBias::InflowPriceUp);
    }

    #[test]
    fn summary_window_is_trailing() {
        let history = vec![
            day("2026-08-20", 1.0e7, 0.5),
            day("2026-08-21", 2.0e7, 0.5),
            day("2026-08-22", 3.0e7, 0.5),
        ];
        let summary = summarize_flow_window(&history, 2);
        assert_eq!(summary.days_covered, 2);
        assert_eq!(summary.days[0].date, "2026-08-21");
    }

    #[test]
    fn summary_of_short_history_covers_what_exists() {
        let history = vec![day("2026-08-28", 1.0e7, 0.3)];
        let summary = summarize_flow_window(&history, 5);
        assert_eq!(summary.days_covered, 1);
    }

    #[test]
    fn cumulative_change_compounds() {
        let history = vec![day("a", 1.0e7, 10.0), day("b", 1.0e7, 10.0)];
        let summary = summarize_flow_window(&history, 2);
        assert!((summary.cumulative_change_pct - 21.0).abs() < 1e-9);
    }

    #[test]
    fn outflow_into_strength_is_distribution_bias() {
        let history = vec![day("a", -8.0e7, 3.0)];
        let summary = summarize_flow_window(&history, 1);
        assert_eq!(summary.bias, FlowPriceBias::OutflowPriceUp);
    }

    #[test]
    fn insignificant_flow_is_flat() {
        let history = vec![day("a", 100.0, 0.01)];
        let summary = summarize_flow_window(&history, 1);
        assert_eq!(summary.bias, FlowPriceBias::Flat);
    }
}
