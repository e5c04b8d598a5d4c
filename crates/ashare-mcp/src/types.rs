//! Type definitions for MCP tool inputs and outputs
//!
//! This module defines all the serializable request and response types
//! for MCP tools, with JSON Schema generation for automatic validation.

use ashare_lib::{
    FlowWindowSummary, InstituteTrendSummary, ShareholderChangeSummary, StockIndicators,
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

// ============================================================================
// TOOL INPUTS
// ============================================================================

/// Input for the analyze_large_fund_flow tool
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct LargeFundFlowInput {
    /// Minimum |main-fund net inflow| in wan CNY (default: 5000)
    #[serde(default = "default_main_fund_threshold")]
    pub main_fund_threshold_wan: f64,

    /// Minimum turnover as a percent of market cap (default: 6.0)
    #[serde(default = "default_turnover_share_threshold")]
    pub turnover_share_threshold_pct: f64,

    /// Minimum |price change| in percent (default: 3.0)
    #[serde(default = "default_price_change_threshold")]
    pub price_change_threshold_pct: f64,

    /// Minimum main-fund share of turnover in percent (default: 10.0)
    #[serde(default = "default_main_fund_share_threshold")]
    pub main_fund_share_threshold_pct: f64,

    /// Board selection: "all", "sh_sz_a", "sh_a", "star", "sz_a",
    /// "chinext", "sh_b", or "sz_b" (default: "all")
    #[serde(default = "default_board")]
    pub board: String,

    /// Maximum number of results, 1 to 100 (default: 10)
    #[serde(default = "default_max_results")]
    pub max_results: usize,

    /// Sort key: "main_fund" or "turnover_share" (default: "main_fund")
    #[serde(default = "default_sort_by")]
    pub sort_by: String,

    /// Enrich each hit with institutional and shareholder holding trends
    /// (default: true)
    #[serde(default = "default_true")]
    pub analyze_holdings: bool,

    /// Reuse cached results when fresh (default: true)
    #[serde(default = "default_true")]
    pub use_cache: bool,
}

impl Default for LargeFundFlowInput {
    fn default() -> Self {
        Self {
            main_fund_threshold_wan: default_main_fund_threshold(),
            turnover_share_threshold_pct: default_turnover_share_threshold(),
            price_change_threshold_pct: default_price_change_threshold(),
            main_fund_share_threshold_pct: default_main_fund_share_threshold(),
            board: default_board(),
            max_results: default_max_results(),
            sort_by: default_sort_by(),
            analyze_holdings: true,
            use_cache: true,
        }
    }
}

fn default_main_fund_threshold() -> f64 {
    5000.0
}

fn default_turnover_share_threshold() -> f64 {
    6.0
}

fn default_price_change_threshold() -> f64 {
    3.0
}

fn default_main_fund_share_threshold() -> f64 {
    10.0
}

fn default_board() -> String {
    "all".to_string()
}

fn default_max_results() -> usize {
    10
}

fn default_sort_by() -> String {
    "main_fund".to_string()
}

fn default_true() -> bool {
    true
}

/// Input for the analyze_stock_fund_flow_detail tool
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct StockFlowDetailInput {
    /// Six-digit stock code; exchange suffixes like ".SH" are accepted
    pub stock_code: String,

    /// Number of trailing trading days to summarize, 1 to 60 (default: 5)
    #[serde(default = "default_days")]
    pub days: usize,
}

fn default_days() -> usize {
    5
}

// ============================================================================
// TOOL OUTPUTS
// ============================================================================

/// Output from the analyze_large_fund_flow tool
#[derive(Debug, Clone, Serialize)]
pub struct LargeFundFlowOutput {
    /// Analysis timestamp (RFC 3339)
    pub generated_at: String,

    /// Board the screen ran over
    pub board: String,

    /// Thresholds the screen applied
    pub thresholds: ThresholdsEcho,

    /// Sort key applied to the results
    pub sort_by: String,

    /// Stocks in the joined ranking before filtering
    pub total_candidates: usize,

    /// Stocks that cleared every threshold (before truncation)
    pub matched: usize,

    /// Screen hits, best first
    pub stocks: Vec<ScreenedStock>,

    /// Whether this response was served from the analysis cache
    pub from_cache: bool,
}

/// Echo of the thresholds a screen ran with
#[derive(Debug, Clone, Serialize)]
pub struct ThresholdsEcho {
    pub main_fund_wan: f64,
    pub turnover_share_pct: f64,
    pub price_change_pct: f64,
    pub main_fund_share_pct: f64,
}

/// One screen hit with optional holdings enrichment
#[derive(Debug, Clone, Serialize)]
pub struct ScreenedStock {
    #[serde(flatten)]
    pub indicators: StockIndicators,

    /// Present when analyze_holdings was requested
    #[serde(skip_serializing_if = "Option::is_none")]
    pub holdings: Option<HoldingsSummary>,
}

/// Holding trends for one stock
#[derive(Debug, Clone, Serialize)]
pub struct HoldingsSummary {
    pub institutes: InstituteSection,
    pub shareholders: ShareholderSection,
}

/// Institutional holding trend, or why it is absent
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum InstituteSection {
    /// Two report periods were available and compared
    Compared {
        #[serde(flatten)]
        summary: InstituteTrendSummary,
    },
    /// Only one published report period was found
    SinglePeriod {
        period: String,
        total_ratio_pct: f64,
        org_count: usize,
        main_org_types: Vec<String>,
    },
    /// No published institutional report was found
    NoData,
    /// The upstream fetch failed; screening itself still succeeded
    Unavailable { message: String },
}

/// Top-shareholder roster change, or why it is absent
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ShareholderSection {
    /// Two report dates were available and compared
    Compared {
        #[serde(flatten)]
        summary: ShareholderChangeSummary,
    },
    /// Only one report date was found
    SingleDate { date: String, holder_count: usize },
    /// No shareholder records were found
    NoData,
    /// The upstream fetch failed; screening itself still succeeded
    Unavailable { message: String },
}

/// Output from the analyze_stock_fund_flow_detail tool
#[derive(Debug, Clone, Serialize)]
pub struct StockFlowDetailOutput {
    /// Normalized six-digit stock code
    pub stock_code: String,

    /// Analysis timestamp (RFC 3339)
    pub generated_at: String,

    /// Days requested by the caller
    pub days_requested: usize,

    #[serde(flatten)]
    pub summary: FlowWindowSummary,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_large_fund_flow_input_defaults() {
        let input: LargeFundFlowInput = serde_json::from_value(json!({})).unwrap();
        assert_eq!(input.main_fund_threshold_wan, 5000.0);
        assert_eq!(input.turnover_share_threshold_pct, 6.0);
        assert_eq!(input.price_change_threshold_pct, 3.0);
        assert_eq!(input.main_fund_share_threshold_pct, 10.0);
        assert_eq!(input.board, "all");
        assert_eq!(input.max_results, 10);
        assert_eq!(input.sort_by, "main_fund");
        assert!(input.analyze_holdings);
        assert!(input.use_cache);
    }

    #[test]
    fn test_stock_flow_detail_input_defaults() {
        let input: StockFlowDetailInput =
            serde_json::from_value(json!({"stock_code": "600519"})).unwrap();
        assert_eq!(input.stock_code, "600519");
        assert_eq!(input.days, 5);
    }

    #[test]
    fn test_institute_section_serializes_with_status_tag() {
        let section = InstituteSection::SinglePeriod {
            period: "2026Q2".to_string(),
            total_ratio_pct: 12.3,
            org_count: 4,
            main_org_types: vec!["fund (3)".to_string()],
        };
        let value = serde_json::to_value(&section).unwrap();
        assert_eq!(value["status"], "single_period");
        assert_eq!(value["period"], "2026Q2");
    }

    #[test]
    fn test_screened_stock_flattens_indicators() {
        let stock = ScreenedStock {
            indicators: ashare_lib::StockIndicators {
                code: "600519".to_string(),
                name: "Kweichow Moutai".to_string(),
                last_price: 1500.0,
                change_pct: 3.2,
                main_net_inflow_wan: 8000.0,
                main_net_ratio_pct: 12.0,
                direction: ashare_lib::FlowDirection::Inflow,
                turnover_wan: 66_000.0,
                market_cap_yi: 18_000.0,
                turnover_share_pct: 6.5,
                main_fund_share_pct: 12.0,
            },
            holdings: None,
        };

        let value = serde_json::to_value(&stock).unwrap();
        assert_eq!(value["code"], "600519");
        assert_eq!(value["direction"], "inflow");
        assert!(value.get("holdings").is_none());
    }
}
