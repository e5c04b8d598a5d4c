//! MCP tool implementations for fund-flow analysis
//!
//! This module defines the two tools exposed by the MCP server:
//! - analyze_large_fund_flow: market-wide screen for decisive main-fund moves
//! - analyze_stock_fund_flow_detail: one stock's multi-day flow summary

use ashare_lib::{
    candidate_periods, compare_shareholder_periods, holdings::top_org_types, screen_fund_flow,
    summarize_flow_window, summarize_institute_trend, Board, InstitutePeriodSnapshot,
    ScreenThresholds, ShareholderRecord, SortBy,
};
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{CallToolResult, Content};
use rmcp::{tool, tool_router, ErrorData as McpError};
use tracing::{info, warn};

use crate::server::FundFlowServer;
use crate::types::{
    HoldingsSummary, InstituteSection, LargeFundFlowInput, LargeFundFlowOutput, ScreenedStock,
    ShareholderSection, StockFlowDetailInput, StockFlowDetailOutput, ThresholdsEcho,
};
use crate::Error;

/// Published holding reports lag the calendar; probing more than a few
/// candidate periods only adds throttled upstream round trips.
const MAX_PERIOD_PROBES: usize = 4;

#[tool_router(vis = "pub(crate)")]
impl FundFlowServer {
    #[tool(
        description = "Screen the A-share market (or one board) for stocks with decisive \
                       main-fund activity today: |net inflow| above a wan-CNY floor, turnover \
                       share and |price change| above percent floors, and a minimum main-fund \
                       share of turnover. Optionally enriches hits with institutional and \
                       top-shareholder holding trends. Results are cached for five minutes."
    )]
    pub async fn analyze_large_fund_flow(
        &self,
        Parameters(input): Parameters<LargeFundFlowInput>,
    ) -> Result<CallToolResult, McpError> {
        let output = self.run_large_fund_flow(input).await.map_err(McpError::from)?;
        Ok(CallToolResult::success(vec![Content::json(&output)?]))
    }

    #[tool(
        description = "Summarize one stock's fund flow over the last N trading days: total and \
                       per-day main-fund net inflows, inflow/outflow day counts, cumulative \
                       price change, order-size breakdown, and a flow-versus-price \
                       classification. stock_code is a six-digit A-share code; days defaults \
                       to 5."
    )]
    pub async fn analyze_stock_fund_flow_detail(
        &self,
        Parameters(input): Parameters<StockFlowDetailInput>,
    ) -> Result<CallToolResult, McpError> {
        let output = self.run_stock_flow_detail(input).await.map_err(McpError::from)?;
        Ok(CallToolResult::success(vec![Content::json(&output)?]))
    }
}

impl FundFlowServer {
    /// Validate, screen, and enrich. Public so the CLI and tests can drive
    /// the same path the MCP tool uses.
    pub async fn run_large_fund_flow(
        &self,
        input: LargeFundFlowInput,
    ) -> crate::Result<LargeFundFlowOutput> {
        let (board, sort_by) = validate_screen_input(&input)?;
        let key = cache_key(&input, board, sort_by);

        if input.use_cache {
            if let Some(mut cached) = self.cached_analysis(&key).await {
                info!(board = %board, "serving screen from cache");
                cached.from_cache = true;
                return Ok(cached);
            }
        }

        let flows = empty_ok(self.client.main_fund_flow(board).await)?;
        let quotes = empty_ok(self.client.spot_quotes(board).await)?;
        let total_candidates = flows.len();

        let thresholds = ScreenThresholds {
            main_fund_net_wan: input.main_fund_threshold_wan,
            turnover_share_pct: input.turnover_share_threshold_pct,
            price_change_pct: input.price_change_threshold_pct,
            main_fund_share_pct: input.main_fund_share_threshold_pct,
        };

        // Screen without a cap first so the matched count is the true total.
        let mut hits = screen_fund_flow(&flows, &quotes, &thresholds, sort_by, usize::MAX);
        let matched = hits.len();
        hits.truncate(input.max_results);

        info!(
            board = %board,
            candidates = total_candidates,
            matched,
            returned = hits.len(),
            "screen complete"
        );

        let mut stocks = Vec::with_capacity(hits.len());
        for indicators in hits {
            let holdings = if input.analyze_holdings {
                Some(self.holdings_summary(&indicators.code, input.use_cache).await)
            } else {
                None
            };
            stocks.push(ScreenedStock {
                indicators,
                holdings,
            });
        }

        let output = LargeFundFlowOutput {
            generated_at: chrono::Utc::now().to_rfc3339(),
            board: board.as_str().to_string(),
            thresholds: ThresholdsEcho {
                main_fund_wan: input.main_fund_threshold_wan,
                turnover_share_pct: input.turnover_share_threshold_pct,
                price_change_pct: input.price_change_threshold_pct,
                main_fund_share_pct: input.main_fund_share_threshold_pct,
            },
            sort_by: sort_key_name(sort_by).to_string(),
            total_candidates,
            matched,
            stocks,
            from_cache: false,
        };

        self.store_analysis(key, output.clone()).await;
        Ok(output)
    }

    pub async fn run_stock_flow_detail(
        &self,
        input: StockFlowDetailInput,
    ) -> crate::Result<StockFlowDetailOutput> {
        if !(1..=60).contains(&input.days) {
            return Err(Error::invalid_param("days", "must be between 1 and 60"));
        }
        let code = ashare_lib::normalize_code(&input.stock_code)?;

        let history = empty_ok(self.client.daily_fund_flow(&code).await)?;
        let summary = summarize_flow_window(&history, input.days);

        Ok(StockFlowDetailOutput {
            stock_code: code,
            generated_at: chrono::Utc::now().to_rfc3339(),
            days_requested: input.days,
            summary,
        })
    }

    /// Holding trends for one stock, from cache when allowed and fresh.
    /// Fetch failures degrade to `Unavailable` sections so a single slow
    /// report lookup cannot fail the whole screen.
    async fn holdings_summary(&self, code: &str, use_cache: bool) -> HoldingsSummary {
        if use_cache {
            if let Some(cached) = self.cached_holdings(code).await {
                return cached;
            }
        }

        let institutes = match self.institute_snapshots(code).await {
            Ok(snapshots) => institute_section(snapshots),
            Err(err) => {
                warn!(code, error = %err, "institutional holdings fetch failed");
                InstituteSection::Unavailable {
                    message: err.to_string(),
                }
            }
        };

        let shareholders = match self.client.top_shareholders(code).await {
            Ok(records) => shareholder_section(&records),
            Err(err) => {
                warn!(code, error = %err, "top shareholders fetch failed");
                ShareholderSection::Unavailable {
                    message: err.to_string(),
                }
            }
        };

        let summary = HoldingsSummary {
            institutes,
            shareholders,
        };
        self.store_holdings(code.to_string(), summary.clone()).await;
        summary
    }

    /// Probe candidate report periods, most recent first, until two
    /// published reports are found.
    async fn institute_snapshots(
        &self,
        code: &str,
    ) -> ashare_lib::Result<Vec<InstitutePeriodSnapshot>> {
        let today = chrono::Utc::now().date_naive();
        let mut snapshots = Vec::new();

        for period in candidate_periods(today).into_iter().take(MAX_PERIOD_PROBES) {
            let rows = self.client.institute_holdings(code, period).await?;
            if !rows.is_empty() {
                snapshots.push(InstitutePeriodSnapshot::from_rows(period, rows));
                if snapshots.len() == 2 {
                    break;
                }
            }
        }

        Ok(snapshots)
    }
}

fn validate_screen_input(input: &LargeFundFlowInput) -> crate::Result<(Board, SortBy)> {
    let thresholds = [
        ("main_fund_threshold_wan", input.main_fund_threshold_wan),
        (
            "turnover_share_threshold_pct",
            input.turnover_share_threshold_pct,
        ),
        (
            "price_change_threshold_pct",
            input.price_change_threshold_pct,
        ),
        (
            "main_fund_share_threshold_pct",
            input.main_fund_share_threshold_pct,
        ),
    ];
    for (name, value) in thresholds {
        if !value.is_finite() || value < 0.0 {
            return Err(Error::invalid_param(name, "must be a non-negative number"));
        }
    }

    if !(1..=100).contains(&input.max_results) {
        return Err(Error::invalid_param(
            "max_results",
            "must be between 1 and 100",
        ));
    }

    let board = input
        .board
        .parse::<Board>()
        .map_err(|err| Error::invalid_param("board", err.to_string()))?;
    let sort_by = parse_sort_by(&input.sort_by)?;

    Ok((board, sort_by))
}

fn parse_sort_by(value: &str) -> crate::Result<SortBy> {
    match value {
        "main_fund" => Ok(SortBy::MainFund),
        "turnover_share" => Ok(SortBy::TurnoverShare),
        other => Err(Error::invalid_param(
            "sort_by",
            format!("unknown sort key '{}'; use main_fund or turnover_share", other),
        )),
    }
}

fn sort_key_name(sort_by: SortBy) -> &'static str {
    match sort_by {
        SortBy::MainFund => "main_fund",
        SortBy::TurnoverShare => "turnover_share",
    }
}

fn cache_key(input: &LargeFundFlowInput, board: Board, sort_by: SortBy) -> String {
    format!(
        "{}|{}|{}|{}|{}|{}|{}|{}",
        board.as_str(),
        input.main_fund_threshold_wan,
        input.turnover_share_threshold_pct,
        input.price_change_threshold_pct,
        input.main_fund_share_threshold_pct,
        input.max_results,
        sort_key_name(sort_by),
        input.analyze_holdings,
    )
}

/// An answered-but-empty upstream table is a valid "nothing matched today"
/// state, not a failure.
fn empty_ok<T>(result: ashare_lib::Result<Vec<T>>) -> crate::Result<Vec<T>> {
    match result {
        Err(ashare_lib::Error::EmptyPayload { .. }) => Ok(Vec::new()),
        other => Ok(other?),
    }
}

fn institute_section(snapshots: Vec<InstitutePeriodSnapshot>) -> InstituteSection {
    let mut iter = snapshots.into_iter();
    match (iter.next(), iter.next()) {
        (Some(current), Some(previous)) => InstituteSection::Compared {
            summary: summarize_institute_trend(&current, &previous),
        },
        (Some(only), None) => InstituteSection::SinglePeriod {
            period: only.period.label(),
            total_ratio_pct: only.total_ratio_pct,
            org_count: only.org_count,
            main_org_types: top_org_types(&only.holdings),
        },
        _ => InstituteSection::NoData,
    }
}

fn shareholder_section(records: &[ShareholderRecord]) -> ShareholderSection {
    if records.is_empty() {
        return ShareholderSection::NoData;
    }
    match compare_shareholder_periods(records) {
        Some(summary) => ShareholderSection::Compared { summary },
        None => {
            let date = records[0].end_date.clone();
            let holder_count = records.iter().filter(|r| r.end_date == date).count();
            ShareholderSection::SingleDate { date, holder_count }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ashare_lib::{InstituteHolding, ReportPeriod};

    fn base_input() -> LargeFundFlowInput {
        LargeFundFlowInput::default()
    }

    #[test]
    fn test_validate_accepts_defaults() {
        let (board, sort_by) = validate_screen_input(&base_input()).unwrap();
        assert_eq!(board, Board::All);
        assert_eq!(sort_by, SortBy::MainFund);
    }

    #[test]
    fn test_validate_rejects_negative_threshold() {
        let mut input = base_input();
        input.price_change_threshold_pct = -1.0;
        let err = validate_screen_input(&input).unwrap_err();
        assert_eq!(err.code, 400);
        assert!(err.message.contains("price_change_threshold_pct"));
    }

    #[test]
    fn test_validate_rejects_result_cap_out_of_range() {
        let mut input = base_input();
        input.max_results = 0;
        assert!(validate_screen_input(&input).is_err());

        input.max_results = 101;
        assert!(validate_screen_input(&input).is_err());
    }

    #[test]
    fn test_validate_rejects_unknown_board_and_sort() {
        let mut input = base_input();
        input.board = "nasdaq".to_string();
        assert!(validate_screen_input(&input).is_err());

        let mut input = base_input();
        input.sort_by = "volume".to_string();
        assert!(validate_screen_input(&input).is_err());
    }

    #[test]
    fn test_cache_key_covers_parameters() {
        let input = base_input();
        let key = cache_key(&input, Board::All, SortBy::MainFund);

        let mut other = base_input();
        other.main_fund_threshold_wan = 9999.0;
        let other_key = cache_key(&other, Board::All, SortBy::MainFund);

        assert_ne!(key, other_key);
        assert_ne!(key, cache_key(&input, Board::Star, SortBy::MainFund));
        assert_ne!(key, cache_key(&input, Board::All, SortBy::TurnoverShare));
    }

    #[test]
    fn test_institute_section_variants() {
        assert!(matches!(
            institute_section(vec![]),
            InstituteSection::NoData
        ));

        let holding = InstituteHolding {
            org_name: "Fund A".to_string(),
            org_type: "fund".to_string(),
            hold_ratio_pct: Some(2.0),
            ratio_change_pct: Some(0.5),
        };
        let current =
            InstitutePeriodSnapshot::from_rows(ReportPeriod::new(2026, 2), vec![holding.clone()]);
        let previous =
            InstitutePeriodSnapshot::from_rows(ReportPeriod::new(2026, 1), vec![holding]);

        assert!(matches!(
            institute_section(vec![current.clone()]),
            InstituteSection::SinglePeriod { .. }
        ));
        assert!(matches!(
            institute_section(vec![current, previous]),
            InstituteSection::Compared { .. }
        ));
    }

    #[test]
    fn test_shareholder_section_single_date() {
        let records = vec![
            ShareholderRecord {
                end_date: "2026-06-30".to_string(),
                holder_name: "Alpha".to_string(),
                hold_ratio_pct: Some(8.0),
            },
            ShareholderRecord {
                end_date: "2026-06-30".to_string(),
                holder_name: "Beta".to_string(),
                hold_ratio_pct: Some(5.0),
            },
        ];

        match shareholder_section(&records) {
            ShareholderSection::SingleDate { date, holder_count } => {
                assert_eq!(date, "2026-06-30");
                assert_eq!(holder_count, 2);
            }
            other => panic!("expected single date section, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_payload_maps_to_empty_rows() {
        let empty: ashare_lib::Result<Vec<u8>> = Err(ashare_lib::Error::EmptyPayload {
            endpoint: "push2 spot snapshot",
        });
        assert!(empty_ok(empty).unwrap().is_empty());

        let real: ashare_lib::Result<Vec<u8>> = Err(ashare_lib::Error::InvalidStockCode {
            code: "abc".to_string(),
        });
        assert!(empty_ok(real).is_err());
    }

    #[tokio::test]
    async fn test_detail_rejects_bad_days_before_any_fetch() {
        let server = FundFlowServer::new().unwrap();
        let err = server
            .run_stock_flow_detail(StockFlowDetailInput {
                stock_code: "600519".to_string(),
                days: 0,
            })
            .await
            .unwrap_err();
        assert_eq!(err.code, 400);
    }

    #[tokio::test]
    async fn test_detail_rejects_invalid_code_before_any_fetch() {
        let server = FundFlowServer::new().unwrap();
        let err = server
            .run_stock_flow_detail(StockFlowDetailInput {
                stock_code: "not-a-code".to_string(),
                days: 5,
            })
            .await
            .unwrap_err();
        assert_eq!(err.code, 400);
    }

    #[tokio::test]
    async fn test_screen_rejects_bad_board_before_any_fetch() {
        let server = FundFlowServer::new().unwrap();
        let mut input = base_input();
        input.board = "nyse".to_string();
        let err = server.run_large_fund_flow(input).await.unwrap_err();
        assert_eq!(err.code, 400);
    }
}
