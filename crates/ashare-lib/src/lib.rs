//! A-share market data library entry points.
//!
//! This crate exposes a throttled HTTP client for the public quote and fund
//! flow endpoints, typed row structures for the payloads they return, and
//! pure functions that turn those rows into capital flow indicators.
//! Higher-level consumers (CLI, MCP server) should only depend on the
//! functions exported here instead of reimplementing behavior.
//!

#![deny(warnings)]

pub mod board;
pub mod client;
pub mod error;
pub mod flow;
pub mod holdings;
pub mod report_period;
pub mod screen;
pub mod spot;
pub mod symbol;

pub use board::Board;
pub use client::{ClientConfig, QuoteClient};
pub use error::{Error, Result};
pub use flow::{
    summarize_flow_window, DailyFundFlow, FlowPriceBias, FlowWindowSummary, MainFundFlowRow,
};
pub use holdings::{
    compare_shareholder_periods, summarize_institute_trend, HoldingTrend, InstituteHolding,
    InstitutePeriodSnapshot, InstituteTrendSummary, ShareholderChangeSummary, ShareholderRecord,
};
pub use report_period::{candidate_periods, ReportPeriod};
pub use screen::{
    screen_fund_flow, FlowDirection, ScreenThresholds, SortBy, StockIndicators,
};
pub use spot::SpotQuote;
pub use symbol::{exchange_of, normalize_code, secid, secucode, Exchange};
