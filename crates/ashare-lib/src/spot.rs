//! Real-time spot quote snapshots.

use serde_json::Value;
use tracing::info;

use crate::board::Board;
use crate::client::QuoteClient;
use crate::error::{Error, Result};

/// Public token the upstream list endpoints expect on every request.
pub(crate) const UT_TOKEN: &str = "bd1d9ddb04089700cf9c27f6f7426281";

/// One row of the real-time quote snapshot.
///
/// Suspended stocks report `"-"` for their numeric fields upstream; those
/// decode to `None` here and are skipped by consumers that need the values.
#[derive(Debug, Clone, PartialEq)]
pub struct SpotQuote {
    pub code: String,
    pub name: String,
    /// Latest traded price (CNY).
    pub last_price: Option<f64>,
    /// Percent change against the previous close.
    pub change_pct: Option<f64>,
    /// Traded volume in lots.
    pub volume: Option<f64>,
    /// Traded amount (CNY).
    pub turnover: Option<f64>,
    /// Total market capitalization (CNY).
    pub market_cap: Option<f64>,
}

impl QuoteClient {
    /// Fetch the real-time quote snapshot for every stock on `board`.
    pub async fn spot_quotes(&self, board: Board) -> Result<Vec<SpotQuote>> {
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
                    ("fid", "f3"),
                    ("fs", board.selector()),
                    ("fields", "f2,f3,f5,f6,f12,f14,f20"),
                ],
            )
            .await?;

        let quotes = parse_spot_payload(&payload)?;
        info!(board = %board, rows = quotes.len(), "fetched spot quotes");
        Ok(quotes)
    }
}

/// Decode a numeric field that may arrive as a number, a string, `"-"`
/// (suspended), or `null`.
pub(crate) fn opt_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.parse::<f64>().ok(),
        _ => None,
    }
}

pub(crate) fn parse_spot_payload(payload: &Value) -> Result<Vec<SpotQuote>> {
    let diff = payload["data"]["diff"]
        .as_array()
        .ok_or(Error::EmptyPayload {
            endpoint: "push2 clist",
        })?;

    let mut quotes = Vec::with_capacity(diff.len());
    for item in diff {
        let code = match item["f12"].as_str() {
            Some(code) => code.to_string(),
            None => continue,
        };
        quotes.push(SpotQuote {
            code,
            name: item["f14"].as_str().unwrap_or_default().to_string(),
            last_price: opt_f64(&item["f2"]),
            change_pct: opt_f64(&item["f3"]),
            volume: opt_f64(&item["f5"]),
            turnover: opt_f64(&item["f6"]),
            market_cap: opt_f64(&item["f20"]),
        });
    }

    Ok(quotes)
}
