//! Institutional and top-shareholder holdings: fetchers over the datacenter
//! F10 reports, plus pure period-over-period trend summarizers.
//!
//! Holding data confirms (or undercuts) what the daily flow numbers suggest:
//! a large inflow backed by institutions adding positions reads very
//! differently from one where the top holders are stepping out.

use serde_json::Value;
use tracing::debug;

use crate::client::QuoteClient;
use crate::error::Result;
use crate::report_period::ReportPeriod;
use crate::spot::opt_f64;
use crate::symbol;

/// One institution's position in a stock for one report period.
#[derive(Debug, Clone, PartialEq)]
pub struct InstituteHolding {
    pub org_name: String,
    pub org_type: String,
    /// Percent of total shares held.
    pub hold_ratio_pct: Option<f64>,
    /// Change in the ratio against the prior period, when published.
    pub ratio_change_pct: Option<f64>,
}

/// All institutional positions for one stock and report period.
#[derive(Debug, Clone, PartialEq)]
pub struct InstitutePeriodSnapshot {
    pub period: ReportPeriod,
    /// Sum of the per-institution hold ratios.
    pub total_ratio_pct: f64,
    pub org_count: usize,
    pub holdings: Vec<InstituteHolding>,
}

impl InstitutePeriodSnapshot {
    pub fn from_rows(period: ReportPeriod, holdings: Vec<InstituteHolding>) -> Self {
        let total_ratio_pct = holdings.iter().filter_map(|h| h.hold_ratio_pct).sum();
        let org_count = holdings.len();
        Self {
            period,
            total_ratio_pct,
            org_count,
            holdings,
        }
    }
}

/// One top-ten shareholder record for one report date.
#[derive(Debug, Clone, PartialEq)]
pub struct ShareholderRecord {
    /// Report cutoff date, `YYYY-MM-DD`.
    pub end_date: String,
    pub holder_name: String,
    /// Percent of total shares held.
    pub hold_ratio_pct: Option<f64>,
}

impl QuoteClient {
    /// Fetch the institutional holding detail for one stock and report
    /// period. Returns an empty list when the report has not been published,
    /// so callers can probe candidate periods in order.
    pub async fn institute_holdings(
        &self,
        code: &str,
        period: ReportPeriod,
    ) -> Result<Vec<InstituteHolding>> {
        let normalized = symbol::normalize_code(code)?;
        let url = format!("{}/api/data/v1/get", self.datacenter_base());
        let filter = format!(
            "(SECURITY_CODE=\"{}\")(REPORT_DATE='{}')",
            normalized,
            period.report_date()
        );
        let payload = self
            .get_json(
                &url,
                &[
                    ("reportName", "RPT_MAIN_ORGHOLDDETAILS"),
                    ("columns", "ALL"),
                    ("filter", &filter),
                    ("pageNumber", "1"),
                    ("pageSize", "500"),
                    ("source", "WEB"),
                    ("client", "WEB"),
                ],
            )
            .await?;

        let rows = parse_institute_payload(&payload);
        debug!(code = %normalized, period = %period.label(), rows = rows.len(),
               "fetched institutional holdings");
        Ok(rows)
    }

    /// Fetch recent top-ten shareholder records for one stock, newest report
    /// date first.
    pub async fn top_shareholders(&self, code: &str) -> Result<Vec<ShareholderRecord>> {
        let secucode = symbol::secucode(code)?;
        let url = format!("{}/api/data/v1/get", self.datacenter_base());
        let filter = format!("(SECUCODE=\"{}\")", secucode);
        let payload = self
            .get_json(
                &url,
                &[
                    ("reportName", "RPT_F10_EH_HOLDERS"),
                    ("columns", "ALL"),
                    ("filter", &filter),
                    ("sortColumns", "END_DATE,HOLDER_RANK"),
                    ("sortTypes", "-1,1"),
                    ("pageNumber", "1"),
                    ("pageSize", "500"),
                    ("source", "WEB"),
                    ("client", "WEB"),
                ],
            )
            .await?;

        let rows = parse_shareholder_payload(&payload);
        debug!(code = %secucode, rows = rows.len(), "fetched top shareholders");
        Ok(rows)
    }
}

/// Unpublished reports come back as `{"result": null}`; that is an empty
/// list, not an error.
pub(crate) fn parse_institute_payload(payload: &Value) -> Vec<InstituteHolding> {
    let Some(data) = payload["result"]["data"].as_array() else {
        return Vec::new();
    };

    data.iter()
        .map(|item| InstituteHolding {
            org_name: item["ORG_NAME"].as_str().unwrap_or_default().to_string(),
            org_type: item["ORG_TYPE_NAME"]
                .as_str()
                .unwrap_or("unknown")
                .to_string(),
            hold_ratio_pct: opt_f64(&item["TOTAL_SHARES_RATIO"]),
            ratio_change_pct: opt_f64(&item["CHANGE_RATIO"]),
        })
        .collect()
}

pub(crate) fn parse_shareholder_payload(payload: &Value) -> Vec<ShareholderRecord> {
    let Some(data) = payload["result"]["data"].as_array() else {
        return Vec::new();
    };

    data.iter()
        .filter_map(|item| {
            let holder_name = item["HOLDER_NAME"].as_str()?.to_string();
            // END_DATE arrives as "2026-06-30 00:00:00"; keep the date part.
            let end_date = item["END_DATE"]
                .as_str()
                .map(|d| d.split_whitespace().next().unwrap_or(d).to_string())?;
            Some(ShareholderRecord {
                end_date,
                holder_name,
                hold_ratio_pct: opt_f64(&item["HOLD_NUM_RATIO"]),
            })
        })
        .collect()
}

/// Direction of a holding change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HoldingTrend {
    Increasing,
    Decreasing,
    Unchanged,
}

impl HoldingTrend {
    fn from_delta(delta: f64) -> Self {
        if delta > 0.0 {
            HoldingTrend::Increasing
        } else if delta < 0.0 {
            HoldingTrend::Decreasing
        } else {
            HoldingTrend::Unchanged
        }
    }
}

/// Two-period institutional trend.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct InstituteTrendSummary {
    pub current_period: String,
    pub previous_period: String,
    pub current_ratio_pct: f64,
    pub previous_ratio_pct: f64,
    pub ratio_change_pct: f64,
    pub org_count: usize,
    pub org_count_change: i64,
    pub trend: HoldingTrend,
    /// Orgs whose published ratio change is positive / negative / zero.
    pub increased_orgs: usize,
    pub decreased_orgs: usize,
    pub unchanged_orgs: usize,
    /// Up to three most common org types, as `type (count)` labels.
    pub main_org_types: Vec<String>,
}

/// Compare the two most recent institutional snapshots.
pub fn summarize_institute_trend(
    current: &InstitutePeriodSnapshot,
    previous: &InstitutePeriodSnapshot,
) -> InstituteTrendSummary {
    let ratio_change = current.total_ratio_pct - previous.total_ratio_pct;

    let increased = current
        .holdings
        .iter()
        .filter(|h| h.ratio_change_pct.is_some_and(|c| c > 0.0))
        .count();
    let decreased = current
        .holdings
        .iter()
        .filter(|h| h.ratio_change_pct.is_some_and(|c| c < 0.0))
        .count();
    let unchanged = current
        .holdings
        .iter()
        .filter(|h| h.ratio_change_pct.is_some_and(|c| c == 0.0))
        .count();

    InstituteTrendSummary {
        current_period: current.period.label(),
        previous_period: previous.period.label(),
        current_ratio_pct: current.total_ratio_pct,
        previous_ratio_pct: previous.total_ratio_pct,
        ratio_change_pct: ratio_change,
        org_count: current.org_count,
        org_count_change: current.org_count as i64 - previous.org_count as i64,
        trend: HoldingTrend::from_delta(ratio_change),
        increased_orgs: increased,
        decreased_orgs: decreased,
        unchanged_orgs: unchanged,
        main_org_types: top_org_types(&current.holdings),
    }
}

/// Up to three most common org types in a snapshot, most common first.
pub fn top_org_types(holdings: &[InstituteHolding]) -> Vec<String> {
    let mut counts: std::collections::HashMap<&str, usize> = std::collections::HashMap::new();
    for holding in holdings {
        *counts.entry(holding.org_type.as_str()).or_default() += 1;
    }

    let mut sorted: Vec<_> = counts.into_iter().collect();
    sorted.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    sorted
        .into_iter()
        .take(3)
        .map(|(org_type, count)| format!("{org_type} ({count})"))
        .collect()
}

/// Change in the top-shareholder roster between the two most recent report
/// dates.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct ShareholderChangeSummary {
    pub latest_date: String,
    pub previous_date: String,
    /// Holders present in both periods whose ratio rose / fell / held.
    pub increased: usize,
    pub decreased: usize,
    pub unchanged: usize,
    /// Holders only in the latest / only in the previous period.
    pub new_holders: usize,
    pub exited_holders: usize,
    pub trend: HoldingTrend,
}

/// Compare the two most recent shareholder report dates. `None` when fewer
/// than two dates are present; the caller reports that state explicitly.
pub fn compare_shareholder_periods(
    records: &[ShareholderRecord],
) -> Option<ShareholderChangeSummary> {
    let mut dates: Vec<&str> = records.iter().map(|r| r.end_date.as_str()).collect();
    dates.sort_unstable();
    dates.dedup();
    if dates.len() < 2 {
        return None;
    }
    let latest = dates[dates.len() - 1];
    let previous = dates[dates.len() - 2];

    let ratios_at = |date: &str| -> std::collections::HashMap<&str, f64> {
        records
            .iter()
            .filter(|r| r.end_date == date)
            .filter_map(|r| Some((r.holder_name.as_str(), r.hold_ratio_pct?)))
            .collect()
    };
    let latest_ratios = ratios_at(latest);
    let previous_ratios = ratios_at(previous);

    let mut increased = 0;
    let mut decreased = 0;
    let mut unchanged = 0;
    for (holder, latest_ratio) in &latest_ratios {
        if let Some(previous_ratio) = previous_ratios.get(holder) {
            if latest_ratio > previous_ratio {
                increased += 1;
            } else if latest_ratio < previous_ratio {
                decreased += 1;
            } else {
                unchanged += 1;
            }
        }
    }

    let new_holders = latest_ratios
        .keys()
        .filter(|h| !previous_ratios.contains_key(*h))
        .count();
    let exited_holders = previous_ratios
        .keys()
        .filter(|h| !latest_ratios.contains_key(*h))
        .count();

    let trend = if increased > decreased {
        HoldingTrend::Increasing
    } else if decreased > increased {
        HoldingTrend::Decreasing
    } else {
        HoldingTrend::Unchanged
    };

    Some(ShareholderChangeSummary {
        latest_date: latest.to_string(),
        previous_date: previous.to_string(),
        increased,
        decreased,
        unchanged,
        new_holders,
        exited_holders,
        trend,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn holding(org: &str, org_type: &str, ratio: f64, change: f64) -> InstituteHolding {
        InstituteHolding {
            org_name: org.to_string(),
            org_type: org_type.to_string(),
            hold_ratio_pct: Some(ratio),
            ratio_change_pct: Some(change),
        }
    }

    fn record(date: &str, holder: &str, ratio: f64) -> ShareholderRecord {
        ShareholderRecord {
            end_date: date.to_string(),
            holder_name: holder.to_string(),
            hold_ratio_pct: Some(ratio),
        }
    }

    #[test]
    fn parse_institute_rows() {
        let payload = json!({
            "result": {
                "data": [
                    {"ORG_NAME": "Fund A", "ORG_TYPE_NAME": "fund",
                     "TOTAL_SHARES_RATIO": 2.5, "CHANGE_RATIO": 0.3},
                    {"ORG_NAME": "Insurer B", "ORG_TYPE_NAME": "insurance",
                     "TOTAL_SHARES_RATIO": "1.1", "CHANGE_RATIO": null}
                ]
            },
            "success": true
        });

        let rows = parse_institute_payload(&payload);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].hold_ratio_pct, Some(2.5));
        assert_eq!(rows[1].hold_ratio_pct, Some(1.1));
        assert_eq!(rows[1].ratio_change_pct, None);
    }

    #[test]
    fn unpublished_report_parses_to_empty() {
        let payload = json!({"result": null, "success": false});
        assert!(parse_institute_payload(&payload).is_empty());
    }

    #[test]
    fn parse_sharholder_rows_strip_time_component() {
        let payload = json!({
            "result": {
                "data": [
                    {"HOLDER_NAME": "Holder A", "END_DATE": "2026-06-30 00:00:00",
                     "HOLD_NUM_RATIO": 8.1},
                ]
            }
        });

        let rows = parse_shareholder_payload(&payload);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].end_date, "2026-06-30");
    }

    #[test]
    fn snapshot_totals_sum_ratios() {
        let snapshot = InstitutePeriodSnapshot::from_rows(
            ReportPeriod::new(2026, 2),
            vec![
                holding("A", "fund", 2.0, 0.5),
                holding("B", "fund", 1.5, -0.2),
            ],
        );
        assert_eq!(snapshot.org_count, 2);
        assert!((snapshot.total_ratio_pct - 3.5).abs() < 1e-9);
    }

    #[test]
    fn institute_trend_compares_periods() {
        let current = InstitutePeriodSnapshot::from_rows(
            ReportPeriod::new(2026, 2),
            vec![
                holding("A", "fund", 2.0, 0.5),
                holding("B", "fund", 1.5, -0.2),
                holding("C", "insurance", 1.0, 0.0),
            ],
        );
        let previous = InstitutePeriodSnapshot::from_rows(
            ReportPeriod::new(2026, 1),
            vec![holding("A", "fund", 1.5, 0.0), holding("B", "fund", 1.7, 0.0)],
        );

        let summary = summarize_institute_trend(&current, &previous);
        assert_eq!(summary.trend, HoldingTrend::Increasing);
        assert!((summary.ratio_change_pct - 1.3).abs() < 1e-9);
        assert_eq!(summary.org_count_change, 1);
        assert_eq!(summary.increased_orgs, 1);
        assert_eq!(summary.decreased_orgs, 1);
        assert_eq!(summary.unchanged_orgs, 1);
        assert_eq!(summary.main_org_types[0], "fund (2)");
    }

    #[test]
    fn top_org_types_caps_at_three() {
        let holdings: Vec<_> = ["fund", "fund", "insurance", "broker", "qfii", "pension"]
            .iter()
            .map(|t| holding("x", t, 1.0, 0.0))
            .collect();
        let types = top_org_types(&holdings);
        assert_eq!(types.len(), 3);
        assert_eq!(types[0], "fund (2)");
    }

    #[test]
    fn shareholder_comparison_counts_changes() {
        let records = vec![
            record("2026-06-30", "Alpha", 8.0),
            record("2026-06-30", "Beta", 5.0),
            record("2026-06-30", "Newcomer", 2.0),
            record("2026-03-31", "Alpha", 7.0),
            record("2026-03-31", "Beta", 6.0),
            record("2026-03-31", "Departed", 1.5),
        ];

        let summary = compare_shareholder_periods(&records).unwrap();
        assert_eq!(summary.latest_date, "2026-06-30");
        assert_eq!(summary.previous_date, "2026-03-31");
        assert_eq!(summary.increased, 1);
        assert_eq!(summary.decreased, 1);
        assert_eq!(summary.unchanged, 0);
        assert_eq!(summary.new_holders, 1);
        assert_eq!(summary.exited_holders, 1);
        assert_eq!(summary.trend, HoldingTrend::Unchanged);
    }

    #[test]
    fn shareholder_comparison_needs_two_dates() {
        let records = vec![record("2026-06-30", "Alpha", 8.0)];
        assert!(compare_shareholder_periods(&records).is_none());
    }

    #[test]
    fn shareholder_trend_follows_majority() {
        let records = vec![
            record("2026-06-30", "Alpha", 9.0),
            record("2026-06-30", "Beta", 6.0),
            record("2026-03-31", "Alpha", 7.0),
            record("2026-03-31", "Beta", 5.0),
        ];
        let summary = compare_shareholder_periods(&records).unwrap();
        assert_eq!(summary.trend, HoldingTrend::Increasing);
    }
}
