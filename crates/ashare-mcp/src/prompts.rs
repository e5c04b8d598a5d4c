//! MCP prompt templates for common fund-flow analysis workflows
//!
//! Prompts provide pre-configured templates that guide AI assistants
//! through common tasks like market-wide screening and single-stock
//! deep dives.

use crate::Result;
use serde::Serialize;

/// Prompt descriptor for MCP prompts/list
#[derive(Debug, Serialize)]
pub struct PromptDescriptor {
    pub name: &'static str,
    pub description: &'static str,
    pub arguments: Vec<PromptArgumentDescriptor>,
}

/// Argument definition for prompt templates
#[derive(Debug, Serialize)]
pub struct PromptArgumentDescriptor {
    pub name: &'static str,
    pub description: &'static str,
    pub required: bool,
}

/// Get all available prompt templates
pub fn list_prompts() -> Vec<PromptDescriptor> {
    vec![
        PromptDescriptor {
            name: "fund_flow_screen",
            description: "Screen the market for decisive main-fund moves and interpret the hits",
            arguments: vec![
                PromptArgumentDescriptor {
                    name: "risk_appetite",
                    description: "Screening strictness: conservative, balanced, aggressive",
                    required: false,
                },
                PromptArgumentDescriptor {
                    name: "board",
                    description: "Board to screen: all, sh_sz_a, sh_a, star, sz_a, chinext",
                    required: false,
                },
            ],
        },
        PromptDescriptor {
            name: "stock_flow_deep_dive",
            description: "Analyze one stock's recent fund flow and holding trends in depth",
            arguments: vec![PromptArgumentDescriptor {
                name: "stock_code",
                description: "Six-digit stock code to analyze",
                required: true,
            }],
        },
    ]
}

/// Get a specific prompt template by name.
///
/// Returns the prompt description and rendered message text.
pub fn get_prompt(name: &str, arguments: &serde_json::Value) -> Result<(String, String)> {
    match name {
        "fund_flow_screen" => get_fund_flow_screen_prompt(arguments),
        "stock_flow_deep_dive" => get_stock_flow_deep_dive_prompt(arguments),
        _ => Err(crate::Error::not_found(format!("Unknown prompt: {}", name))),
    }
}

fn get_fund_flow_screen_prompt(args: &serde_json::Value) -> Result<(String, String)> {
    let risk_appetite = args["risk_appetite"].as_str().unwrap_or("balanced");
    let board = args["board"].as_str().unwrap_or("all");

    let thresholds = match risk_appetite {
        "conservative" => {
            "main_fund_threshold_wan: 10000, turnover_share_threshold_pct: 8.0, \
             price_change_threshold_pct: 4.0. Only heavyweight, unambiguous moves."
        }
        "balanced" => "Use the tool defaults (5000 wan / 6% / 3% / 10%).",
        "aggressive" => {
            "main_fund_threshold_wan: 2000, turnover_share_threshold_pct: 4.0, \
             price_change_threshold_pct: 2.0, max_results: 20. Wider net, more noise."
        }
        _ => "Use the tool defaults.",
    };

    let text = format!(
        r#"# Market Fund Flow Screen

Screen board **{board}** for decisive main-fund activity with **{risk_appetite}** strictness.

## Parameters
{thresholds}

## Steps
1. Call `analyze_large_fund_flow` with board "{board}" and the parameters above
2. For each hit, note:
   - Flow direction versus price direction (see the analysis guide resource)
   - Main-fund share of turnover (conviction of the move)
   - Institutional and shareholder trends when present
3. Pick the 2-3 strongest candidates and call `analyze_stock_fund_flow_detail`
   to check whether today's move continues a multi-day pattern

## Expected Output
A ranked shortlist with, per stock: the flow reading, whether holdings
support it, and whether the multi-day history confirms it. Flag outflow-
into-strength cases explicitly."#
    );

    Ok((
        format!("Fund flow screen of board {board} ({risk_appetite})"),
        text,
    ))
}

fn get_stock_flow_deep_dive_prompt(args: &serde_json::Value) -> Result<(String, String)> {
    let stock_code = args["stock_code"]
        .as_str()
        .ok_or_else(|| crate::Error::invalid_param("stock_code", "Missing required argument"))?;

    let text = format!(
        r#"# Single-Stock Fund Flow Deep Dive: {stock_code}

Analyze the recent capital-flow picture of stock **{stock_code}**.

## Steps

1. **Multi-day flow** (use `analyze_stock_fund_flow_detail`)
   - Run with days: 5 and days: 20 and compare the two windows
   - Note `bias`, `inflow_days` vs `outflow_days`, and the order-size
     breakdown (extra-large orders moving against small orders is the
     classic accumulation/distribution footprint)

2. **Same-day context** (use `analyze_large_fund_flow`)
   - Screen the stock's board with low thresholds and check whether
     {stock_code} appears, and where it ranks

3. **Synthesis**
   - Is the flow persistent or a one-day event?
   - Does price action confirm or diverge from the flow?
   - What do the institutional and shareholder trends add?

## Expected Output
A short assessment: flow direction and persistence, price confirmation,
holding support, and the main caveat."#
    );

    Ok((format!("Fund flow deep dive for {stock_code}"), text))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_list_prompts() {
        let prompts = list_prompts();
        assert_eq!(prompts.len(), 2);

        let names: Vec<_> = prompts.iter().map(|p| p.name).collect();
        assert!(names.contains(&"fund_flow_screen"));
        assert!(names.contains(&"stock_flow_deep_dive"));
    }

    #[test]
    fn test_fund_flow_screen_prompt() {
        let args = json!({ "risk_appetite": "conservative", "board": "star" });
        let (description, text) = get_prompt("fund_flow_screen", &args).unwrap();
        assert!(description.contains("star"));
        assert!(text.contains("10000"));
        assert!(text.contains("analyze_large_fund_flow"));
    }

    #[test]
    fn test_fund_flow_screen_defaults() {
        let (_, text) = get_prompt("fund_flow_screen", &json!({})).unwrap();
        assert!(text.contains("balanced"));
        assert!(text.contains("all"));
    }

    #[test]
    fn test_stock_flow_deep_dive_prompt() {
        let args = json!({ "stock_code": "600519" });
        let (description, text) = get_prompt("stock_flow_deep_dive", &args).unwrap();
        assert!(description.contains("600519"));
        assert!(text.contains("analyze_stock_fund_flow_detail"));
    }

    #[test]
    fn test_missing_required_argument() {
        let result = get_prompt("stock_flow_deep_dive", &json!({}));
        assert!(result.is_err());
    }

    #[test]
    fn test_unknown_prompt() {
        let result = get_prompt("nonexistent", &json!({}));
        assert!(result.is_err());
    }
}
