//! Stock code normalization and exchange classification.
//!
//! Upstream endpoints address a stock three ways: the bare six-digit code
//! (`600519`), a `market.code` secid (`1.600519`) and an exchange-suffixed
//! secucode (`600519.SH`). This module converts user-supplied codes into all
//! three and classifies a code into its exchange by prefix.

use crate::error::{Error, Result};

/// Exchange a stock code belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exchange {
    /// Shanghai Stock Exchange (main board 60x, STAR Market 68x).
    Shanghai,
    /// Shenzhen Stock Exchange (main board 00x, ChiNext 30x).
    Shenzhen,
    /// Beijing Stock Exchange (43x, 83x, 87x, 88x).
    Beijing,
}

impl Exchange {
    /// Short lowercase marker used in CLI flags and cache keys.
    pub fn as_str(&self) -> &'static str {
        match self {
            Exchange::Shanghai => "sh",
            Exchange::Shenzhen => "sz",
            Exchange::Beijing => "bj",
        }
    }

    /// Numeric market prefix for push2-style `secid` parameters.
    pub fn market_id(&self) -> u8 {
        match self {
            Exchange::Shanghai => 1,
            // Shenzhen and Beijing both live under market 0 upstream.
            Exchange::Shenzhen | Exchange::Beijing => 0,
        }
    }

    /// Uppercase suffix for datacenter `SECUCODE` filters.
    pub fn secucode_suffix(&self) -> &'static str {
        match self {
            Exchange::Shanghai => "SH",
            Exchange::Shenzhen => "SZ",
            Exchange::Beijing => "BJ",
        }
    }
}

/// Normalize a user-supplied stock code to the bare six digits.
///
/// Exchange suffixes (`600519.SH`) are stripped and over-long codes keep
/// their last six characters (`sh600519` style prefixes). The result must be
/// six ASCII digits.
pub fn normalize_code(code: &str) -> Result<String> {
    let trimmed = code.trim();
    // "600519.SH" keeps the head; "1.600519" (secid form) keeps the tail.
    let without_suffix = match trimmed.split_once('.') {
        Some((head, tail)) if tail.bytes().all(|b| b.is_ascii_alphabetic()) => head,
        Some((_, tail)) => tail,
        None => trimmed,
    };
    let tail = if without_suffix.len() > 6 {
        &without_suffix[without_suffix.len() - 6..]
    } else {
        without_suffix
    };

    if tail.len() == 6 && tail.bytes().all(|b| b.is_ascii_digit()) {
        Ok(tail.to_string())
    } else {
        Err(Error::InvalidStockCode {
            code: code.to_string(),
        })
    }
}

/// Classify a normalized six-digit code into its exchange by prefix.
pub fn exchange_of(code: &str) -> Result<Exchange> {
    if code.len() != 6 || !code.bytes().all(|b| b.is_ascii_digit()) {
        return Err(Error::InvalidStockCode {
            code: code.to_string(),
        });
    }

    match &code[..2] {
        "60" | "68" => Ok(Exchange::Shanghai),
        "00" | "30" => Ok(Exchange::Shenzhen),
        "43" | "83" | "87" | "88" => Ok(Exchange::Beijing),
        _ => Err(Error::UnknownExchange {
            code: code.to_string(),
        }),
    }
}

/// `market.code` form used by the push2 quote and fund-flow endpoints.
pub fn secid(code: &str) -> Result<String> {
    let normalized = normalize_code(code)?;
    let exchange = exchange_of(&normalized)?;
    Ok(format!("{}.{}", exchange.market_id(), normalized))
}

/// `CODE.EX` form used by the datacenter F10 report filters.
pub fn secucode(code: &str) -> Result<String> {
    let normalized = normalize_code(code)?;
    let exchange = exchange_of(&normalized)?;
    Ok(format!("{}.{}", normalized, exchange.secucode_suffix()))
}
