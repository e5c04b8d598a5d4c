//! Board selections for market-wide quote and fund-flow queries.

use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// A board (market segment) selection for list queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Board {
    /// Every listed stock: all A shares plus both B-share boards.
    #[default]
    All,
    /// Shanghai and Shenzhen A shares.
    ShSzA,
    /// Shanghai A shares (main board and STAR Market).
    ShA,
    /// STAR Market only.
    Star,
    /// Shenzhen A shares (main board and ChiNext).
    SzA,
    /// ChiNext only.
    ChiNext,
    /// Shanghai B shares.
    ShB,
    /// Shenzhen B shares.
    SzB,
}

impl Board {
    /// Upstream `fs` market selector for push2 list endpoints.
    pub fn selector(&self) -> &'static str {
        match self {
            Board::All => "m:0+t:6,m:0+t:80,m:1+t:2,m:1+t:23,m:0+t:7,m:1+t:3",
            Board::ShSzA => "m:0+t:6,m:0+t:80,m:1+t:2,m:1+t:23",
            Board::ShA => "m:1+t:2,m:1+t:23",
            Board::Star => "m:1+t:23",
            Board::SzA => "m:0+t:6,m:0+t:80",
            Board::ChiNext => "m:0+t:80",
            Board::ShB => "m:1+t:3",
            Board::SzB => "m:0+t:7",
        }
    }

    /// Stable lowercase name used in tool parameters and cache keys.
    pub fn as_str(&self) -> &'static str {
        match self {
            Board::All => "all",
            Board::ShSzA => "sh_sz_a",
            Board::ShA => "sh_a",
            Board::Star => "star",
            Board::SzA => "sz_a",
            Board::ChiNext => "chinext",
            Board::ShB => "sh_b",
            Board::SzB => "sz_b",
        }
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Board {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "all" => Ok(Board::All),
            "sh_sz_a" | "shsz_a" => Ok(Board::ShSzA),
            "sh_a" => Ok(Board::ShA),
            "star" => Ok(Board::Star),
            "sz_a" => Ok(Board::SzA),
            "chinext" => Ok(Board::ChiNext),
            "sh_b" => Ok(Board::ShB),
            "sz_b" => Ok(Board::SzB),
            other => Err(Error::UnknownBoard {
                name: other.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_round_trips_every_board() {
        for board in [
            Board::All,
            Board::ShSzA,
            Board::ShA,
            Board::Star,
            Board::SzA,
            Board::ChiNext,
            Board::ShB,
            Board::SzB,
        ] {
            assert_eq!(board.as_str().parse::<Board>().unwrap(), board);
        }
    }

    #[test]
    fn parse_is_case_and_dash_insensitive() {
        assert_eq!("SH_A".parse::<Board>().unwrap(), Board::ShA);
        assert_eq!("sh-sz-a".parse::<Board>().unwrap(), Board::ShSzA);
    }

    #[test]
    fn parse_rejects_unknown_names() {
        assert!("nasdaq".parse::<Board>().is_err());
    }

    #[test]
    fn star_selector_is_subset_of_sh_a() {
        assert!(Board::ShA.selector().contains(Board::Star.selector()));
    }
}
