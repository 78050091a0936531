//! Market-facing types shared by every component

use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::errors::EngineError;

/// Outcome a bet is placed on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    Yes,
    No,
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::Yes => write!(f, "YES"),
            Side::No => write!(f, "NO"),
        }
    }
}

impl FromStr for Side {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "YES" => Ok(Side::Yes),
            "NO" => Ok(Side::No),
            _ => Err(EngineError::InvalidSide(s.to_string())),
        }
    }
}

/// Public state of a binary market as reported by the venue
///
/// Field names accept the venue's camelCase JSON (`totalLiquidity`,
/// `volume24Hours`, `closeTime` in epoch milliseconds, `isResolved`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketSnapshot {
    /// Market identifier
    pub id: String,
    /// Question text, used for logging and prompts only
    #[serde(default)]
    pub question: String,
    /// Implied probability of YES
    #[serde(default = "default_probability")]
    pub probability: Decimal,
    /// Total liquidity in currency units
    #[serde(default)]
    pub total_liquidity: Decimal,
    /// Traded volume over the last 24 hours
    #[serde(default, rename = "volume24Hours")]
    pub volume_24h: Decimal,
    /// When trading closes, if known
    #[serde(default, with = "chrono::serde::ts_milliseconds_option")]
    pub close_time: Option<DateTime<Utc>>,
    /// Whether the market has already resolved
    #[serde(default)]
    pub is_resolved: bool,
}

fn default_probability() -> Decimal {
    dec!(0.5)
}

impl MarketSnapshot {
    pub fn new(id: impl Into<String>, probability: Decimal) -> Self {
        Self {
            id: id.into(),
            question: String::new(),
            probability,
            total_liquidity: Decimal::ZERO,
            volume_24h: Decimal::ZERO,
            close_time: None,
            is_resolved: false,
        }
    }

    pub fn with_question(mut self, question: impl Into<String>) -> Self {
        self.question = question.into();
        self
    }

    pub fn with_liquidity(mut self, liquidity: Decimal) -> Self {
        self.total_liquidity = liquidity;
        self
    }

    pub fn with_volume(mut self, volume_24h: Decimal) -> Self {
        self.volume_24h = volume_24h;
        self
    }

    pub fn with_close_time(mut self, close_time: DateTime<Utc>) -> Self {
        self.close_time = Some(close_time);
        self
    }

    pub fn resolved(mut self) -> Self {
        self.is_resolved = true;
        self
    }

    /// Implied probability forced into [0, 1]
    pub fn implied_probability(&self) -> Decimal {
        clamp_unit(self.probability)
    }
}

/// Clamp a value into [0, 1]
pub fn clamp_unit(value: Decimal) -> Decimal {
    value.clamp(Decimal::ZERO, Decimal::ONE)
}
