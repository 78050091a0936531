use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::common::errors::{EngineError, Result};
use crate::common::types::Side;

/// How a market settled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Resolution {
    Yes,
    No,
    /// Resolved to the market probability
    Mkt,
    Cancel,
    /// Resolved to a probability; above 0.5 counts for YES
    Numeric(Decimal),
}

impl Resolution {
    /// Whether a bet on `side` won under this resolution
    ///
    /// `Mkt` and `Cancel` are never wins.
    pub fn favors(&self, side: Side) -> bool {
        match (self, side) {
            (Resolution::Yes, Side::Yes) | (Resolution::No, Side::No) => true,
            (Resolution::Numeric(p), Side::Yes) => *p > dec!(0.5),
            (Resolution::Numeric(p), Side::No) => *p <= dec!(0.5),
            _ => false,
        }
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resolution::Yes => write!(f, "YES"),
            Resolution::No => write!(f, "NO"),
            Resolution::Mkt => write!(f, "MKT"),
            Resolution::Cancel => write!(f, "CANCEL"),
            Resolution::Numeric(p) => write!(f, "{}", p),
        }
    }
}

impl FromStr for Resolution {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_uppercase().as_str() {
            "YES" => Ok(Resolution::Yes),
            "NO" => Ok(Resolution::No),
            "MKT" => Ok(Resolution::Mkt),
            "CANCEL" => Ok(Resolution::Cancel),
            other => other
                .parse::<Decimal>()
                .map(Resolution::Numeric)
                .map_err(|_| EngineError::MarketData(format!("unknown resolution {:?}", s))),
        }
    }
}

/// A bet waiting for its market to settle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingPosition {
    pub side: Side,
    pub amount: Decimal,
    pub entry_probability: Decimal,
    pub market_question: String,
    pub entry_time: DateTime<Utc>,
}

/// Settled bet with realized profit or loss
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedPosition {
    pub market_id: String,
    pub market_question: String,
    pub side: Side,
    pub amount: Decimal,
    pub entry_probability: Decimal,
    pub resolution: Resolution,
    pub won: bool,
    pub pnl: Decimal,
    pub resolved_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResolutionMetrics {
    pub total_resolved: usize,
    pub wins: usize,
    pub losses: usize,
    /// Percent of resolved bets that won
    pub win_rate: Decimal,
    pub total_pnl: Decimal,
    pub total_invested: Decimal,
    /// Percent of the amount invested in resolved bets
    pub roi: Decimal,
}

/// Follows open bets until their markets resolve
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResolutionTracker {
    pending: HashMap<String, PendingPosition>,
    resolved: HashMap<String, ResolvedPosition>,
}

impl ResolutionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn track_position(
        &mut self,
        market_id: &str,
        side: Side,
        amount: Decimal,
        entry_probability: Decimal,
        market_question: &str,
    ) {
        debug!("Tracking position: {} {} {:.2}", market_id, side, amount);
        self.pending.insert(
            market_id.to_string(),
            PendingPosition {
                side,
                amount,
                entry_probability,
                market_question: market_question.to_string(),
                entry_time: Utc::now(),
            },
        );
    }

    pub fn is_tracking(&self, market_id: &str) -> bool {
        self.pending.contains_key(market_id)
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Settle a tracked bet; `None` when the market is not being tracked
    ///
    /// `entry_probability` is the market's YES probability at entry, so a
    /// YES share cost `p` and a NO share cost `1 − p`. A win pays
    /// `amount × (1 / price − 1)` (zero at a zero price, saturating at
    /// `Decimal::MAX`); a loss costs the full amount.
    pub fn check_resolution(&mut self, market_id: &str, resolution: Resolution) -> Option<&ResolvedPosition> {
        let position = self.pending.remove(market_id)?;

        let won = resolution.favors(position.side);
        let pnl = if won {
            win_payout(position.side, position.amount, position.entry_probability)
        } else {
            -position.amount
        };

        info!(
            "Market resolved: {} - {} - P&L: {:.2}",
            market_id,
            if won { "WON" } else { "LOST" },
            pnl
        );

        let resolved = ResolvedPosition {
            market_id: market_id.to_string(),
            market_question: position.market_question,
            side: position.side,
            amount: position.amount,
            entry_probability: position.entry_probability,
            resolution,
            won,
            pnl,
            resolved_at: Utc::now(),
        };
        self.resolved.insert(market_id.to_string(), resolved);
        self.resolved.get(market_id)
    }

    pub fn metrics(&self) -> ResolutionMetrics {
        if self.resolved.is_empty() {
            return ResolutionMetrics::default();
        }

        let total_resolved = self.resolved.len();
        let wins = self.resolved.values().filter(|r| r.won).count();
        let total_pnl = self
            .resolved
            .values()
            .fold(Decimal::ZERO, |sum, r| sum.saturating_add(r.pnl));
        let total_invested = self
            .resolved
            .values()
            .fold(Decimal::ZERO, |sum, r| sum.saturating_add(r.amount));

        let win_rate = Decimal::from(wins) / Decimal::from(total_resolved) * Decimal::ONE_HUNDRED;
        let roi = if total_invested > Decimal::ZERO {
            total_pnl
                .checked_div(total_invested)
                .map_or(Decimal::MAX, |ratio| ratio.saturating_mul(Decimal::ONE_HUNDRED))
        } else {
            Decimal::ZERO
        };

        ResolutionMetrics {
            total_resolved,
            wins,
            losses: total_resolved - wins,
            win_rate,
            total_pnl,
            total_invested,
            roi,
        }
    }
}

/// Profit on a winning bet bought at the price of `side`
fn win_payout(side: Side, amount: Decimal, entry_probability: Decimal) -> Decimal {
    let price = match side {
        Side::Yes => entry_probability,
        Side::No => Decimal::ONE - entry_probability,
    };
    if price <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    let odds = Decimal::ONE.checked_div(price).map_or(Decimal::MAX, |r| r - Decimal::ONE);
    amount.saturating_mul(odds)
}
