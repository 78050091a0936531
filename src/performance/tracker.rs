use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::common::types::Side;

/// One executed bet, as journaled
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeRecord {
    pub timestamp: DateTime<Utc>,
    pub market_id: String,
    pub market_question: String,
    pub side: Side,
    pub amount: Decimal,
    /// Market probability when the bet was placed
    pub probability: Decimal,
    pub reasoning: String,
}

/// Aggregate view over the trade journal and balance history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceStats {
    pub total_trades: usize,
    pub total_invested: Decimal,
    pub total_pnl: Decimal,
    /// Percent of the starting balance
    pub roi: Decimal,
    pub starting_balance: Option<Decimal>,
    pub current_balance: Option<Decimal>,
}

/// In-memory trade journal with balance tracking
///
/// The tracker never touches disk. It is `Serialize + Deserialize` so the
/// caller can persist it between runs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PerformanceTracker {
    trades: Vec<TradeRecord>,
    starting_balance: Option<Decimal>,
    current_balance: Option<Decimal>,
}

impl PerformanceTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_trade(
        &mut self,
        market_id: &str,
        market_question: &str,
        side: Side,
        amount: Decimal,
        probability: Decimal,
        reasoning: &str,
    ) -> &TradeRecord {
        let preview: String = market_question.chars().take(50).collect();
        info!("Recorded trade: {}... {} {:.2}", preview, side, amount);

        self.trades.push(TradeRecord {
            timestamp: Utc::now(),
            market_id: market_id.to_string(),
            market_question: market_question.to_string(),
            side,
            amount,
            probability,
            reasoning: reasoning.to_string(),
        });
        &self.trades[self.trades.len() - 1]
    }

    /// Update the current balance; the first call also fixes the starting balance
    pub fn update_balance(&mut self, balance: Decimal) {
        if self.starting_balance.is_none() {
            self.starting_balance = Some(balance);
        }
        self.current_balance = Some(balance);
    }

    pub fn statistics(&self) -> PerformanceStats {
        let total_invested = self
            .trades
            .iter()
            .fold(Decimal::ZERO, |sum, t| sum.saturating_add(t.amount));

        let total_pnl = match (self.starting_balance, self.current_balance) {
            (Some(start), Some(current)) => current.saturating_sub(start),
            _ => Decimal::ZERO,
        };

        let roi = match self.starting_balance {
            Some(start) if !start.is_zero() => total_pnl
                .checked_div(start)
                .map_or(Decimal::MAX, |ratio| ratio.saturating_mul(Decimal::ONE_HUNDRED)),
            _ => Decimal::ZERO,
        };

        PerformanceStats {
            total_trades: self.trades.len(),
            total_invested,
            total_pnl,
            roi,
            starting_balance: self.starting_balance,
            current_balance: self.current_balance,
        }
    }

    /// The last `n` trades, oldest first
    pub fn recent_trades(&self, n: usize) -> &[TradeRecord] {
        let start = self.trades.len().saturating_sub(n);
        &self.trades[start..]
    }

    pub fn trades(&self) -> &[TradeRecord] {
        &self.trades
    }
}
