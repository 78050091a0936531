use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::common::types::Side;

/// Output of every sizing strategy
///
/// A decline always carries a zero amount. The side of a decline is
/// meaningless and reported as NO.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub trade: bool,
    pub amount: Decimal,
    pub side: Side,
    /// Human-readable explanation, for logs and the trade journal
    pub reason: String,
}

impl Recommendation {
    /// Create a trade recommendation
    pub fn trade(side: Side, amount: Decimal, reason: impl Into<String>) -> Self {
        Self {
            trade: true,
            amount,
            side,
            reason: reason.into(),
        }
    }

    /// Create a no-trade recommendation
    pub fn decline(reason: impl Into<String>) -> Self {
        Self {
            trade: false,
            amount: Decimal::ZERO,
            side: Side::No,
            reason: reason.into(),
        }
    }

    /// Returns true if this recommends trading
    pub fn is_trade(&self) -> bool {
        self.trade
    }
}
