use std::future::Future;
use std::sync::Arc;

use rust_decimal::Decimal;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::common::errors::Result;
use crate::common::types::Side;
use crate::risk::ledger::{DenyReason, PortfolioState, Position, RiskLedger, TradeGate};

/// Result of one gate → clamp → execute → record transaction
#[derive(Debug, Clone, PartialEq)]
pub enum Admission {
    /// The venue confirmed and the position is on the ledger
    Executed(Position),
    /// The ledger refused the proposed amount
    Denied(DenyReason),
    /// Clamping left less than the minimum bet
    BelowMinimum(Decimal),
    /// The venue declined; nothing was recorded
    NotConfirmed,
}

/// Ledger handle that can be shared across tasks
///
/// Holds one lock across the whole admission so that two decisions cannot
/// both pass the portfolio check against headroom only one of them fits.
#[derive(Debug, Clone)]
pub struct SharedLedger {
    inner: Arc<Mutex<RiskLedger>>,
    min_bet: Decimal,
}

impl SharedLedger {
    pub fn new(ledger: RiskLedger, min_bet: Decimal) -> Self {
        Self {
            inner: Arc::new(Mutex::new(ledger)),
            min_bet,
        }
    }

    pub fn min_bet(&self) -> Decimal {
        self.min_bet
    }

    /// Run a full admission under the ledger lock
    ///
    /// `execute` receives the clamped amount and must resolve to `Ok(true)`
    /// only when the venue confirmed the bet. An execution error is returned
    /// as-is and leaves the ledger untouched.
    pub async fn admit<F, Fut>(
        &self,
        market_id: &str,
        amount: Decimal,
        side: Side,
        entry_probability: Decimal,
        balance: Decimal,
        execute: F,
    ) -> Result<Admission>
    where
        F: FnOnce(Decimal) -> Fut,
        Fut: Future<Output = Result<bool>>,
    {
        let mut ledger = self.inner.lock().await;

        if let TradeGate::Denied(reason) = ledger.can_trade(market_id, amount, balance)? {
            info!("Cannot trade market {}: {}", market_id, reason);
            return Ok(Admission::Denied(reason));
        }

        let adjusted = ledger.adjust_bet_size(amount, balance, market_id)?;
        if adjusted < self.min_bet {
            debug!("Bet amount {:.2} too small for {}", adjusted, market_id);
            return Ok(Admission::BelowMinimum(adjusted));
        }

        if !execute(adjusted).await? {
            warn!("Venue did not confirm bet on {}", market_id);
            return Ok(Admission::NotConfirmed);
        }

        let position = ledger
            .record_position(market_id, adjusted, side, entry_probability)?
            .clone();
        Ok(Admission::Executed(position))
    }

    pub async fn has_position(&self, market_id: &str) -> bool {
        self.inner.lock().await.has_position(market_id)
    }

    pub async fn remove_position(&self, market_id: &str) -> Option<Position> {
        self.inner.lock().await.remove_position(market_id)
    }

    pub async fn portfolio_summary(&self) -> PortfolioState {
        self.inner.lock().await.portfolio_summary()
    }

    /// Clone the current ledger out from under the lock
    pub async fn ledger(&self) -> RiskLedger {
        self.inner.lock().await.clone()
    }
}
