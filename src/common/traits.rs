//! Collaborator interfaces the engine depends on
//!
//! The engine performs no I/O of its own. Market data, forecasts and order
//! placement are reached through these traits so that HTTP clients, retry
//! policies and schedulers stay outside the core.

use async_trait::async_trait;
use rust_decimal::Decimal;
use tracing::info;

use super::errors::Result;
use super::types::{MarketSnapshot, Side};
use crate::forecast::AnalysisRequest;

/// Source of market snapshots and account balance
#[async_trait]
pub trait MarketSource: Send + Sync {
    /// Fetch the (already creator-filtered) markets to consider this cycle
    async fn fetch_markets(&self) -> Result<Vec<MarketSnapshot>>;

    /// Current account balance in currency units
    async fn balance(&self) -> Result<Decimal>;
}

/// Third-party forecaster producing raw, untrusted text
///
/// Implementations may fail or return garbage; the engine tolerates both.
#[async_trait]
pub trait ForecastProvider: Send + Sync {
    /// Answer `request` for `market` with raw text
    async fn forecast(&self, market: &MarketSnapshot, request: &AnalysisRequest) -> Result<String>;
}

/// Venue that accepts finalized bets
#[async_trait]
pub trait ExecutionVenue: Send + Sync {
    /// Place a bet, returning `Ok(true)` only on confirmed execution
    ///
    /// # Arguments
    /// * `market_id` - Market to bet on
    /// * `amount` - Currency amount, already clamped by the risk ledger
    /// * `side` - YES or NO
    async fn place_bet(&self, market_id: &str, amount: Decimal, side: Side) -> Result<bool>;

    /// Name of the venue, for logs
    fn venue_name(&self) -> &'static str;
}

/// Venue that confirms every bet without sending it anywhere
#[derive(Debug, Clone, Default)]
pub struct DryRunVenue;

#[async_trait]
impl ExecutionVenue for DryRunVenue {
    async fn place_bet(&self, market_id: &str, amount: Decimal, side: Side) -> Result<bool> {
        info!("[dry-run] {} bet of {:.2} on market {}", side, amount, market_id);
        Ok(true)
    }

    fn venue_name(&self) -> &'static str {
        "dry-run"
    }
}
