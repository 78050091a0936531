use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::common::errors::{ensure_non_negative, ensure_probability, Result};
use crate::common::types::Side;
use crate::config::RiskConfig;

/// An open bet on one market
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub market_id: String,
    pub amount: Decimal,
    pub side: Side,
    /// Market probability at the time the bet was placed
    pub entry_probability: Decimal,
    pub opened_at: DateTime<Utc>,
}

/// Derived view of the ledger
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioState {
    pub open_positions: usize,
    pub total_at_risk: Decimal,
    pub positions: HashMap<String, Position>,
}

/// Why the ledger refused a trade
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DenyReason {
    AlreadyHolding,
    ExceedsPositionSize { max: Decimal },
    ExceedsPortfolioRisk { max_ratio: Decimal },
    TooManyOpen { max: usize },
}

impl fmt::Display for DenyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DenyReason::AlreadyHolding => write!(f, "Already have position"),
            DenyReason::ExceedsPositionSize { max } => {
                write!(f, "Exceeds max position size {}", max)
            }
            DenyReason::ExceedsPortfolioRisk { max_ratio } => {
                write!(f, "Exceeds portfolio risk limit {}", max_ratio)
            }
            DenyReason::TooManyOpen { max } => write!(f, "At max open positions {}", max),
        }
    }
}

/// Outcome of [`RiskLedger::can_trade`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TradeGate {
    Allowed,
    Denied(DenyReason),
}

impl TradeGate {
    pub fn is_allowed(&self) -> bool {
        matches!(self, TradeGate::Allowed)
    }
}

/// Full ledger state for external persistence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    pub limits: RiskConfig,
    pub positions: Vec<Position>,
}

impl LedgerSnapshot {
    /// Rebuild a ledger from a snapshot
    pub fn restore(self) -> RiskLedger {
        let mut ledger = RiskLedger::new(self.limits);
        for position in self.positions {
            ledger.positions.insert(position.market_id.clone(), position);
        }
        ledger
    }
}

/// Open positions plus the limits new ones are admitted against
///
/// # Invariants
///
/// - At most one open position per market id
/// - A position admitted through gate → clamp never exceeds `max_position_size`
/// - After admission, total at risk ≤ balance × `max_portfolio_risk`
/// - Open count never exceeds `max_markets_open` through `can_trade`
///
/// The portfolio bound holds at admission time only. A later drop in
/// balance does not force positions closed.
#[derive(Debug, Clone, PartialEq)]
pub struct RiskLedger {
    limits: RiskConfig,
    positions: HashMap<String, Position>,
}

impl RiskLedger {
    pub fn new(limits: RiskConfig) -> Self {
        Self {
            limits,
            positions: HashMap::new(),
        }
    }

    pub fn limits(&self) -> &RiskConfig {
        &self.limits
    }

    pub fn has_position(&self, market_id: &str) -> bool {
        self.positions.contains_key(market_id)
    }

    pub fn position(&self, market_id: &str) -> Option<&Position> {
        self.positions.get(market_id)
    }

    pub fn open_count(&self) -> usize {
        self.positions.len()
    }

    /// Sum of amounts across open positions
    pub fn total_at_risk(&self) -> Decimal {
        self.positions.values().map(|p| p.amount).sum()
    }

    /// Check a proposed bet against every limit
    ///
    /// Checks run in a fixed order and the first failure is reported:
    /// duplicate market, position size, portfolio ratio (skipped when
    /// `balance` is not positive), open count.
    pub fn can_trade(&self, market_id: &str, amount: Decimal, balance: Decimal) -> Result<TradeGate> {
        let amount = ensure_non_negative(amount)?;

        if self.has_position(market_id) {
            debug!("Already have position in market {}", market_id);
            return Ok(TradeGate::Denied(DenyReason::AlreadyHolding));
        }

        if amount > self.limits.max_position_size {
            debug!(
                "Bet {} exceeds max position size {}",
                amount, self.limits.max_position_size
            );
            return Ok(TradeGate::Denied(DenyReason::ExceedsPositionSize {
                max: self.limits.max_position_size,
            }));
        }

        if balance > Decimal::ZERO {
            // Ratio overflow counts as over budget
            let risk_ratio = (self.total_at_risk() + amount)
                .checked_div(balance)
                .unwrap_or(Decimal::MAX);
            if risk_ratio > self.limits.max_portfolio_risk {
                debug!(
                    "Risk ratio {} exceeds max {}",
                    risk_ratio, self.limits.max_portfolio_risk
                );
                return Ok(TradeGate::Denied(DenyReason::ExceedsPortfolioRisk {
                    max_ratio: self.limits.max_portfolio_risk,
                }));
            }
        }

        if self.positions.len() >= self.limits.max_markets_open {
            debug!("Already at max open positions {}", self.limits.max_markets_open);
            return Ok(TradeGate::Denied(DenyReason::TooManyOpen {
                max: self.limits.max_markets_open,
            }));
        }

        Ok(TradeGate::Allowed)
    }

    /// Shrink a proposed bet to fit the remaining budget
    ///
    /// Caps at `max_position_size`, then at the portfolio headroom when
    /// `balance` is positive, then floors at zero. `market_id` is only
    /// used for logging.
    pub fn adjust_bet_size(&self, amount: Decimal, balance: Decimal, market_id: &str) -> Result<Decimal> {
        let proposed = ensure_non_negative(amount)?;

        let mut adjusted = proposed.min(self.limits.max_position_size);
        if balance > Decimal::ZERO {
            let headroom = balance * self.limits.max_portfolio_risk - self.total_at_risk();
            adjusted = adjusted.min(headroom);
        }
        adjusted = adjusted.max(Decimal::ZERO);

        if adjusted != proposed {
            info!(
                "Adjusted bet on {} from {:.2} to {:.2}",
                market_id, proposed, adjusted
            );
        }
        Ok(adjusted)
    }

    /// Record a confirmed bet, replacing any existing position on the market
    pub fn record_position(
        &mut self,
        market_id: &str,
        amount: Decimal,
        side: Side,
        entry_probability: Decimal,
    ) -> Result<&Position> {
        let amount = ensure_non_negative(amount)?;
        let entry_probability = ensure_probability(entry_probability)?;

        let position = Position {
            market_id: market_id.to_string(),
            amount,
            side,
            entry_probability,
            opened_at: Utc::now(),
        };
        info!("Recorded position: {} {} {:.2}", market_id, side, amount);

        self.positions.insert(market_id.to_string(), position);
        Ok(&self.positions[market_id])
    }

    /// Close a position; absent markets are a no-op
    pub fn remove_position(&mut self, market_id: &str) -> Option<Position> {
        let removed = self.positions.remove(market_id);
        if removed.is_some() {
            info!("Removed position: {}", market_id);
        }
        removed
    }

    pub fn portfolio_summary(&self) -> PortfolioState {
        PortfolioState {
            open_positions: self.positions.len(),
            total_at_risk: self.total_at_risk(),
            positions: self.positions.clone(),
        }
    }

    /// Copy out everything needed to rebuild this ledger
    pub fn snapshot(&self) -> LedgerSnapshot {
        let mut positions: Vec<Position> = self.positions.values().cloned().collect();
        positions.sort_by(|a, b| a.market_id.cmp(&b.market_id));
        LedgerSnapshot {
            limits: self.limits.clone(),
            positions,
        }
    }
}

impl Default for RiskLedger {
    fn default() -> Self {
        Self::new(RiskConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::errors::EngineError;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    fn limits(max_position_size: Decimal, max_portfolio_risk: Decimal, max_markets_open: usize) -> RiskConfig {
        RiskConfig {
            max_position_size,
            max_portfolio_risk,
            max_markets_open,
        }
    }

    #[test]
    fn test_scenario_clamp_to_headroom() {
        // Balance 500 at 30% risk leaves 150; 80 already committed
        let mut ledger = RiskLedger::new(limits(dec!(100), dec!(0.3), 10));
        ledger.record_position("m1", dec!(80), Side::Yes, dec!(0.4)).unwrap();

        let adjusted = ledger.adjust_bet_size(dec!(90), dec!(500), "m2").unwrap();
        assert_eq!(adjusted, dec!(70));

        assert_eq!(
            ledger.can_trade("m2", dec!(90), dec!(500)).unwrap(),
            TradeGate::Denied(DenyReason::ExceedsPortfolioRisk { max_ratio: dec!(0.3) })
        );
        assert!(ledger.can_trade("m2", adjusted, dec!(500)).unwrap().is_allowed());
    }

    #[test]
    fn test_duplicate_checked_first() {
        let mut ledger = RiskLedger::new(limits(dec!(10), dec!(0.3), 1));
        ledger.record_position("m1", dec!(5), Side::No, dec!(0.6)).unwrap();

        // Also oversized, over budget and over count; duplicate wins
        assert_eq!(
            ledger.can_trade("m1", dec!(1000), dec!(10)).unwrap(),
            TradeGate::Denied(DenyReason::AlreadyHolding)
        );
    }

    #[test]
    fn test_position_size_before_portfolio() {
        let ledger = RiskLedger::new(limits(dec!(10), dec!(0.3), 10));
        assert_eq!(
            ledger.can_trade("m1", dec!(11), dec!(10)).unwrap(),
            TradeGate::Denied(DenyReason::ExceedsPositionSize { max: dec!(10) })
        );
        assert!(ledger.can_trade("m1", dec!(10), dec!(1000)).unwrap().is_allowed());
    }

    #[test]
    fn test_open_count_limit() {
        let mut ledger = RiskLedger::new(limits(dec!(100), dec!(1), 2));
        ledger.record_position("a", dec!(1), Side::Yes, dec!(0.5)).unwrap();
        ledger.record_position("b", dec!(1), Side::Yes, dec!(0.5)).unwrap();

        assert_eq!(
            ledger.can_trade("c", dec!(1), dec!(1000)).unwrap(),
            TradeGate::Denied(DenyReason::TooManyOpen { max: 2 })
        );
    }

    #[test]
    fn test_zero_balance_skips_portfolio_check() {
        let ledger = RiskLedger::default();
        assert!(ledger.can_trade("m1", dec!(50), dec!(0)).unwrap().is_allowed());
        assert_eq!(ledger.adjust_bet_size(dec!(150), dec!(0), "m1").unwrap(), dec!(100));
    }

    #[test]
    fn test_adjust_floors_at_zero() {
        let mut ledger = RiskLedger::new(limits(dec!(100), dec!(0.1), 10));
        ledger.record_position("m1", dec!(50), Side::Yes, dec!(0.5)).unwrap();
        // Headroom is 100 * 0.1 - 50 = -40
        assert_eq!(ledger.adjust_bet_size(dec!(20), dec!(100), "m2").unwrap(), dec!(0));
    }

    #[test]
    fn test_negative_amounts_rejected() {
        let mut ledger = RiskLedger::default();
        assert!(matches!(
            ledger.can_trade("m1", dec!(-1), dec!(100)),
            Err(EngineError::NegativeAmount(_))
        ));
        assert!(matches!(
            ledger.adjust_bet_size(dec!(-1), dec!(100), "m1"),
            Err(EngineError::NegativeAmount(_))
        ));
        assert!(matches!(
            ledger.record_position("m1", dec!(-1), Side::Yes, dec!(0.5)),
            Err(EngineError::NegativeAmount(_))
        ));
        assert!(matches!(
            ledger.record_position("m1", dec!(1), Side::Yes, dec!(1.5)),
            Err(EngineError::InvalidProbability(_))
        ));
        assert_eq!(ledger.open_count(), 0);
    }

    #[test]
    fn test_record_overwrites_and_remove_is_idempotent() {
        let mut ledger = RiskLedger::default();
        ledger.record_position("m1", dec!(10), Side::Yes, dec!(0.4)).unwrap();
        ledger.record_position("m1", dec!(20), Side::No, dec!(0.6)).unwrap();

        assert_eq!(ledger.open_count(), 1);
        assert_eq!(ledger.total_at_risk(), dec!(20));

        let removed = ledger.remove_position("m1").unwrap();
        assert_eq!(removed.side, Side::No);
        assert!(ledger.remove_position("m1").is_none());
        assert!(ledger.remove_position("never").is_none());
    }

    #[test]
    fn test_portfolio_summary() {
        let mut ledger = RiskLedger::default();
        ledger.record_position("a", dec!(12.5), Side::Yes, dec!(0.3)).unwrap();
        ledger.record_position("b", dec!(7.5), Side::No, dec!(0.7)).unwrap();

        let summary = ledger.portfolio_summary();
        assert_eq!(summary.open_positions, 2);
        assert_eq!(summary.total_at_risk, dec!(20));
        assert_eq!(summary.positions["b"].amount, dec!(7.5));
    }

    #[test]
    fn test_snapshot_restore() {
        let mut ledger = RiskLedger::new(limits(dec!(40), dec!(0.5), 3));
        ledger.record_position("b", dec!(7), Side::No, dec!(0.7)).unwrap();
        ledger.record_position("a", dec!(3), Side::Yes, dec!(0.2)).unwrap();

        let snapshot = ledger.snapshot();
        assert_eq!(snapshot.positions[0].market_id, "a");

        let json = serde_json::to_string(&snapshot).unwrap();
        let restored = serde_json::from_str::<LedgerSnapshot>(&json).unwrap().restore();
        assert_eq!(restored, ledger);
    }

    #[test]
    fn test_gate_then_clamp_never_exceeds_budget() {
        let balance = dec!(400);
        let mut ledger = RiskLedger::new(limits(dec!(60), dec!(0.3), 50));

        for (i, proposed) in [dec!(45), dec!(60), dec!(25), dec!(33), dec!(10), dec!(5)].into_iter().enumerate() {
            let market_id = format!("m{}", i);
            let adjusted = ledger.adjust_bet_size(proposed, balance, &market_id).unwrap();
            if !ledger.can_trade(&market_id, adjusted, balance).unwrap().is_allowed() {
                continue;
            }
            ledger.record_position(&market_id, adjusted, Side::Yes, dec!(0.5)).unwrap();

            assert!(adjusted <= dec!(60));
            assert!(ledger.total_at_risk() <= balance * dec!(0.3));
        }
        assert_eq!(ledger.total_at_risk(), dec!(120));
    }
}
