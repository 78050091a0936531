//! Market tradability scoring
//!
//! Turns a [`MarketSnapshot`] into four normalized sub-scores and one
//! weighted overall score. Pure and total: every snapshot, however
//! degenerate, produces scores in [0, 1].

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::common::types::{clamp_unit, MarketSnapshot};
use crate::config::EvaluatorConfig;

/// Liquidity at which the liquidity score saturates
const FULL_LIQUIDITY: Decimal = dec!(200);
/// 24h volume at which the volume score saturates
const FULL_VOLUME: Decimal = dec!(100);
/// Multiplier applied to volume/liquidity turnover
const TURNOVER_MULTIPLIER: Decimal = dec!(2);

const WEIGHT_LIQUIDITY: Decimal = dec!(0.30);
const WEIGHT_TIME: Decimal = dec!(0.25);
const WEIGHT_VOLATILITY: Decimal = dec!(0.25);
const WEIGHT_VOLUME: Decimal = dec!(0.20);

/// Per-market tradability scores, each in [0, 1]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationScores {
    pub liquidity: Decimal,
    pub time: Decimal,
    pub volatility: Decimal,
    pub volume: Decimal,
    pub overall: Decimal,
}

impl EvaluationScores {
    /// Build scores from the four sub-scores, deriving the weighted overall
    pub fn from_components(
        liquidity: Decimal,
        time: Decimal,
        volatility: Decimal,
        volume: Decimal,
    ) -> Self {
        let liquidity = clamp_unit(liquidity);
        let time = clamp_unit(time);
        let volatility = clamp_unit(volatility);
        let volume = clamp_unit(volume);
        let overall = liquidity * WEIGHT_LIQUIDITY
            + time * WEIGHT_TIME
            + volatility * WEIGHT_VOLATILITY
            + volume * WEIGHT_VOLUME;

        Self {
            liquidity,
            time,
            volatility,
            volume,
            overall: clamp_unit(overall),
        }
    }
}

/// Stateless market scorer
#[derive(Debug, Clone)]
pub struct MarketEvaluator {
    min_liquidity: Decimal,
}

impl MarketEvaluator {
    pub fn new(min_liquidity: Decimal) -> Self {
        Self { min_liquidity }
    }

    pub fn from_config(config: &EvaluatorConfig) -> Self {
        Self::new(config.min_liquidity)
    }

    /// Score a market against the current wall clock
    pub fn evaluate(&self, market: &MarketSnapshot) -> EvaluationScores {
        self.evaluate_at(market, Utc::now())
    }

    /// Score a market as of `now`
    pub fn evaluate_at(&self, market: &MarketSnapshot, now: DateTime<Utc>) -> EvaluationScores {
        EvaluationScores::from_components(
            self.liquidity_score(market),
            time_score(market.close_time, now),
            volatility_score(market),
            volume_score(market),
        )
    }

    /// Zero below the floor, then a linear ramp saturating at 200
    pub fn liquidity_score(&self, market: &MarketSnapshot) -> Decimal {
        if market.total_liquidity < self.min_liquidity {
            return Decimal::ZERO;
        }
        clamp_unit(market.total_liquidity / FULL_LIQUIDITY)
    }
}

/// Piecewise preference for markets closing in one to seven days
///
/// Each band includes its lower bound.
pub fn time_score(close_time: Option<DateTime<Utc>>, now: DateTime<Utc>) -> Decimal {
    let Some(close_time) = close_time else {
        return dec!(0.5);
    };

    let remaining = close_time - now;
    if remaining < Duration::zero() {
        dec!(0.0)
    } else if remaining < Duration::days(1) {
        dec!(0.3)
    } else if remaining < Duration::days(7) {
        dec!(1.0)
    } else if remaining < Duration::days(30) {
        dec!(0.7)
    } else {
        dec!(0.4)
    }
}

/// Trading activity relative to depth
pub fn volatility_score(market: &MarketSnapshot) -> Decimal {
    let turnover = if market.total_liquidity > Decimal::ZERO {
        // Overflow only happens for absurd ratios, which saturate anyway
        market
            .volume_24h
            .checked_div(market.total_liquidity)
            .unwrap_or(Decimal::ONE)
    } else {
        Decimal::ZERO
    };
    clamp_unit(clamp_unit(turnover) * TURNOVER_MULTIPLIER)
}

pub fn volume_score(market: &MarketSnapshot) -> Decimal {
    clamp_unit(market.volume_24h / FULL_VOLUME)
}
