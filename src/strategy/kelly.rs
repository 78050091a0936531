use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tracing::{debug, info};

use crate::common::types::{MarketSnapshot, Side};
use crate::evaluator::EvaluationScores;
use crate::forecast::Prediction;
use crate::strategy::traits::SizingPolicy;
use crate::strategy::types::Recommendation;

/// Bets below this are not worth placing
pub const MIN_KELLY_BET: Decimal = dec!(1.0);

/// Fractional Kelly sizing on the side the forecast favors
///
/// For a YES bet `p` is the forecast and `q` the market price; for NO both
/// are complemented. Full Kelly for a binary contract bought at `q` is
/// `(p - q) / (1 - q)`; the bet is that fraction scaled by
/// `kelly_fraction` and expressed per 100 units, capped at `max_bet`.
#[derive(Debug, Clone, PartialEq)]
pub struct KellyStrategy {
    pub max_bet: Decimal,
    pub kelly_fraction: Decimal,
}

impl KellyStrategy {
    pub fn new(max_bet: Decimal, kelly_fraction: Decimal) -> Self {
        Self {
            max_bet,
            kelly_fraction,
        }
    }

    /// Full Kelly fraction for buying at `q` with belief `p`; zero when `q` is 1
    pub fn full_kelly(p: Decimal, q: Decimal) -> Decimal {
        if q >= Decimal::ONE {
            return Decimal::ZERO;
        }
        (p - q) / (Decimal::ONE - q)
    }
}

impl Default for KellyStrategy {
    fn default() -> Self {
        Self::new(dec!(50), dec!(0.25))
    }
}

impl SizingPolicy for KellyStrategy {
    fn name(&self) -> &str {
        "kelly"
    }

    fn should_trade(
        &self,
        market: &MarketSnapshot,
        _scores: &EvaluationScores,
        prediction: Option<&Prediction>,
    ) -> Recommendation {
        let Some(prediction) = prediction else {
            return Recommendation::decline("kelly: no prediction");
        };

        let market_prob = market.implied_probability();
        let (side, p, q) = if prediction.probability > market_prob {
            (Side::Yes, prediction.probability, market_prob)
        } else {
            (
                Side::No,
                Decimal::ONE - prediction.probability,
                Decimal::ONE - market_prob,
            )
        };

        let edge = p - q;
        if edge <= Decimal::ZERO {
            return Recommendation::decline("kelly: no positive edge");
        }

        let kelly = Self::full_kelly(p, q);
        let amount = self.max_bet.min(kelly * self.kelly_fraction * dec!(100));

        if amount < MIN_KELLY_BET {
            debug!("Kelly bet {} below minimum {}", amount, MIN_KELLY_BET);
            return Recommendation::decline(format!(
                "kelly: bet {} below minimum {}",
                amount, MIN_KELLY_BET
            ));
        }

        info!("Kelly strategy: {} bet of {:.2} (kelly: {:.4})", side, amount, kelly);
        Recommendation::trade(side, amount, format!("kelly: fraction {:.4}", kelly))
    }
}
