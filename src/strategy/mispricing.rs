use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tracing::info;

use crate::common::types::{clamp_unit, MarketSnapshot, Side};
use crate::evaluator::EvaluationScores;
use crate::forecast::Prediction;
use crate::strategy::traits::SizingPolicy;
use crate::strategy::types::Recommendation;

/// Bets against a market that strays from a fair-value estimate
///
/// Fair value is the forecast probability when one exists, otherwise the
/// evaluator's overall score is used as a weak proxy. Sizing is linear in
/// the gap: `min(max_bet, edge × 200)`.
#[derive(Debug, Clone, PartialEq)]
pub struct MispricingStrategy {
    pub max_bet: Decimal,
    pub min_edge: Decimal,
}

impl MispricingStrategy {
    pub fn new(max_bet: Decimal, min_edge: Decimal) -> Self {
        Self { max_bet, min_edge }
    }
}

impl Default for MispricingStrategy {
    fn default() -> Self {
        Self::new(dec!(50), dec!(0.1))
    }
}

impl SizingPolicy for MispricingStrategy {
    fn name(&self) -> &str {
        "mispricing"
    }

    fn should_trade(
        &self,
        market: &MarketSnapshot,
        scores: &EvaluationScores,
        prediction: Option<&Prediction>,
    ) -> Recommendation {
        let fair = match prediction {
            Some(p) => p.probability,
            None => clamp_unit(scores.overall),
        };
        let market_prob = market.implied_probability();
        let edge = (fair - market_prob).abs();

        if edge < self.min_edge {
            return Recommendation::decline(format!("mispricing: {} below {}", edge, self.min_edge));
        }

        let side = if fair > market_prob { Side::Yes } else { Side::No };
        let amount = self.max_bet.min(edge * dec!(200));

        info!("Mispricing strategy: {} bet of {:.2} (edge: {})", side, amount, edge);
        Recommendation::trade(side, amount, format!("mispricing: fair {} vs {}", fair, market_prob))
    }
}
