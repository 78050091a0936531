use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tracing::{debug, info};

use crate::common::types::{MarketSnapshot, Side};
use crate::evaluator::EvaluationScores;
use crate::forecast::Prediction;
use crate::strategy::traits::SizingPolicy;
use crate::strategy::types::Recommendation;

/// Disagreements smaller than this are treated as noise
pub const MIN_EDGE: Decimal = dec!(0.05);

/// Forecast-gated strategy sizing by disagreement × confidence
///
/// Bets `min(max_bet, edge × confidence × 100)` on the side the forecast
/// favors, provided the forecaster is confident enough and disagrees with
/// the market by at least [`MIN_EDGE`].
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeStrategy {
    pub min_confidence: Decimal,
    pub max_bet: Decimal,
}

impl EdgeStrategy {
    pub fn new(min_confidence: Decimal, max_bet: Decimal) -> Self {
        Self {
            min_confidence,
            max_bet,
        }
    }
}

impl Default for EdgeStrategy {
    fn default() -> Self {
        Self::new(dec!(0.6), dec!(50))
    }
}

impl SizingPolicy for EdgeStrategy {
    fn name(&self) -> &str {
        "edge"
    }

    fn should_trade(
        &self,
        market: &MarketSnapshot,
        _scores: &EvaluationScores,
        prediction: Option<&Prediction>,
    ) -> Recommendation {
        let Some(prediction) = prediction else {
            return Recommendation::decline("edge: no prediction");
        };

        if prediction.confidence < self.min_confidence {
            debug!(
                "Forecast confidence {} below threshold {}",
                prediction.confidence, self.min_confidence
            );
            return Recommendation::decline(format!(
                "edge: confidence {} below {}",
                prediction.confidence, self.min_confidence
            ));
        }

        let market_prob = market.implied_probability();
        let edge = (prediction.probability - market_prob).abs();
        if edge < MIN_EDGE {
            debug!("Edge too small: {}", edge);
            return Recommendation::decline(format!("edge: {} below {}", edge, MIN_EDGE));
        }

        let side = if prediction.probability > market_prob {
            Side::Yes
        } else {
            Side::No
        };
        let amount = self.max_bet.min(edge * prediction.confidence * dec!(100));

        info!(
            "Edge strategy: {} bet of {:.2} (edge: {}, confidence: {})",
            side, amount, edge, prediction.confidence
        );
        Recommendation::trade(
            side,
            amount,
            format!("edge: {} at confidence {}", edge, prediction.confidence),
        )
    }
}
