use crate::common::types::MarketSnapshot;
use crate::evaluator::EvaluationScores;
use crate::forecast::Prediction;
use crate::strategy::types::Recommendation;

/// Contract shared by every sizing policy
///
/// # Implementation Notes
///
/// - `should_trade` must be pure: no I/O, no interior mutability
/// - It must be total: bad inputs decline, they never panic
/// - Budget enforcement is not the policy's job; the risk ledger clamps later
pub trait SizingPolicy: Send + Sync {
    /// Identifier used in logs and recommendation reasons
    fn name(&self) -> &str;

    /// Decide whether, which side and how much to bet
    ///
    /// # Arguments
    /// * `market` - Current market snapshot
    /// * `scores` - Evaluator output for the same snapshot
    /// * `prediction` - External forecast, if one was obtained
    fn should_trade(
        &self,
        market: &MarketSnapshot,
        scores: &EvaluationScores,
        prediction: Option<&Prediction>,
    ) -> Recommendation;
}
