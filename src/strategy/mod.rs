//! Strategy module for trade decision making
//!
//! Every strategy turns the same three inputs into a [`Recommendation`]:
//! the market snapshot, the evaluator's scores and an optional forecast.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    PURE (no shared state)                   │
//! ├─────────────────────────────────────────────────────────────┤
//! │  MarketSnapshot ──► MarketEvaluator ──► EvaluationScores    │
//! │  forecast text  ──► PredictionParser ──► Prediction         │
//! │                         │                                   │
//! │                         ▼                                   │
//! │  Strategy.should_trade() → Recommendation                   │
//! └─────────────────────────────────────────────────────────────┘
//!
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    STATEFUL (one owner)                     │
//! ├─────────────────────────────────────────────────────────────┤
//! │  RiskLedger                                                 │
//! │    - Gates the recommendation against open exposure         │
//! │    - Clamps the amount to the remaining budget              │
//! │    - Records the position once the venue confirms           │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Components
//!
//! - [`Strategy`]: Closed set of strategies, dispatched by `match`
//! - [`SizingPolicy`]: Contract every variant implements
//! - [`Recommendation`]: Trade/decline decision with side and amount
//! - [`CompositeStrategy`]: Weighted vote across child strategies
//!
//! # Example
//!
//! ```ignore
//! use judgmental_engine::strategy::{EdgeStrategy, SizingPolicy, Strategy};
//!
//! let strategy = Strategy::Edge(EdgeStrategy::default());
//! let rec = strategy.should_trade(&market, &scores, Some(&prediction));
//! if rec.is_trade() {
//!     // hand rec.amount / rec.side to the risk ledger
//! }
//! ```

mod composite;
mod edge;
mod kelly;
mod mispricing;
mod traits;
mod types;

pub use composite::{aggregate, CompositeStrategy, Vote, MAX_WEIGHT};
pub use edge::{EdgeStrategy, MIN_EDGE};
pub use kelly::{KellyStrategy, MIN_KELLY_BET};
pub use mispricing::MispricingStrategy;
pub use traits::SizingPolicy;
pub use types::Recommendation;

use crate::common::errors::Result;
use crate::common::types::MarketSnapshot;
use crate::config::StrategyConfig;
use crate::evaluator::EvaluationScores;
use crate::forecast::Prediction;

/// All strategies the engine can run
#[derive(Debug, Clone, PartialEq)]
pub enum Strategy {
    Edge(EdgeStrategy),
    Kelly(KellyStrategy),
    Mispricing(MispricingStrategy),
    Composite(CompositeStrategy),
}

impl Strategy {
    /// Default composite: edge and Kelly, equally weighted
    pub fn from_config(config: &StrategyConfig) -> Result<Self> {
        let composite = CompositeStrategy::new(vec![
            Strategy::Edge(EdgeStrategy::new(config.min_confidence, config.max_bet)),
            Strategy::Kelly(KellyStrategy::new(config.max_bet, config.kelly_fraction)),
        ])?;
        Ok(Strategy::Composite(composite))
    }
}

impl SizingPolicy for Strategy {
    fn name(&self) -> &str {
        match self {
            Strategy::Edge(s) => s.name(),
            Strategy::Kelly(s) => s.name(),
            Strategy::Mispricing(s) => s.name(),
            Strategy::Composite(s) => s.name(),
        }
    }

    fn should_trade(
        &self,
        market: &MarketSnapshot,
        scores: &EvaluationScores,
        prediction: Option<&Prediction>,
    ) -> Recommendation {
        match self {
            Strategy::Edge(s) => s.should_trade(market, scores, prediction),
            Strategy::Kelly(s) => s.should_trade(market, scores, prediction),
            Strategy::Mispricing(s) => s.should_trade(market, scores, prediction),
            Strategy::Composite(s) => s.should_trade(market, scores, prediction),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::types::Side;
    use rust_decimal_macros::dec;

    #[test]
    fn test_from_config_builds_default_composite() {
        let strategy = Strategy::from_config(&StrategyConfig::default()).unwrap();
        let Strategy::Composite(composite) = &strategy else {
            panic!("expected composite, got {:?}", strategy);
        };

        assert_eq!(composite.children().len(), 2);
        assert_eq!(composite.children()[0], Strategy::Edge(EdgeStrategy::default()));
        assert_eq!(composite.children()[1], Strategy::Kelly(KellyStrategy::default()));
        assert_eq!(strategy.name(), "composite");
    }

    #[test]
    fn test_enum_dispatch_matches_variant() {
        // Scenario: market 0.35, forecast 0.65 at confidence 0.75
        let market = MarketSnapshot::new("m1", dec!(0.35));
        let scores = EvaluationScores::from_components(dec!(0.5), dec!(0.5), dec!(0.5), dec!(0.5));
        let prediction = Prediction::new(dec!(0.65), dec!(0.75), "undervalued");

        let strategy = Strategy::Edge(EdgeStrategy::default());
        let rec = strategy.should_trade(&market, &scores, Some(&prediction));

        assert_eq!(strategy.name(), "edge");
        assert!(rec.is_trade());
        assert_eq!(rec.side, Side::Yes);
        assert_eq!(rec.amount, dec!(22.5));
    }

    #[test]
    fn test_nested_composite() {
        let inner = CompositeStrategy::new(vec![Strategy::Edge(EdgeStrategy::default())]).unwrap();
        let outer = Strategy::Composite(
            CompositeStrategy::with_weights(vec![Strategy::Composite(inner)], vec![dec!(1)]).unwrap(),
        );
        let market = MarketSnapshot::new("m1", dec!(0.35));
        let scores = EvaluationScores::from_components(dec!(0), dec!(0), dec!(0), dec!(0));
        let prediction = Prediction::new(dec!(0.65), dec!(0.75), "x");

        let rec = outer.should_trade(&market, &scores, Some(&prediction));
        assert_eq!(rec.amount, dec!(22.5));
    }
}
