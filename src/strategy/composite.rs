use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tracing::debug;

use crate::common::errors::{EngineError, Result};
use crate::common::types::{MarketSnapshot, Side};
use crate::evaluator::EvaluationScores;
use crate::forecast::Prediction;
use crate::strategy::traits::SizingPolicy;
use crate::strategy::types::Recommendation;
use crate::strategy::Strategy;

/// Largest weight a single child may carry
pub const MAX_WEIGHT: Decimal = dec!(1000);

/// Weighted vote across several strategies
///
/// Each child that wants to trade contributes `weight × amount` to its
/// side's total. The larger total wins and is the bet amount. An exact
/// tie is a decline: equal conviction on both sides is not consensus.
#[derive(Debug, Clone, PartialEq)]
pub struct CompositeStrategy {
    children: Vec<Strategy>,
    weights: Vec<Decimal>,
}

impl CompositeStrategy {
    /// Combine strategies with equal weights summing to 1
    pub fn new(children: Vec<Strategy>) -> Result<Self> {
        if children.is_empty() {
            return Err(EngineError::InvalidStrategy(
                "composite needs at least one child".to_string(),
            ));
        }
        let weight = Decimal::ONE / Decimal::from(children.len());
        let weights = vec![weight; children.len()];
        Ok(Self { children, weights })
    }

    /// Combine strategies with explicit weights, one per child
    pub fn with_weights(children: Vec<Strategy>, weights: Vec<Decimal>) -> Result<Self> {
        if children.is_empty() {
            return Err(EngineError::InvalidStrategy(
                "composite needs at least one child".to_string(),
            ));
        }
        if children.len() != weights.len() {
            return Err(EngineError::InvalidStrategy(format!(
                "{} children but {} weights",
                children.len(),
                weights.len()
            )));
        }
        if let Some(w) = weights.iter().find(|w| w.is_sign_negative() && !w.is_zero()) {
            return Err(EngineError::InvalidStrategy(format!("negative weight {}", w)));
        }
        if let Some(w) = weights.iter().find(|w| **w > MAX_WEIGHT) {
            return Err(EngineError::InvalidStrategy(format!(
                "weight {} exceeds {}",
                w, MAX_WEIGHT
            )));
        }
        Ok(Self { children, weights })
    }

    pub fn children(&self) -> &[Strategy] {
        &self.children
    }

    pub fn weights(&self) -> &[Decimal] {
        &self.weights
    }
}

impl SizingPolicy for CompositeStrategy {
    fn name(&self) -> &str {
        "composite"
    }

    fn should_trade(
        &self,
        market: &MarketSnapshot,
        scores: &EvaluationScores,
        prediction: Option<&Prediction>,
    ) -> Recommendation {
        let mut votes = Vec::with_capacity(self.children.len());
        for (child, weight) in self.children.iter().zip(&self.weights) {
            let rec = child.should_trade(market, scores, prediction);
            if !rec.is_trade() {
                continue;
            }
            let Some(weighted_amount) = rec.amount.checked_mul(*weight) else {
                debug!("Weighted amount from {} overflowed, declining", child.name());
                return Recommendation::decline(format!("composite: {} vote overflowed", child.name()));
            };
            votes.push(Vote {
                strategy: child.name().to_string(),
                side: rec.side,
                weighted_amount,
            });
        }

        aggregate(&votes)
    }
}

/// One child's weighted recommendation
#[derive(Debug, Clone, PartialEq)]
pub struct Vote {
    pub strategy: String,
    pub side: Side,
    pub weighted_amount: Decimal,
}

/// Sum votes per side; the strictly larger side wins, a tie declines
///
/// The decision depends only on the multiset of (side, amount) pairs,
/// not on their order.
pub fn aggregate(votes: &[Vote]) -> Recommendation {
    if votes.is_empty() {
        return Recommendation::decline("composite: no strategy recommends trading");
    }

    let totals = votes
        .iter()
        .try_fold((Decimal::ZERO, Decimal::ZERO), |(yes, no), vote| match vote.side {
            Side::Yes => Some((yes.checked_add(vote.weighted_amount)?, no)),
            Side::No => Some((yes, no.checked_add(vote.weighted_amount)?)),
        });
    let Some((yes_total, no_total)) = totals else {
        debug!("Composite vote total overflowed, declining");
        return Recommendation::decline("composite: vote total overflowed");
    };

    let reason = format!(
        "composite: {}",
        votes
            .iter()
            .map(|v| format!("{}={}:{:.2}", v.strategy, v.side, v.weighted_amount))
            .collect::<Vec<_>>()
            .join(", ")
    );

    if yes_total > no_total {
        Recommendation::trade(Side::Yes, yes_total, reason)
    } else if no_total > yes_total {
        Recommendation::trade(Side::No, no_total, reason)
    } else {
        debug!("Composite tie at {} per side, declining", yes_total);
        Recommendation::decline(format!("composite: tie at {} per side", yes_total))
    }
}
