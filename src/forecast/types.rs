use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::common::types::clamp_unit;

/// Rationale carried by the neutral prediction
pub const UNAVAILABLE_RATIONALE: &str = "unavailable";

/// How a prediction was obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PredictionSource {
    /// Decoded from a JSON object in the response
    Structured,
    /// Recovered from labelled numbers in free text
    Extracted,
    /// No usable signal; the neutral default
    Unavailable,
}

/// Forecast for a binary market
///
/// Both numeric fields are always within [0, 1].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub probability: Decimal,
    pub confidence: Decimal,
    pub rationale: String,
    pub source: PredictionSource,
}

impl Prediction {
    /// Structured prediction, clamping both numeric fields
    pub fn new(probability: Decimal, confidence: Decimal, rationale: impl Into<String>) -> Self {
        Self {
            probability: clamp_unit(probability),
            confidence: clamp_unit(confidence),
            rationale: rationale.into(),
            source: PredictionSource::Structured,
        }
    }

    /// Neutral `{0.5, 0.0, "unavailable"}` prediction
    pub fn unavailable() -> Self {
        Self {
            probability: dec!(0.5),
            confidence: Decimal::ZERO,
            rationale: UNAVAILABLE_RATIONALE.to_string(),
            source: PredictionSource::Unavailable,
        }
    }

    /// Neutral prediction annotated with why no signal was available
    pub fn unavailable_because(reason: impl std::fmt::Display) -> Self {
        Self {
            rationale: format!("{}: {}", UNAVAILABLE_RATIONALE, reason),
            ..Self::unavailable()
        }
    }

    pub(crate) fn with_source(mut self, source: PredictionSource) -> Self {
        self.source = source;
        self
    }

    /// True when this is the neutral no-signal prediction
    pub fn is_unavailable(&self) -> bool {
        self.source == PredictionSource::Unavailable
    }
}

impl Default for Prediction {
    fn default() -> Self {
        Self::unavailable()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_clamps() {
        let p = Prediction::new(dec!(1.4), dec!(-0.2), "x");
        assert_eq!(p.probability, dec!(1));
        assert_eq!(p.confidence, dec!(0));
        assert!(!p.is_unavailable());
    }

    #[test]
    fn test_unavailable_is_distinguishable() {
        let p = Prediction::unavailable();
        assert_eq!(p.probability, dec!(0.5));
        assert_eq!(p.confidence, dec!(0));
        assert_eq!(p.rationale, "unavailable");
        assert!(p.is_unavailable());

        let q = Prediction::unavailable_because("quota exceeded");
        assert!(q.is_unavailable());
        assert!(q.rationale.starts_with("unavailable"));
    }
}
