//! Forecast response parsing
//!
//! Forecaster output is untrusted free text that usually, but not always,
//! embeds a JSON object such as
//! `{"probability": 0.65, "confidence": 0.75, "reasoning": "..."}`.
//! [`PredictionParser::parse`] never fails: it tries the embedded object,
//! then labelled numbers in the text, then settles for the neutral
//! [`Prediction::unavailable`].

use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::{Map, Value};
use std::str::FromStr;
use tracing::{debug, warn};

use super::types::{Prediction, PredictionSource};

/// First brace-delimited object without nested braces
static OBJECT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)\{[^}]+\}").expect("object pattern is valid"));

static PROBABILITY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)probability["']?\s*:\s*([0-9.]+)"#).expect("probability pattern is valid")
});

static CONFIDENCE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)confidence["']?\s*:\s*([0-9.]+)"#).expect("confidence pattern is valid")
});

/// Value used for a numeric field the response did not provide
const MISSING_FIELD_DEFAULT: Decimal = dec!(0.5);
/// Characters of raw text kept as rationale by the text fallback
const RATIONALE_PREVIEW_CHARS: usize = 200;
const MISSING_RATIONALE: &str = "No reasoning provided";

/// Total parser from raw forecaster text to [`Prediction`]
#[derive(Debug, Clone, Copy, Default)]
pub struct PredictionParser;

impl PredictionParser {
    pub fn new() -> Self {
        Self
    }

    /// Parse a raw response; never fails
    pub fn parse(&self, raw: &str) -> Prediction {
        if let Some(found) = OBJECT_RE.find(raw) {
            match decode_object(found.as_str()) {
                Some(prediction) => return prediction,
                None => debug!("Embedded object did not decode, scanning text instead"),
            }
        }

        match scan_labels(raw) {
            Some(prediction) => prediction,
            None => {
                warn!("Forecast response carried no usable signal");
                Prediction::unavailable()
            }
        }
    }
}

/// Decode probability/confidence/rationale from a JSON object
///
/// A numeric field that is present but not a number (or numeric string)
/// fails the whole decode.
fn decode_object(text: &str) -> Option<Prediction> {
    let object: Map<String, Value> = serde_json::from_str(text).ok()?;

    let probability = numeric_field(&object, "probability")?;
    let confidence = numeric_field(&object, "confidence")?;
    let rationale = match object.get("rationale").or_else(|| object.get("reasoning")) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => MISSING_RATIONALE.to_string(),
        Some(other) => other.to_string(),
    };

    Some(
        Prediction::new(
            probability.unwrap_or(MISSING_FIELD_DEFAULT),
            confidence.unwrap_or(MISSING_FIELD_DEFAULT),
            rationale,
        )
        .with_source(PredictionSource::Structured),
    )
}

/// `Some(None)` when absent, `None` when present but unusable
fn numeric_field(object: &Map<String, Value>, key: &str) -> Option<Option<Decimal>> {
    match object.get(key) {
        None | Some(Value::Null) => Some(None),
        Some(Value::Number(n)) => parse_decimal(&n.to_string()).map(Some),
        Some(Value::String(s)) => parse_decimal(s.trim()).map(Some),
        Some(_) => None,
    }
}

fn parse_decimal(text: &str) -> Option<Decimal> {
    Decimal::from_str(text)
        .or_else(|_| Decimal::from_scientific(text))
        .ok()
}

/// Look for `probability: 0.7` / `confidence: 0.8` style labels
fn scan_labels(raw: &str) -> Option<Prediction> {
    let probability = capture_decimal(&PROBABILITY_RE, raw);
    let confidence = capture_decimal(&CONFIDENCE_RE, raw);

    if probability.is_none() && confidence.is_none() {
        return None;
    }

    let rationale: String = raw.chars().take(RATIONALE_PREVIEW_CHARS).collect();
    Some(
        Prediction::new(
            probability.unwrap_or(MISSING_FIELD_DEFAULT),
            confidence.unwrap_or(MISSING_FIELD_DEFAULT),
            rationale,
        )
        .with_source(PredictionSource::Extracted),
    )
}

fn capture_decimal(pattern: &Regex, raw: &str) -> Option<Decimal> {
    pattern
        .captures(raw)
        .and_then(|caps| caps.get(1))
        .and_then(|m| Decimal::from_str(m.as_str()).ok())
}
