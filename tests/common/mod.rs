//! Common test utilities and fixtures

#![allow(dead_code)]

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use judgmental_engine::common::replay::{RecordedForecasts, RecordedMarkets};
use judgmental_engine::{EngineError, ExecutionVenue, MarketSnapshot, Result, Side};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// A liquid, active market closing in three days
pub fn active_market(id: &str, probability: Decimal) -> MarketSnapshot {
    MarketSnapshot::new(id, probability)
        .with_question(format!("Will {} happen?", id))
        .with_liquidity(dec!(500))
        .with_volume(dec!(120))
        .with_close_time(Utc::now() + Duration::days(3))
}

/// Recorded source over the given markets
pub fn source(markets: Vec<MarketSnapshot>, balance: Decimal) -> RecordedMarkets {
    RecordedMarkets::new(markets, balance)
}

/// Forecaster answering with the given raw texts
pub fn forecasts(responses: &[(&str, &str)]) -> RecordedForecasts {
    let mut recorded = RecordedForecasts::default();
    for (market_id, raw) in responses {
        recorded.insert(*market_id, *raw);
    }
    recorded
}

/// Sample raw forecaster responses
pub mod responses {
    /// Clean JSON answer
    pub const CONFIDENT_YES: &str =
        r#"{"probability": 0.65, "confidence": 0.75, "reasoning": "Market underestimates the odds"}"#;

    /// JSON wrapped in chatter
    pub const CHATTY_NO: &str = r#"Sure! Here is my analysis:
{"probability": 0.2, "confidence": 0.9, "rationale": "Very unlikely given the timeline"}
Let me know if you need anything else."#;

    /// No JSON object, labels in prose
    pub const PROSE: &str = "My estimate: probability: 0.8 and confidence: 0.7 overall.";

    /// Nothing usable
    pub const GARBAGE: &str = "I cannot help with that request.";
}

/// Venue that records every bet it receives
#[derive(Debug, Default)]
pub struct RecordingVenue {
    pub bets: Mutex<Vec<(String, Decimal, Side)>>,
    pub fail_on: Option<String>,
}

impl RecordingVenue {
    pub fn failing_on(market_id: &str) -> Self {
        Self {
            bets: Mutex::new(Vec::new()),
            fail_on: Some(market_id.to_string()),
        }
    }

    pub fn bets(&self) -> Vec<(String, Decimal, Side)> {
        self.bets.lock().unwrap().clone()
    }
}

#[async_trait]
impl ExecutionVenue for RecordingVenue {
    async fn place_bet(&self, market_id: &str, amount: Decimal, side: Side) -> Result<bool> {
        if self.fail_on.as_deref() == Some(market_id) {
            return Err(EngineError::Execution(format!("venue rejected {}", market_id)));
        }
        self.bets
            .lock()
            .unwrap()
            .push((market_id.to_string(), amount, side));
        Ok(true)
    }

    fn venue_name(&self) -> &'static str {
        "recording"
    }
}
