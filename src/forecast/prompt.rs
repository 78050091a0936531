//! Analysis prompt handed to the forecast provider

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::common::types::MarketSnapshot;

/// System instruction sent ahead of every analysis prompt
pub const SYSTEM_INSTRUCTION: &str =
    "You are an expert prediction market analyst. Always respond with valid JSON.";

/// Everything the forecaster is asked for one market
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisRequest {
    pub system: &'static str,
    pub prompt: String,
}

impl AnalysisRequest {
    pub fn for_market(market: &MarketSnapshot) -> Self {
        Self {
            system: SYSTEM_INSTRUCTION,
            prompt: build_analysis_prompt(market),
        }
    }
}

/// Render the user prompt asking for a probability/confidence/reasoning triple
///
/// The requested JSON shape is the one [`super::PredictionParser`] decodes.
pub fn build_analysis_prompt(market: &MarketSnapshot) -> String {
    let question = if market.question.is_empty() {
        market.id.as_str()
    } else {
        market.question.as_str()
    };

    let close_line = market
        .close_time
        .map(|t| format!("\nThe market closes on {}.", t.format("%Y-%m-%d %H:%M:%S UTC")))
        .unwrap_or_default();

    format!(
        r#"You are an expert at analyzing prediction markets. Analyze the following market and provide your assessment.

Market Question: {question}

Current Market Probability: {probability}%{close_line}

Please provide:
1. Your predicted probability that this event will occur (as a number between 0 and 1)
2. Your confidence in this prediction (as a number between 0 and 1)
3. A brief reasoning for your prediction (2-3 sentences)

Respond in JSON format:
{{
    "probability": 0.65,
    "confidence": 0.75,
    "reasoning": "Your reasoning here"
}}"#,
        question = question,
        probability = as_percent(market.implied_probability()),
        close_line = close_line,
    )
}

fn as_percent(probability: Decimal) -> Decimal {
    (probability * dec!(100)).round_dp(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forecast::PredictionParser;
    use chrono::TimeZone;

    #[test]
    fn test_prompt_mentions_market_state() {
        let market = MarketSnapshot::new("m1", dec!(0.35))
            .with_question("Will AI achieve AGI by 2030?")
            .with_close_time(chrono::Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap());

        let prompt = build_analysis_prompt(&market);
        assert!(prompt.contains("Will AI achieve AGI by 2030?"));
        assert!(prompt.contains("Current Market Probability: 35.0%"));
        assert!(prompt.contains("2030-01-01 00:00:00 UTC"));
    }

    #[test]
    fn test_prompt_without_close_time() {
        let prompt = build_analysis_prompt(&MarketSnapshot::new("m2", dec!(0.5)));
        assert!(prompt.contains("Market Question: m2"));
        assert!(!prompt.contains("closes on"));
    }

    #[test]
    fn test_example_shape_round_trips_through_parser() {
        let prompt = build_analysis_prompt(&MarketSnapshot::new("m3", dec!(0.5)));
        let prediction = PredictionParser::new().parse(&prompt);
        assert_eq!(prediction.probability, dec!(0.65));
        assert_eq!(prediction.confidence, dec!(0.75));
    }

    #[test]
    fn test_request_pairs_instruction_with_prompt() {
        let market = MarketSnapshot::new("m4", dec!(0.2)).with_question("Will it snow?");
        let request = AnalysisRequest::for_market(&market);
        assert_eq!(request.system, SYSTEM_INSTRUCTION);
        assert!(request.system.contains("JSON"));
        assert_eq!(request.prompt, build_analysis_prompt(&market));
    }
}
