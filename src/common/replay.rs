//! Offline collaborators backed by recorded data
//!
//! Used by the CLI to replay a cycle from JSON files and by tests.

use std::collections::HashMap;
use std::path::Path;

use async_trait::async_trait;
use rust_decimal::Decimal;
use tracing::debug;

use super::errors::{EngineError, Result};
use super::traits::{ForecastProvider, MarketSource};
use super::types::MarketSnapshot;
use crate::forecast::AnalysisRequest;

/// Market source serving a fixed list of snapshots
#[derive(Debug, Clone, Default)]
pub struct RecordedMarkets {
    markets: Vec<MarketSnapshot>,
    balance: Decimal,
}

impl RecordedMarkets {
    pub fn new(markets: Vec<MarketSnapshot>, balance: Decimal) -> Self {
        Self { markets, balance }
    }

    /// Load snapshots from a JSON array in the venue's field naming
    pub fn from_json_file(path: impl AsRef<Path>, balance: Decimal) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let markets: Vec<MarketSnapshot> = serde_json::from_str(&raw)?;
        debug!("Loaded {} market snapshots from {}", markets.len(), path.as_ref().display());
        Ok(Self::new(markets, balance))
    }

    pub fn markets(&self) -> &[MarketSnapshot] {
        &self.markets
    }
}

#[async_trait]
impl MarketSource for RecordedMarkets {
    async fn fetch_markets(&self) -> Result<Vec<MarketSnapshot>> {
        Ok(self.markets.clone())
    }

    async fn balance(&self) -> Result<Decimal> {
        Ok(self.balance)
    }
}

/// Forecast provider answering from a market id → raw text map
///
/// Markets without a recorded answer produce a `Forecast` error, the same
/// way a failed provider call would.
#[derive(Debug, Clone, Default)]
pub struct RecordedForecasts {
    responses: HashMap<String, String>,
}

impl RecordedForecasts {
    pub fn new(responses: HashMap<String, String>) -> Self {
        Self { responses }
    }

    /// Load a JSON object mapping market id to raw forecast text
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let responses: HashMap<String, String> = serde_json::from_str(&raw)?;
        Ok(Self::new(responses))
    }

    pub fn insert(&mut self, market_id: impl Into<String>, response: impl Into<String>) {
        self.responses.insert(market_id.into(), response.into());
    }
}

#[async_trait]
impl ForecastProvider for RecordedForecasts {
    async fn forecast(&self, market: &MarketSnapshot, _request: &AnalysisRequest) -> Result<String> {
        self.responses
            .get(&market.id)
            .cloned()
            .ok_or_else(|| EngineError::Forecast(format!("no recorded forecast for {}", market.id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::io::Write;

    #[tokio::test]
    async fn test_recorded_markets_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"id": "m1", "question": "Q?", "probability": 0.35, "totalLiquidity": 500,
                 "volume24Hours": 120, "isResolved": false}}]"#
        )
        .unwrap();

        let source = RecordedMarkets::from_json_file(file.path(), dec!(1000)).unwrap();
        let markets = source.fetch_markets().await.unwrap();
        assert_eq!(markets.len(), 1);
        assert_eq!(markets[0].probability, dec!(0.35));
        assert_eq!(source.balance().await.unwrap(), dec!(1000));
    }

    #[tokio::test]
    async fn test_missing_forecast_is_an_error() {
        let mut forecasts = RecordedForecasts::default();
        forecasts.insert("m1", r#"{"probability": 0.7}"#);

        let known = MarketSnapshot::new("m1", dec!(0.5));
        let unknown = MarketSnapshot::new("m2", dec!(0.5));
        assert!(forecasts
            .forecast(&known, &AnalysisRequest::for_market(&known))
            .await
            .is_ok());
        assert!(matches!(
            forecasts.forecast(&unknown, &AnalysisRequest::for_market(&unknown)).await,
            Err(EngineError::Forecast(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            RecordedForecasts::from_json_file("/nonexistent/forecasts.json"),
            Err(EngineError::Io(_))
        ));
    }
}
