//! Decision engine: one market or one full cycle at a time
//!
//! Wires the evaluator, parser, strategy and shared ledger together against
//! the collaborator traits in [`crate::common::traits`].
//!
//! # Cycle
//!
//! ```text
//! fetch markets + balance
//!        │
//!        ▼
//! drop resolved / already held
//!        │
//!        ▼
//! forecasts for all candidates (concurrent)
//!        │
//!        ▼
//! per market, one at a time:
//!   evaluate → strategy → ledger.admit(gate → clamp → execute → record)
//! ```

use futures_util::future::join_all;
use rust_decimal::Decimal;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

use crate::common::errors::Result;
use crate::common::traits::{ExecutionVenue, ForecastProvider, MarketSource};
use crate::common::types::MarketSnapshot;
use crate::config::EngineConfig;
use crate::evaluator::MarketEvaluator;
use crate::forecast::{AnalysisRequest, Prediction, PredictionParser};
use crate::performance::{PerformanceTracker, Resolution, ResolutionTracker, ResolvedPosition};
use crate::risk::{Admission, DenyReason, PortfolioState, Position, RiskLedger, SharedLedger};
use crate::strategy::{Recommendation, SizingPolicy, Strategy};

/// What happened to one market
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Not considered at all (resolved, already held)
    Skipped(String),
    /// The strategy declined
    Declined(Recommendation),
    /// The ledger refused the recommendation
    Denied(DenyReason),
    /// The clamped amount fell under the minimum bet
    BelowMinimum(Decimal),
    /// The venue did not confirm
    NotConfirmed,
    /// Placed and recorded
    Executed(Position),
    /// Processing returned an error (venue failure, bad amount)
    Failed(String),
}

impl Outcome {
    pub fn is_executed(&self) -> bool {
        matches!(self, Outcome::Executed(_))
    }
}

/// Per-market outcomes of one cycle
#[derive(Debug, Clone, PartialEq)]
pub struct CycleReport {
    pub balance: Decimal,
    pub outcomes: Vec<(String, Outcome)>,
}

impl CycleReport {
    pub fn executed(&self) -> impl Iterator<Item = &Position> {
        self.outcomes.iter().filter_map(|(_, outcome)| match outcome {
            Outcome::Executed(position) => Some(position),
            _ => None,
        })
    }

    pub fn outcome(&self, market_id: &str) -> Option<&Outcome> {
        self.outcomes
            .iter()
            .find(|(id, _)| id == market_id)
            .map(|(_, outcome)| outcome)
    }
}

pub struct DecisionEngine {
    evaluator: MarketEvaluator,
    parser: PredictionParser,
    strategy: Strategy,
    ledger: SharedLedger,
    performance: Mutex<PerformanceTracker>,
    resolutions: Mutex<ResolutionTracker>,
}

impl DecisionEngine {
    pub fn new(evaluator: MarketEvaluator, strategy: Strategy, ledger: SharedLedger) -> Self {
        Self {
            evaluator,
            parser: PredictionParser::new(),
            strategy,
            ledger,
            performance: Mutex::new(PerformanceTracker::new()),
            resolutions: Mutex::new(ResolutionTracker::new()),
        }
    }

    /// Build the default engine: composite strategy, empty ledger
    pub fn from_config(config: &EngineConfig) -> Result<Self> {
        config.validate()?;
        let strategy = Strategy::from_config(&config.strategy)?;
        let ledger = SharedLedger::new(RiskLedger::new(config.risk.clone()), config.strategy.min_bet);
        Ok(Self::new(MarketEvaluator::from_config(&config.evaluator), strategy, ledger))
    }

    pub fn ledger(&self) -> &SharedLedger {
        &self.ledger
    }

    pub fn strategy(&self) -> &Strategy {
        &self.strategy
    }

    pub async fn performance(&self) -> PerformanceTracker {
        self.performance.lock().await.clone()
    }

    pub async fn resolutions(&self) -> ResolutionTracker {
        self.resolutions.lock().await.clone()
    }

    pub async fn portfolio_summary(&self) -> PortfolioState {
        self.ledger.portfolio_summary().await
    }

    /// Ask the provider to analyze a market and parse its answer
    ///
    /// Provider failures become the neutral prediction with the error as
    /// its rationale.
    pub async fn forecast(&self, provider: &dyn ForecastProvider, market: &MarketSnapshot) -> Prediction {
        let request = AnalysisRequest::for_market(market);
        match provider.forecast(market, &request).await {
            Ok(raw) => {
                let prediction = self.parser.parse(&raw);
                info!(
                    "Forecast for {}: prob={}, confidence={}",
                    market.id, prediction.probability, prediction.confidence
                );
                prediction
            }
            Err(e) => {
                warn!("Forecast provider failed for {}: {}", market.id, e);
                Prediction::unavailable_because(e)
            }
        }
    }

    /// Decide on one market and, if admitted, place the bet
    ///
    /// An unavailable prediction is treated as no prediction at all.
    #[instrument(skip(self, market, prediction, venue), fields(market_id = %market.id))]
    pub async fn process_market(
        &self,
        market: &MarketSnapshot,
        prediction: Option<&Prediction>,
        balance: Decimal,
        venue: &dyn ExecutionVenue,
    ) -> Result<Outcome> {
        if market.is_resolved {
            return Ok(Outcome::Skipped("market resolved".to_string()));
        }
        if self.ledger.has_position(&market.id).await {
            return Ok(Outcome::Skipped("already holding".to_string()));
        }

        let scores = self.evaluator.evaluate(market);
        let signal = prediction.filter(|p| !p.is_unavailable());
        let rec = self.strategy.should_trade(market, &scores, signal);

        if !rec.is_trade() {
            debug!("Skipping market {}: {}", market.id, rec.reason);
            return Ok(Outcome::Declined(rec));
        }

        let entry_probability = market.implied_probability();
        let side = rec.side;
        let admission = self
            .ledger
            .admit(&market.id, rec.amount, side, entry_probability, balance, |amount| {
                venue.place_bet(&market.id, amount, side)
            })
            .await?;

        let outcome = match admission {
            Admission::Executed(position) => {
                let reasoning = signal.map_or("Strategy-based", |p| p.rationale.as_str());
                self.performance.lock().await.record_trade(
                    &market.id,
                    &market.question,
                    side,
                    position.amount,
                    entry_probability,
                    reasoning,
                );
                self.resolutions.lock().await.track_position(
                    &market.id,
                    side,
                    position.amount,
                    entry_probability,
                    &market.question,
                );
                Outcome::Executed(position)
            }
            Admission::Denied(reason) => Outcome::Denied(reason),
            Admission::BelowMinimum(amount) => Outcome::BelowMinimum(amount),
            Admission::NotConfirmed => Outcome::NotConfirmed,
        };
        Ok(outcome)
    }

    /// Run one full cycle over the source's markets
    ///
    /// Forecasts are fetched concurrently; ledger admissions then run in
    /// market order. A failure on one market is reported as
    /// [`Outcome::Failed`] and does not stop the cycle.
    #[instrument(skip_all, fields(venue = venue.venue_name()))]
    pub async fn run_cycle(
        &self,
        source: &dyn MarketSource,
        provider: Option<&dyn ForecastProvider>,
        venue: &dyn ExecutionVenue,
    ) -> Result<CycleReport> {
        let markets = source.fetch_markets().await?;
        let balance = source.balance().await?;
        self.performance.lock().await.update_balance(balance);
        info!("Processing {} markets with balance {:.2}", markets.len(), balance);

        let mut outcomes = Vec::with_capacity(markets.len());
        let mut candidates = Vec::new();
        for market in &markets {
            if market.is_resolved {
                outcomes.push((market.id.clone(), Outcome::Skipped("market resolved".to_string())));
            } else if self.ledger.has_position(&market.id).await {
                outcomes.push((market.id.clone(), Outcome::Skipped("already holding".to_string())));
            } else {
                candidates.push(market);
            }
        }

        let predictions: Vec<Option<Prediction>> = match provider {
            Some(provider) => join_all(candidates.iter().map(|m| self.forecast(provider, m)))
                .await
                .into_iter()
                .map(Some)
                .collect(),
            None => vec![None; candidates.len()],
        };

        for (market, prediction) in candidates.into_iter().zip(predictions) {
            match self.process_market(market, prediction.as_ref(), balance, venue).await {
                Ok(outcome) => outcomes.push((market.id.clone(), outcome)),
                Err(e) => {
                    warn!("Error processing market {}: {}", market.id, e);
                    outcomes.push((market.id.clone(), Outcome::Failed(e.to_string())));
                }
            }
        }

        let summary = self.ledger.portfolio_summary().await;
        info!(
            "Cycle done: {} open positions, {:.2} at risk",
            summary.open_positions, summary.total_at_risk
        );

        Ok(CycleReport { balance, outcomes })
    }

    /// Settle a resolved market: realize P&L and free its ledger slot
    ///
    /// Returns `None` when the engine holds no tracked bet on the market.
    pub async fn reconcile(&self, market_id: &str, resolution: Resolution) -> Option<ResolvedPosition> {
        let resolved = self
            .resolutions
            .lock()
            .await
            .check_resolution(market_id, resolution)
            .cloned();
        if resolved.is_some() {
            self.ledger.remove_position(market_id).await;
        }
        resolved
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::traits::DryRunVenue;
    use crate::common::types::Side;
    use crate::strategy::EdgeStrategy;
    use async_trait::async_trait;
    use rust_decimal_macros::dec;

    struct RefusingVenue;

    #[async_trait]
    impl ExecutionVenue for RefusingVenue {
        async fn place_bet(&self, _market_id: &str, _amount: Decimal, _side: Side) -> Result<bool> {
            Ok(false)
        }

        fn venue_name(&self) -> &'static str {
            "refusing"
        }
    }

    #[derive(Default)]
    struct CapturingProvider {
        requests: std::sync::Mutex<Vec<AnalysisRequest>>,
    }

    #[async_trait]
    impl ForecastProvider for CapturingProvider {
        async fn forecast(&self, _market: &MarketSnapshot, request: &AnalysisRequest) -> Result<String> {
            self.requests.lock().unwrap().push(request.clone());
            Ok(r#"{"probability": 0.65, "confidence": 0.75, "reasoning": "x"}"#.to_string())
        }
    }

    fn engine() -> DecisionEngine {
        DecisionEngine::from_config(&EngineConfig::default()).unwrap()
    }

    fn liquid_market(id: &str, probability: Decimal) -> MarketSnapshot {
        MarketSnapshot::new(id, probability)
            .with_question("Will it ship?")
            .with_liquidity(dec!(500))
            .with_volume(dec!(120))
    }

    #[tokio::test]
    async fn test_executes_and_records() {
        let engine = DecisionEngine::new(
            MarketEvaluator::new(dec!(50)),
            Strategy::Edge(EdgeStrategy::default()),
            SharedLedger::new(RiskLedger::default(), dec!(1)),
        );
        let market = liquid_market("m1", dec!(0.35));
        let prediction = Prediction::new(dec!(0.65), dec!(0.75), "undervalued");

        let outcome = engine
            .process_market(&market, Some(&prediction), dec!(1000), &DryRunVenue)
            .await
            .unwrap();

        let Outcome::Executed(position) = outcome else {
            panic!("expected execution, got {:?}", outcome);
        };
        assert_eq!(position.amount, dec!(22.5));
        assert_eq!(position.side, Side::Yes);

        let performance = engine.performance().await;
        assert_eq!(performance.trades().len(), 1);
        assert_eq!(performance.trades()[0].reasoning, "undervalued");
        assert!(engine.resolutions().await.is_tracking("m1"));
    }

    #[tokio::test]
    async fn test_forecast_sends_instruction_and_prompt() {
        let engine = engine();
        let provider = CapturingProvider::default();
        let market = liquid_market("m1", dec!(0.35));

        let prediction = engine.forecast(&provider, &market).await;
        assert_eq!(prediction.probability, dec!(0.65));

        let requests = provider.requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].system, crate::forecast::SYSTEM_INSTRUCTION);
        assert!(requests[0].prompt.contains("Will it ship?"));
        assert!(requests[0].prompt.contains("35.0%"));
    }

    #[tokio::test]
    async fn test_skips_resolved_and_held() {
        let engine = engine();
        let prediction = Prediction::new(dec!(0.65), dec!(0.75), "x");

        let resolved = liquid_market("m1", dec!(0.35)).resolved();
        assert!(matches!(
            engine.process_market(&resolved, Some(&prediction), dec!(1000), &DryRunVenue).await.unwrap(),
            Outcome::Skipped(_)
        ));

        let market = liquid_market("m2", dec!(0.35));
        assert!(engine
            .process_market(&market, Some(&prediction), dec!(1000), &DryRunVenue)
            .await
            .unwrap()
            .is_executed());
        assert!(matches!(
            engine.process_market(&market, Some(&prediction), dec!(1000), &DryRunVenue).await.unwrap(),
            Outcome::Skipped(_)
        ));
    }

    #[tokio::test]
    async fn test_unavailable_prediction_declines() {
        let engine = engine();
        // Kelly would bet on a neutral 0.5 against a 0.3 market
        let market = liquid_market("m1", dec!(0.3));
        let outcome = engine
            .process_market(&market, Some(&Prediction::unavailable()), dec!(1000), &DryRunVenue)
            .await
            .unwrap();
        assert!(matches!(outcome, Outcome::Declined(_)));
    }

    #[tokio::test]
    async fn test_unconfirmed_bet_leaves_no_trace() {
        let engine = engine();
        let market = liquid_market("m1", dec!(0.35));
        let prediction = Prediction::new(dec!(0.65), dec!(0.75), "x");

        let outcome = engine
            .process_market(&market, Some(&prediction), dec!(1000), &RefusingVenue)
            .await
            .unwrap();
        assert_eq!(outcome, Outcome::NotConfirmed);
        assert_eq!(engine.portfolio_summary().await.open_positions, 0);
        assert!(engine.performance().await.trades().is_empty());
    }

    #[tokio::test]
    async fn test_reconcile_frees_ledger() {
        let engine = engine();
        let market = liquid_market("m1", dec!(0.35));
        let prediction = Prediction::new(dec!(0.65), dec!(0.75), "x");
        engine
            .process_market(&market, Some(&prediction), dec!(1000), &DryRunVenue)
            .await
            .unwrap();

        assert!(engine.reconcile("unknown", Resolution::Yes).await.is_none());
        let resolved = engine.reconcile("m1", Resolution::Yes).await.unwrap();
        assert!(resolved.won);
        assert!(resolved.pnl > Decimal::ZERO);
        assert!(!engine.ledger().has_position("m1").await);
    }
}
