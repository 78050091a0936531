//! Judgmental Engine Library
//!
//! Decision core for betting on binary prediction markets: scores a
//! market's tradability, extracts a forecast from untrusted text, sizes a
//! bet with edge/Kelly strategies and admits it against a risk ledger.

pub mod common;
pub mod config;
pub mod engine;
pub mod evaluator;
pub mod forecast;
pub mod performance;
pub mod risk;
pub mod strategy;

// Re-export commonly used types
pub use common::errors::{EngineError, Result};
pub use common::traits::{DryRunVenue, ExecutionVenue, ForecastProvider, MarketSource};
pub use common::types::{MarketSnapshot, Side};
pub use config::types::EngineConfig;
pub use engine::{CycleReport, DecisionEngine, Outcome};
pub use evaluator::{EvaluationScores, MarketEvaluator};
pub use forecast::{Prediction, PredictionParser, PredictionSource};
pub use performance::{PerformanceTracker, Resolution, ResolutionTracker};
pub use risk::{DenyReason, LedgerSnapshot, PortfolioState, Position, RiskLedger, SharedLedger, TradeGate};

// Strategy types
pub use strategy::{
    CompositeStrategy, EdgeStrategy, KellyStrategy, MispricingStrategy, Recommendation, SizingPolicy,
    Strategy,
};
