//! Error types for the decision engine
//!
//! Only caller-misuse and infrastructure failures are errors. Market noise
//! (missing close time, unparseable forecasts) and policy declines never
//! surface here.

use rust_decimal::Decimal;
use thiserror::Error;

/// Result type alias using our EngineError
pub type Result<T> = std::result::Result<T, EngineError>;

/// Main error type for engine operations
#[derive(Error, Debug)]
pub enum EngineError {
    /// A bet amount below zero was handed to the strategy/ledger boundary
    #[error("Negative amount: {0}")]
    NegativeAmount(Decimal),

    /// A side token other than YES/NO
    #[error("Invalid side token: {0:?}")]
    InvalidSide(String),

    /// A probability outside [0, 1] where the caller must supply a valid one
    #[error("Probability out of range [0, 1]: {0}")]
    InvalidProbability(Decimal),

    /// Malformed strategy composition (weights vs. children mismatch, empty list)
    #[error("Invalid strategy: {0}")]
    InvalidStrategy(String),

    /// JSON serialization/deserialization errors
    #[error("JSON parsing error: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Forecast provider failures (transport, quota)
    #[error("Forecast provider error: {0}")]
    Forecast(String),

    /// Execution venue failures
    #[error("Execution error: {0}")]
    Execution(String),

    /// Market data source failures
    #[error("Market data error: {0}")]
    MarketData(String),

    /// Filesystem errors from the CLI's input files
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<config::ConfigError> for EngineError {
    fn from(err: config::ConfigError) -> Self {
        EngineError::Configuration(err.to_string())
    }
}

/// Reject negative amounts at the ledger/strategy boundary
pub(crate) fn ensure_non_negative(amount: Decimal) -> Result<Decimal> {
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(EngineError::NegativeAmount(amount));
    }
    Ok(amount)
}

/// Reject probabilities outside [0, 1]
pub(crate) fn ensure_probability(probability: Decimal) -> Result<Decimal> {
    if probability < Decimal::ZERO || probability > Decimal::ONE {
        return Err(EngineError::InvalidProbability(probability));
    }
    Ok(probability)
}
