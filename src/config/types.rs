//! Configuration types

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::common::errors::{EngineError, Result};

/// Main engine configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Risk ledger limits
    #[serde(default)]
    pub risk: RiskConfig,
    /// Strategy sizing parameters
    #[serde(default)]
    pub strategy: StrategyConfig,
    /// Market evaluator parameters
    #[serde(default)]
    pub evaluator: EvaluatorConfig,
    /// General application settings
    #[serde(default)]
    pub settings: AppSettings,
}

impl EngineConfig {
    /// Reject values that would make the budgets meaningless
    pub fn validate(&self) -> Result<()> {
        self.risk.validate()?;
        self.strategy.validate()?;
        self.evaluator.validate()
    }
}

/// Risk ledger limits
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskConfig {
    /// Per-market cap in currency units
    #[serde(default = "default_max_position_size")]
    pub max_position_size: Decimal,
    /// Fraction of balance that may be at risk across all open positions
    #[serde(default = "default_max_portfolio_risk")]
    pub max_portfolio_risk: Decimal,
    /// Maximum number of concurrently open positions
    #[serde(default = "default_max_markets_open")]
    pub max_markets_open: usize,
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            max_position_size: default_max_position_size(),
            max_portfolio_risk: default_max_portfolio_risk(),
            max_markets_open: default_max_markets_open(),
        }
    }
}

impl RiskConfig {
    pub fn validate(&self) -> Result<()> {
        if self.max_position_size < Decimal::ZERO {
            return Err(EngineError::Configuration(format!(
                "max_position_size must be non-negative, got {}",
                self.max_position_size
            )));
        }
        ensure_fraction("max_portfolio_risk", self.max_portfolio_risk)?;
        if self.max_markets_open == 0 {
            return Err(EngineError::Configuration(
                "max_markets_open must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

fn default_max_position_size() -> Decimal {
    dec!(100)
}

fn default_max_portfolio_risk() -> Decimal {
    dec!(0.3)
}

fn default_max_markets_open() -> usize {
    10
}

/// Strategy sizing parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyConfig {
    /// Minimum forecast confidence for the edge strategy
    #[serde(default = "default_min_confidence")]
    pub min_confidence: Decimal,
    /// Bet ceiling shared by every strategy
    #[serde(default = "default_max_bet")]
    pub max_bet: Decimal,
    /// Safety scaling applied to the full Kelly fraction
    #[serde(default = "default_kelly_fraction")]
    pub kelly_fraction: Decimal,
    /// Smallest bet the engine will place after risk clamping
    #[serde(default = "default_min_bet")]
    pub min_bet: Decimal,
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self {
            min_confidence: default_min_confidence(),
            max_bet: default_max_bet(),
            kelly_fraction: default_kelly_fraction(),
            min_bet: default_min_bet(),
        }
    }
}

impl StrategyConfig {
    pub fn validate(&self) -> Result<()> {
        ensure_fraction("min_confidence", self.min_confidence)?;
        ensure_fraction("kelly_fraction", self.kelly_fraction)?;
        if self.max_bet < Decimal::ZERO {
            return Err(EngineError::Configuration(format!(
                "max_bet must be non-negative, got {}",
                self.max_bet
            )));
        }
        if self.min_bet < Decimal::ZERO {
            return Err(EngineError::Configuration(format!(
                "min_bet must be non-negative, got {}",
                self.min_bet
            )));
        }
        Ok(())
    }
}

fn default_min_confidence() -> Decimal {
    dec!(0.6)
}

fn default_max_bet() -> Decimal {
    dec!(50)
}

fn default_kelly_fraction() -> Decimal {
    dec!(0.25)
}

fn default_min_bet() -> Decimal {
    dec!(1.0)
}

/// Market evaluator parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluatorConfig {
    /// Liquidity below which a market scores zero on liquidity
    #[serde(default = "default_min_liquidity")]
    pub min_liquidity: Decimal,
}

impl Default for EvaluatorConfig {
    fn default() -> Self {
        Self {
            min_liquidity: default_min_liquidity(),
        }
    }
}

impl EvaluatorConfig {
    pub fn validate(&self) -> Result<()> {
        if self.min_liquidity < Decimal::ZERO {
            return Err(EngineError::Configuration(format!(
                "min_liquidity must be non-negative, got {}",
                self.min_liquidity
            )));
        }
        Ok(())
    }
}

fn default_min_liquidity() -> Decimal {
    dec!(50)
}

/// General application settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppSettings {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn ensure_fraction(name: &str, value: Decimal) -> Result<()> {
    if value < Decimal::ZERO || value > Decimal::ONE {
        return Err(EngineError::Configuration(format!(
            "{} must be within [0, 1], got {}",
            name, value
        )));
    }
    Ok(())
}
