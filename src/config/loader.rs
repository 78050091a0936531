//! Configuration loader

use config::{Config, Environment, File};
use rust_decimal::Decimal;
use std::path::Path;
use std::str::FromStr;

use super::types::EngineConfig;
use crate::common::errors::{EngineError, Result};

/// Load configuration from file and environment variables
///
/// Priority (highest to lowest):
/// 1. Environment variables (prefixed with APP_, `__` between sections,
///    e.g. `APP_RISK__MAX_MARKETS_OPEN=5`)
/// 2. Configuration file (TOML format)
/// 3. Default values
///
/// The result is validated before it is returned.
pub fn load_config(config_path: Option<&str>) -> Result<EngineConfig> {
    let mut builder = Config::builder();

    if let Some(path) = config_path {
        if Path::new(path).exists() {
            builder = builder.add_source(File::with_name(path).required(false));
        }
    }

    builder = builder.add_source(
        Environment::with_prefix("APP")
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true),
    );

    let config: EngineConfig = builder.build()?.try_deserialize()?;
    config.validate()?;
    Ok(config)
}

/// Load configuration from the flat environment names used by the bot's `.env`
///
/// Unset variables keep their defaults; set-but-unparseable ones are errors.
pub fn load_from_env() -> Result<EngineConfig> {
    dotenvy::dotenv().ok();

    let mut config = EngineConfig::default();

    if let Some(value) = decimal_var("MAX_POSITION_SIZE")? {
        config.risk.max_position_size = value;
    }
    if let Some(value) = decimal_var("MAX_PORTFOLIO_RISK")? {
        config.risk.max_portfolio_risk = value;
    }
    if let Some(raw) = env_var("MAX_MARKETS_OPEN") {
        config.risk.max_markets_open = raw.parse().map_err(|_| {
            EngineError::Configuration(format!("MAX_MARKETS_OPEN is not an integer: {:?}", raw))
        })?;
    }
    if let Some(value) = decimal_var("MIN_CONFIDENCE")? {
        config.strategy.min_confidence = value;
    }
    if let Some(value) = decimal_var("MAX_BET_AMOUNT")? {
        config.strategy.max_bet = value;
    }
    if let Some(value) = decimal_var("KELLY_FRACTION")? {
        config.strategy.kelly_fraction = value;
    }
    if let Some(value) = decimal_var("MIN_MARKET_LIQUIDITY")? {
        config.evaluator.min_liquidity = value;
    }
    if let Some(level) = env_var("LOG_LEVEL") {
        config.settings.log_level = level.to_lowercase();
    }

    config.validate()?;
    Ok(config)
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn decimal_var(name: &str) -> Result<Option<Decimal>> {
    env_var(name)
        .map(|raw| {
            Decimal::from_str(&raw).map_err(|e| {
                EngineError::Configuration(format!("{} is not a number ({:?}): {}", name, raw, e))
            })
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::io::Write;

    #[test]
    fn test_load_config_from_toml_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
[risk]
max_position_size = 250
max_markets_open = 4

[strategy]
min_confidence = 0.7

[evaluator]
min_liquidity = 20
"#
        )
        .unwrap();

        let path = file.path().to_str().unwrap().to_string();
        let config = load_config(Some(&path)).unwrap();

        assert_eq!(config.risk.max_position_size, dec!(250));
        assert_eq!(config.risk.max_markets_open, 4);
        assert_eq!(config.risk.max_portfolio_risk, dec!(0.3));
        assert_eq!(config.strategy.min_confidence, dec!(0.7));
        assert_eq!(config.evaluator.min_liquidity, dec!(20));
    }

    #[test]
    fn test_load_config_rejects_invalid_file_values() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[risk]\nmax_portfolio_risk = 2.0").unwrap();

        let path = file.path().to_str().unwrap().to_string();
        assert!(matches!(
            load_config(Some(&path)),
            Err(EngineError::Configuration(_))
        ));
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let config = load_config(Some("/nonexistent/engine.toml")).unwrap();
        assert_eq!(config.strategy.max_bet, dec!(50));
    }

    // ========================================================================
    // Flat environment names
    // ========================================================================

    static ENV_LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());

    const FLAT_VARS: [&str; 8] = [
        "MAX_POSITION_SIZE",
        "MAX_PORTFOLIO_RISK",
        "MAX_MARKETS_OPEN",
        "MIN_CONFIDENCE",
        "MAX_BET_AMOUNT",
        "KELLY_FRACTION",
        "MIN_MARKET_LIQUIDITY",
        "LOG_LEVEL",
    ];

    /// Run `f` with only `vars` set among the flat names
    fn with_flat_env<T>(vars: &[(&str, &str)], f: impl FnOnce() -> T) -> T {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        for name in FLAT_VARS {
            std::env::remove_var(name);
        }
        for (name, value) in vars {
            std::env::set_var(name, value);
        }
        let result = f();
        for name in FLAT_VARS {
            std::env::remove_var(name);
        }
        result
    }

    #[test]
    fn test_load_from_env_overrides() {
        let config = with_flat_env(
            &[
                ("MAX_BET_AMOUNT", "25"),
                ("MIN_MARKET_LIQUIDITY", " 75.5 "),
                ("MAX_MARKETS_OPEN", "3"),
                ("KELLY_FRACTION", "0.5"),
                ("LOG_LEVEL", "DEBUG"),
            ],
            load_from_env,
        )
        .unwrap();

        assert_eq!(config.strategy.max_bet, dec!(25));
        assert_eq!(config.evaluator.min_liquidity, dec!(75.5));
        assert_eq!(config.risk.max_markets_open, 3);
        assert_eq!(config.strategy.kelly_fraction, dec!(0.5));
        assert_eq!(config.settings.log_level, "debug");
        // Untouched
        assert_eq!(config.risk.max_position_size, dec!(100));
        assert_eq!(config.strategy.min_confidence, dec!(0.6));
    }

    #[test]
    fn test_load_from_env_defaults_when_unset_or_blank() {
        let config = with_flat_env(&[], load_from_env).unwrap();
        assert_eq!(config, EngineConfig::default());

        let config = with_flat_env(&[("MAX_BET_AMOUNT", "  ")], load_from_env).unwrap();
        assert_eq!(config.strategy.max_bet, dec!(50));
    }

    #[test]
    fn test_load_from_env_rejects_bad_values() {
        for vars in [
            [("MAX_BET_AMOUNT", "lots")],
            [("MAX_MARKETS_OPEN", "2.5")],
            [("MIN_CONFIDENCE", "1.5")],
        ] {
            let result = with_flat_env(&vars, load_from_env);
            assert!(
                matches!(result, Err(EngineError::Configuration(_))),
                "{:?} gave {:?}",
                vars,
                result
            );
        }
    }
}
