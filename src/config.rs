//! Application configuration loaded from environment variables.

use rust_decimal::Decimal;
use serde::Deserialize;

use crate::arbitrage::EvaluatorSettings;
use crate::odds::{AmericanTieBreak, OddsBounds, OddsSettings};

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    // === Odds Guardrail ===
    /// Lowest plausible decimal odd (inclusive).
    #[serde(default = "default_decimal_min")]
    pub decimal_min: f64,

    /// Highest plausible decimal odd (inclusive).
    #[serde(default = "default_decimal_max")]
    pub decimal_max: f64,

    // === Notation Detection ===
    /// Unsigned integers at or above this may be read as American.
    #[serde(default = "default_american_threshold")]
    pub american_threshold: f64,

    /// ...but only when divisible by this step.
    #[serde(default = "default_american_step")]
    pub american_step: u32,

    // === Allocation ===
    /// Return-on-stake ratio above which results carry an advisory.
    #[serde(default = "default_high_margin_threshold")]
    pub high_margin_threshold: f64,

    /// Bankroll used when the caller doesn't supply one.
    #[serde(default = "default_stake")]
    pub default_stake: Decimal,

    /// Minimum profit percentage for the scanner to report a sure-bet.
    #[serde(default)]
    pub min_profit_pct: Decimal,

    // === Server Configuration ===
    /// HTTP server port for the API.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub rust_log: String,

    /// Enable verbose logging.
    #[serde(default)]
    pub verbose: bool,
}

fn default_decimal_min() -> f64 {
    OddsBounds::DEFAULT_MIN
}

fn default_decimal_max() -> f64 {
    OddsBounds::DEFAULT_MAX
}

fn default_american_threshold() -> f64 {
    AmericanTieBreak::default().threshold
}

fn default_american_step() -> u32 {
    AmericanTieBreak::default().step
}

fn default_high_margin_threshold() -> f64 {
    EvaluatorSettings::DEFAULT_HIGH_MARGIN_THRESHOLD
}

fn default_stake() -> Decimal {
    Decimal::new(100, 0) // $100
}

fn default_port() -> u16 {
    8080
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            decimal_min: default_decimal_min(),
            decimal_max: default_decimal_max(),
            american_threshold: default_american_threshold(),
            american_step: default_american_step(),
            high_margin_threshold: default_high_margin_threshold(),
            default_stake: default_stake(),
            min_profit_pct: Decimal::ZERO,
            port: default_port(),
            rust_log: default_log_level(),
            verbose: false,
        }
    }
}

impl Config {
    /// Load configuration from environment, reading .env file first.
    pub fn load() -> Result<Self, envy::Error> {
        dotenvy::dotenv().ok();
        envy::from_env()
    }

    /// Check if the configuration is valid.
    pub fn validate(&self) -> Result<(), String> {
        if !(self.decimal_min > 1.0) {
            return Err("DECIMAL_MIN must be greater than 1.0".to_string());
        }

        if !(self.decimal_max > self.decimal_min) || !self.decimal_max.is_finite() {
            return Err("DECIMAL_MAX must be finite and greater than DECIMAL_MIN".to_string());
        }

        if self.american_step == 0 {
            return Err("AMERICAN_STEP must be at least 1".to_string());
        }

        if !(self.american_threshold >= 1.0) {
            return Err("AMERICAN_THRESHOLD must be at least 1".to_string());
        }

        if !(self.high_margin_threshold > 0.0) {
            return Err("HIGH_MARGIN_THRESHOLD must be positive".to_string());
        }

        if self.default_stake <= Decimal::ZERO {
            return Err("DEFAULT_STAKE must be positive".to_string());
        }

        if self.min_profit_pct < Decimal::ZERO {
            return Err("MIN_PROFIT_PCT must not be negative".to_string());
        }

        Ok(())
    }

    /// Build the settings value handed to the evaluator.
    pub fn evaluator_settings(&self) -> EvaluatorSettings {
        EvaluatorSettings {
            odds: OddsSettings {
                bounds: OddsBounds {
                    min: self.decimal_min,
                    max: self.decimal_max,
                },
                tie_break: AmericanTieBreak {
                    threshold: self.american_threshold,
                    step: self.american_step,
                },
            },
            high_margin_threshold: self.high_margin_threshold,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn default_values_are_sensible() {
        assert_eq!(default_decimal_min(), 1.01);
        assert_eq!(default_decimal_max(), 1000.0);
        assert_eq!(default_american_threshold(), 100.0);
        assert_eq!(default_american_step(), 5);
        assert_eq!(default_stake(), dec!(100));
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn settings_mirror_config() {
        let config = Config {
            decimal_min: 1.05,
            american_step: 10,
            high_margin_threshold: 0.5,
            ..Config::default()
        };

        let settings = config.evaluator_settings();
        assert_eq!(settings.odds.bounds.min, 1.05);
        assert_eq!(settings.odds.tie_break.step, 10);
        assert_eq!(settings.high_margin_threshold, 0.5);
    }

    #[test]
    fn validate_rejects_min_at_or_below_one() {
        let config = Config {
            decimal_min: 1.0,
            ..Config::default()
        };

        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_inverted_bounds() {
        let config = Config {
            decimal_min: 5.0,
            decimal_max: 2.0,
            ..Config::default()
        };

        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_zero_step_and_stake() {
        let config = Config {
            american_step: 0,
            ..Config::default()
        };
        assert!(config.validate().is_err());

        let config = Config {
            default_stake: Decimal::ZERO,
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }
}
