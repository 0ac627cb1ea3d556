//! Unified error types for the sure-bet engine.

use rust_decimal::Decimal;
use thiserror::Error;

/// Unified error type for the sure-bet engine and its shell.
#[derive(Error, Debug)]
pub enum SurebetError {
    /// Configuration loading error.
    #[error("configuration error: {0}")]
    Config(#[from] envy::Error),

    /// Odds parsing/normalization error.
    #[error("odds error: {0}")]
    Odds(#[from] OddsError),

    /// Arbitrage evaluation error.
    #[error("arbitrage error: {0}")]
    Arbitrage(#[from] ArbitrageError),

    /// Batch scan error.
    #[error("scan error: {0}")]
    Scan(#[from] ScanError),

    /// JSON parsing error.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors produced while turning a raw price into decimal odds.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum OddsError {
    /// Input could not be read as any recognized notation.
    #[error("malformed odds '{input}': {reason}")]
    Malformed {
        /// The raw value as received.
        input: String,
        /// Why it was rejected.
        reason: String,
    },

    /// Parsed fine, but the decimal equivalent is outside the plausible range.
    #[error("implausible odds '{input}': decimal {decimal} outside [{min}, {max}]")]
    Implausible {
        /// The raw value as received.
        input: String,
        /// Converted decimal value.
        decimal: f64,
        /// Lower bound in force.
        min: f64,
        /// Upper bound in force.
        max: f64,
    },
}

impl OddsError {
    /// Build a `Malformed` error.
    pub fn malformed(input: impl Into<String>, reason: impl Into<String>) -> Self {
        OddsError::Malformed {
            input: input.into(),
            reason: reason.into(),
        }
    }
}

/// Arbitrage evaluation errors.
///
/// Data-quality problems (bad odds, wrong market size, no arbitrage) are
/// reported inside `SurebetResult`. Only caller misuse ends up here.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ArbitrageError {
    /// Total stake must be strictly positive.
    #[error("invalid total stake: {0} (must be > 0)")]
    InvalidStake(Decimal),

    /// Total stake is so large the resulting payout cannot be held as money.
    #[error("total stake {0} gives a payout outside the money range")]
    StakeOutOfRange(Decimal),
}

/// Errors raised by the batch scanner.
#[derive(Error, Debug)]
pub enum ScanError {
    /// A line could not be decoded as a market record.
    #[error("line {line}: {source}")]
    BadRecord {
        /// 1-based line number.
        line: usize,
        /// Underlying decode error.
        #[source]
        source: serde_json::Error,
    },

    /// Writing an evaluated record failed.
    #[error("failed to encode result: {0}")]
    Encode(#[from] serde_json::Error),

    /// The scan options carried an unusable stake.
    #[error(transparent)]
    Stake(#[from] ArbitrageError),

    /// Reading input or writing output failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenient Result type alias.
pub type Result<T> = std::result::Result<T, SurebetError>;
