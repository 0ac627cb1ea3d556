//! Sure-bet detection and stake allocation.
//!
//! Given the outcomes of one betting market, each priced by some bookmaker in
//! some odds notation, this library works out whether backing every outcome
//! locks in a profit and how to split a bankroll to do it.
//!
//! # Strategy
//!
//! Convert every price to decimal odds. If the implied probabilities sum to
//! less than 1, stake each outcome in proportion to its implied probability
//! and every outcome pays the same:
//!
//! ```text
//! Home @ 2.10 (A):  1/2.10 = 0.4762
//! Away @ 2.05 (B):  1/2.05 = 0.4878
//! ──────────────────────────────────
//! Total:            0.9640 < 1.00 ✅
//! Profit:           $3.73 on $100 (3.73% guaranteed)
//! ```
//!
//! # Modules
//!
//! - [`config`]: Configuration loading from environment
//! - [`error`]: Unified error types
//! - [`market`]: Market and outcome types
//! - [`odds`]: Notation detection and decimal normalization
//! - [`arbitrage`]: Arbitrage test and stake allocation
//! - [`scanner`]: Batch evaluation of JSON-lines feeds
//! - [`api`]: HTTP API for evaluation, health and metrics
//! - [`metrics`]: Prometheus metrics
//! - [`utils`]: Utility functions

pub mod api;
pub mod arbitrage;
pub mod config;
pub mod error;
pub mod market;
pub mod metrics;
pub mod odds;
pub mod scanner;
pub mod utils;

pub use arbitrage::{evaluate, EvaluatorSettings, SurebetResult};
pub use config::Config;
pub use error::{Result, SurebetError};
pub use market::{Market, Outcome, RawOdd};
pub use odds::{detect_format, normalize, OddsFormat};
