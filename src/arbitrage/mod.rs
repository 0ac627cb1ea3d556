//! Arbitrage module for detecting and sizing sure-bets.
//!
//! This module handles:
//! - Implied-probability test across a market's outcomes
//! - Stake allocation that equalizes payouts
//! - Result and rejection types

pub mod calculator;
pub mod evaluator;
pub mod types;

pub use calculator::{allocate, implied_sum, round_money, Allocation};
pub use evaluator::evaluate;
pub use types::{AllocationLeg, EvaluatorSettings, RejectionKind, SurebetResult};
