//! Evaluator inputs and outputs.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::odds::OddsSettings;

/// Why a market did not produce a sure-bet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum RejectionKind {
    /// Outcome count is not 2 or 3.
    UnsupportedMarketSize,
    /// An outcome's price could not be parsed.
    MalformedOdds,
    /// An outcome's price converted to an out-of-range decimal.
    ImplausibleOdds,
    /// Prices parsed fine but the implied probabilities sum to 1 or more.
    NoArbitrage,
}

/// Stake assigned to one outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationLeg {
    /// Outcome name.
    pub label: String,
    /// Price source.
    pub bookmaker: String,
    /// Decimal odds used for this leg.
    pub decimal_odd: f64,
    /// Amount to stake, two decimals.
    pub stake: Decimal,
}

/// Outcome of evaluating one market.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurebetResult {
    /// Whether a guaranteed profit exists.
    pub is_surebet: bool,
    /// Per-outcome stakes, in input order. Only set for sure-bets.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allocation: Option<Vec<AllocationLeg>>,
    /// Return whichever outcome wins.
    pub payout: Decimal,
    /// `payout - total_stake`.
    pub profit: Decimal,
    /// Sum of implied probabilities, as a percentage.
    pub edge_percentage: f64,
    /// Typed rejection.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rejection: Option<RejectionKind>,
    /// Human-readable rejection.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<String>,
    /// Non-fatal note, e.g. suspiciously high margin.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub advisory: Option<String>,
}

impl SurebetResult {
    /// Reason text for unsupported market sizes.
    pub const UNSUPPORTED_SIZE: &'static str = "unsupported market size";
    /// Reason text for a market without arbitrage.
    pub const NO_ARBITRAGE: &'static str = "no arbitrage opportunity";
    /// Advisory text for margins above the configured threshold.
    pub const HIGH_MARGIN: &'static str = "margin unusually high - verify odds";

    /// Market rejected before the arbitrage test could run.
    pub fn rejected(kind: RejectionKind, reason: impl Into<String>) -> Self {
        Self {
            is_surebet: false,
            allocation: None,
            payout: Decimal::ZERO,
            profit: Decimal::ZERO,
            edge_percentage: 0.0,
            rejection: Some(kind),
            rejection_reason: Some(reason.into()),
            advisory: None,
        }
    }

    /// Market evaluated, no arbitrage present.
    pub fn no_arbitrage(edge_percentage: f64) -> Self {
        Self {
            edge_percentage,
            ..Self::rejected(RejectionKind::NoArbitrage, Self::NO_ARBITRAGE)
        }
    }

    /// Profit as a percentage of the total stake.
    pub fn profit_pct(&self) -> Decimal {
        let staked = self.payout - self.profit;
        if staked.is_zero() {
            Decimal::ZERO
        } else {
            (self.profit / staked) * Decimal::ONE_HUNDRED
        }
    }

    /// Sum of the rounded leg stakes.
    pub fn total_staked(&self) -> Decimal {
        self.allocation
            .iter()
            .flatten()
            .map(|leg| leg.stake)
            .sum()
    }
}

/// Call-time settings for the evaluator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EvaluatorSettings {
    /// Normalizer settings (guardrail and tie-break).
    pub odds: OddsSettings,
    /// Profit/stake ratio above which an advisory is attached.
    pub high_margin_threshold: f64,
}

impl EvaluatorSettings {
    /// Default advisory threshold (20% return).
    pub const DEFAULT_HIGH_MARGIN_THRESHOLD: f64 = 0.20;
}

impl Default for EvaluatorSettings {
    fn default() -> Self {
        Self {
            odds: OddsSettings::default(),
            high_margin_threshold: Self::DEFAULT_HIGH_MARGIN_THRESHOLD,
        }
    }
}
