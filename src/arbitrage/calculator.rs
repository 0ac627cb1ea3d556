//! Stake, payout and profit calculations for sure-bet allocations.
//!
//! Every leg is sized so that it returns the same amount if it wins:
//!
//! ```text
//! Home @ 2.10   1/2.10 = 0.4762
//! Away @ 2.05   1/2.05 = 0.4878
//! ─────────────────────────────
//! implied sum   0.9640 < 1 ✅
//! payout        100 / 0.9640 = 103.73
//! stakes        103.73 / 2.10 = 49.40, 103.73 / 2.05 = 50.60
//! profit        3.73 whichever side wins
//! ```
//!
//! All math is `f64`. Conversion to two-decimal money happens once, at the
//! output boundary, via [`round_money`].

use rust_decimal::prelude::FromPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use smallvec::SmallVec;

use crate::market::Market;

/// Unrounded allocation for a market with an arbitrage.
#[derive(Debug, Clone, PartialEq)]
pub struct Allocation {
    /// Bankroll being split.
    pub total_stake: f64,
    /// Sum of implied probabilities (< 1).
    pub implied_sum: f64,
    /// Return whichever outcome wins.
    pub payout: f64,
    /// Stake per outcome, same order as the odds.
    pub stakes: SmallVec<[f64; Market::MAX_OUTCOMES]>,
    /// `payout - total_stake`.
    pub profit: f64,
}

impl Allocation {
    /// Profit as a fraction of the total stake.
    pub fn return_on_stake(&self) -> f64 {
        if self.total_stake > 0.0 {
            self.profit / self.total_stake
        } else {
            0.0
        }
    }
}

/// Sum of `1 / odd` over all outcomes.
pub fn implied_sum(decimal_odds: &[f64]) -> f64 {
    decimal_odds.iter().map(|odd| 1.0 / odd).sum()
}

/// Implied-probability sum expressed as a percentage.
pub fn edge_percentage(implied_sum: f64) -> f64 {
    implied_sum * 100.0
}

/// Fractional guaranteed profit rate (`1 - implied_sum`).
pub fn margin(implied_sum: f64) -> f64 {
    1.0 - implied_sum
}

/// Split `total_stake` so every outcome pays the same.
///
/// Returns `None` when the implied sum is 1 or more.
pub fn allocate(decimal_odds: &[f64], total_stake: f64) -> Option<Allocation> {
    let implied_sum = implied_sum(decimal_odds);
    if implied_sum >= 1.0 {
        return None;
    }

    let payout = total_stake / implied_sum;
    let stakes = decimal_odds.iter().map(|odd| payout / odd).collect();

    Some(Allocation {
        total_stake,
        implied_sum,
        payout,
        stakes,
        profit: payout - total_stake,
    })
}

/// Round to two decimals (half away from zero) as money.
///
/// `None` when `value` is not finite or does not fit in a `Decimal`.
pub fn round_money(value: f64) -> Option<Decimal> {
    Decimal::from_f64(value)
        .map(|d| d.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero))
}
