//! Conversion of raw prices into canonical decimal odds.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::format::{parse_odd, AmericanTieBreak, OddsFormat};
use crate::error::OddsError;
use crate::market::RawOdd;

/// Plausible range for decimal odds, inclusive on both ends.
///
/// Anything outside is treated as corrupted upstream data and rejected. The
/// value is never clamped into range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OddsBounds {
    /// Lowest accepted decimal (just above 1).
    pub min: f64,
    /// Highest accepted decimal (room for outright longshots).
    pub max: f64,
}

impl OddsBounds {
    /// Default lower bound.
    pub const DEFAULT_MIN: f64 = 1.01;
    /// Default upper bound.
    pub const DEFAULT_MAX: f64 = 1000.0;

    /// Check a converted value against the range.
    pub fn check(&self, input: &str, decimal: f64) -> Result<f64, OddsError> {
        if decimal.is_finite() && decimal >= self.min && decimal <= self.max {
            Ok(decimal)
        } else {
            Err(OddsError::Implausible {
                input: input.to_string(),
                decimal,
                min: self.min,
                max: self.max,
            })
        }
    }
}

impl Default for OddsBounds {
    fn default() -> Self {
        Self {
            min: Self::DEFAULT_MIN,
            max: Self::DEFAULT_MAX,
        }
    }
}

/// Everything the normalizer needs from its caller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct OddsSettings {
    /// Plausibility guardrail.
    pub bounds: OddsBounds,
    /// Decimal-vs-American policy for unsigned integers.
    pub tie_break: AmericanTieBreak,
}

/// A price in canonical decimal form.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NormalizedOdd {
    /// Total payout per unit staked, stake included.
    pub decimal: f64,
    /// Notation the raw value was read as.
    pub format: OddsFormat,
}

impl NormalizedOdd {
    /// Probability implied by the price (`1 / decimal`).
    pub fn implied_probability(&self) -> f64 {
        1.0 / self.decimal
    }

    /// Render the same price in another notation.
    pub fn express(&self, format: OddsFormat) -> String {
        let d = self.decimal;
        let profit = d - 1.0;
        match format {
            OddsFormat::Decimal => format!("{:.2}", d),
            OddsFormat::Fractional => {
                let (num, den) = approximate_fraction(profit, 100);
                format!("{}/{}", num, den)
            }
            OddsFormat::American => {
                if d >= 2.0 {
                    format!("+{:.0}", profit * 100.0)
                } else {
                    format!("-{:.0}", 100.0 / profit)
                }
            }
            OddsFormat::HongKong => format!("{:.2}", profit),
            OddsFormat::Indonesian => {
                if d >= 2.0 {
                    format!("{:.2}", profit)
                } else {
                    format!("{:.2}", -1.0 / profit)
                }
            }
            OddsFormat::Malay => {
                if d <= 2.0 {
                    format!("{:.3}", profit)
                } else {
                    format!("{:.3}", -1.0 / profit)
                }
            }
        }
    }
}

/// Convert a numeric payload in a known notation to decimal odds.
///
/// No range check happens here.
pub fn to_decimal(format: OddsFormat, v: f64) -> f64 {
    match format {
        OddsFormat::Decimal => v,
        OddsFormat::Fractional => 1.0 + v,
        OddsFormat::American => {
            if v > 0.0 {
                1.0 + v / 100.0
            } else {
                1.0 + 100.0 / v.abs()
            }
        }
        OddsFormat::HongKong => v + 1.0,
        OddsFormat::Indonesian | OddsFormat::Malay => {
            if v > 0.0 {
                v + 1.0
            } else {
                1.0 + 1.0 / v.abs()
            }
        }
    }
}

/// Detect the notation of `raw` and convert it to decimal odds.
pub fn normalize(raw: &RawOdd, settings: &OddsSettings) -> Result<NormalizedOdd, OddsError> {
    let parsed = parse_odd(raw, &settings.tie_break)?;
    finish(raw, parsed.format, parsed.value.as_f64(), &settings.bounds)
}

/// Convert `raw` reading it as `format`, skipping detection.
pub fn normalize_as(
    raw: &RawOdd,
    format: OddsFormat,
    settings: &OddsSettings,
) -> Result<NormalizedOdd, OddsError> {
    let parsed = parse_odd(raw, &settings.tie_break)?;
    finish(raw, format, parsed.value.as_f64(), &settings.bounds)
}

fn finish(
    raw: &RawOdd,
    format: OddsFormat,
    value: f64,
    bounds: &OddsBounds,
) -> Result<NormalizedOdd, OddsError> {
    let decimal = bounds.check(&raw.to_string(), to_decimal(format, value))?;
    debug!(raw = %raw, %format, decimal, "Normalized odds");
    Ok(NormalizedOdd { decimal, format })
}

/// Best fraction `num/den` with `den <= max_den` for a non-negative ratio.
fn approximate_fraction(ratio: f64, max_den: u64) -> (u64, u64) {
    if !ratio.is_finite() || ratio <= 0.0 {
        return (0, 1);
    }

    let mut best = (ratio.round() as u64, 1u64);
    let mut best_err = (ratio - best.0 as f64).abs();
    for den in 2..=max_den {
        if best_err < 1e-9 {
            break;
        }
        let num = (ratio * den as f64).round() as u64;
        let err = (ratio - num as f64 / den as f64).abs();
        if err < best_err {
            best = (num, den);
            best_err = err;
        }
    }

    let g = gcd(best.0, best.1).max(1);
    (best.0 / g, best.1 / g)
}

fn gcd(a: u64, b: u64) -> u64 {
    if b == 0 {
        a
    } else {
        gcd(b, a % b)
    }
}
