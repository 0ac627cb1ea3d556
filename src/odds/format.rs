//! Odds notation detection.
//!
//! Bookmakers quote prices in six notations. Scraped data rarely says which,
//! so the notation is inferred from the shape and magnitude of the value:
//!
//! ```text
//! "5/2"          fractional
//! "+150" "-125"  american (explicit sign)
//! 1.85           decimal          (n >= 1)
//! 0.85           hongkong         (0 < n < 1)
//! -1.25          indonesian       (-100 < n < -1)
//! -0.80          malay            (-1 <= n < 0)
//! -200           american         (n <= -100)
//! ```
//!
//! Unsigned integers >= 100 are ambiguous between decimal longshots and
//! American quotes written without a sign. [`AmericanTieBreak`] settles that.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use crate::error::OddsError;
use crate::market::RawOdd;

static FRACTIONAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*([0-9]+)\s*/\s*([0-9]+)\s*$").expect("valid regex"));

static SIGNED_INTEGER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*([+-])([0-9]+)\s*$").expect("valid regex"));

/// Odds notation.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum OddsFormat {
    /// Total payout per unit staked, stake included (European).
    Decimal,
    /// Net profit as a ratio, e.g. 5/2 (UK).
    Fractional,
    /// Moneyline: +N wins N per 100, -N stakes N to win 100 (US).
    #[strum(to_string = "american", serialize = "moneyline", serialize = "us")]
    American,
    /// Net profit per unit staked.
    #[strum(to_string = "hongkong", serialize = "hk")]
    HongKong,
    /// American scaled by 100.
    #[strum(to_string = "indonesian", serialize = "indo")]
    Indonesian,
    /// Hong Kong for favourites, negative reciprocal for underdogs.
    Malay,
}

/// Numeric payload of a parsed price.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OddsValue {
    /// Fractional `numerator/denominator`.
    Fraction {
        /// Profit part.
        numerator: f64,
        /// Stake part, never zero.
        denominator: f64,
    },
    /// Any other notation, signed.
    Number(f64),
}

impl OddsValue {
    /// The payload as a single number.
    pub fn as_f64(&self) -> f64 {
        match *self {
            OddsValue::Fraction {
                numerator,
                denominator,
            } => numerator / denominator,
            OddsValue::Number(n) => n,
        }
    }
}

/// A raw price with its notation resolved.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParsedOdd {
    /// Detected notation.
    pub format: OddsFormat,
    /// Parsed payload.
    pub value: OddsValue,
}

/// Policy for unsigned integers that could be either decimal or American.
///
/// An integral value `>= threshold` is American only when divisible by
/// `step`; otherwise it stays decimal. American lines are quoted in steps of
/// 5, so `150` reads as +150 (2.50 decimal) while `151` stays a 151.0
/// decimal longshot. Both knobs are tunable through configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AmericanTieBreak {
    /// Smallest magnitude considered for American.
    pub threshold: f64,
    /// Required divisor.
    pub step: u32,
}

impl Default for AmericanTieBreak {
    fn default() -> Self {
        Self {
            threshold: 100.0,
            step: 5,
        }
    }
}

impl AmericanTieBreak {
    /// Whether a positive, unsigned number should be read as American.
    pub fn is_american(&self, n: f64) -> bool {
        if n < self.threshold || n.fract() != 0.0 || self.step == 0 {
            return false;
        }
        n % f64::from(self.step) == 0.0
    }
}

/// Parse a raw price and resolve its notation.
pub fn parse_odd(raw: &RawOdd, tie_break: &AmericanTieBreak) -> Result<ParsedOdd, OddsError> {
    match raw {
        RawOdd::Number(n) => classify_number(*n, &raw.to_string(), tie_break),
        RawOdd::Text(text) => parse_text(text, tie_break),
    }
}

/// Detect the notation of a raw price.
pub fn detect_format(raw: &RawOdd, tie_break: &AmericanTieBreak) -> Result<OddsFormat, OddsError> {
    parse_odd(raw, tie_break).map(|parsed| parsed.format)
}

fn parse_text(text: &str, tie_break: &AmericanTieBreak) -> Result<ParsedOdd, OddsError> {
    if let Some(caps) = FRACTIONAL.captures(text) {
        let numerator = parse_digits(&caps[1]);
        let denominator = parse_digits(&caps[2]);
        if denominator == 0.0 {
            return Err(OddsError::malformed(text, "zero denominator"));
        }
        return Ok(ParsedOdd {
            format: OddsFormat::Fractional,
            value: OddsValue::Fraction {
                numerator,
                denominator,
            },
        });
    }

    if let Some(caps) = SIGNED_INTEGER.captures(text) {
        let magnitude = parse_digits(&caps[2]);
        if magnitude == 0.0 {
            return Err(OddsError::malformed(text, "zero value"));
        }
        let value = if &caps[1] == "-" { -magnitude } else { magnitude };
        return Ok(ParsedOdd {
            format: OddsFormat::American,
            value: OddsValue::Number(value),
        });
    }

    let n: f64 = text
        .trim()
        .parse()
        .map_err(|_| OddsError::malformed(text, "not a number"))?;
    classify_number(n, text, tie_break)
}

// Digit runs too long for u64 still parse; the guardrail decides on them.
fn parse_digits(digits: &str) -> f64 {
    digits.parse().unwrap_or(f64::INFINITY)
}

fn classify_number(
    n: f64,
    input: &str,
    tie_break: &AmericanTieBreak,
) -> Result<ParsedOdd, OddsError> {
    if !n.is_finite() {
        return Err(OddsError::malformed(input, "not a finite number"));
    }

    let format = if n >= 1.0 {
        if tie_break.is_american(n) {
            OddsFormat::American
        } else {
            OddsFormat::Decimal
        }
    } else if n > 0.0 {
        OddsFormat::HongKong
    } else if n < 0.0 {
        let magnitude = n.abs();
        if magnitude >= 100.0 {
            OddsFormat::American
        } else if magnitude > 1.0 {
            OddsFormat::Indonesian
        } else {
            OddsFormat::Malay
        }
    } else {
        return Err(OddsError::malformed(input, "zero value"));
    };

    Ok(ParsedOdd {
        format,
        value: OddsValue::Number(n),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn detect(raw: impl Into<RawOdd>) -> Result<OddsFormat, OddsError> {
        detect_format(&raw.into(), &AmericanTieBreak::default())
    }

    #[test]
    fn fractional_strings() {
        assert_eq!(detect("5/2").unwrap(), OddsFormat::Fractional);
        assert_eq!(detect(" 11 / 10 ").unwrap(), OddsFormat::Fractional);
        assert_eq!(detect("1/1").unwrap(), OddsFormat::Fractional);
    }

    #[test]
    fn fractional_zero_denominator_is_malformed() {
        assert!(matches!(detect("5/0"), Err(OddsError::Malformed { .. })));
    }

    #[test]
    fn signed_strings_are_american() {
        assert_eq!(detect("+150").unwrap(), OddsFormat::American);
        assert_eq!(detect("-125").unwrap(), OddsFormat::American);
        // An explicit sign wins over magnitude.
        assert_eq!(detect("-5").unwrap(), OddsFormat::American);
    }

    #[test]
    fn signed_decimal_string_falls_through_to_magnitude() {
        assert_eq!(detect("-1.25").unwrap(), OddsFormat::Indonesian);
        assert_eq!(detect("-0.80").unwrap(), OddsFormat::Malay);
    }

    #[test]
    fn oversized_integers_still_parse() {
        assert_eq!(detect("100000000000000000000/1").unwrap(), OddsFormat::Fractional);
        assert_eq!(detect("+100000000000000000000").unwrap(), OddsFormat::American);
    }

    #[test]
    fn non_ascii_digits_are_not_numbers() {
        match detect("٥/٢") {
            Err(OddsError::Malformed { reason, .. }) => assert_eq!(reason, "not a number"),
            other => panic!("expected malformed, got {:?}", other),
        }
        assert!(matches!(detect("+١٥٠"), Err(OddsError::Malformed { .. })));
    }

    #[test]
    fn numeric_ranges() {
        assert_eq!(detect(1.80).unwrap(), OddsFormat::Decimal);
        assert_eq!(detect(1.0).unwrap(), OddsFormat::Decimal);
        assert_eq!(detect(0.85).unwrap(), OddsFormat::HongKong);
        assert_eq!(detect(-0.5).unwrap(), OddsFormat::Malay);
        assert_eq!(detect(-1.0).unwrap(), OddsFormat::Malay);
        assert_eq!(detect(-1.5).unwrap(), OddsFormat::Indonesian);
        assert_eq!(detect(-99.0).unwrap(), OddsFormat::Indonesian);
        assert_eq!(detect(-100.0).unwrap(), OddsFormat::American);
        assert_eq!(detect(-250.0).unwrap(), OddsFormat::American);
    }

    #[test]
    fn numeric_strings_use_the_same_ranges() {
        assert_eq!(detect("2.50").unwrap(), OddsFormat::Decimal);
        assert_eq!(detect("0.9").unwrap(), OddsFormat::HongKong);
    }

    #[test]
    fn zero_and_garbage_are_malformed() {
        assert!(matches!(detect(0.0), Err(OddsError::Malformed { .. })));
        assert!(matches!(detect("0"), Err(OddsError::Malformed { .. })));
        assert!(matches!(detect("+0"), Err(OddsError::Malformed { .. })));
        assert!(matches!(detect("evens"), Err(OddsError::Malformed { .. })));
        assert!(matches!(detect("2.5x"), Err(OddsError::Malformed { .. })));
        assert!(matches!(detect(""), Err(OddsError::Malformed { .. })));
    }

    #[test]
    fn non_finite_numbers_are_malformed() {
        assert!(matches!(detect(f64::NAN), Err(OddsError::Malformed { .. })));
        assert!(matches!(detect(f64::INFINITY), Err(OddsError::Malformed { .. })));
        assert!(matches!(detect("NaN"), Err(OddsError::Malformed { .. })));
        assert!(matches!(detect("inf"), Err(OddsError::Malformed { .. })));
    }

    #[test]
    fn tie_break_multiples_of_five_are_american() {
        assert_eq!(detect(150.0).unwrap(), OddsFormat::American);
        assert_eq!(detect(100.0).unwrap(), OddsFormat::American);
        assert_eq!(detect("150.0").unwrap(), OddsFormat::American);
    }

    #[test]
    fn tie_break_other_integers_stay_decimal() {
        assert_eq!(detect(151.0).unwrap(), OddsFormat::Decimal);
        assert_eq!(detect(99.0).unwrap(), OddsFormat::Decimal);
        assert_eq!(detect(95.0).unwrap(), OddsFormat::Decimal);
        assert_eq!(detect(150.5).unwrap(), OddsFormat::Decimal);
    }

    #[test]
    fn tie_break_is_tunable() {
        let tens = AmericanTieBreak {
            threshold: 100.0,
            step: 10,
        };
        assert!(!tens.is_american(155.0));
        assert!(tens.is_american(160.0));

        let higher = AmericanTieBreak {
            threshold: 200.0,
            step: 5,
        };
        assert_eq!(
            detect_format(&RawOdd::Number(150.0), &higher).unwrap(),
            OddsFormat::Decimal
        );
    }

    #[test]
    fn parsed_payload_is_kept() {
        let parsed = parse_odd(&"5/2".into(), &AmericanTieBreak::default()).unwrap();
        assert_eq!(
            parsed.value,
            OddsValue::Fraction {
                numerator: 5.0,
                denominator: 2.0
            }
        );
        assert_eq!(parsed.value.as_f64(), 2.5);

        let parsed = parse_odd(&"-125".into(), &AmericanTieBreak::default()).unwrap();
        assert_eq!(parsed.value, OddsValue::Number(-125.0));
    }

    #[test]
    fn format_from_string_works() {
        assert_eq!(OddsFormat::from_str("decimal").unwrap(), OddsFormat::Decimal);
        assert_eq!(OddsFormat::from_str("HK").unwrap(), OddsFormat::HongKong);
        assert_eq!(OddsFormat::from_str("moneyline").unwrap(), OddsFormat::American);
        assert_eq!(OddsFormat::HongKong.to_string(), "hongkong");
    }
}
