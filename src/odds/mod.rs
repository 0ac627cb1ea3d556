//! Odds module: notation detection and decimal normalization.
//!
//! This module handles:
//! - Classifying a raw price into one of six notations
//! - Converting it to decimal odds
//! - Rejecting values outside the plausible range

pub mod format;
pub mod normalize;

pub use format::{detect_format, parse_odd, AmericanTieBreak, OddsFormat, OddsValue, ParsedOdd};
pub use normalize::{normalize, normalize_as, to_decimal, NormalizedOdd, OddsBounds, OddsSettings};
