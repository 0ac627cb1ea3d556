//! Market-related types: priced outcomes and the markets that group them.

use std::fmt;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Raw price as handed over by a data source.
///
/// Scrapers deliver either JSON numbers or strings ("5/2", "+150", "1.85").
/// Nothing is interpreted here; see [`crate::odds::parse_odd`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawOdd {
    /// Numeric price.
    Number(f64),
    /// Textual price.
    Text(String),
}

impl fmt::Display for RawOdd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawOdd::Number(n) => write!(f, "{}", n),
            RawOdd::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<f64> for RawOdd {
    fn from(value: f64) -> Self {
        RawOdd::Number(value)
    }
}

impl From<&str> for RawOdd {
    fn from(value: &str) -> Self {
        RawOdd::Text(value.to_string())
    }
}

impl From<String> for RawOdd {
    fn from(value: String) -> Self {
        RawOdd::Text(value)
    }
}

/// One priced side of a market.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Outcome {
    /// Outcome name (e.g. "Home", "Over 2.5").
    pub label: String,
    /// Price in whatever notation the source used.
    #[serde(alias = "odd")]
    pub raw_odd: RawOdd,
    /// Who quoted the price.
    pub bookmaker: String,
}

impl Outcome {
    /// Create a new outcome.
    pub fn new(
        label: impl Into<String>,
        raw_odd: impl Into<RawOdd>,
        bookmaker: impl Into<String>,
    ) -> Self {
        Self {
            label: label.into(),
            raw_odd: raw_odd.into(),
            bookmaker: bookmaker.into(),
        }
    }
}

/// Descriptive data carried alongside a market. Never read by the math.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MarketMetadata {
    /// Sport name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sport: Option<String>,
    /// League or tournament.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub competition: Option<String>,
    /// Scheduled start (RFC 3339).
    #[serde(
        default,
        with = "time::serde::rfc3339::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub scheduled_at: Option<OffsetDateTime>,
    /// Teams or players involved.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub contestants: Vec<String>,
}

/// A group of mutually exclusive, collectively exhaustive outcomes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Market {
    /// Priced outcomes, in display order.
    pub outcomes: Vec<Outcome>,
    /// Passthrough metadata.
    #[serde(flatten)]
    pub metadata: MarketMetadata,
}

impl Market {
    /// Smallest supported market (two-way).
    pub const MIN_OUTCOMES: usize = 2;
    /// Largest supported market (three-way, e.g. 1X2).
    pub const MAX_OUTCOMES: usize = 3;

    /// Create a market without metadata.
    pub fn new(outcomes: Vec<Outcome>) -> Self {
        Self {
            outcomes,
            metadata: MarketMetadata::default(),
        }
    }

    /// Whether the outcome count is one the evaluator handles.
    pub fn has_supported_size(&self) -> bool {
        (Self::MIN_OUTCOMES..=Self::MAX_OUTCOMES).contains(&self.outcomes.len())
    }

    /// Short human-readable name for logs ("A vs B" or the outcome labels).
    pub fn display_name(&self) -> String {
        if self.metadata.contestants.is_empty() {
            self.outcomes
                .iter()
                .map(|o| o.label.as_str())
                .collect::<Vec<_>>()
                .join(" / ")
        } else {
            self.metadata.contestants.join(" vs ")
        }
    }
}
