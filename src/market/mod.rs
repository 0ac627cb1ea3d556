//! Market module: the input shape handed to the evaluator.
//!
//! A market is two or three priced outcomes plus descriptive metadata that
//! rides along untouched.

pub mod types;

pub use types::{Market, MarketMetadata, Outcome, RawOdd};
