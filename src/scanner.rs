//! Batch evaluation of JSON-lines market feeds.
//!
//! Each input line is one market as produced by the scraping layer. Each
//! output line is the same market with its `SurebetResult` attached. Running
//! totals live in a [`ScanTally`] owned by the loop, not in global state.

use std::io::{BufRead, Write};
use std::time::Instant;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::arbitrage::{evaluate, EvaluatorSettings, RejectionKind, SurebetResult};
use crate::error::ScanError;
use crate::market::Market;
use crate::metrics;

/// A market with its evaluation attached, ready for storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluatedMarket {
    /// The market as received, metadata included.
    #[serde(flatten)]
    pub market: Market,
    /// Evaluation result.
    pub result: SurebetResult,
}

/// Knobs for one scan.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScanOptions {
    /// Bankroll split across each market.
    pub total_stake: Decimal,
    /// Sure-bets below this profit percentage are not emitted.
    pub min_profit_pct: Decimal,
    /// Emit only sure-bets.
    pub only_surebets: bool,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            total_stake: Decimal::ONE_HUNDRED,
            min_profit_pct: Decimal::ZERO,
            only_surebets: false,
        }
    }
}

/// Running totals for a scan.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ScanTally {
    /// Records read (including undecodable ones).
    pub scanned: u64,
    /// Sure-bets found.
    pub surebets: u64,
    /// Markets with no arbitrage.
    pub no_arbitrage: u64,
    /// Markets rejected for size or bad odds.
    pub rejected: u64,
    /// Lines that were not valid market JSON.
    pub invalid: u64,
    /// Sure-bets held back by the profit filter.
    pub filtered: u64,
    /// Records written to the output.
    pub emitted: u64,
    /// Best profit percentage seen.
    pub best_profit_pct: Option<Decimal>,
}

impl ScanTally {
    /// Account for one evaluated market.
    pub fn record(&mut self, result: &SurebetResult) {
        self.scanned += 1;
        match result.rejection {
            None => {
                self.surebets += 1;
                let pct = result.profit_pct();
                if self.best_profit_pct.map_or(true, |best| pct > best) {
                    self.best_profit_pct = Some(pct);
                }
            }
            Some(RejectionKind::NoArbitrage) => self.no_arbitrage += 1,
            Some(_) => self.rejected += 1,
        }
    }

    /// Account for one undecodable line.
    pub fn record_invalid(&mut self) {
        self.scanned += 1;
        self.invalid += 1;
    }
}

impl std::fmt::Display for ScanTally {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "scanned={} surebets={} no_arb={} rejected={} invalid={} filtered={} emitted={} best={}%",
            self.scanned,
            self.surebets,
            self.no_arbitrage,
            self.rejected,
            self.invalid,
            self.filtered,
            self.emitted,
            self.best_profit_pct
                .map(|d| d.round_dp(2).to_string())
                .unwrap_or_else(|| "N/A".to_string()),
        )
    }
}

/// Decode one input line.
pub fn parse_record(line_no: usize, line: &str) -> Result<Market, ScanError> {
    serde_json::from_str(line).map_err(|source| ScanError::BadRecord {
        line: line_no,
        source,
    })
}

/// Whether an evaluated market should be written out.
pub fn should_emit(result: &SurebetResult, options: &ScanOptions) -> bool {
    if result.is_surebet {
        result.profit_pct() >= options.min_profit_pct
    } else {
        !options.only_surebets
    }
}

/// Evaluate every market in `reader`, writing results to `writer`.
pub fn scan<R: BufRead, W: Write>(
    reader: R,
    mut writer: W,
    settings: &EvaluatorSettings,
    options: &ScanOptions,
) -> Result<ScanTally, ScanError> {
    let mut tally = ScanTally::default();

    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let market = match parse_record(idx + 1, &line) {
            Ok(m) => m,
            Err(e) => {
                warn!("Skipping record: {}", e);
                metrics::inc_invalid_records();
                tally.record_invalid();
                continue;
            }
        };

        let start = Instant::now();
        let result = evaluate(&market, options.total_stake, settings)?;
        metrics::record_evaluation(&result, start);
        tally.record(&result);

        if !should_emit(&result, options) {
            if result.is_surebet {
                tally.filtered += 1;
            }
            debug!(line = idx + 1, "Record not emitted");
            continue;
        }

        let record = EvaluatedMarket { market, result };
        writeln!(writer, "{}", serde_json::to_string(&record)?)?;
        tally.emitted += 1;
    }

    writer.flush()?;
    info!("Scan complete: {}", tally);
    Ok(tally)
}
