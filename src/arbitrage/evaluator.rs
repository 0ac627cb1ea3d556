//! Sure-bet evaluation of a single market.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use smallvec::SmallVec;
use tracing::{debug, info, instrument, warn};

use super::calculator::{allocate, edge_percentage, implied_sum, margin, round_money};
use super::types::{AllocationLeg, EvaluatorSettings, RejectionKind, SurebetResult};
use crate::error::{ArbitrageError, OddsError};
use crate::market::Market;
use crate::odds::normalize;

/// Evaluate a market for arbitrage and size the stakes.
///
/// Bad data never fails the call: wrong market sizes, unreadable or
/// implausible prices and missing arbitrage all come back as a
/// `SurebetResult` with `is_surebet == false`. Errors are reserved for a
/// `total_stake` that is not positive or whose payout overflows `Decimal`.
#[instrument(skip(market, settings), fields(market = %market.display_name()))]
pub fn evaluate(
    market: &Market,
    total_stake: Decimal,
    settings: &EvaluatorSettings,
) -> Result<SurebetResult, ArbitrageError> {
    if total_stake <= Decimal::ZERO {
        return Err(ArbitrageError::InvalidStake(total_stake));
    }
    let stake = total_stake
        .to_f64()
        .ok_or(ArbitrageError::InvalidStake(total_stake))?;

    if !market.has_supported_size() {
        debug!(outcomes = market.outcomes.len(), "Unsupported market size");
        return Ok(SurebetResult::rejected(
            RejectionKind::UnsupportedMarketSize,
            SurebetResult::UNSUPPORTED_SIZE,
        ));
    }

    let mut odds: SmallVec<[f64; Market::MAX_OUTCOMES]> = SmallVec::new();
    for outcome in &market.outcomes {
        match normalize(&outcome.raw_odd, &settings.odds) {
            Ok(odd) => odds.push(odd.decimal),
            Err(e) => {
                warn!(label = %outcome.label, bookmaker = %outcome.bookmaker, error = %e, "Rejecting market");
                let kind = match e {
                    OddsError::Malformed { .. } => RejectionKind::MalformedOdds,
                    OddsError::Implausible { .. } => RejectionKind::ImplausibleOdds,
                };
                return Ok(SurebetResult::rejected(
                    kind,
                    format!("outcome '{}': {}", outcome.label, e),
                ));
            }
        }
    }

    let sum = implied_sum(&odds);
    let edge = edge_percentage(sum);

    let Some(allocation) = allocate(&odds, stake) else {
        debug!(edge_percentage = edge, "No arbitrage opportunity");
        return Ok(SurebetResult::no_arbitrage(edge));
    };

    let out_of_range = || ArbitrageError::StakeOutOfRange(total_stake);
    let payout = round_money(allocation.payout).ok_or_else(out_of_range)?;
    let profit = round_money(allocation.profit).ok_or_else(out_of_range)?;
    let legs = market
        .outcomes
        .iter()
        .zip(odds.iter().zip(&allocation.stakes))
        .map(|(outcome, (&decimal_odd, &leg_stake))| {
            Some(AllocationLeg {
                label: outcome.label.clone(),
                bookmaker: outcome.bookmaker.clone(),
                decimal_odd,
                stake: round_money(leg_stake)?,
            })
        })
        .collect::<Option<Vec<_>>>()
        .ok_or_else(out_of_range)?;

    let advisory = if allocation.return_on_stake() > settings.high_margin_threshold {
        warn!(
            return_on_stake = allocation.return_on_stake(),
            threshold = settings.high_margin_threshold,
            "Margin unusually high"
        );
        Some(SurebetResult::HIGH_MARGIN.to_string())
    } else {
        None
    };

    let result = SurebetResult {
        is_surebet: true,
        allocation: Some(legs),
        payout,
        profit,
        edge_percentage: edge,
        rejection: None,
        rejection_reason: None,
        advisory,
    };

    info!(
        edge_percentage = edge,
        margin = margin(sum),
        payout = %result.payout,
        profit = %result.profit,
        "Sure-bet found"
    );

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market::Outcome;
    use crate::odds::OddsBounds;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    fn market(odds: &[(&str, f64, &str)]) -> Market {
        Market::new(
            odds.iter()
                .map(|(label, odd, bookmaker)| Outcome::new(*label, *odd, *bookmaker))
                .collect(),
        )
    }

    fn eval(market: &Market) -> SurebetResult {
        evaluate(market, dec!(100), &EvaluatorSettings::default()).unwrap()
    }

    #[test]
    fn two_way_sure_bet() {
        let m = market(&[("Home", 2.10, "A"), ("Away", 2.05, "B")]);
        let result = eval(&m);

        assert!(result.is_surebet);
        assert!((result.edge_percentage - 96.40).abs() < 0.01);
        assert_eq!(result.profit, dec!(3.73));
        assert_eq!(result.payout, dec!(103.73));
        assert!(result.advisory.is_none());

        let legs = result.allocation.unwrap();
        assert_eq!(legs[0].label, "Home");
        assert_eq!(legs[0].bookmaker, "A");
        assert_eq!(legs[0].stake, dec!(49.40));
        assert_eq!(legs[1].stake, dec!(50.60));
    }

    #[test]
    fn high_margin_gets_advisory() {
        let m = market(&[("Home", 2.00, "A"), ("Away", 34.00, "B")]);
        let result = eval(&m);

        assert!(result.is_surebet);
        assert_eq!(result.payout, dec!(188.89));
        assert_eq!(result.profit, dec!(88.89));
        assert_eq!(result.advisory.as_deref(), Some(SurebetResult::HIGH_MARGIN));

        let stakes: Vec<Decimal> = result.allocation.unwrap().iter().map(|l| l.stake).collect();
        assert_eq!(stakes, vec![dec!(94.44), dec!(5.56)]);
    }

    #[test]
    fn advisory_starts_strictly_above_threshold() {
        let m = market(&[("Home", 2.40, "A"), ("Away", 2.40, "B")]);
        let return_on_stake = allocate(&[2.40, 2.40], 100.0).unwrap().return_on_stake();

        let mut settings = EvaluatorSettings::default();
        settings.high_margin_threshold = return_on_stake;
        let at = evaluate(&m, dec!(100), &settings).unwrap();
        assert!(at.is_surebet);
        assert_eq!(at.advisory, None);

        settings.high_margin_threshold = return_on_stake - 1e-9;
        let above = evaluate(&m, dec!(100), &settings).unwrap();
        assert_eq!(above.advisory.as_deref(), Some(SurebetResult::HIGH_MARGIN));
    }

    #[test]
    fn payout_beyond_decimal_range_is_an_error() {
        let m = market(&[("Home", 2.00, "A"), ("Away", 34.00, "B")]);
        let stake = dec!(70000000000000000000000000000);

        assert_eq!(
            evaluate(&m, stake, &EvaluatorSettings::default()),
            Err(ArbitrageError::StakeOutOfRange(stake))
        );
    }

    #[test]
    fn no_arbitrage_reports_edge() {
        let m = market(&[("Home", 1.80, "A"), ("Away", 1.90, "B")]);
        let result = eval(&m);

        assert!(!result.is_surebet);
        assert!(result.edge_percentage >= 100.0);
        assert_eq!(result.rejection, Some(RejectionKind::NoArbitrage));
        assert_eq!(result.payout, Decimal::ZERO);
        assert_eq!(result.profit, Decimal::ZERO);
        assert!(result.allocation.is_none());
    }

    #[test]
    fn mixed_notations_are_normalized() {
        let m = Market::new(vec![
            Outcome::new("Home", "+150", "A"),
            Outcome::new("Draw", "5/2", "B"),
            Outcome::new("Away", 4.5, "C"),
        ]);
        let result = eval(&m);

        // 0.4 + 0.2857 + 0.2222 = 0.9079
        assert!(result.is_surebet);
        let odds: Vec<f64> = result
            .allocation
            .unwrap()
            .iter()
            .map(|l| l.decimal_odd)
            .collect();
        assert_eq!(odds, vec![2.5, 3.5, 4.5]);
    }

    #[test]
    fn unsupported_sizes_are_rejected() {
        for count in [0, 1, 4] {
            let m = Market::new(vec![Outcome::new("X", 5.0, "A"); count]);
            let result = eval(&m);
            assert!(!result.is_surebet);
            assert_eq!(result.rejection, Some(RejectionKind::UnsupportedMarketSize));
            assert_eq!(result.rejection_reason.as_deref(), Some("unsupported market size"));
        }
    }

    #[test]
    fn one_bad_outcome_rejects_the_market() {
        let m = Market::new(vec![
            Outcome::new("Home", 2.10, "A"),
            Outcome::new("Away", "n/a", "B"),
        ]);
        let result = eval(&m);

        assert!(!result.is_surebet);
        assert_eq!(result.rejection, Some(RejectionKind::MalformedOdds));
        let reason = result.rejection_reason.unwrap();
        assert!(reason.contains("Away"), "{}", reason);
        assert!(reason.contains("n/a"), "{}", reason);
    }

    #[test]
    fn implausible_outcome_rejects_the_market() {
        let m = market(&[("Home", 1.001, "A"), ("Away", 2.0, "B")]);
        let result = eval(&m);

        assert_eq!(result.rejection, Some(RejectionKind::ImplausibleOdds));
        assert!(result.allocation.is_none());
    }

    #[test]
    fn custom_bounds_are_respected() {
        let mut settings = EvaluatorSettings::default();
        settings.odds.bounds = OddsBounds { min: 1.01, max: 20.0 };
        let m = market(&[("Home", 2.00, "A"), ("Away", 34.00, "B")]);

        let result = evaluate(&m, dec!(100), &settings).unwrap();
        assert_eq!(result.rejection, Some(RejectionKind::ImplausibleOdds));
    }

    #[test]
    fn non_positive_stake_is_an_error() {
        let m = market(&[("Home", 2.10, "A"), ("Away", 2.05, "B")]);
        let settings = EvaluatorSettings::default();

        assert_eq!(
            evaluate(&m, Decimal::ZERO, &settings),
            Err(ArbitrageError::InvalidStake(Decimal::ZERO))
        );
        assert!(evaluate(&m, dec!(-5), &settings).is_err());
    }
}
