//! Strategy Classifier
//!
//! Maps a leg set to one strategy name by evaluating the rule table in
//! priority order. The first matching rule wins; classification never fails.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::definition::{CreditDebit, Direction, LegProfile};
use super::rule_table::StrategyTable;
use crate::domain::portfolio::{Leg, consolidate};

/// Fallback for unmatched sets containing options.
pub const COMPLEX_STRATEGY: &str = "Complex Strategy";

/// Fallback for unmatched sets without options.
pub const MIXED_STRATEGY: &str = "Mixed Strategy";

/// Classification result with registry metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrategyMatch {
    /// Strategy name.
    pub name: String,
    /// Market bias, when the rule declares one.
    pub direction: Option<Direction>,
    /// Credit or debit, when the rule declares one.
    pub credit_debit: Option<CreditDebit>,
    /// Index of the matching rule; `None` for fallbacks.
    pub rule_index: Option<usize>,
}

impl StrategyMatch {
    fn fallback(name: &str) -> Self {
        Self {
            name: name.to_string(),
            direction: None,
            credit_debit: None,
            rule_index: None,
        }
    }

    /// Whether a rule matched (rather than a fallback).
    #[must_use]
    pub const fn is_recognized(&self) -> bool {
        self.rule_index.is_some()
    }
}

/// Rule-driven classifier over a shared, immutable rule table.
#[derive(Debug, Clone)]
pub struct StrategyClassifier {
    table: Arc<StrategyTable>,
}

impl Default for StrategyClassifier {
    fn default() -> Self {
        Self::new(Arc::new(StrategyTable::standard()))
    }
}

impl StrategyClassifier {
    /// Create a classifier over a rule table.
    #[must_use]
    pub const fn new(table: Arc<StrategyTable>) -> Self {
        Self { table }
    }

    /// Rule table in use.
    #[must_use]
    pub fn table(&self) -> &StrategyTable {
        &self.table
    }

    /// Strategy name for a leg set.
    #[must_use]
    pub fn classify(&self, legs: &[Leg]) -> String {
        self.classify_detailed(legs).name
    }

    /// Strategy name plus direction, credit/debit and the matching rule.
    ///
    /// Split fills are merged and flat legs dropped before matching.
    #[must_use]
    pub fn classify_detailed(&self, legs: &[Leg]) -> StrategyMatch {
        let legs = consolidate(legs);
        let profile = LegProfile::new(&legs);

        self.table
            .rules()
            .iter()
            .enumerate()
            .find(|(_, rule)| rule.matches(&profile))
            .map_or_else(
                || {
                    StrategyMatch::fallback(if profile.has_options() {
                        COMPLEX_STRATEGY
                    } else {
                        MIXED_STRATEGY
                    })
                },
                |(idx, rule)| StrategyMatch {
                    name: rule.name.clone(),
                    direction: rule.direction,
                    credit_debit: rule.credit_debit,
                    rule_index: Some(idx),
                },
            )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::portfolio::OptionType;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use test_case::test_case;

    fn near() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 2, 21).unwrap()
    }

    fn far() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 21).unwrap()
    }

    fn call(strike: Decimal, qty: i64) -> Leg {
        Leg::option("SPY", OptionType::Call, strike, near(), qty, Decimal::ZERO)
    }

    fn put(strike: Decimal, qty: i64) -> Leg {
        Leg::option("SPY", OptionType::Put, strike, near(), qty, Decimal::ZERO)
    }

    fn classify(legs: &[Leg]) -> String {
        StrategyClassifier::default().classify(legs)
    }

    #[test_case(vec![Leg::equity("SPY", 100, dec!(-50000))], "Long Stock" ; "long stock")]
    #[test_case(vec![Leg::equity("SPY", -100, dec!(50000))], "Short Stock" ; "short stock")]
    #[test_case(vec![call(dec!(500), 1)], "Long Call" ; "long call")]
    #[test_case(vec![call(dec!(500), -1)], "Short Call" ; "short call")]
    #[test_case(vec![put(dec!(500), 1)], "Long Put" ; "long put")]
    #[test_case(vec![put(dec!(500), -1)], "Short Put" ; "short put")]
    fn single_legs(legs: Vec<Leg>, expected: &str) {
        assert_eq!(classify(&legs), expected);
    }

    #[test_case(call(dec!(100), 1), call(dec!(110), -1), "Bull Call Spread" ; "bull call")]
    #[test_case(call(dec!(100), -1), call(dec!(110), 1), "Bear Call Spread" ; "bear call")]
    #[test_case(put(dec!(95), 1), put(dec!(100), -1), "Bull Put Spread" ; "bull put")]
    #[test_case(put(dec!(95), -1), put(dec!(100), 1), "Bear Put Spread" ; "bear put")]
    fn verticals(a: Leg, b: Leg, expected: &str) {
        assert_eq!(classify(&[a.clone(), b.clone()]), expected);
        assert_eq!(classify(&[b, a]), expected);
    }

    #[test]
    fn zebra_takes_precedence_over_vertical() {
        let legs = [call(dec!(100), 2), call(dec!(110), -1)];
        let result = StrategyClassifier::default().classify_detailed(&legs);
        assert_eq!(result.name, "Bull ZEBRA");
        assert_eq!(result.direction, Some(Direction::Bullish));

        let legs = [put(dec!(110), 2), put(dec!(100), -1)];
        assert_eq!(classify(&legs), "Bear ZEBRA");
    }

    #[test]
    fn split_fills_are_merged_before_classification() {
        let legs = [call(dec!(100), 1), call(dec!(110), -1), call(dec!(100), 1)];
        assert_eq!(classify(&legs), "Bull ZEBRA");
    }

    #[test_case(call(dec!(100), 1), put(dec!(100), 1), "Long Straddle" ; "long straddle")]
    #[test_case(call(dec!(100), -1), put(dec!(100), -1), "Short Straddle" ; "short straddle")]
    #[test_case(call(dec!(100), 1), put(dec!(100), -1), "Straddle" ; "mixed straddle")]
    #[test_case(call(dec!(110), 1), put(dec!(90), 1), "Long Strangle" ; "long strangle")]
    #[test_case(call(dec!(110), -1), put(dec!(90), -1), "Short Strangle" ; "short strangle")]
    #[test_case(call(dec!(110), -1), put(dec!(90), 1), "Strangle" ; "mixed strangle")]
    fn straddles_and_strangles(a: Leg, b: Leg, expected: &str) {
        assert_eq!(classify(&[a, b]), expected);
    }

    #[test]
    fn covered_call_requires_coverage() {
        let stock = Leg::equity("SPY", 100, dec!(-50000));
        assert_eq!(classify(&[stock.clone(), call(dec!(520), -1)]), "Covered Call");
        assert_eq!(classify(&[stock, call(dec!(520), -2)]), COMPLEX_STRATEGY);
    }

    #[test]
    fn short_stock_with_long_option_is_not_recognized() {
        let legs = [Leg::equity("SPY", -100, dec!(50000)), call(dec!(520), 1)];
        assert_eq!(classify(&legs), COMPLEX_STRATEGY);
    }

    #[test]
    fn collar_and_jade_lizard() {
        let collar = [
            Leg::equity("SPY", 100, dec!(-50000)),
            call(dec!(520), -1),
            put(dec!(480), 1),
        ];
        assert_eq!(classify(&collar), "Collar");

        let jade = [put(dec!(480), -1), call(dec!(520), -1), call(dec!(525), 1)];
        assert_eq!(classify(&jade), "Jade Lizard");
    }

    #[test]
    fn calendar_and_diagonal() {
        let long_far = |strike| Leg::option("SPY", OptionType::Call, strike, far(), 1, Decimal::ZERO);
        assert_eq!(classify(&[call(dec!(500), -1), long_far(dec!(500))]), "Calendar Spread");
        assert_eq!(classify(&[call(dec!(510), -1), long_far(dec!(500))]), "Diagonal Spread");
    }

    #[test]
    fn three_and_four_leg_structures() {
        let fly = [call(dec!(100), 1), call(dec!(105), -2), call(dec!(110), 1)];
        assert_eq!(classify(&fly), "Butterfly");

        let condor = [
            put(dec!(90), 1),
            put(dec!(95), -1),
            call(dec!(105), -1),
            call(dec!(110), 1),
        ];
        assert_eq!(classify(&condor), "Iron Condor");

        let four_calls = [
            call(dec!(100), 1),
            call(dec!(105), -1),
            call(dec!(110), -1),
            call(dec!(115), 1),
        ];
        assert_eq!(classify(&four_calls), "Iron Butterfly");

        let three_puts_one_call = [
            put(dec!(90), 1),
            put(dec!(95), -1),
            put(dec!(97), -1),
            call(dec!(110), 1),
        ];
        assert_eq!(classify(&three_puts_one_call), "Four-Leg Strategy");
    }

    #[test]
    fn fallbacks() {
        let five = [
            call(dec!(100), 1),
            call(dec!(105), 1),
            call(dec!(110), 1),
            call(dec!(115), 1),
            call(dec!(120), 1),
        ];
        assert_eq!(classify(&five), COMPLEX_STRATEGY);

        let two_stocks = [
            Leg::equity("SPY", 100, dec!(-50000)),
            Leg::equity("QQQ", 100, dec!(-40000)),
        ];
        assert_eq!(classify(&two_stocks), MIXED_STRATEGY);
        assert_eq!(classify(&[]), MIXED_STRATEGY);

        let result = StrategyClassifier::default().classify_detailed(&five);
        assert!(!result.is_recognized());
    }
}
