//! Property tests for pricing, classification, risk and projections.

// Allow unwrap in tests - tests should panic on unexpected errors
#![allow(clippy::unwrap_used, clippy::cast_possible_truncation)]

use std::sync::Arc;

use chrono::{Duration, NaiveDate};
use proptest::prelude::*;
use rust_decimal::Decimal;

use analytics_engine::domain::pricing::BlackScholes;
use analytics_engine::{
    GreeksEngine, Leg, OptionType, ProjectionEngine, Quote, QuoteBook, SpreadRiskMatcher,
    StrategyClassifier, StrategyTable,
};

fn as_of() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 1, 2).unwrap()
}

fn option_type() -> impl Strategy<Value = OptionType> {
    prop_oneof![Just(OptionType::Call), Just(OptionType::Put)]
}

fn option_leg() -> impl Strategy<Value = Leg> {
    (
        option_type(),
        80u32..=120,
        1i64..=60,
        prop_oneof![-3i64..=-1, 1i64..=3],
        -500i64..=500,
    )
        .prop_map(|(kind, strike, days, qty, cost)| {
            Leg::option(
                "XYZ",
                kind,
                Decimal::from(strike),
                as_of() + Duration::days(days),
                qty,
                Decimal::from(cost),
            )
        })
}

proptest! {
    #[test]
    fn greeks_vanish_without_time_or_volatility(
        s in 1.0f64..500.0,
        k in 1.0f64..500.0,
        dte in -30.0f64..=0.0,
        iv in 0.01f64..2.0,
        kind in option_type(),
    ) {
        let model = BlackScholes::default();
        prop_assert!(model.greeks(s, k, dte, iv, kind).is_zero());
        prop_assert!(model.greeks(s, k, 30.0, -iv, kind).is_zero());
        prop_assert!(model.greeks(s, k, 30.0, 0.0, kind).is_zero());
    }

    #[test]
    fn call_minus_put_delta_is_one(
        s in 10.0f64..500.0,
        k in 10.0f64..500.0,
        dte in 1.0f64..730.0,
        iv in 0.05f64..1.5,
    ) {
        let model = BlackScholes::default();
        let call = model.greeks(s, k, dte, iv, OptionType::Call);
        let put = model.greeks(s, k, dte, iv, OptionType::Put);
        prop_assert!((call.delta - put.delta - 1.0).abs() < 1e-9);
    }

    #[test]
    fn classification_ignores_leg_order(
        legs in prop::collection::vec(option_leg(), 1..5),
        seed in any::<u64>(),
    ) {
        let classifier = StrategyClassifier::new(Arc::new(StrategyTable::standard()));
        let mut shuffled = legs.clone();
        let len = shuffled.len();
        shuffled.rotate_left((seed % len as u64) as usize);

        let first = classifier.classify_detailed(&legs);
        prop_assert_eq!(&first, &classifier.classify_detailed(&legs));
        prop_assert_eq!(first, classifier.classify_detailed(&shuffled));
    }

    #[test]
    fn debit_spread_risks_premium_only(
        low in 50u32..150,
        width in 1u32..30,
        premium in 1i64..=1000,
        contracts in 1i64..=5,
        kind in option_type(),
    ) {
        let expiry = as_of() + Duration::days(30);
        let (long_strike, short_strike) = match kind {
            OptionType::Call => (low, low + width),
            OptionType::Put => (low + width, low),
        };
        let legs = vec![
            Leg::option("XYZ", kind, Decimal::from(long_strike), expiry, contracts, Decimal::from(-premium - 50)),
            Leg::option("XYZ", kind, Decimal::from(short_strike), expiry, -contracts, Decimal::from(50)),
        ];

        let risk = SpreadRiskMatcher::capital_at_risk(&legs, Some(100.0), as_of());
        prop_assert_eq!(risk, Decimal::from(premium));
    }

    #[test]
    fn credit_spread_risk_plus_credit_is_width(
        low in 50u32..150,
        width in 1u32..30,
        credit in 0i64..=3000,
        contracts in 1i64..=5,
        kind in option_type(),
    ) {
        let expiry = as_of() + Duration::days(30);
        let (short_strike, long_strike) = match kind {
            OptionType::Call => (low, low + width),
            OptionType::Put => (low + width, low),
        };
        let legs = vec![
            Leg::option("XYZ", kind, Decimal::from(short_strike), expiry, -contracts, Decimal::from(credit + 40)),
            Leg::option("XYZ", kind, Decimal::from(long_strike), expiry, contracts, Decimal::from(-40)),
        ];

        let risk = SpreadRiskMatcher::capital_at_risk(&legs, Some(100.0), as_of());
        let spread_value = Decimal::from(i64::from(width) * 100 * contracts);
        prop_assert_eq!(risk, (spread_value - Decimal::from(credit)).max(Decimal::ZERO));
    }

    #[test]
    fn long_call_scenarios_rise_with_the_underlying(
        spot in 20.0f64..400.0,
        strike_pct in 70u32..=130,
        days in 1i64..=120,
        iv_pct in 5.0f64..120.0,
        contracts in 1i64..=10,
    ) {
        let strike = Decimal::from(spot as i64 * i64::from(strike_pct) / 100 + 1);
        let leg = Leg::option(
            "XYZ",
            OptionType::Call,
            strike,
            as_of() + Duration::days(days),
            contracts,
            Decimal::from(-100 * contracts),
        );
        let quotes = QuoteBook::from_quotes([Quote::priced("XYZ", spot).with_iv(iv_pct)]);
        let enriched = GreeksEngine::default().enrich_all(&[leg], &quotes, as_of());

        let points = ProjectionEngine::default().stress_test(&enriched);
        prop_assert!(points.len() > 1);
        for pair in points.windows(2) {
            prop_assert!(pair[0].move_pct < pair[1].move_pct);
            prop_assert!(pair[1].pnl >= pair[0].pnl - 1e-6, "{:?}", pair);
        }
    }
}
