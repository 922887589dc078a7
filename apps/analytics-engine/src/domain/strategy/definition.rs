//! Strategy definition records.
//!
//! A definition is a set of structural predicates over a consolidated leg
//! set. Unset predicates do not constrain the match.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::portfolio::{CONTRACT_MULTIPLIER, Leg, OptionLeg, OptionType, Side};

/// Market bias of a strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Profits from a rising underlying.
    Bullish,
    /// Profits from a falling underlying.
    Bearish,
    /// Profits from a range-bound underlying or volatility.
    Neutral,
}

/// Whether the strategy is opened for a net credit or debit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CreditDebit {
    /// Opened for a net credit.
    Credit,
    /// Opened for a net debit.
    Debit,
    /// Depends on strikes and premiums.
    Mixed,
}

/// Relation between the option legs' attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Relation {
    /// Every option leg shares the value.
    Same,
    /// At least two option legs differ.
    Different,
}

impl Relation {
    fn holds<T: PartialEq>(self, values: &[T]) -> bool {
        let all_same = values.windows(2).all(|w| w[0] == w[1]);
        match self {
            Self::Same => all_same,
            Self::Different => !all_same,
        }
    }
}

/// Quantity ratio between the option legs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RatioRule {
    /// Every option leg has the same absolute quantity.
    Equal,
    /// Total long contracts : total short contracts.
    LongToShort([u32; 2]),
}

impl RatioRule {
    fn holds(self, options: &[&OptionLeg]) -> bool {
        match self {
            Self::Equal => {
                let quantities: Vec<i64> = options.iter().map(|o| o.signed_quantity.abs()).collect();
                Relation::Same.holds(&quantities)
            }
            Self::LongToShort([long, short]) => {
                let (mut long_qty, mut short_qty) = (0_i64, 0_i64);
                for option in options {
                    if option.signed_quantity > 0 {
                        long_qty += option.signed_quantity;
                    } else {
                        short_qty -= option.signed_quantity;
                    }
                }
                long_qty > 0 && short_qty > 0 && long_qty * i64::from(short) == short_qty * i64::from(long)
            }
        }
    }
}

/// Declarative recognition rule for one named strategy.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StrategyDefinition {
    /// Display name, also the key used by the priority list.
    pub name: String,
    /// Market bias.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direction: Option<Direction>,
    /// Credit or debit.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credit_debit: Option<CreditDebit>,
    /// Total number of legs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub leg_count: Option<usize>,
    /// Number of equity legs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub equity_legs: Option<usize>,
    /// Side of every equity leg.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub equity_side: Option<Side>,
    /// Number of call legs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calls: Option<usize>,
    /// Number of put legs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub puts: Option<usize>,
    /// Side of every option leg.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub option_side: Option<Side>,
    /// Calls vs puts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub option_types: Option<Relation>,
    /// Option strikes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strikes: Option<Relation>,
    /// Option expirations.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expirations: Option<Relation>,
    /// Quantity ratio.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ratio: Option<RatioRule>,
    /// Sides of the call legs in ascending strike order.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub call_sides: Option<Vec<Side>>,
    /// Sides of the put legs in ascending strike order.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub put_sides: Option<Vec<Side>>,
    /// Long shares cover every short call (≥ 100 per contract).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub covered: Option<bool>,
}

/// A leg set split and ordered for predicate evaluation.
#[derive(Debug)]
pub struct LegProfile<'a> {
    legs: &'a [Leg],
    options: Vec<&'a OptionLeg>,
}

impl<'a> LegProfile<'a> {
    /// Profile consolidated legs. Options are ordered by strike, expiration,
    /// signed quantity and type so evaluation is independent of input order.
    #[must_use]
    pub fn new(legs: &'a [Leg]) -> Self {
        let mut options: Vec<&OptionLeg> = legs.iter().filter_map(Leg::as_option).collect();
        options.sort_by(|a, b| {
            a.strike
                .cmp(&b.strike)
                .then(a.expiration.cmp(&b.expiration))
                .then(a.signed_quantity.cmp(&b.signed_quantity))
                .then(a.option_type.cmp(&b.option_type))
        });
        Self { legs, options }
    }

    /// Whether any option leg is present.
    #[must_use]
    pub fn has_options(&self) -> bool {
        !self.options.is_empty()
    }

    fn equities(&self) -> impl Iterator<Item = &'a Leg> + '_ {
        self.legs.iter().filter(|leg| leg.is_equity())
    }

    fn of_type(&self, option_type: OptionType) -> impl Iterator<Item = &&'a OptionLeg> + '_ {
        self.options.iter().filter(move |o| o.option_type == option_type)
    }

    fn sides(&self, option_type: OptionType) -> Vec<Side> {
        self.of_type(option_type)
            .map(|o| Side::of(o.signed_quantity))
            .collect()
    }

    fn covered(&self) -> bool {
        let long_shares: i64 = self
            .equities()
            .map(Leg::signed_quantity)
            .filter(|qty| *qty > 0)
            .sum();
        let short_calls: i64 = self
            .of_type(OptionType::Call)
            .filter(|o| o.signed_quantity < 0)
            .map(|o| -o.signed_quantity)
            .sum();
        long_shares >= short_calls * CONTRACT_MULTIPLIER
    }
}

impl StrategyDefinition {
    /// Named definition with no predicates.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Whether every set predicate holds for the profile.
    #[must_use]
    pub fn matches(&self, profile: &LegProfile<'_>) -> bool {
        let options = &profile.options;
        let count_ok = |expected: Option<usize>, actual: usize| expected.is_none_or(|n| n == actual);

        count_ok(self.leg_count, profile.legs.len())
            && count_ok(self.equity_legs, profile.equities().count())
            && count_ok(self.calls, profile.of_type(OptionType::Call).count())
            && count_ok(self.puts, profile.of_type(OptionType::Put).count())
            && self
                .equity_side
                .is_none_or(|side| profile.equities().all(|leg| leg.side() == side))
            && self
                .option_side
                .is_none_or(|side| options.iter().all(|o| Side::of(o.signed_quantity) == side))
            && self.option_types.is_none_or(|rel| {
                let types: Vec<OptionType> = options.iter().map(|o| o.option_type).collect();
                rel.holds(&types)
            })
            && self.strikes.is_none_or(|rel| {
                let strikes: Vec<_> = options.iter().map(|o| o.strike).collect();
                rel.holds(&strikes)
            })
            && self.expirations.is_none_or(|rel| {
                let mut expirations: Vec<_> = options.iter().map(|o| o.expiration).collect();
                expirations.sort_unstable();
                rel.holds(&expirations)
            })
            && self.ratio.is_none_or(|ratio| ratio.holds(options))
            && self
                .call_sides
                .as_ref()
                .is_none_or(|pattern| *pattern == profile.sides(OptionType::Call))
            && self
                .put_sides
                .as_ref()
                .is_none_or(|pattern| *pattern == profile.sides(OptionType::Put))
            && self.covered.is_none_or(|covered| covered == profile.covered())
    }

    /// Whether this rule relies on an unequal long:short ratio.
    #[must_use]
    pub const fn is_ratio_rule(&self) -> bool {
        matches!(self.ratio, Some(RatioRule::LongToShort(_)))
    }
}

/// The four canonical two-leg vertical spreads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VerticalSpread {
    /// Short higher put, long lower put.
    BullPut,
    /// Short lower call, long higher call.
    BearCall,
    /// Long lower call, short higher call.
    BullCall,
    /// Long higher put, short lower put.
    BearPut,
}

impl VerticalSpread {
    /// Recognise a vertical from its strategy name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "Bull Put Spread" => Some(Self::BullPut),
            "Bear Call Spread" => Some(Self::BearCall),
            "Bull Call Spread" => Some(Self::BullCall),
            "Bear Put Spread" => Some(Self::BearPut),
            _ => None,
        }
    }

    /// Strategy name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::BullPut => "Bull Put Spread",
            Self::BearCall => "Bear Call Spread",
            Self::BullCall => "Bull Call Spread",
            Self::BearPut => "Bear Put Spread",
        }
    }

    /// Opened for a net credit.
    #[must_use]
    pub const fn is_credit(&self) -> bool {
        matches!(self, Self::BullPut | Self::BearCall)
    }
}

impl fmt::Display for VerticalSpread {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn expiry() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 20).unwrap()
    }

    #[test]
    fn relation_holds() {
        assert!(Relation::Same.holds(&[1, 1, 1]));
        assert!(Relation::Different.holds(&[1, 2, 1]));
        assert!(!Relation::Different.holds(&[5]));
    }

    #[test]
    fn sides_follow_ascending_strike() {
        let legs = vec![
            Leg::option("SPY", OptionType::Put, dec!(100), expiry(), -1, dec!(300)),
            Leg::option("SPY", OptionType::Put, dec!(95), expiry(), 1, dec!(-150)),
        ];
        let profile = LegProfile::new(&legs);
        assert_eq!(profile.sides(OptionType::Put), vec![Side::Long, Side::Short]);
        assert!(profile.sides(OptionType::Call).is_empty());
    }

    #[test]
    fn long_to_short_ratio() {
        let legs = vec![
            Leg::option("SPY", OptionType::Call, dec!(100), expiry(), 2, dec!(-1200)),
            Leg::option("SPY", OptionType::Call, dec!(110), expiry(), -1, dec!(150)),
        ];
        let profile = LegProfile::new(&legs);
        assert!(RatioRule::LongToShort([2, 1]).holds(&profile.options));
        assert!(!RatioRule::Equal.holds(&profile.options));
    }

    #[test]
    fn covered_requires_hundred_shares_per_contract() {
        let covered = vec![
            Leg::equity("AAPL", 200, dec!(-38000)),
            Leg::option("AAPL", OptionType::Call, dec!(200), expiry(), -2, dec!(500)),
        ];
        assert!(LegProfile::new(&covered).covered());

        let short_of_cover = vec![
            Leg::equity("AAPL", 150, dec!(-28500)),
            Leg::option("AAPL", OptionType::Call, dec!(200), expiry(), -2, dec!(500)),
        ];
        assert!(!LegProfile::new(&short_of_cover).covered());
    }

    #[test]
    fn definition_deserializes_from_yaml() {
        let yaml = r"
name: Bull ZEBRA
direction: bullish
credit_debit: debit
leg_count: 2
calls: 2
expirations: same
strikes: different
ratio:
  long_to_short: [2, 1]
";
        let def: StrategyDefinition = serde_yaml_bw::from_str(yaml).unwrap();
        assert_eq!(def.ratio, Some(RatioRule::LongToShort([2, 1])));
        assert!(def.is_ratio_rule());
        assert_eq!(def.direction, Some(Direction::Bullish));
    }

    #[test]
    fn vertical_names_round_trip() {
        for kind in [
            VerticalSpread::BullPut,
            VerticalSpread::BearCall,
            VerticalSpread::BullCall,
            VerticalSpread::BearPut,
        ] {
            assert_eq!(VerticalSpread::from_name(kind.name()), Some(kind));
        }
        assert!(VerticalSpread::BullPut.is_credit());
        assert!(!VerticalSpread::BullCall.is_credit());
        assert_eq!(VerticalSpread::from_name("Iron Condor"), None);
    }
}
