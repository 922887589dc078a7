//! Priority-ordered strategy rule table.

use chrono::{Duration, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

use super::definition::{CreditDebit, Direction, LegProfile, RatioRule, Relation, StrategyDefinition};
use crate::domain::portfolio::{Leg, OptionType, Side};

/// Errors from building a rule table.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StrategyTableError {
    /// The table has no definitions.
    #[error("Strategy table is empty")]
    Empty,

    /// Two definitions share a name.
    #[error("Duplicate strategy definition: {name}")]
    DuplicateDefinition {
        /// Strategy name.
        name: String,
    },

    /// The priority list names an undefined strategy.
    #[error("Priority list references unknown strategy: {name}")]
    UnknownPriority {
        /// Name in the priority list.
        name: String,
    },

    /// A ratio rule would be shadowed by an earlier rule of the same shape.
    #[error("Ratio rule '{ratio_rule}' must be ordered before '{shadowing_rule}'")]
    RatioShadowed {
        /// Rule with the ratio predicate.
        ratio_rule: String,
        /// Earlier rule that matches the same legs.
        shadowing_rule: String,
    },
}

/// Raw rule table as it appears in configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrategyTableSpec {
    /// Strategy definitions.
    #[serde(default)]
    pub definitions: Vec<StrategyDefinition>,
    /// Names in evaluation order; unlisted definitions follow in declaration order.
    #[serde(default)]
    pub priority: Vec<String>,
}

/// Immutable, validated rule table in evaluation order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StrategyTable {
    rules: Vec<StrategyDefinition>,
}

impl StrategyTable {
    /// Build a table from definitions and a priority list.
    ///
    /// # Errors
    ///
    /// Returns an error when the table is empty, a name is duplicated, the
    /// priority list names an unknown rule, or a ratio rule is shadowed.
    pub fn from_parts(
        definitions: Vec<StrategyDefinition>,
        priority: &[String],
    ) -> Result<Self, StrategyTableError> {
        if definitions.is_empty() {
            return Err(StrategyTableError::Empty);
        }

        let mut seen = HashSet::new();
        for def in &definitions {
            if !seen.insert(def.name.as_str()) {
                return Err(StrategyTableError::DuplicateDefinition {
                    name: def.name.clone(),
                });
            }
        }
        if let Some(unknown) = priority.iter().find(|name| !seen.contains(name.as_str())) {
            return Err(StrategyTableError::UnknownPriority {
                name: unknown.clone(),
            });
        }

        let mut slots: Vec<Option<StrategyDefinition>> = definitions.into_iter().map(Some).collect();
        let mut rules = Vec::with_capacity(slots.len());
        for name in priority {
            if let Some(def) = slots
                .iter_mut()
                .find(|slot| slot.as_ref().is_some_and(|d| &d.name == name))
                .and_then(Option::take)
            {
                rules.push(def);
            }
        }
        rules.extend(slots.into_iter().flatten());

        check_ratio_order(&rules)?;
        Ok(Self { rules })
    }

    /// Build a table from its configuration form.
    ///
    /// # Errors
    ///
    /// See [`StrategyTable::from_parts`].
    pub fn from_spec(spec: StrategyTableSpec) -> Result<Self, StrategyTableError> {
        Self::from_parts(spec.definitions, &spec.priority)
    }

    /// The built-in table.
    #[must_use]
    pub fn standard() -> Self {
        Self {
            rules: standard_definitions(),
        }
    }

    /// Rules in evaluation order.
    #[must_use]
    pub fn rules(&self) -> &[StrategyDefinition] {
        &self.rules
    }

    /// Number of rules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether the table is empty (never true for a built table).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Position of a rule by name.
    #[must_use]
    pub fn position(&self, name: &str) -> Option<usize> {
        self.rules.iter().position(|r| r.name == name)
    }
}

impl Default for StrategyTable {
    fn default() -> Self {
        Self::standard()
    }
}

/// A ratio rule is shadowed when an earlier rule that does not pin an
/// unequal ratio accepts a leg set the ratio rule itself would match.
///
/// Shadowing is checked against two-leg samples at the rule's ratio. Rules
/// no such sample satisfies fall back to a shape comparison where unset
/// fields on the earlier rule act as wildcards.
fn check_ratio_order(rules: &[StrategyDefinition]) -> Result<(), StrategyTableError> {
    for (idx, ratio_rule) in rules.iter().enumerate().filter(|(_, r)| r.is_ratio_rule()) {
        let samples: Vec<Vec<Leg>> = ratio_samples(ratio_rule)
            .into_iter()
            .filter(|legs| ratio_rule.matches(&LegProfile::new(legs)))
            .collect();

        let shadowing = rules[..idx].iter().find(|earlier| {
            if earlier.is_ratio_rule() || earlier.ratio == Some(RatioRule::Equal) {
                return false;
            }
            if samples.is_empty() {
                covers_shape(earlier, ratio_rule)
            } else {
                samples.iter().any(|legs| earlier.matches(&LegProfile::new(legs)))
            }
        });
        if let Some(earlier) = shadowing {
            return Err(StrategyTableError::RatioShadowed {
                ratio_rule: ratio_rule.name.clone(),
                shadowing_rule: earlier.name.clone(),
            });
        }
    }
    Ok(())
}

/// Two-leg option sets at the rule's long:short ratio, across both option
/// types, strike orderings and expiration layouts.
fn ratio_samples(rule: &StrategyDefinition) -> Vec<Vec<Leg>> {
    let Some(RatioRule::LongToShort([long, short])) = rule.ratio else {
        return Vec::new();
    };
    let (long_qty, short_qty) = (i64::from(long), -i64::from(short));
    let near = NaiveDate::default();
    let far = near + Duration::days(30);
    let (low, high) = (Decimal::from(100), Decimal::from(110));
    let types = [OptionType::Call, OptionType::Put];
    let leg = |kind, strike, expiry, qty| Leg::option("XYZ", kind, strike, expiry, qty, Decimal::ZERO);

    let mut samples = Vec::new();
    for long_type in types {
        for short_type in types {
            for (long_strike, short_strike) in [(low, high), (high, low), (low, low)] {
                for short_expiry in [near, far] {
                    samples.push(vec![
                        leg(long_type, long_strike, near, long_qty),
                        leg(short_type, short_strike, short_expiry, short_qty),
                    ]);
                }
            }
        }
    }
    samples
}

/// Whether every shape field the earlier rule sets agrees with the ratio rule.
fn covers_shape(earlier: &StrategyDefinition, ratio_rule: &StrategyDefinition) -> bool {
    fn agrees<T: PartialEq>(earlier: Option<&T>, later: Option<&T>) -> bool {
        earlier.is_none_or(|value| later == Some(value))
    }

    agrees(earlier.leg_count.as_ref(), ratio_rule.leg_count.as_ref())
        && agrees(earlier.equity_legs.as_ref(), ratio_rule.equity_legs.as_ref())
        && agrees(earlier.calls.as_ref(), ratio_rule.calls.as_ref())
        && agrees(earlier.puts.as_ref(), ratio_rule.puts.as_ref())
        && agrees(earlier.option_types.as_ref(), ratio_rule.option_types.as_ref())
        && agrees(earlier.strikes.as_ref(), ratio_rule.strikes.as_ref())
        && agrees(earlier.expirations.as_ref(), ratio_rule.expirations.as_ref())
}

// ============================================================================
// Built-in Definitions
// ============================================================================

fn rule(name: &str, direction: Direction, credit_debit: CreditDebit) -> StrategyDefinition {
    StrategyDefinition {
        direction: Some(direction),
        credit_debit: Some(credit_debit),
        ..StrategyDefinition::named(name)
    }
}

fn single_equity(name: &str, side: Side, direction: Direction, cd: CreditDebit) -> StrategyDefinition {
    StrategyDefinition {
        leg_count: Some(1),
        equity_legs: Some(1),
        equity_side: Some(side),
        ..rule(name, direction, cd)
    }
}

fn single_option(
    name: &str,
    calls: usize,
    side: Side,
    direction: Direction,
    cd: CreditDebit,
) -> StrategyDefinition {
    StrategyDefinition {
        leg_count: Some(1),
        calls: Some(calls),
        puts: Some(1 - calls),
        option_side: Some(side),
        ..rule(name, direction, cd)
    }
}

fn straddle_like(name: &str, strikes: Relation, side: Option<Side>, cd: CreditDebit) -> StrategyDefinition {
    StrategyDefinition {
        leg_count: Some(2),
        calls: Some(1),
        puts: Some(1),
        expirations: Some(Relation::Same),
        strikes: Some(strikes),
        option_side: side,
        ..rule(name, Direction::Neutral, cd)
    }
}

fn zebra(name: &str, calls: usize, direction: Direction) -> StrategyDefinition {
    StrategyDefinition {
        leg_count: Some(2),
        calls: Some(calls),
        puts: Some(2 - calls),
        expirations: Some(Relation::Same),
        strikes: Some(Relation::Different),
        ratio: Some(RatioRule::LongToShort([2, 1])),
        ..rule(name, direction, CreditDebit::Debit)
    }
}

fn vertical(
    name: &str,
    calls: bool,
    sides: [Side; 2],
    direction: Direction,
    cd: CreditDebit,
) -> StrategyDefinition {
    let pattern = Some(sides.to_vec());
    StrategyDefinition {
        leg_count: Some(2),
        calls: Some(if calls { 2 } else { 0 }),
        puts: Some(if calls { 0 } else { 2 }),
        expirations: Some(Relation::Same),
        strikes: Some(Relation::Different),
        ratio: Some(RatioRule::Equal),
        call_sides: if calls { pattern.clone() } else { None },
        put_sides: if calls { None } else { pattern },
        ..rule(name, direction, cd)
    }
}

fn time_spread(name: &str, strikes: Relation) -> StrategyDefinition {
    StrategyDefinition {
        leg_count: Some(2),
        equity_legs: Some(0),
        option_types: Some(Relation::Same),
        strikes: Some(strikes),
        expirations: Some(Relation::Different),
        ..rule(name, Direction::Neutral, CreditDebit::Debit)
    }
}

/// Built-in definitions in evaluation order.
///
/// Single legs come first, then equity combos, then two-leg structures with
/// ratio patterns ahead of verticals, then three- and four-leg structures.
#[must_use]
pub fn standard_definitions() -> Vec<StrategyDefinition> {
    use CreditDebit::{Credit, Debit, Mixed};
    use Direction::{Bearish, Bullish, Neutral};
    use Side::{Long, Short};

    vec![
        single_equity("Long Stock", Long, Bullish, Debit),
        single_equity("Short Stock", Short, Bearish, Credit),
        single_option("Long Call", 1, Long, Bullish, Debit),
        single_option("Short Call", 1, Short, Bearish, Credit),
        single_option("Long Put", 0, Long, Bearish, Debit),
        single_option("Short Put", 0, Short, Bullish, Credit),
        // Cash backing is not visible in the legs; reachable only when a
        // custom priority puts it ahead of Short Put.
        single_option("Cash Secured Put", 0, Short, Bullish, Credit),
        StrategyDefinition {
            leg_count: Some(2),
            equity_legs: Some(1),
            equity_side: Some(Long),
            calls: Some(1),
            call_sides: Some(vec![Short]),
            covered: Some(true),
            ..rule("Covered Call", Bullish, Credit)
        },
        StrategyDefinition {
            leg_count: Some(3),
            equity_legs: Some(1),
            equity_side: Some(Long),
            calls: Some(1),
            puts: Some(1),
            call_sides: Some(vec![Short]),
            put_sides: Some(vec![Long]),
            ..rule("Collar", Neutral, Mixed)
        },
        straddle_like("Long Straddle", Relation::Same, Some(Long), Debit),
        straddle_like("Short Straddle", Relation::Same, Some(Short), Credit),
        straddle_like("Straddle", Relation::Same, None, Mixed),
        straddle_like("Long Strangle", Relation::Different, Some(Long), Debit),
        straddle_like("Short Strangle", Relation::Different, Some(Short), Credit),
        straddle_like("Strangle", Relation::Different, None, Mixed),
        zebra("Bull ZEBRA", 2, Bullish),
        zebra("Bear ZEBRA", 0, Bearish),
        vertical("Bull Call Spread", true, [Long, Short], Bullish, Debit),
        vertical("Bear Call Spread", true, [Short, Long], Bearish, Credit),
        vertical("Bull Put Spread", false, [Long, Short], Bullish, Credit),
        vertical("Bear Put Spread", false, [Short, Long], Bearish, Debit),
        time_spread("Calendar Spread", Relation::Same),
        time_spread("Diagonal Spread", Relation::Different),
        StrategyDefinition {
            leg_count: Some(3),
            calls: Some(2),
            puts: Some(1),
            put_sides: Some(vec![Short]),
            call_sides: Some(vec![Short, Long]),
            ..rule("Jade Lizard", Bullish, Credit)
        },
        StrategyDefinition {
            leg_count: Some(3),
            equity_legs: Some(0),
            option_types: Some(Relation::Same),
            ..rule("Butterfly", Neutral, Mixed)
        },
        StrategyDefinition {
            leg_count: Some(4),
            calls: Some(2),
            puts: Some(2),
            ..rule("Iron Condor", Neutral, Credit)
        },
        StrategyDefinition {
            leg_count: Some(4),
            equity_legs: Some(0),
            option_types: Some(Relation::Same),
            ..rule("Iron Butterfly", Neutral, Credit)
        },
        StrategyDefinition {
            leg_count: Some(4),
            equity_legs: Some(0),
            ..StrategyDefinition::named("Four-Leg Strategy")
        },
    ]
}
