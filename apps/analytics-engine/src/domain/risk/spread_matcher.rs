//! Spread Risk Matcher
//!
//! Computes capital at risk by pairing short option legs with long legs of
//! the same expiration and right. Pairing is greedy nearest-strike per short
//! leg, not an optimal assignment; with three or more legs per side at one
//! expiration the pairing can differ from a minimum-cost matching.
//!
//! Contributions:
//! - Matched pair: premium paid for a net debit, width minus credit for a net credit
//! - Naked short put: strike × qty × 100
//! - Naked short call: spot (strike when unquoted) × qty × 100
//! - Unmatched long: current market value, else zero
//! - Equity: |qty| × price

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

use crate::domain::portfolio::{CONTRACT_MULTIPLIER, Leg, OptionLeg, OptionType, Symbol};

/// A matched short/long pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpreadPair {
    /// Short leg symbol.
    pub short: Symbol,
    /// Long leg symbol.
    pub long: Symbol,
    /// Call or put.
    pub option_type: OptionType,
    /// Matched contracts.
    pub quantity: i64,
    /// Absolute strike distance.
    pub width: Decimal,
    /// Signed premium of the matched contracts (positive = credit).
    pub net_cost: Decimal,
    /// Maximum loss of the pair.
    pub risk: Decimal,
}

impl SpreadPair {
    /// Whether the pair was opened for a net credit.
    #[must_use]
    pub fn is_credit(&self) -> bool {
        self.net_cost >= Decimal::ZERO
    }
}

/// How an unmatched option leg is risked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResidualKind {
    /// Short put with no protecting long.
    NakedPut,
    /// Short call with no protecting long.
    NakedCall,
    /// Long option with no short against it.
    Long,
}

/// Unmatched portion of an option leg.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResidualLeg {
    /// Leg symbol.
    pub symbol: Symbol,
    /// Residual classification.
    pub kind: ResidualKind,
    /// Unmatched contracts.
    pub quantity: i64,
    /// Risk contribution.
    pub risk: Decimal,
}

/// Full breakdown of a capital-at-risk computation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskBreakdown {
    /// Matched pairs.
    pub pairs: Vec<SpreadPair>,
    /// Unmatched option legs.
    pub residuals: Vec<ResidualLeg>,
    /// Equity contribution.
    pub equity_risk: Decimal,
    /// Sum of every contribution.
    pub total: Decimal,
}

/// Option leg with quantity still available for matching.
struct Slot<'a> {
    leg: &'a Leg,
    option: &'a OptionLeg,
    remaining: i64,
}

/// Stateless spread-aware risk calculator.
#[derive(Debug, Clone, Copy, Default)]
pub struct SpreadRiskMatcher;

impl SpreadRiskMatcher {
    /// Capital at risk for a leg set.
    #[must_use]
    pub fn capital_at_risk(legs: &[Leg], underlying_price: Option<f64>, as_of: NaiveDate) -> Decimal {
        Self::match_spreads(legs, underlying_price, as_of).total
    }

    /// Pair legs and compute every risk contribution.
    #[must_use]
    pub fn match_spreads(legs: &[Leg], underlying_price: Option<f64>, as_of: NaiveDate) -> RiskBreakdown {
        let spot = underlying_price
            .filter(|p| p.is_finite() && *p > 0.0)
            .and_then(Decimal::from_f64);

        let mut breakdown = RiskBreakdown::default();
        let mut buckets: BTreeMap<(i64, OptionType), Vec<Slot<'_>>> = BTreeMap::new();

        for leg in legs {
            match leg {
                Leg::Equity(_) => breakdown.equity_risk += equity_risk(leg, spot),
                Leg::Option(option) if option.signed_quantity != 0 => {
                    buckets
                        .entry((option.dte(as_of), option.option_type))
                        .or_default()
                        .push(Slot {
                            leg,
                            option,
                            remaining: option.signed_quantity.abs(),
                        });
                }
                Leg::Option(_) => {}
            }
        }

        for slots in buckets.into_values() {
            match_bucket(slots, spot, &mut breakdown);
        }

        breakdown.total = breakdown.equity_risk
            + breakdown.pairs.iter().map(|p| p.risk).sum::<Decimal>()
            + breakdown.residuals.iter().map(|r| r.risk).sum::<Decimal>();
        breakdown
    }
}

fn equity_risk(leg: &Leg, spot: Option<Decimal>) -> Decimal {
    let qty = Decimal::from(leg.abs_quantity());
    spot.map(|price| qty * price)
        .or_else(|| leg.market_value().map(|mv| mv.abs()))
        .unwrap_or(Decimal::ZERO)
}

/// `value × part / whole`, exact when `part == whole`.
fn prorate(value: Decimal, part: i64, whole: i64) -> Decimal {
    if whole == 0 {
        Decimal::ZERO
    } else {
        value * Decimal::from(part) / Decimal::from(whole)
    }
}

fn match_bucket(slots: Vec<Slot<'_>>, spot: Option<Decimal>, out: &mut RiskBreakdown) {
    let multiplier = Decimal::from(CONTRACT_MULTIPLIER);
    let (mut shorts, mut longs): (Vec<Slot<'_>>, Vec<Slot<'_>>) =
        slots.into_iter().partition(|s| s.option.signed_quantity < 0);
    // Strike order keeps the result independent of input order.
    shorts.sort_by(|a, b| a.option.strike.cmp(&b.option.strike));
    longs.sort_by(|a, b| a.option.strike.cmp(&b.option.strike));

    for short in &mut shorts {
        while short.remaining > 0 {
            let nearest = longs
                .iter_mut()
                .filter(|l| l.remaining > 0)
                .min_by_key(|l| (l.option.strike - short.option.strike).abs());
            let Some(long) = nearest else {
                break;
            };

            let quantity = short.remaining.min(long.remaining);
            let short_total = short.option.signed_quantity.abs();
            let long_total = long.option.signed_quantity.abs();
            let net_cost = prorate(short.leg.cost_basis(), quantity, short_total)
                + prorate(long.leg.cost_basis(), quantity, long_total);
            let width = (short.option.strike - long.option.strike).abs();
            let risk = if net_cost < Decimal::ZERO {
                net_cost.abs()
            } else {
                (width * Decimal::from(quantity) * multiplier - net_cost).max(Decimal::ZERO)
            };

            out.pairs.push(SpreadPair {
                short: short.option.symbol.clone(),
                long: long.option.symbol.clone(),
                option_type: short.option.option_type,
                quantity,
                width,
                net_cost,
                risk,
            });
            short.remaining -= quantity;
            long.remaining -= quantity;
        }
    }

    for short in shorts.iter().filter(|s| s.remaining > 0) {
        let qty = Decimal::from(short.remaining);
        let (kind, reference) = match short.option.option_type {
            OptionType::Put => (ResidualKind::NakedPut, short.option.strike),
            OptionType::Call => (ResidualKind::NakedCall, spot.unwrap_or(short.option.strike)),
        };
        debug!(
            symbol = %short.option.symbol,
            quantity = short.remaining,
            kind = ?kind,
            "Unmatched short leg risked as naked"
        );
        out.residuals.push(ResidualLeg {
            symbol: short.option.symbol.clone(),
            kind,
            quantity: short.remaining,
            risk: reference * qty * multiplier,
        });
    }

    for long in longs.iter().filter(|l| l.remaining > 0) {
        let total = long.option.signed_quantity.abs();
        let risk = long
            .leg
            .market_value()
            .map(|mv| prorate(mv.abs(), long.remaining, total))
            .unwrap_or(Decimal::ZERO);
        out.residuals.push(ResidualLeg {
            symbol: long.option.symbol.clone(),
            kind: ResidualKind::Long,
            quantity: long.remaining,
            risk,
        });
    }
}
