//! Portfolio Aggregator
//!
//! Nets position Greeks and dollar exposure per underlying and sums the
//! per-underlying snapshots into portfolio totals. Risk is never netted
//! across underlyings.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

use super::spread_matcher::SpreadRiskMatcher;
use crate::domain::portfolio::{Greeks, Leg, RiskSnapshot};
use crate::domain::pricing::EnrichedLeg;

/// Risk of every leg on one underlying.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnderlyingRisk {
    /// Underlying symbol.
    pub underlying: String,
    /// Reference price used for delta dollars and naked-call risk.
    pub underlying_price: Option<f64>,
    /// Number of legs aggregated.
    pub leg_count: usize,
    /// True when no usable quote exists for the underlying.
    pub quote_missing: bool,
    /// Net exposure.
    pub snapshot: RiskSnapshot,
}

/// Per-underlying risk plus portfolio totals.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PortfolioRisk {
    /// One entry per underlying, ordered by symbol.
    pub per_underlying: Vec<UnderlyingRisk>,
    /// Elementwise sum of `per_underlying`.
    pub totals: RiskSnapshot,
}

/// Stateless aggregation of enriched legs.
#[derive(Debug, Clone, Copy, Default)]
pub struct PortfolioAggregator;

impl PortfolioAggregator {
    /// Net exposure of a leg set sharing one underlying.
    #[must_use]
    pub fn snapshot(legs: &[EnrichedLeg], underlying_price: Option<f64>, as_of: NaiveDate) -> RiskSnapshot {
        let net = legs
            .iter()
            .map(EnrichedLeg::position_greeks)
            .fold(Greeks::ZERO, |acc, g| acc + g)
            .sanitized();
        let delta_dollars = underlying_price.map_or(0.0, |price| net.delta * price);
        let raw_legs: Vec<Leg> = legs.iter().map(|e| e.leg.clone()).collect();

        RiskSnapshot {
            net_delta: net.delta,
            net_gamma: net.gamma,
            net_theta: net.theta,
            net_vega: net.vega,
            delta_dollars: if delta_dollars.is_finite() { delta_dollars } else { 0.0 },
            max_risk: SpreadRiskMatcher::capital_at_risk(&raw_legs, underlying_price, as_of),
            unrealized_pnl: raw_legs.iter().map(Leg::unrealized_pnl).sum::<Decimal>(),
        }
    }

    /// Group legs by underlying and roll up to portfolio totals.
    #[must_use]
    pub fn aggregate(legs: &[EnrichedLeg], as_of: NaiveDate) -> PortfolioRisk {
        let mut by_underlying: BTreeMap<&str, Vec<EnrichedLeg>> = BTreeMap::new();
        for leg in legs {
            by_underlying
                .entry(leg.leg.underlying())
                .or_default()
                .push(leg.clone());
        }

        let per_underlying: Vec<UnderlyingRisk> = by_underlying
            .into_iter()
            .map(|(underlying, group)| {
                let underlying_price = group.iter().find_map(|l| l.underlying_price);
                if underlying_price.is_none() {
                    debug!(underlying, legs = group.len(), "Underlying has no quote");
                }
                UnderlyingRisk {
                    underlying: underlying.to_string(),
                    underlying_price,
                    leg_count: group.len(),
                    quote_missing: underlying_price.is_none(),
                    snapshot: Self::snapshot(&group, underlying_price, as_of),
                }
            })
            .collect();

        let totals = per_underlying.iter().map(|u| u.snapshot).sum();
        PortfolioRisk {
            per_underlying,
            totals,
        }
    }
}
