//! Projection Engine
//!
//! Derived views over enriched legs:
//! - Theta decay: day-by-day model theta as each option approaches expiry
//! - Scenario stress test: P&L of fixed percentage moves in the underlying

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::domain::portfolio::Leg;
use crate::domain::pricing::{EnrichedLeg, GreeksEngine};

/// Default projection horizon in days.
pub const DEFAULT_HORIZON_DAYS: u32 = 45;

/// Default underlying moves in percent.
pub const DEFAULT_SCENARIO_MOVES_PCT: [f64; 13] = [
    -10.0, -7.0, -5.0, -3.0, -2.0, -1.0, 0.0, 1.0, 2.0, 3.0, 5.0, 7.0, 10.0,
];

/// Projection settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionParams {
    /// Last day of the theta projection (inclusive).
    pub horizon_days: u32,
    /// Underlying moves in percent.
    pub scenario_moves_pct: Vec<f64>,
}

impl Default for ProjectionParams {
    fn default() -> Self {
        Self {
            horizon_days: DEFAULT_HORIZON_DAYS,
            scenario_moves_pct: DEFAULT_SCENARIO_MOVES_PCT.to_vec(),
        }
    }
}

/// Day on which one or more legs expire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpirationMarker {
    /// Projection day.
    pub day: u32,
    /// Underlyings with a leg expiring that day, sorted.
    pub underlyings: Vec<String>,
}

/// Theta decay series.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ThetaProjection {
    /// Days from today.
    pub days: Vec<u32>,
    /// Net position theta on each day.
    pub daily_theta: Vec<f64>,
    /// Running total of `daily_theta`.
    pub cumulative: Vec<f64>,
    /// Expiration days within the horizon.
    pub expirations: Vec<ExpirationMarker>,
}

/// P&L of one simulated underlying move.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScenarioPoint {
    /// Move in percent.
    pub move_pct: f64,
    /// Total P&L of the move.
    pub pnl: f64,
}

/// Computes theta and scenario projections.
#[derive(Debug, Clone, Default)]
pub struct ProjectionEngine {
    greeks: GreeksEngine,
    params: ProjectionParams,
}

#[allow(clippy::cast_precision_loss)]
fn position_units(leg: &Leg) -> f64 {
    (leg.signed_quantity() * leg.multiplier()) as f64
}

impl ProjectionEngine {
    /// Create an engine.
    #[must_use]
    pub const fn new(greeks: GreeksEngine, params: ProjectionParams) -> Self {
        Self { greeks, params }
    }

    /// Projection settings.
    #[must_use]
    pub const fn params(&self) -> &ProjectionParams {
        &self.params
    }

    /// Net theta for every day of the horizon.
    ///
    /// A leg stops contributing once its remaining DTE reaches zero.
    #[must_use]
    pub fn theta_projection(&self, legs: &[EnrichedLeg]) -> ThetaProjection {
        let horizon = self.params.horizon_days;
        let mut projection = ThetaProjection::default();
        let mut markers: BTreeMap<u32, BTreeSet<String>> = BTreeMap::new();
        let mut running = 0.0;

        for leg in legs {
            if let Some(day) = leg.dte.and_then(|dte| u32::try_from(dte).ok()) {
                if day <= horizon && leg.leg.is_option() {
                    markers
                        .entry(day)
                        .or_default()
                        .insert(leg.leg.underlying().to_string());
                }
            }
        }

        for day in 0..=horizon {
            let theta: f64 = legs
                .iter()
                .filter_map(|leg| self.theta_on_day(leg, day))
                .sum();
            running += theta;
            projection.days.push(day);
            projection.daily_theta.push(theta);
            projection.cumulative.push(running);
        }

        projection.expirations = markers
            .into_iter()
            .map(|(day, underlyings)| ExpirationMarker {
                day,
                underlyings: underlyings.into_iter().collect(),
            })
            .collect();
        projection
    }

    fn theta_on_day(&self, leg: &EnrichedLeg, day: u32) -> Option<f64> {
        let option = leg.leg.as_option()?;
        let remaining = leg.dte? - i64::from(day);
        if remaining <= 0 {
            return None;
        }
        let spot = leg.underlying_price?;
        #[allow(clippy::cast_precision_loss)]
        let greeks = self.greeks.model_greeks(option, spot, remaining as f64, leg.iv);
        Some(greeks.theta * position_units(&leg.leg))
    }

    /// P&L for each configured move, ordered from largest decline to largest advance.
    ///
    /// Options are repriced at the shifted spot with IV and DTE held fixed;
    /// equities move linearly. Legs without an underlying quote contribute zero.
    #[must_use]
    pub fn stress_test(&self, legs: &[EnrichedLeg]) -> Vec<ScenarioPoint> {
        let mut moves = self.params.scenario_moves_pct.clone();
        moves.retain(|m| m.is_finite());
        moves.sort_by(f64::total_cmp);
        moves.dedup();

        moves
            .into_iter()
            .map(|move_pct| ScenarioPoint {
                move_pct,
                pnl: legs.iter().map(|leg| self.leg_scenario_pnl(leg, move_pct)).sum(),
            })
            .collect()
    }

    fn leg_scenario_pnl(&self, leg: &EnrichedLeg, move_pct: f64) -> f64 {
        let Some(spot) = leg.underlying_price else {
            return 0.0;
        };
        let shifted = spot * (1.0 + move_pct / 100.0);
        let units = position_units(&leg.leg);

        match (&leg.leg, leg.dte) {
            (Leg::Option(option), Some(dte)) => {
                #[allow(clippy::cast_precision_loss)]
                let dte = dte as f64;
                let now = self.greeks.model_price(option, spot, dte, leg.iv);
                let then = self.greeks.model_price(option, shifted, dte, leg.iv);
                (then - now) * units
            }
            _ => (shifted - spot) * units,
        }
    }
}
