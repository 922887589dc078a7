//! Report DTOs

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::RejectedLegDto;
use crate::domain::analytics::{RollAnalysis, ScenarioPoint, ThetaProjection};
use crate::domain::portfolio::RiskSnapshot;
use crate::domain::risk::PortfolioRisk;
use crate::domain::strategy::StrategyMatch;

/// Analytics for one position group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupReport {
    /// Group identifier.
    pub group_id: String,
    /// Underlying symbol.
    pub underlying: String,
    /// Account number.
    pub account: String,
    /// Recognized strategy.
    pub strategy: StrategyMatch,
    /// Net exposure and capital at risk of the group's open legs.
    pub risk: RiskSnapshot,
    /// P&L banked by earlier closes and rolls.
    pub realized_pnl: Decimal,
    /// Roll analysis, for vertical spreads only.
    pub roll: Option<RollAnalysis>,
}

/// Output of one recompute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioReport {
    /// Valuation date.
    pub as_of: NaiveDate,
    /// Per-group analytics, in input order.
    pub groups: Vec<GroupReport>,
    /// Per-underlying exposure and portfolio totals.
    pub portfolio: PortfolioRisk,
    /// Theta decay over the projection horizon.
    pub theta: ThetaProjection,
    /// Stress test P&L, from largest decline to largest advance.
    pub scenarios: Vec<ScenarioPoint>,
    /// Legs dropped during validation.
    pub rejected_legs: Vec<RejectedLegDto>,
}

impl PortfolioReport {
    /// Report with no positions.
    #[must_use]
    pub fn empty(as_of: NaiveDate) -> Self {
        Self {
            as_of,
            groups: Vec::new(),
            portfolio: PortfolioRisk::default(),
            theta: ThetaProjection::default(),
            scenarios: Vec::new(),
            rejected_legs: Vec::new(),
        }
    }

    /// Groups with at least one roll badge.
    pub fn alerts(&self) -> impl Iterator<Item = &GroupReport> {
        self.groups
            .iter()
            .filter(|g| g.roll.as_ref().is_some_and(|r| !r.badges.is_empty()))
    }
}
