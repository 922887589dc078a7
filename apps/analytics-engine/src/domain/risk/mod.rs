//! Risk Bounded Context
//!
//! Spread-aware capital at risk and per-underlying exposure rollups.

pub mod aggregator;
pub mod spread_matcher;

pub use aggregator::{PortfolioAggregator, PortfolioRisk, UnderlyingRisk};
pub use spread_matcher::{
    ResidualKind, ResidualLeg, RiskBreakdown, SpreadPair, SpreadRiskMatcher,
};
