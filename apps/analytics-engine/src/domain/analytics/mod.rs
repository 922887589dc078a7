//! Analytics Bounded Context
//!
//! Derived views over enriched positions:
//! - Theta decay projection and price-scenario stress test
//! - Roll alerts for vertical spreads

pub mod projection;
pub mod roll;

pub use projection::{
    DEFAULT_HORIZON_DAYS, DEFAULT_SCENARIO_MOVES_PCT, ExpirationMarker, ProjectionEngine,
    ProjectionParams, ScenarioPoint, ThetaProjection,
};
pub use roll::{
    Badge, BadgeKind, RollAnalysis, RollAnalyzer, RollParams, Severity, Target, Urgency,
    default_targets,
};
