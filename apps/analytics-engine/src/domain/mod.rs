//! Domain Layer
//!
//! The innermost layer: pure, synchronous analytics with no I/O. Every
//! operation is a deterministic transform of immutable inputs.
//!
//! # Bounded Contexts
//!
//! - [`portfolio`]: Legs, quotes, position groups, Greeks and risk snapshots
//! - [`pricing`]: Black-Scholes model and per-leg Greeks enrichment
//! - [`strategy`]: Rule-driven strategy classification
//! - [`risk`]: Spread-aware capital at risk and portfolio aggregation
//! - [`analytics`]: Theta/scenario projections and roll alerts

pub mod analytics;
pub mod portfolio;
pub mod pricing;
pub mod risk;
pub mod strategy;
