// Allow unwrap/expect in tests - tests should panic on unexpected errors
// Allow test-specific patterns and pedantic lints in test code
#![cfg_attr(
    test,
    allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::float_cmp,
        clippy::too_many_lines,
        clippy::needless_pass_by_value,
        clippy::default_trait_access,
        clippy::items_after_statements
    )
)]

//! Analytics Engine - Rust Core Library
//!
//! Pure, synchronous risk and strategy analytics for an options trading
//! journal. Given open legs and a quote snapshot, the engine computes
//! position Greeks, recognizes strategies, bounds capital at risk,
//! aggregates exposure, projects theta decay and price scenarios, and
//! raises roll alerts for vertical spreads.
//!
//! # Architecture
//!
//! ## Layers (inside → outside)
//!
//! - **Domain**: Core analytics with no I/O
//!   - `portfolio`: Legs, symbols, quotes, position groups
//!   - `pricing`: Black-Scholes model and `GreeksEngine`
//!   - `strategy`: Rule table and `StrategyClassifier`
//!   - `risk`: `SpreadRiskMatcher` and `PortfolioAggregator`
//!   - `analytics`: `ProjectionEngine` and `RollAnalyzer`
//!
//! - **Application**: Orchestration
//!   - `dto`: `Snapshot` input, `PortfolioReport` output
//!   - `use_cases`: `RecomputePortfolioUseCase`
//!   - `services`: `RecomputeScheduler`
//!
//! - **Config / Observability**: YAML configuration, logging, metrics
//!
//! Every computation takes an explicit `as_of` date; the engine never
//! reads the clock.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]

// =============================================================================
// Clean Architecture Layers
// =============================================================================

/// Domain layer - Core analytics with no external dependencies.
pub mod domain;

/// Application layer - Use cases, services and DTOs.
pub mod application;

// =============================================================================
// Cross-cutting
// =============================================================================

/// Configuration loading and validation.
pub mod config;

/// Application-level errors.
pub mod error;

/// Logging and metrics.
pub mod observability;

// =============================================================================
// Re-exports
// =============================================================================

// Domain re-exports
pub use domain::analytics::{
    ProjectionEngine, RollAnalysis, RollAnalyzer, ScenarioPoint, ThetaProjection,
};
pub use domain::portfolio::{
    Greeks, GreeksSource, Leg, OptionType, PositionGroup, Quote, QuoteBook, RiskSnapshot, Side,
    Symbol,
};
pub use domain::pricing::{EnrichedLeg, GreeksEngine, black_scholes_price};
pub use domain::risk::{PortfolioAggregator, PortfolioRisk, SpreadRiskMatcher};
pub use domain::strategy::{StrategyClassifier, StrategyMatch, StrategyTable};

// Application re-exports
pub use application::dto::{GroupReport, LegDto, PortfolioReport, Snapshot};
pub use application::services::{RecomputeScheduler, RecomputeSchedulerConfig};
pub use application::use_cases::RecomputePortfolioUseCase;

// Cross-cutting re-exports
pub use config::{Config, ConfigError, load_config, load_config_or_default};
pub use error::{EngineError, ErrorCode};
