//! Use Cases
//!
//! Application-specific orchestration of the domain engines.

mod recompute_portfolio;

pub use recompute_portfolio::RecomputePortfolioUseCase;
