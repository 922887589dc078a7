//! Portfolio Bounded Context
//!
//! Immutable inputs and outputs of the analytics engine:
//! - Equity and option legs, grouped per underlying and account
//! - Quote snapshots with optional broker greeks
//! - Per-unit greeks and scaled risk snapshots

pub mod errors;
pub mod value_objects;

pub use errors::{LegValidationError, SymbolError};
pub use value_objects::{
    CONTRACT_MULTIPLIER, EquityLeg, Greeks, GreeksSource, Leg, OccContract, OptionLeg, OptionType,
    PositionGroup, Quote, QuoteBook, RiskSnapshot, Side, Symbol, consolidate,
};
