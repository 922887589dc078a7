//! Strategy Bounded Context
//!
//! Declarative, priority-ordered recognition of named options strategies.
//!
//! # Key Concepts
//!
//! - **Strategy Definition**: Structural predicates over a leg set
//! - **Rule Table**: Validated definitions in evaluation order
//! - **Classifier**: First matching rule wins, with generic fallbacks

pub mod classifier;
pub mod definition;
pub mod rule_table;

pub use classifier::{COMPLEX_STRATEGY, MIXED_STRATEGY, StrategyClassifier, StrategyMatch};
pub use definition::{
    CreditDebit, Direction, LegProfile, RatioRule, Relation, StrategyDefinition, VerticalSpread,
};
pub use rule_table::{StrategyTable, StrategyTableError, StrategyTableSpec, standard_definitions};
