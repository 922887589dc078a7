//! Portfolio Value Objects

mod greeks;
mod leg;
mod position_group;
mod quote;
mod risk_snapshot;
mod symbol;

pub use greeks::{Greeks, GreeksSource};
pub use leg::{CONTRACT_MULTIPLIER, EquityLeg, Leg, OptionLeg, OptionType, Side};
pub use position_group::{PositionGroup, consolidate};
pub use quote::{Quote, QuoteBook};
pub use risk_snapshot::RiskSnapshot;
pub use symbol::{OccContract, Symbol};
