//! Pricing Bounded Context
//!
//! Black-Scholes valuation and per-leg Greeks enrichment.

pub mod black_scholes;
pub mod greeks_engine;

pub use black_scholes::{
    BlackScholes, DEFAULT_MIN_DTE, DEFAULT_RISK_FREE_RATE, black_scholes_price, greeks,
    intrinsic_value, norm_cdf, norm_pdf,
};
pub use greeks_engine::{DEFAULT_IV, EnrichedLeg, GreeksEngine, PricingParams};
