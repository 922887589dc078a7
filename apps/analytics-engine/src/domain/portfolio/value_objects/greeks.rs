//! Options Greeks value object.

use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign};

/// Sensitivities of one unit (share or contract) of an instrument.
///
/// Greeks are always per unit; scaling by quantity and the contract
/// multiplier happens once, at aggregation time.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Greeks {
    /// Delta - price change per $1 move in the underlying.
    pub delta: f64,
    /// Gamma - rate of change of delta.
    pub gamma: f64,
    /// Theta - time decay per calendar day.
    pub theta: f64,
    /// Vega - price change per 1% move in implied volatility.
    pub vega: f64,
}

impl Greeks {
    /// Zero Greeks.
    pub const ZERO: Self = Self {
        delta: 0.0,
        gamma: 0.0,
        theta: 0.0,
        vega: 0.0,
    };

    /// Greeks of one share of stock.
    pub const SHARE: Self = Self {
        delta: 1.0,
        gamma: 0.0,
        theta: 0.0,
        vega: 0.0,
    };

    /// Create new Greeks.
    #[must_use]
    pub const fn new(delta: f64, gamma: f64, theta: f64, vega: f64) -> Self {
        Self {
            delta,
            gamma,
            theta,
            vega,
        }
    }

    /// Scale Greeks by a factor (e.g., signed quantity × multiplier).
    #[must_use]
    pub fn scale(&self, factor: f64) -> Self {
        Self {
            delta: self.delta * factor,
            gamma: self.gamma * factor,
            theta: self.theta * factor,
            vega: self.vega * factor,
        }
    }

    /// Whether every field is exactly zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }

    /// Replace non-finite values with zero.
    #[must_use]
    pub fn sanitized(self) -> Self {
        let clean = |v: f64| if v.is_finite() { v } else { 0.0 };
        Self {
            delta: clean(self.delta),
            gamma: clean(self.gamma),
            theta: clean(self.theta),
            vega: clean(self.vega),
        }
    }
}

impl Add for Greeks {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self {
            delta: self.delta + rhs.delta,
            gamma: self.gamma + rhs.gamma,
            theta: self.theta + rhs.theta,
            vega: self.vega + rhs.vega,
        }
    }
}

impl AddAssign for Greeks {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

/// Where a leg's Greeks came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GreeksSource {
    /// At least one field reported by the broker quote.
    Broker,
    /// Black-Scholes model values.
    Model,
    /// Inputs were degenerate and no broker values exist; all zero.
    Unavailable,
}

impl GreeksSource {
    /// Metric label.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Broker => "broker",
            Self::Model => "bs",
            Self::Unavailable => "unavailable",
        }
    }
}
