//! Risk snapshot value object.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign};

use super::Greeks;

/// Net exposure of a set of legs, already scaled to position size.
///
/// Ephemeral: recomputed on every invocation, never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RiskSnapshot {
    /// Net position delta (shares equivalent).
    pub net_delta: f64,
    /// Net position gamma.
    pub net_gamma: f64,
    /// Net position theta (dollars per day).
    pub net_theta: f64,
    /// Net position vega (dollars per 1% IV).
    pub net_vega: f64,
    /// Net delta × underlying price.
    pub delta_dollars: f64,
    /// Capital at risk.
    pub max_risk: Decimal,
    /// Unrealized P&L of the open legs.
    pub unrealized_pnl: Decimal,
}

impl RiskSnapshot {
    /// Empty snapshot.
    pub const ZERO: Self = Self {
        net_delta: 0.0,
        net_gamma: 0.0,
        net_theta: 0.0,
        net_vega: 0.0,
        delta_dollars: 0.0,
        max_risk: Decimal::ZERO,
        unrealized_pnl: Decimal::ZERO,
    };

    /// Net greeks as a [`Greeks`] value.
    #[must_use]
    pub const fn greeks(&self) -> Greeks {
        Greeks::new(self.net_delta, self.net_gamma, self.net_theta, self.net_vega)
    }
}

impl Add for RiskSnapshot {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self {
            net_delta: self.net_delta + rhs.net_delta,
            net_gamma: self.net_gamma + rhs.net_gamma,
            net_theta: self.net_theta + rhs.net_theta,
            net_vega: self.net_vega + rhs.net_vega,
            delta_dollars: self.delta_dollars + rhs.delta_dollars,
            max_risk: self.max_risk + rhs.max_risk,
            unrealized_pnl: self.unrealized_pnl + rhs.unrealized_pnl,
        }
    }
}

impl AddAssign for RiskSnapshot {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl std::iter::Sum for RiskSnapshot {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}
