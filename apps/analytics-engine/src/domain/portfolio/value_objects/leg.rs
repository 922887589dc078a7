//! Leg Value Object
//!
//! A leg is one open equity or option holding. Legs are immutable snapshots
//! supplied per computation; the engine never mutates caller data.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::Symbol;

/// Shares per standard equity option contract.
pub const CONTRACT_MULTIPLIER: i64 = 100;

/// Option type (call or put).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OptionType {
    /// Call option (right to buy).
    #[serde(alias = "C", alias = "Call", alias = "call")]
    Call,
    /// Put option (right to sell).
    #[serde(alias = "P", alias = "Put", alias = "put")]
    Put,
}

impl fmt::Display for OptionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Call => write!(f, "CALL"),
            Self::Put => write!(f, "PUT"),
        }
    }
}

/// Position side derived from the sign of the quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    /// Long position (bought).
    Long,
    /// Short position (sold/written).
    Short,
}

impl Side {
    /// Side for a signed quantity. Zero is treated as long.
    #[must_use]
    pub const fn of(signed_quantity: i64) -> Self {
        if signed_quantity < 0 {
            Self::Short
        } else {
            Self::Long
        }
    }
}

/// An equity holding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EquityLeg {
    /// Ticker.
    pub symbol: Symbol,
    /// Underlying symbol (same as the ticker for equities).
    pub underlying: String,
    /// Shares; negative when short.
    pub signed_quantity: i64,
    /// Signed cost basis: positive when proceeds were received, negative when paid.
    pub cost_basis: Decimal,
    /// Current market value, when the caller has it.
    pub market_value: Option<Decimal>,
    /// Unrealized P&L last reported for the holding.
    pub unrealized_pnl: Decimal,
}

/// An option holding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionLeg {
    /// OCC option symbol.
    pub symbol: Symbol,
    /// Underlying symbol.
    pub underlying: String,
    /// Call or put.
    pub option_type: OptionType,
    /// Strike price.
    pub strike: Decimal,
    /// Expiration date.
    pub expiration: NaiveDate,
    /// Contracts; negative when short.
    pub signed_quantity: i64,
    /// Signed cost basis for all contracts: positive for credit received,
    /// negative for debit paid.
    pub cost_basis: Decimal,
    /// Current market value, when the caller has it.
    pub market_value: Option<Decimal>,
    /// Unrealized P&L last reported for the holding.
    pub unrealized_pnl: Decimal,
}

impl OptionLeg {
    /// Calendar days from `as_of` to expiration (negative once expired).
    #[must_use]
    pub fn dte(&self, as_of: NaiveDate) -> i64 {
        (self.expiration - as_of).num_days()
    }
}

/// One option or equity leg.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "instrument_type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Leg {
    /// Equity holding.
    Equity(EquityLeg),
    /// Option holding.
    Option(OptionLeg),
}

impl Leg {
    /// Build an equity leg with zero P&L and no market value.
    #[must_use]
    pub fn equity(symbol: &str, signed_quantity: i64, cost_basis: Decimal) -> Self {
        let symbol = Symbol::new(symbol);
        Self::Equity(EquityLeg {
            underlying: symbol.as_str().to_string(),
            symbol,
            signed_quantity,
            cost_basis,
            market_value: None,
            unrealized_pnl: Decimal::ZERO,
        })
    }

    /// Build an option leg with zero P&L and no market value.
    ///
    /// The OCC symbol is derived from the contract terms.
    #[must_use]
    pub fn option(
        underlying: &str,
        option_type: OptionType,
        strike: Decimal,
        expiration: NaiveDate,
        signed_quantity: i64,
        cost_basis: Decimal,
    ) -> Self {
        let type_char = match option_type {
            OptionType::Call => 'C',
            OptionType::Put => 'P',
        };
        let strike_millis = (strike * Decimal::ONE_THOUSAND)
            .trunc()
            .to_i64()
            .unwrap_or_default();
        let symbol = Symbol::new(format!(
            "{}{}{}{:08}",
            underlying.to_uppercase(),
            expiration.format("%y%m%d"),
            type_char,
            strike_millis
        ));
        Self::Option(OptionLeg {
            symbol,
            underlying: underlying.to_uppercase(),
            option_type,
            strike,
            expiration,
            signed_quantity,
            cost_basis,
            market_value: None,
            unrealized_pnl: Decimal::ZERO,
        })
    }

    /// Set the market value.
    #[must_use]
    pub fn with_market_value(mut self, value: Decimal) -> Self {
        match &mut self {
            Self::Equity(e) => e.market_value = Some(value),
            Self::Option(o) => o.market_value = Some(value),
        }
        self
    }

    /// Set the unrealized P&L.
    #[must_use]
    pub fn with_unrealized_pnl(mut self, pnl: Decimal) -> Self {
        match &mut self {
            Self::Equity(e) => e.unrealized_pnl = pnl,
            Self::Option(o) => o.unrealized_pnl = pnl,
        }
        self
    }

    /// Instrument symbol.
    #[must_use]
    pub const fn symbol(&self) -> &Symbol {
        match self {
            Self::Equity(e) => &e.symbol,
            Self::Option(o) => &o.symbol,
        }
    }

    /// Underlying symbol.
    #[must_use]
    pub fn underlying(&self) -> &str {
        match self {
            Self::Equity(e) => &e.underlying,
            Self::Option(o) => &o.underlying,
        }
    }

    /// Signed quantity (shares or contracts).
    #[must_use]
    pub const fn signed_quantity(&self) -> i64 {
        match self {
            Self::Equity(e) => e.signed_quantity,
            Self::Option(o) => o.signed_quantity,
        }
    }

    /// Unsigned quantity.
    #[must_use]
    pub const fn abs_quantity(&self) -> i64 {
        self.signed_quantity().abs()
    }

    /// Long or short.
    #[must_use]
    pub const fn side(&self) -> Side {
        Side::of(self.signed_quantity())
    }

    /// Signed cost basis.
    #[must_use]
    pub const fn cost_basis(&self) -> Decimal {
        match self {
            Self::Equity(e) => e.cost_basis,
            Self::Option(o) => o.cost_basis,
        }
    }

    /// Cost basis per share or contract.
    #[must_use]
    pub fn cost_per_unit(&self) -> Decimal {
        let qty = self.abs_quantity();
        if qty == 0 {
            Decimal::ZERO
        } else {
            self.cost_basis() / Decimal::from(qty)
        }
    }

    /// Market value, when known.
    #[must_use]
    pub const fn market_value(&self) -> Option<Decimal> {
        match self {
            Self::Equity(e) => e.market_value,
            Self::Option(o) => o.market_value,
        }
    }

    /// Unrealized P&L.
    #[must_use]
    pub const fn unrealized_pnl(&self) -> Decimal {
        match self {
            Self::Equity(e) => e.unrealized_pnl,
            Self::Option(o) => o.unrealized_pnl,
        }
    }

    /// Option details, if this is an option leg.
    #[must_use]
    pub const fn as_option(&self) -> Option<&OptionLeg> {
        match self {
            Self::Option(o) => Some(o),
            Self::Equity(_) => None,
        }
    }

    /// Check if this is an option leg.
    #[must_use]
    pub const fn is_option(&self) -> bool {
        matches!(self, Self::Option(_))
    }

    /// Check if this is an equity leg.
    #[must_use]
    pub const fn is_equity(&self) -> bool {
        matches!(self, Self::Equity(_))
    }

    /// Units per quantity: 100 shares per option contract, 1 per share.
    #[must_use]
    pub const fn multiplier(&self) -> i64 {
        match self {
            Self::Equity(_) => 1,
            Self::Option(_) => CONTRACT_MULTIPLIER,
        }
    }

    /// Fold another fill of the same instrument into this leg.
    ///
    /// Returns `false` (and leaves `self` untouched) when the symbols or
    /// instrument kinds differ.
    pub fn absorb(&mut self, other: &Self) -> bool {
        if self.symbol() != other.symbol() || self.is_option() != other.is_option() {
            return false;
        }
        let add_value = |a: Option<Decimal>, b: Option<Decimal>| match (a, b) {
            (Some(a), Some(b)) => Some(a + b),
            (Some(v), None) | (None, Some(v)) => Some(v),
            (None, None) => None,
        };
        match self {
            Self::Equity(e) => {
                e.signed_quantity += other.signed_quantity();
                e.cost_basis += other.cost_basis();
                e.market_value = add_value(e.market_value, other.market_value());
                e.unrealized_pnl += other.unrealized_pnl();
            }
            Self::Option(o) => {
                o.signed_quantity += other.signed_quantity();
                o.cost_basis += other.cost_basis();
                o.market_value = add_value(o.market_value, other.market_value());
                o.unrealized_pnl += other.unrealized_pnl();
            }
        }
        true
    }
}
