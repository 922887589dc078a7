//! Leg DTOs
//!
//! Loosely-typed leg records as they arrive from broker syncs and the
//! journal database. Conversion into [`Leg`] is the only place where leg
//! input can be rejected.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::portfolio::{
    EquityLeg, Leg, LegValidationError, OccContract, OptionLeg, OptionType, Symbol,
};

/// Wire record for one open leg. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegDto {
    /// Ticker or OCC option symbol.
    #[serde(default)]
    pub symbol: Option<String>,
    /// Underlying symbol.
    #[serde(default)]
    pub underlying: Option<String>,
    /// `EQUITY`, `OPTION`, or a broker string such as `Equity Option`.
    #[serde(default)]
    pub instrument_type: Option<String>,
    /// `CALL`/`PUT` (also `C`/`P`).
    #[serde(default)]
    pub option_type: Option<String>,
    /// Strike price.
    #[serde(default)]
    pub strike: Option<Decimal>,
    /// Expiration date.
    #[serde(default)]
    pub expiration: Option<NaiveDate>,
    /// Signed quantity; negative when short.
    #[serde(default)]
    pub signed_quantity: Option<i64>,
    /// Unsigned quantity, used with `quantity_direction` when
    /// `signed_quantity` is absent.
    #[serde(default)]
    pub quantity: Option<i64>,
    /// `Long` or `Short`.
    #[serde(default)]
    pub quantity_direction: Option<String>,
    /// Signed cost basis: positive for credit received.
    #[serde(default)]
    pub cost_basis: Option<Decimal>,
    /// Current market value.
    #[serde(default)]
    pub market_value: Option<Decimal>,
    /// Unrealized P&L.
    #[serde(default)]
    pub unrealized_pnl: Option<Decimal>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InstrumentKind {
    Equity,
    Option,
}

fn instrument_kind(raw: &str) -> Option<InstrumentKind> {
    let upper = raw.trim().to_ascii_uppercase();
    if upper.contains("OPTION") {
        Some(InstrumentKind::Option)
    } else if matches!(upper.as_str(), "EQUITY" | "STOCK" | "ETF") {
        Some(InstrumentKind::Equity)
    } else {
        None
    }
}

fn parse_option_type(raw: &str) -> Option<OptionType> {
    match raw.trim().to_ascii_uppercase().as_str() {
        "C" | "CALL" => Some(OptionType::Call),
        "P" | "PUT" => Some(OptionType::Put),
        _ => None,
    }
}

impl LegDto {
    /// Symbol for error reporting.
    #[must_use]
    pub fn display_symbol(&self) -> String {
        self.symbol
            .as_deref()
            .map(str::trim)
            .unwrap_or_default()
            .to_uppercase()
    }

    fn resolved_quantity(&self, symbol: &str) -> Result<i64, LegValidationError> {
        let quantity = match (self.signed_quantity, self.quantity) {
            (Some(signed), _) => signed,
            (None, Some(quantity)) => {
                let short = self
                    .quantity_direction
                    .as_deref()
                    .is_some_and(|d| d.trim().eq_ignore_ascii_case("short"));
                if short { -quantity.abs() } else { quantity }
            }
            (None, None) => {
                return Err(LegValidationError::MissingField {
                    symbol: symbol.to_string(),
                    field: "signed_quantity",
                });
            }
        };

        if quantity == 0 {
            return Err(LegValidationError::ZeroQuantity {
                symbol: symbol.to_string(),
            });
        }
        Ok(quantity)
    }
}

impl TryFrom<LegDto> for Leg {
    type Error = LegValidationError;

    fn try_from(dto: LegDto) -> Result<Self, Self::Error> {
        let symbol = Symbol::new(dto.symbol.clone().unwrap_or_default());
        if symbol.as_str().is_empty() {
            return Err(LegValidationError::MissingSymbol);
        }
        let name = symbol.as_str().to_string();

        let raw_type = dto.instrument_type.clone().unwrap_or_default();
        let kind = instrument_kind(&raw_type).ok_or_else(|| {
            LegValidationError::UnknownInstrumentType {
                symbol: name.clone(),
                value: raw_type.clone(),
            }
        })?;

        let signed_quantity = dto.resolved_quantity(&name)?;
        let cost_basis = dto.cost_basis.unwrap_or_default();
        let unrealized_pnl = dto.unrealized_pnl.unwrap_or_default();
        let underlying = dto
            .underlying
            .as_deref()
            .map(|u| u.trim().to_uppercase())
            .filter(|u| !u.is_empty());

        match kind {
            InstrumentKind::Equity => Ok(Self::Equity(EquityLeg {
                underlying: underlying.unwrap_or_else(|| name.clone()),
                symbol,
                signed_quantity,
                cost_basis,
                market_value: dto.market_value,
                unrealized_pnl,
            })),
            InstrumentKind::Option => {
                // Fields missing from the record are recovered from the OCC symbol.
                let occ: Option<OccContract> = symbol.parse_occ().ok();

                let option_type = match dto.option_type.as_deref() {
                    Some(raw) => parse_option_type(raw).ok_or_else(|| LegValidationError::InvalidField {
                        symbol: name.clone(),
                        field: "option_type",
                        message: format!("expected CALL or PUT, got '{raw}'"),
                    })?,
                    None => occ.as_ref().map(|c| c.option_type).ok_or_else(|| {
                        LegValidationError::MissingField {
                            symbol: name.clone(),
                            field: "option_type",
                        }
                    })?,
                };

                let strike = dto
                    .strike
                    .or_else(|| occ.as_ref().map(|c| c.strike))
                    .ok_or_else(|| LegValidationError::MissingField {
                        symbol: name.clone(),
                        field: "strike",
                    })?;
                if strike <= Decimal::ZERO {
                    return Err(LegValidationError::InvalidField {
                        symbol: name,
                        field: "strike",
                        message: format!("must be positive, got {strike}"),
                    });
                }

                let expiration = dto
                    .expiration
                    .or_else(|| occ.as_ref().map(|c| c.expiration))
                    .ok_or_else(|| LegValidationError::MissingField {
                        symbol: name.clone(),
                        field: "expiration",
                    })?;

                let underlying = underlying
                    .or_else(|| occ.map(|c| c.root))
                    .ok_or_else(|| LegValidationError::MissingField {
                        symbol: name.clone(),
                        field: "underlying",
                    })?;

                Ok(Self::Option(OptionLeg {
                    symbol,
                    underlying,
                    option_type,
                    strike,
                    expiration,
                    signed_quantity,
                    cost_basis,
                    market_value: dto.market_value,
                    unrealized_pnl,
                }))
            }
        }
    }
}

impl From<&Leg> for LegDto {
    fn from(leg: &Leg) -> Self {
        let option = leg.as_option();
        Self {
            symbol: Some(leg.symbol().as_str().to_string()),
            underlying: Some(leg.underlying().to_string()),
            instrument_type: Some(if leg.is_option() { "OPTION" } else { "EQUITY" }.to_string()),
            option_type: option.map(|o| o.option_type.to_string()),
            strike: option.map(|o| o.strike),
            expiration: option.map(|o| o.expiration),
            signed_quantity: Some(leg.signed_quantity()),
            quantity: None,
            quantity_direction: None,
            cost_basis: Some(leg.cost_basis()),
            market_value: leg.market_value(),
            unrealized_pnl: Some(leg.unrealized_pnl()),
        }
    }
}
