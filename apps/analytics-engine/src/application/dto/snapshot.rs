//! Snapshot DTOs
//!
//! The JSON document the engine consumes: grouped legs plus a quote
//! snapshot, valued as of one date.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::LegDto;
use crate::domain::portfolio::{Leg, PositionGroup, QuoteBook};

/// Wire record for one position group.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionGroupDto {
    /// Group identifier.
    pub group_id: String,
    /// Account number.
    #[serde(default)]
    pub account: String,
    /// Underlying symbol. Derived from the first leg when empty.
    #[serde(default)]
    pub underlying: String,
    /// P&L banked by earlier closes and rolls.
    #[serde(default)]
    pub realized_pnl: Decimal,
    /// Strategy label assigned upstream.
    #[serde(default)]
    pub strategy_label: Option<String>,
    /// Open legs.
    #[serde(default)]
    pub legs: Vec<LegDto>,
}

/// Input snapshot for one recompute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Valuation date. All DTE values are measured from here.
    pub as_of: NaiveDate,
    /// Position groups.
    #[serde(default)]
    pub groups: Vec<PositionGroupDto>,
    /// Quotes keyed by symbol.
    #[serde(default)]
    pub quotes: QuoteBook,
}

/// A leg dropped during validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RejectedLegDto {
    /// Group the leg belonged to.
    pub group_id: String,
    /// Leg symbol as supplied.
    pub symbol: String,
    /// Why the leg was rejected.
    pub reason: String,
}

/// Groups that passed validation plus the legs that did not.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidatedSnapshot {
    /// Groups with only valid legs. Groups left without legs are dropped.
    pub groups: Vec<PositionGroup>,
    /// Rejected legs in input order.
    pub rejected: Vec<RejectedLegDto>,
}

impl Snapshot {
    /// Create a snapshot with no groups or quotes.
    #[must_use]
    pub fn empty(as_of: NaiveDate) -> Self {
        Self {
            as_of,
            groups: Vec::new(),
            quotes: QuoteBook::new(),
        }
    }

    /// Parse a snapshot from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Convert every group, dropping invalid legs.
    ///
    /// Rejections are logged and returned; they never fail the snapshot.
    #[must_use]
    pub fn validate(&self) -> ValidatedSnapshot {
        let mut validated = ValidatedSnapshot::default();

        for group in &self.groups {
            let mut legs = Vec::with_capacity(group.legs.len());
            for dto in &group.legs {
                let symbol = dto.display_symbol();
                match Leg::try_from(dto.clone()) {
                    Ok(leg) => legs.push(leg),
                    Err(e) => {
                        warn!(
                            group_id = %group.group_id,
                            symbol = %symbol,
                            error = %e,
                            "Rejected leg"
                        );
                        validated.rejected.push(RejectedLegDto {
                            group_id: group.group_id.clone(),
                            symbol,
                            reason: e.to_string(),
                        });
                    }
                }
            }

            if legs.is_empty() {
                continue;
            }

            let underlying = if group.underlying.trim().is_empty() {
                legs[0].underlying().to_string()
            } else {
                group.underlying.trim().to_string()
            };
            let mut position_group =
                PositionGroup::new(group.group_id.clone(), group.account.clone(), underlying, legs)
                    .with_realized_pnl(group.realized_pnl);
            position_group.strategy_label.clone_from(&group.strategy_label);
            validated.groups.push(position_group);
        }

        validated
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    const SNAPSHOT: &str = r#"{
        "as_of": "2025-01-02",
        "groups": [
            {
                "group_id": "g1",
                "account": "5WT00001",
                "underlying": "spy",
                "realized_pnl": "120.00",
                "legs": [
                    {"symbol": "SPY   250117P00450000", "instrument_type": "Equity Option",
                     "signed_quantity": -1, "cost_basis": 300},
                    {"symbol": "SPY   250117P00445000", "instrument_type": "Equity Option",
                     "signed_quantity": 1, "cost_basis": -180},
                    {"symbol": "SPY   250117P00440000", "instrument_type": "Equity Option",
                     "signed_quantity": 0}
                ]
            },
            {
                "group_id": "g2",
                "legs": [
                    {"symbol": "XYZ", "instrument_type": "Bond", "signed_quantity": 5}
                ]
            }
        ],
        "quotes": {
            "spy": {"symbol": "SPY", "price": 455.0}
        }
    }"#;

    #[test]
    fn parses_and_validates() {
        let snapshot = Snapshot::from_json(SNAPSHOT).unwrap();
        assert_eq!(snapshot.as_of, NaiveDate::from_ymd_opt(2025, 1, 2).unwrap());
        assert_eq!(snapshot.quotes.price("SPY"), Some(455.0));

        let validated = snapshot.validate();
        assert_eq!(validated.groups.len(), 1);
        let group = &validated.groups[0];
        assert_eq!(group.underlying, "SPY");
        assert_eq!(group.realized_pnl, dec!(120));
        assert_eq!(group.legs.len(), 2);

        assert_eq!(validated.rejected.len(), 2);
        assert_eq!(validated.rejected[0].group_id, "g1");
        assert_eq!(validated.rejected[0].symbol, "SPY   250117P00440000");
        assert_eq!(validated.rejected[1].group_id, "g2");
    }

    #[test]
    fn missing_underlying_comes_from_first_leg() {
        let snapshot = Snapshot {
            as_of: NaiveDate::from_ymd_opt(2025, 1, 2).unwrap(),
            groups: vec![PositionGroupDto {
                group_id: "g".to_string(),
                legs: vec![LegDto {
                    symbol: Some("QQQ   250221C00520000".to_string()),
                    instrument_type: Some("OPTION".to_string()),
                    signed_quantity: Some(1),
                    ..LegDto::default()
                }],
                ..PositionGroupDto::default()
            }],
            quotes: QuoteBook::new(),
        };
        assert_eq!(snapshot.validate().groups[0].underlying, "QQQ");
    }
}
