//! Position group value object.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::Leg;

/// Legs sharing one underlying and account, as grouped by the external
/// chain builder. This is the unit the engine classifies and scores.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionGroup {
    /// Group identifier supplied by the chain builder.
    pub group_id: String,
    /// Account number.
    pub account: String,
    /// Underlying symbol.
    pub underlying: String,
    /// P&L already banked by partial closes and rolls.
    #[serde(default)]
    pub realized_pnl: Decimal,
    /// Strategy label assigned upstream, if any.
    #[serde(default)]
    pub strategy_label: Option<String>,
    /// Currently open legs.
    pub legs: Vec<Leg>,
}

impl PositionGroup {
    /// Create a group with no banked P&L.
    #[must_use]
    pub fn new(
        group_id: impl Into<String>,
        account: impl Into<String>,
        underlying: impl Into<String>,
        legs: Vec<Leg>,
    ) -> Self {
        Self {
            group_id: group_id.into(),
            account: account.into(),
            underlying: underlying.into().to_uppercase(),
            realized_pnl: Decimal::ZERO,
            strategy_label: None,
            legs,
        }
    }

    /// Set the realized P&L.
    #[must_use]
    pub const fn with_realized_pnl(mut self, realized_pnl: Decimal) -> Self {
        self.realized_pnl = realized_pnl;
        self
    }

    /// Legs with split fills of the same instrument merged and flat legs dropped.
    ///
    /// Order of first appearance is preserved.
    #[must_use]
    pub fn consolidated_legs(&self) -> Vec<Leg> {
        consolidate(&self.legs)
    }

    /// Sum of the open legs' unrealized P&L.
    #[must_use]
    pub fn unrealized_pnl(&self) -> Decimal {
        self.legs.iter().map(Leg::unrealized_pnl).sum()
    }

    /// Sum of the open legs' cost basis.
    #[must_use]
    pub fn cost_basis(&self) -> Decimal {
        self.legs.iter().map(Leg::cost_basis).sum()
    }
}

/// Merge legs with the same symbol and drop legs whose net quantity is zero.
#[must_use]
pub fn consolidate(legs: &[Leg]) -> Vec<Leg> {
    let mut merged: Vec<Leg> = Vec::with_capacity(legs.len());
    for leg in legs {
        if !merged.iter_mut().any(|existing| existing.absorb(leg)) {
            merged.push(leg.clone());
        }
    }
    merged.retain(|leg| leg.signed_quantity() != 0);
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::portfolio::value_objects::OptionType;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn expiry() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 21).unwrap()
    }

    #[test]
    fn consolidation_merges_and_drops_flat_legs() {
        let legs = vec![
            Leg::option("IBIT", OptionType::Call, dec!(47), expiry(), 1, dec!(-300)),
            Leg::option("IBIT", OptionType::Call, dec!(61), expiry(), -1, dec!(90)),
            Leg::option("IBIT", OptionType::Call, dec!(47), expiry(), 1, dec!(-310)),
            Leg::equity("IBIT", 100, dec!(-5000)),
            Leg::equity("IBIT", -100, dec!(5200)),
        ];
        let group = PositionGroup::new("g1", "5WT0001", "ibit", legs);
        let merged = group.consolidated_legs();

        assert_eq!(group.underlying, "IBIT");
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].signed_quantity(), 2);
        assert_eq!(merged[0].cost_basis(), dec!(-610));
        assert_eq!(merged[1].signed_quantity(), -1);
    }

    #[test]
    fn pnl_and_cost_totals() {
        let legs = vec![
            Leg::option("SPY", OptionType::Put, dec!(400), expiry(), -1, dec!(250))
                .with_unrealized_pnl(dec!(40)),
            Leg::option("SPY", OptionType::Put, dec!(395), expiry(), 1, dec!(-100))
                .with_unrealized_pnl(dec!(-10)),
        ];
        let group = PositionGroup::new("g2", "acct", "SPY", legs).with_realized_pnl(dec!(75));
        assert_eq!(group.unrealized_pnl(), dec!(30));
        assert_eq!(group.cost_basis(), dec!(150));
        assert_eq!(group.realized_pnl, dec!(75));
    }
}
