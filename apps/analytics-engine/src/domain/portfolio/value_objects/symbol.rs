//! Symbol value object for equity tickers and OCC option symbols.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::OptionType;
use crate::domain::portfolio::errors::SymbolError;

/// Length of the OCC suffix: `YYMMDD` + `C|P` + 8-digit strike.
const OCC_SUFFIX_LEN: usize = 15;

/// A trading symbol (ticker or OCC option symbol).
///
/// Examples:
/// - Equity: "AAPL", "MSFT"
/// - Option: "AAPL250117P00190000", or the padded broker form
///   "AAPL  250117P00190000"
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Symbol(String);

/// Contract terms recovered from an OCC option symbol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OccContract {
    /// Root (underlying) symbol.
    pub root: String,
    /// Expiration date.
    pub expiration: NaiveDate,
    /// Call or put.
    pub option_type: OptionType,
    /// Strike price.
    pub strike: Decimal,
}

impl Symbol {
    /// Create a new Symbol.
    ///
    /// The symbol is trimmed and normalized to uppercase. Inner padding
    /// (as used by some brokers for OCC roots) is preserved.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into().trim().to_uppercase())
    }

    /// Get the symbol string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Symbol with all whitespace removed, used for lookups.
    #[must_use]
    pub fn compact(&self) -> String {
        self.0.chars().filter(|c| !c.is_whitespace()).collect()
    }

    /// Check if this looks like an OCC option symbol.
    #[must_use]
    pub fn is_option(&self) -> bool {
        self.parse_occ().is_ok()
    }

    /// Parse the OCC option symbol format.
    ///
    /// OCC format: `{ROOT}{YY}{MM}{DD}{P/C}{PRICE}`
    /// - Root: 1-6 characters
    /// - Date: 6 digits (YYMMDD)
    /// - Type: P (put) or C (call)
    /// - Price: 8 digits (strike × 1000)
    ///
    /// # Errors
    ///
    /// Returns [`SymbolError`] when the symbol does not follow the format.
    pub fn parse_occ(&self) -> Result<OccContract, SymbolError> {
        let compact = self.compact();
        if compact.len() <= OCC_SUFFIX_LEN || !compact.is_ascii() {
            return Err(SymbolError::NotOcc {
                symbol: self.0.clone(),
            });
        }

        let split = compact.len() - OCC_SUFFIX_LEN;
        let (root, suffix) = compact.split_at(split);
        let (date_part, rest) = suffix.split_at(6);
        let (type_part, strike_part) = rest.split_at(1);

        if root.len() > 6 || !root.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(SymbolError::NotOcc {
                symbol: self.0.clone(),
            });
        }

        let option_type = match type_part {
            "C" => OptionType::Call,
            "P" => OptionType::Put,
            _ => {
                return Err(SymbolError::NotOcc {
                    symbol: self.0.clone(),
                });
            }
        };

        let expiration = NaiveDate::parse_from_str(date_part, "%y%m%d").map_err(|_| {
            SymbolError::InvalidExpiration {
                symbol: self.0.clone(),
            }
        })?;

        if !strike_part.chars().all(|c| c.is_ascii_digit()) {
            return Err(SymbolError::InvalidStrike {
                symbol: self.0.clone(),
            });
        }
        let strike_millis: i64 = strike_part.parse().map_err(|_| SymbolError::InvalidStrike {
            symbol: self.0.clone(),
        })?;

        Ok(OccContract {
            root: root.to_string(),
            expiration,
            option_type,
            strike: Decimal::new(strike_millis, 3).normalize(),
        })
    }

    /// Underlying root of an option symbol, or the symbol itself.
    #[must_use]
    pub fn underlying(&self) -> Self {
        self.parse_occ()
            .map_or_else(|_| self.clone(), |occ| Self(occ.root))
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for Symbol {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<String> for Symbol {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<&str> for Symbol {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symbol_new_normalizes_case() {
        let s = Symbol::new(" aapl ");
        assert_eq!(s.as_str(), "AAPL");
    }

    #[test]
    fn parse_compact_occ() {
        let occ = Symbol::new("AAPL250117P00190000").parse_occ().unwrap();
        assert_eq!(occ.root, "AAPL");
        assert_eq!(occ.option_type, OptionType::Put);
        assert_eq!(occ.strike, Decimal::new(190, 0));
        assert_eq!(occ.expiration, NaiveDate::from_ymd_opt(2025, 1, 17).unwrap());
    }

    #[test]
    fn parse_padded_occ_with_fractional_strike() {
        let occ = Symbol::new("SPY   250321C00452500").parse_occ().unwrap();
        assert_eq!(occ.root, "SPY");
        assert_eq!(occ.option_type, OptionType::Call);
        assert_eq!(occ.strike, Decimal::new(4525, 1));
    }

    #[test]
    fn equity_is_not_option() {
        assert!(!Symbol::new("AAPL").is_option());
        assert!(!Symbol::new("BRK.B").is_option());
        assert_eq!(Symbol::new("AAPL").underlying().as_str(), "AAPL");
    }

    #[test]
    fn invalid_date_is_rejected() {
        let err = Symbol::new("AAPL251340C00100000").parse_occ().unwrap_err();
        assert!(matches!(err, SymbolError::InvalidExpiration { .. }));
    }

    #[test]
    fn invalid_type_char_is_rejected() {
        let err = Symbol::new("AAPL250117X00100000").parse_occ().unwrap_err();
        assert!(matches!(err, SymbolError::NotOcc { .. }));
    }

    #[test]
    fn underlying_from_option() {
        let opt = Symbol::new("GOOGL250221C00150000");
        assert_eq!(opt.underlying().as_str(), "GOOGL");
    }
}
