//! Portfolio input errors.
//!
//! These only occur at the input boundary, when loosely-typed leg records
//! are converted into [`Leg`](super::Leg) values. The analytics themselves
//! never fail.

use thiserror::Error;

/// Errors from parsing an OCC option symbol.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SymbolError {
    /// Symbol does not follow the OCC layout.
    #[error("Not an OCC option symbol: {symbol}")]
    NotOcc {
        /// Symbol as supplied.
        symbol: String,
    },

    /// Expiration digits are not a valid date.
    #[error("Invalid expiration in option symbol: {symbol}")]
    InvalidExpiration {
        /// Symbol as supplied.
        symbol: String,
    },

    /// Strike digits are not numeric.
    #[error("Invalid strike in option symbol: {symbol}")]
    InvalidStrike {
        /// Symbol as supplied.
        symbol: String,
    },
}

/// Errors raised while validating a leg record.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LegValidationError {
    /// Symbol is empty.
    #[error("Leg is missing a symbol")]
    MissingSymbol,

    /// Instrument type is missing or unrecognized.
    #[error("Unknown instrument type for {symbol}: {value}")]
    UnknownInstrumentType {
        /// Leg symbol.
        symbol: String,
        /// Instrument type as supplied.
        value: String,
    },

    /// A field required for the instrument type is absent.
    #[error("Leg {symbol} is missing required field '{field}'")]
    MissingField {
        /// Leg symbol.
        symbol: String,
        /// Field name.
        field: &'static str,
    },

    /// A field has an unusable value.
    #[error("Leg {symbol} has invalid {field}: {message}")]
    InvalidField {
        /// Leg symbol.
        symbol: String,
        /// Field name.
        field: &'static str,
        /// What is wrong with the value.
        message: String,
    },

    /// Quantity is zero (nothing open).
    #[error("Leg {symbol} has zero quantity")]
    ZeroQuantity {
        /// Leg symbol.
        symbol: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = LegValidationError::MissingField {
            symbol: "AAPL".to_string(),
            field: "strike",
        };
        assert_eq!(err.to_string(), "Leg AAPL is missing required field 'strike'");

        let err = SymbolError::NotOcc {
            symbol: "XYZ".to_string(),
        };
        assert_eq!(err.to_string(), "Not an OCC option symbol: XYZ");
    }
}
