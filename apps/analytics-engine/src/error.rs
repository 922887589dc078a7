//! Error handling for the analytics engine.
//!
//! Computations never fail; errors exist only at the input and
//! configuration boundaries. `EngineError` collects them for callers that
//! drive the whole engine (the binary, host services).

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::ConfigError;
use crate::domain::portfolio::{LegValidationError, SymbolError};
use crate::domain::strategy::StrategyTableError;
use crate::observability::{LoggingError, MetricsError};

/// Stable error codes for logs and machine-readable output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Configuration could not be loaded or is invalid.
    InvalidConfig,
    /// Strategy rule table is invalid.
    InvalidStrategyTable,
    /// Snapshot document is malformed.
    InvalidSnapshot,
    /// A leg record was rejected.
    InvalidLeg,
    /// An option symbol could not be parsed.
    InvalidSymbol,
    /// Logging or metrics failed to start.
    ObservabilityInit,
    /// File I/O failed.
    Io,
}

impl ErrorCode {
    /// Code as a string.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidConfig => "INVALID_CONFIG",
            Self::InvalidStrategyTable => "INVALID_STRATEGY_TABLE",
            Self::InvalidSnapshot => "INVALID_SNAPSHOT",
            Self::InvalidLeg => "INVALID_LEG",
            Self::InvalidSymbol => "INVALID_SYMBOL",
            Self::ObservabilityInit => "OBSERVABILITY_INIT",
            Self::Io => "IO",
        }
    }
}

/// Application-level error.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Configuration error.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Strategy rule table error.
    #[error("Invalid strategy table: {0}")]
    StrategyTable(#[from] StrategyTableError),

    /// Snapshot JSON did not parse.
    #[error("Failed to parse snapshot '{path}': {source}")]
    Snapshot {
        /// Snapshot path.
        path: String,
        /// Parser error.
        source: serde_json::Error,
    },

    /// Leg validation error.
    #[error(transparent)]
    Leg(#[from] LegValidationError),

    /// Option symbol error.
    #[error(transparent)]
    Symbol(#[from] SymbolError),

    /// Logging setup error.
    #[error(transparent)]
    Logging(#[from] LoggingError),

    /// Metrics exporter error.
    #[error(transparent)]
    Metrics(#[from] MetricsError),

    /// File I/O error.
    #[error("I/O error on '{path}': {source}")]
    Io {
        /// File path.
        path: String,
        /// The underlying IO error.
        source: std::io::Error,
    },
}

impl EngineError {
    /// Error code for this error.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Config(_) => ErrorCode::InvalidConfig,
            Self::StrategyTable(_) => ErrorCode::InvalidStrategyTable,
            Self::Snapshot { .. } => ErrorCode::InvalidSnapshot,
            Self::Leg(_) => ErrorCode::InvalidLeg,
            Self::Symbol(_) => ErrorCode::InvalidSymbol,
            Self::Logging(_) | Self::Metrics(_) => ErrorCode::ObservabilityInit,
            Self::Io { .. } => ErrorCode::Io,
        }
    }

    /// Wrap a snapshot parse error.
    #[must_use]
    pub fn snapshot(path: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Snapshot {
            path: path.into(),
            source,
        }
    }

    /// Wrap an I/O error.
    #[must_use]
    pub fn io(path: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
