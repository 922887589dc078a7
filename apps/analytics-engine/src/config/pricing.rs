//! Pricing model configuration for greeks enrichment.

use serde::{Deserialize, Serialize};

use crate::domain::pricing::{DEFAULT_IV, DEFAULT_MIN_DTE, DEFAULT_RISK_FREE_RATE, PricingParams};

/// Pricing model configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricingConfig {
    /// Risk-free rate (annualized).
    #[serde(default = "default_risk_free_rate")]
    pub risk_free_rate: f64,
    /// IV used when no quote carries one, as a decimal fraction.
    #[serde(default = "default_iv")]
    pub default_iv: f64,
    /// Minimum DTE fed to the model, in days.
    #[serde(default = "default_min_dte_floor")]
    pub min_dte_floor: f64,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            risk_free_rate: default_risk_free_rate(),
            default_iv: default_iv(),
            min_dte_floor: default_min_dte_floor(),
        }
    }
}

impl PricingConfig {
    /// Engine parameters.
    #[must_use]
    pub const fn params(&self) -> PricingParams {
        PricingParams {
            risk_free_rate: self.risk_free_rate,
            default_iv: self.default_iv,
            min_dte_floor: self.min_dte_floor,
        }
    }
}

const fn default_risk_free_rate() -> f64 {
    DEFAULT_RISK_FREE_RATE
}

const fn default_iv() -> f64 {
    DEFAULT_IV
}

const fn default_min_dte_floor() -> f64 {
    DEFAULT_MIN_DTE
}
