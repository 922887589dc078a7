//! Black-Scholes Pricing Model
//!
//! European option price and per-contract Greeks for the risk dashboard.
//! The cumulative normal uses the Abramowitz-Stegun 26.2.17 polynomial so
//! results are identical on every platform.
//!
//! Degenerate inputs never fail:
//! - Greeks are all zero when `dte ≤ 0`, `iv ≤ 0`, `S ≤ 0` or `K ≤ 0`
//! - Price collapses to intrinsic value under the same conditions

// Black-Scholes uses standard mathematical notation (s, k, t, r, sigma)
// Financial formulas use standard notation where mul_add() obscures meaning
#![allow(clippy::many_single_char_names)]
#![allow(clippy::suboptimal_flops)]

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

use crate::domain::portfolio::{Greeks, OptionType};

/// Default annual risk-free rate.
pub const DEFAULT_RISK_FREE_RATE: f64 = 0.045;

/// Days-to-expiration floor applied before converting to years.
pub const DEFAULT_MIN_DTE: f64 = 0.5;

/// Calendar days per year.
const DAYS_PER_YEAR: f64 = 365.0;

// ============================================================================
// Normal Distribution
// ============================================================================

// Abramowitz & Stegun 26.2.17 coefficients (|error| < 7.5e-8).
const AS_P: f64 = 0.231_641_9;
const AS_B1: f64 = 0.319_381_530;
const AS_B2: f64 = -0.356_563_782;
const AS_B3: f64 = 1.781_477_937;
const AS_B4: f64 = -1.821_255_978;
const AS_B5: f64 = 1.330_274_429;

/// Standard normal PDF.
#[must_use]
pub fn norm_pdf(x: f64) -> f64 {
    (-0.5 * x * x).exp() / (2.0 * PI).sqrt()
}

/// Standard normal CDF (Abramowitz-Stegun polynomial approximation).
#[must_use]
pub fn norm_cdf(x: f64) -> f64 {
    if x.is_nan() {
        return 0.5;
    }
    if x < 0.0 {
        return 1.0 - norm_cdf(-x);
    }
    let t = 1.0 / (1.0 + AS_P * x);
    let poly = t * (AS_B1 + t * (AS_B2 + t * (AS_B3 + t * (AS_B4 + t * AS_B5))));
    1.0 - norm_pdf(x) * poly
}

// ============================================================================
// Model
// ============================================================================

/// Black-Scholes model parameters shared by every evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BlackScholes {
    /// Annual risk-free rate (e.g., 0.045).
    pub risk_free_rate: f64,
    /// Minimum days to expiration used for positive DTE.
    pub min_dte: f64,
}

impl Default for BlackScholes {
    fn default() -> Self {
        Self {
            risk_free_rate: DEFAULT_RISK_FREE_RATE,
            min_dte: DEFAULT_MIN_DTE,
        }
    }
}

struct Terms {
    s: f64,
    k: f64,
    t: f64,
    sigma: f64,
    d1: f64,
    d2: f64,
    discount: f64,
}

impl BlackScholes {
    /// Create a model with the given rate and DTE floor.
    #[must_use]
    pub const fn new(risk_free_rate: f64, min_dte: f64) -> Self {
        Self {
            risk_free_rate,
            min_dte,
        }
    }

    /// Whether the inputs fall outside the model's domain.
    #[must_use]
    pub fn is_degenerate(s: f64, k: f64, dte: f64, iv: f64) -> bool {
        !(s.is_finite() && k.is_finite() && dte.is_finite() && iv.is_finite())
            || s <= 0.0
            || k <= 0.0
            || dte <= 0.0
            || iv <= 0.0
    }

    fn terms(&self, s: f64, k: f64, dte: f64, iv: f64) -> Option<Terms> {
        if Self::is_degenerate(s, k, dte, iv) {
            return None;
        }
        let t = dte.max(self.min_dte) / DAYS_PER_YEAR;
        let r = self.risk_free_rate;
        let sqrt_t = t.sqrt();
        let d1 = ((s / k).ln() + (r + 0.5 * iv * iv) * t) / (iv * sqrt_t);
        Some(Terms {
            s,
            k,
            t,
            sigma: iv,
            d1,
            d2: d1 - iv * sqrt_t,
            discount: (-r * t).exp(),
        })
    }

    /// Per-contract (unscaled) Greeks.
    ///
    /// `iv` is a decimal fraction. Theta is per calendar day and vega per
    /// 1% change in IV.
    #[must_use]
    pub fn greeks(&self, s: f64, k: f64, dte: f64, iv: f64, option_type: OptionType) -> Greeks {
        let Some(x) = self.terms(s, k, dte, iv) else {
            return Greeks::ZERO;
        };
        let sqrt_t = x.t.sqrt();
        let pdf_d1 = norm_pdf(x.d1);
        let gamma = pdf_d1 / (x.s * x.sigma * sqrt_t);
        let vega = x.s * pdf_d1 * sqrt_t / 100.0;
        let decay = -(x.s * pdf_d1 * x.sigma) / (2.0 * sqrt_t);
        let carry = self.risk_free_rate * x.k * x.discount;

        let (delta, theta) = match option_type {
            OptionType::Call => (norm_cdf(x.d1), decay - carry * norm_cdf(x.d2)),
            OptionType::Put => (norm_cdf(x.d1) - 1.0, decay + carry * norm_cdf(-x.d2)),
        };

        Greeks::new(delta, gamma, theta / DAYS_PER_YEAR, vega).sanitized()
    }

    /// Option price per share.
    ///
    /// Falls back to intrinsic value on degenerate inputs.
    #[must_use]
    pub fn price(&self, s: f64, k: f64, dte: f64, iv: f64, option_type: OptionType) -> f64 {
        let Some(x) = self.terms(s, k, dte, iv) else {
            return intrinsic_value(s, k, option_type);
        };
        let value = match option_type {
            OptionType::Call => x.s * norm_cdf(x.d1) - x.k * x.discount * norm_cdf(x.d2),
            OptionType::Put => x.k * x.discount * norm_cdf(-x.d2) - x.s * norm_cdf(-x.d1),
        };
        if value.is_finite() { value.max(0.0) } else { 0.0 }
    }
}

/// Intrinsic value per share; zero for non-positive or non-finite inputs.
#[must_use]
pub fn intrinsic_value(s: f64, k: f64, option_type: OptionType) -> f64 {
    if !(s.is_finite() && k.is_finite()) || s <= 0.0 || k <= 0.0 {
        return 0.0;
    }
    match option_type {
        OptionType::Call => (s - k).max(0.0),
        OptionType::Put => (k - s).max(0.0),
    }
}

/// Per-contract Greeks with the default DTE floor.
#[must_use]
pub fn greeks(
    underlying_price: f64,
    strike: f64,
    days_to_expiration: f64,
    iv: f64,
    option_type: OptionType,
    risk_free_rate: f64,
) -> Greeks {
    BlackScholes::new(risk_free_rate, DEFAULT_MIN_DTE).greeks(
        underlying_price,
        strike,
        days_to_expiration,
        iv,
        option_type,
    )
}

/// Option price per share with the default DTE floor.
#[must_use]
pub fn black_scholes_price(
    underlying_price: f64,
    strike: f64,
    days_to_expiration: f64,
    iv: f64,
    option_type: OptionType,
    risk_free_rate: f64,
) -> f64 {
    BlackScholes::new(risk_free_rate, DEFAULT_MIN_DTE).price(
        underlying_price,
        strike,
        days_to_expiration,
        iv,
        option_type,
    )
}
