//! Greeks Engine
//!
//! Enriches legs with per-unit Greeks. Broker greeks quoted on the option's
//! own symbol win field by field over the model; the model fills the rest.

use chrono::NaiveDate;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::black_scholes::{BlackScholes, DEFAULT_MIN_DTE, DEFAULT_RISK_FREE_RATE};
use crate::domain::portfolio::{Greeks, GreeksSource, Leg, OptionLeg, Quote, QuoteBook};

/// IV used when neither the option nor its underlying quotes one.
pub const DEFAULT_IV: f64 = 0.30;

/// Pricing inputs shared by every leg of a computation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricingParams {
    /// Annual risk-free rate.
    pub risk_free_rate: f64,
    /// IV fallback as a decimal fraction.
    pub default_iv: f64,
    /// DTE floor applied before converting to years.
    pub min_dte_floor: f64,
}

impl Default for PricingParams {
    fn default() -> Self {
        Self {
            risk_free_rate: DEFAULT_RISK_FREE_RATE,
            default_iv: DEFAULT_IV,
            min_dte_floor: DEFAULT_MIN_DTE,
        }
    }
}

/// A leg together with the market context used to price it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedLeg {
    /// The source leg.
    pub leg: Leg,
    /// Calendar days to expiration (options only).
    pub dte: Option<i64>,
    /// Reference price of the underlying, when quoted.
    pub underlying_price: Option<f64>,
    /// IV used for the model, as a decimal fraction (zero for equities).
    pub iv: f64,
    /// Per-unit Greeks.
    pub greeks: Greeks,
    /// Provenance of `greeks`.
    pub source: GreeksSource,
}

impl EnrichedLeg {
    /// Greeks scaled by signed quantity and multiplier.
    #[must_use]
    pub fn position_greeks(&self) -> Greeks {
        #[allow(clippy::cast_precision_loss)]
        let factor = (self.leg.signed_quantity() * self.leg.multiplier()) as f64;
        self.greeks.scale(factor)
    }

    /// Strike as `f64` for option legs.
    #[must_use]
    pub fn strike(&self) -> Option<f64> {
        self.leg.as_option().and_then(|o| o.strike.to_f64())
    }
}

/// Computes Greeks for legs against a quote snapshot.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GreeksEngine {
    params: PricingParams,
}

impl GreeksEngine {
    /// Create an engine.
    #[must_use]
    pub const fn new(params: PricingParams) -> Self {
        Self { params }
    }

    /// Pricing parameters.
    #[must_use]
    pub const fn params(&self) -> &PricingParams {
        &self.params
    }

    /// Underlying Black-Scholes model.
    #[must_use]
    pub const fn model(&self) -> BlackScholes {
        BlackScholes::new(self.params.risk_free_rate, self.params.min_dte_floor)
    }

    /// IV for an option: its own quote, then the underlying's, then the default.
    #[must_use]
    pub fn resolve_iv(&self, option: &OptionLeg, quotes: &QuoteBook) -> f64 {
        quotes
            .get(option.symbol.as_str())
            .and_then(Quote::iv_fraction)
            .or_else(|| quotes.get(&option.underlying).and_then(Quote::iv_fraction))
            .unwrap_or(self.params.default_iv)
    }

    /// Model Greeks for an option at an explicit spot, DTE and IV.
    #[must_use]
    pub fn model_greeks(&self, option: &OptionLeg, spot: f64, dte: f64, iv: f64) -> Greeks {
        let strike = option.strike.to_f64().unwrap_or_default();
        self.model().greeks(spot, strike, dte, iv, option.option_type)
    }

    /// Model price per share for an option at an explicit spot, DTE and IV.
    #[must_use]
    pub fn model_price(&self, option: &OptionLeg, spot: f64, dte: f64, iv: f64) -> f64 {
        let strike = option.strike.to_f64().unwrap_or_default();
        self.model().price(spot, strike, dte, iv, option.option_type)
    }

    /// Enrich a single leg.
    #[must_use]
    pub fn enrich(&self, leg: &Leg, quotes: &QuoteBook, as_of: NaiveDate) -> EnrichedLeg {
        let underlying_price = quotes.price(leg.underlying());

        let Some(option) = leg.as_option() else {
            return EnrichedLeg {
                leg: leg.clone(),
                dte: None,
                underlying_price,
                iv: 0.0,
                greeks: Greeks::SHARE,
                source: GreeksSource::Model,
            };
        };

        let dte = option.dte(as_of);
        let iv = self.resolve_iv(option, quotes);
        #[allow(clippy::cast_precision_loss)]
        let dte_days = dte as f64;
        let spot = underlying_price.unwrap_or_default();
        let strike = option.strike.to_f64().unwrap_or_default();

        if underlying_price.is_none() {
            debug!(
                symbol = %option.symbol,
                underlying = %option.underlying,
                "No underlying quote, model greeks degrade to zero"
            );
        }

        let model = self.model().greeks(spot, strike, dte_days, iv, option.option_type);
        let degenerate = BlackScholes::is_degenerate(spot, strike, dte_days, iv);
        let (greeks, source) = match quotes.get(option.symbol.as_str()) {
            Some(quote) if broker_fields(quote) > 0 => (overlay(model, quote), GreeksSource::Broker),
            _ if degenerate => (Greeks::ZERO, GreeksSource::Unavailable),
            _ => (model, GreeksSource::Model),
        };

        EnrichedLeg {
            leg: leg.clone(),
            dte: Some(dte),
            underlying_price,
            iv,
            greeks,
            source,
        }
    }

    /// Enrich every leg, preserving order.
    #[must_use]
    pub fn enrich_all(&self, legs: &[Leg], quotes: &QuoteBook, as_of: NaiveDate) -> Vec<EnrichedLeg> {
        legs.iter().map(|leg| self.enrich(leg, quotes, as_of)).collect()
    }
}

fn finite(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite())
}

fn broker_fields(quote: &Quote) -> usize {
    [quote.delta, quote.gamma, quote.theta, quote.vega]
        .into_iter()
        .filter_map(finite)
        .count()
}

/// Replace each model field the broker quotes.
fn overlay(model: Greeks, quote: &Quote) -> Greeks {
    Greeks {
        delta: finite(quote.delta).unwrap_or(model.delta),
        gamma: finite(quote.gamma).unwrap_or(model.gamma),
        theta: finite(quote.theta).unwrap_or(model.theta),
        vega: finite(quote.vega).unwrap_or(model.vega),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::portfolio::OptionType;
    use rust_decimal_macros::dec;

    fn as_of() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 2).unwrap()
    }

    fn call_leg() -> Leg {
        let expiry = as_of() + chrono::Days::new(30);
        Leg::option("SPY", OptionType::Call, dec!(100), expiry, 2, dec!(-700))
    }

    fn option_symbol(leg: &Leg) -> String {
        leg.symbol().as_str().to_string()
    }

    #[test]
    fn test_equity_leg_has_unit_delta() {
        let engine = GreeksEngine::default();
        let quotes = QuoteBook::from_quotes([Quote::priced("AAPL", 190.0)]);
        let enriched = engine.enrich(&Leg::equity("AAPL", 50, dec!(-9000)), &quotes, as_of());
        assert_eq!(enriched.greeks, Greeks::SHARE);
        assert_eq!(enriched.position_greeks().delta, 50.0);
        assert_eq!(enriched.underlying_price, Some(190.0));
        assert_eq!(enriched.dte, None);
    }

    #[test]
    fn test_model_greeks_when_no_broker_values() {
        let engine = GreeksEngine::default();
        let quotes = QuoteBook::from_quotes([Quote::priced("SPY", 100.0)]);
        let enriched = engine.enrich(&call_leg(), &quotes, as_of());
        assert_eq!(enriched.source, GreeksSource::Model);
        assert_eq!(enriched.dte, Some(30));
        assert!((enriched.greeks.delta - 0.534).abs() < 0.005);
        assert!((enriched.iv - DEFAULT_IV).abs() < 1e-12);
        // 2 contracts × 100 shares
        assert!((enriched.position_greeks().delta - 106.8).abs() < 1.0);
    }

    #[test]
    fn test_broker_greeks_override_per_field() {
        let engine = GreeksEngine::default();
        let leg = call_leg();
        let broker = Quote {
            symbol: option_symbol(&leg),
            delta: Some(0.61),
            theta: Some(-0.08),
            ..Quote::default()
        };
        let quotes = QuoteBook::from_quotes([Quote::priced("SPY", 100.0), broker]);
        let enriched = engine.enrich(&leg, &quotes, as_of());

        assert_eq!(enriched.source, GreeksSource::Broker);
        assert_eq!(enriched.greeks.delta, 0.61);
        assert_eq!(enriched.greeks.theta, -0.08);
        // gamma and vega still come from the model
        assert!(enriched.greeks.gamma > 0.0);
        assert!(enriched.greeks.vega > 0.0);
    }

    #[test]
    fn test_iv_resolution_order() {
        let engine = GreeksEngine::default();
        let leg = call_leg();
        let option = leg.as_option().unwrap();

        let underlying_only = QuoteBook::from_quotes([Quote::priced("SPY", 100.0).with_iv(40.0)]);
        assert!((engine.resolve_iv(option, &underlying_only) - 0.40).abs() < 1e-12);

        let both = QuoteBook::from_quotes([
            Quote::priced("SPY", 100.0).with_iv(40.0),
            Quote::priced(option_symbol(&leg), 3.5).with_iv(25.0),
        ]);
        assert!((engine.resolve_iv(option, &both) - 0.25).abs() < 1e-12);

        assert!((engine.resolve_iv(option, &QuoteBook::new()) - DEFAULT_IV).abs() < 1e-12);
    }

    #[test]
    fn test_missing_underlying_quote_is_unavailable() {
        let engine = GreeksEngine::default();
        let enriched = engine.enrich(&call_leg(), &QuoteBook::new(), as_of());
        assert_eq!(enriched.source, GreeksSource::Unavailable);
        assert_eq!(enriched.greeks, Greeks::ZERO);
        assert_eq!(enriched.underlying_price, None);
    }

    #[test]
    fn test_expired_option_is_unavailable() {
        let engine = GreeksEngine::default();
        let quotes = QuoteBook::from_quotes([Quote::priced("SPY", 100.0)]);
        let later = as_of() + chrono::Days::new(31);
        let enriched = engine.enrich(&call_leg(), &quotes, later);
        assert_eq!(enriched.dte, Some(-1));
        assert_eq!(enriched.greeks, Greeks::ZERO);
    }
}
