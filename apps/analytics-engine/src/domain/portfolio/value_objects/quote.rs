//! Quote snapshot value objects.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::Symbol;

/// A market quote for an equity or option symbol.
///
/// Equity quotes are keyed by the underlying symbol; option quotes by the
/// OCC symbol and may carry broker-computed greeks. Every field except the
/// symbol is optional because feeds may be stale or partial.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    /// Quoted symbol.
    #[serde(default)]
    pub symbol: String,
    /// Last trade price.
    #[serde(default)]
    pub price: Option<f64>,
    /// Mid/mark price.
    #[serde(default)]
    pub mark: Option<f64>,
    /// Broker delta (per contract).
    #[serde(default)]
    pub delta: Option<f64>,
    /// Broker gamma (per contract).
    #[serde(default)]
    pub gamma: Option<f64>,
    /// Broker theta (per contract, per day).
    #[serde(default)]
    pub theta: Option<f64>,
    /// Broker vega (per contract, per 1% IV).
    #[serde(default)]
    pub vega: Option<f64>,
    /// Implied volatility in percent (e.g. `32.5`).
    #[serde(default)]
    pub iv: Option<f64>,
}

impl Quote {
    /// Quote with a price only.
    #[must_use]
    pub fn priced(symbol: impl Into<String>, price: f64) -> Self {
        Self {
            symbol: symbol.into(),
            price: Some(price),
            ..Self::default()
        }
    }

    /// Set the implied volatility (percent).
    #[must_use]
    pub const fn with_iv(mut self, iv_pct: f64) -> Self {
        self.iv = Some(iv_pct);
        self
    }

    /// Reference price: mark when positive, else last price when positive.
    #[must_use]
    pub fn reference_price(&self) -> Option<f64> {
        let usable = |p: Option<f64>| p.filter(|v| v.is_finite() && *v > 0.0);
        usable(self.mark).or_else(|| usable(self.price))
    }

    /// Implied volatility as a decimal fraction, when positive.
    #[must_use]
    pub fn iv_fraction(&self) -> Option<f64> {
        self.iv
            .filter(|v| v.is_finite() && *v > 0.0)
            .map(|pct| pct / 100.0)
    }

    /// Whether any broker greek is present.
    #[must_use]
    pub const fn has_greeks(&self) -> bool {
        self.delta.is_some() || self.gamma.is_some() || self.theta.is_some() || self.vega.is_some()
    }
}

/// Read-only snapshot of quotes taken at call time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "HashMap<String, Quote>", into = "HashMap<String, Quote>")]
pub struct QuoteBook {
    quotes: HashMap<String, Quote>,
}

impl QuoteBook {
    /// Empty book.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a book from quotes, keyed by their own symbol.
    pub fn from_quotes(quotes: impl IntoIterator<Item = Quote>) -> Self {
        let quotes = quotes
            .into_iter()
            .map(|q| (Self::key(&q.symbol), q))
            .collect();
        Self { quotes }
    }

    fn key(symbol: &str) -> String {
        Symbol::new(symbol).compact()
    }

    /// Look up a quote (case and padding insensitive).
    #[must_use]
    pub fn get(&self, symbol: &str) -> Option<&Quote> {
        self.quotes.get(&Self::key(symbol))
    }

    /// Reference price of a symbol.
    #[must_use]
    pub fn price(&self, symbol: &str) -> Option<f64> {
        self.get(symbol).and_then(Quote::reference_price)
    }

    /// Number of quotes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.quotes.len()
    }

    /// Whether the book is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.quotes.is_empty()
    }
}

impl From<HashMap<String, Quote>> for QuoteBook {
    fn from(map: HashMap<String, Quote>) -> Self {
        map.into_iter()
            .map(|(symbol, mut quote)| {
                if quote.symbol.is_empty() {
                    quote.symbol = symbol;
                }
                quote
            })
            .collect()
    }
}

impl From<QuoteBook> for HashMap<String, Quote> {
    fn from(book: QuoteBook) -> Self {
        book.quotes
    }
}

impl FromIterator<Quote> for QuoteBook {
    fn from_iter<T: IntoIterator<Item = Quote>>(iter: T) -> Self {
        Self::from_quotes(iter)
    }
}
