//! The rate table and the conversion formula.
//!
//! Every value in a [`RateTable`] is expressed relative to a single reference
//! currency, so any pair can be converted in two hops through it.

use super::error::RatesError;
use std::collections::HashMap;

/// Currency every table is anchored to. The ECB feed is quoted against it.
pub const REFERENCE_CURRENCY: &str = "EUR";

#[derive(Debug, Clone, PartialEq)]
pub struct RateTable {
    reference: String,
    rates: HashMap<String, f64>,
}

impl RateTable {
    /// Creates an empty table for the given reference currency.
    pub fn new(reference: &str) -> Self {
        Self {
            reference: reference.to_uppercase(),
            rates: HashMap::new(),
        }
    }

    /// Creates a table holding only the reference currency at 1.0.
    pub fn anchored(reference: &str) -> Self {
        let mut table = Self::new(reference);
        table.anchor();
        table
    }

    pub fn reference(&self) -> &str {
        &self.reference
    }

    /// Inserts or overwrites a rate.
    ///
    /// Rejects zero, negative and non-finite values, and any value other than
    /// 1.0 for the reference currency.
    pub fn insert(&mut self, code: &str, rate: f64) -> Result<(), RatesError> {
        let code = code.trim().to_uppercase();
        let valid = rate.is_finite() && rate > 0.0 && (code != self.reference || rate == 1.0);
        if code.is_empty() || !valid {
            return Err(RatesError::InvalidRate { code, rate });
        }
        self.rates.insert(code, rate);
        Ok(())
    }

    /// Ensures the reference currency is present at exactly 1.0.
    pub fn anchor(&mut self) {
        self.rates.insert(self.reference.clone(), 1.0);
    }

    pub fn get(&self, code: &str) -> Option<f64> {
        self.rates.get(&code.trim().to_uppercase()).copied()
    }

    pub fn contains(&self, code: &str) -> bool {
        self.get(code).is_some()
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.rates.iter().map(|(code, rate)| (code.as_str(), *rate))
    }

    /// Currency codes sorted alphabetically, for display.
    pub fn codes(&self) -> Vec<&str> {
        let mut codes: Vec<&str> = self.rates.keys().map(String::as_str).collect();
        codes.sort_unstable();
        codes
    }

    /// Copies every entry of `other` into this table, overwriting collisions.
    pub fn overlay(&mut self, other: &RateTable) {
        for (code, rate) in other.iter() {
            self.rates.insert(code.to_string(), rate);
        }
    }

    /// Converts `amount` of `from` into `to`: `(amount / rate[from]) * rate[to]`.
    ///
    /// No rounding is applied. Equal rates short-circuit to `amount`.
    pub fn convert(&self, amount: f64, from: &str, to: &str) -> Result<f64, RatesError> {
        if !amount.is_finite() || amount < 0.0 {
            return Err(RatesError::InvalidAmount(amount));
        }
        let from_rate = self
            .get(from)
            .ok_or_else(|| RatesError::UnknownCurrencyCode(from.to_uppercase()))?;
        let to_rate = self
            .get(to)
            .ok_or_else(|| RatesError::UnknownCurrencyCode(to.to_uppercase()))?;
        // (x / r) * r can be off by an ulp
        if from_rate == to_rate {
            return Ok(amount);
        }
        Ok((amount / from_rate) * to_rate)
    }
}

impl Default for RateTable {
    fn default() -> Self {
        Self::new(REFERENCE_CURRENCY)
    }
}

/// A single conversion as requested by the user.
#[derive(Debug, Clone, PartialEq)]
pub struct ConversionRequest {
    pub amount: f64,
    pub from: String,
    pub to: String,
}

impl ConversionRequest {
    pub fn new(amount: f64, from: &str, to: &str) -> Self {
        Self {
            amount,
            from: from.trim().to_uppercase(),
            to: to.trim().to_uppercase(),
        }
    }

    pub fn apply(&self, table: &RateTable) -> Result<f64, RatesError> {
        table.convert(self.amount, &self.from, &self.to)
    }
}
