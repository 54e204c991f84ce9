use std::collections::HashSet;

use crate::api::{ApiRate, Rate};

/// The rates a user quotes, relative to their base currency
#[derive(Clone, Debug, PartialEq)]
pub struct RateTable {
    base: String,
    rates: Vec<Rate>,
}

impl RateTable {
    pub fn new(base: impl Into<String>) -> RateTable {
        RateTable {
            base: base.into(),
            rates: Vec::new(),
        }
    }

    pub fn from_api(base: impl Into<String>, rates: Vec<ApiRate>) -> RateTable {
        let mut res = RateTable::new(base);
        res.replace_all(rates);
        res
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    /// Only the explicitly quoted rates, in insertion order
    pub fn quoted(&self) -> &[Rate] {
        &self.rates
    }

    pub fn get(&self, currency: &str) -> Option<&Rate> {
        self.rates.iter().find(|r| r.currency == currency)
    }

    /// The quoted rates plus the base currency's 1:1 rate, unless quoted
    pub fn with_base(&self) -> Vec<Rate> {
        let mut res = self.rates.clone();
        if self.get(&self.base).is_none() && !self.base.is_empty() {
            res.push(Rate::identity(&self.base));
        }
        res
    }

    /// Currencies a converter row may reference
    pub fn available_codes(&self) -> HashSet<String> {
        let mut res = self
            .rates
            .iter()
            .filter(|r| r.is_set())
            .map(|r| r.currency.clone())
            .collect::<HashSet<_>>();
        if !self.base.is_empty() {
            res.insert(self.base.clone());
        }
        res
    }

    pub fn upsert(&mut self, rate: Rate) {
        match self.rates.iter_mut().find(|r| r.currency == rate.currency) {
            Some(r) => *r = rate,
            None => self.rates.push(rate),
        }
    }

    /// Returns the removed rate, if there was one
    pub fn remove(&mut self, currency: &str) -> Option<Rate> {
        let pos = self.rates.iter().position(|r| r.currency == currency)?;
        Some(self.rates.remove(pos))
    }

    pub fn clear(&mut self) {
        self.rates.clear();
    }

    pub fn replace_all(&mut self, rates: Vec<ApiRate>) {
        self.rates.clear();
        for r in rates {
            if self.get(&r.currency_code).is_some() {
                tracing::warn!(
                    currency = %r.currency_code,
                    "duplicate rate in listing, keeping the last one"
                );
            }
            self.upsert(Rate::from(r));
        }
    }
}
