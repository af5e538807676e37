//! Static last-resort exchange rates.

use std::collections::HashMap;

use bookstore_common::Currency;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::error::{FxError, FxResult};

/// Read-only table of hardcoded USD rates.
///
/// Built once from configuration at startup. Only consulted by
/// [`RateCache::get_rate`](crate::RateCache::get_rate) when no snapshot can
/// supply a currency.
#[derive(Debug, Clone, PartialEq)]
pub struct FallbackTable {
    rates: HashMap<Currency, Decimal>,
}

impl FallbackTable {
    /// Create a table from explicit entries. Every rate must be positive.
    pub fn new(rates: impl IntoIterator<Item = (Currency, Decimal)>) -> FxResult<Self> {
        let mut table = HashMap::new();
        for (currency, rate) in rates {
            if rate <= Decimal::ZERO {
                return Err(FxError::InvalidInput(format!(
                    "fallback rate for {} must be positive, got {}",
                    currency, rate
                )));
            }
            table.insert(currency, rate);
        }
        Ok(Self { rates: table })
    }

    /// A table with no entries.
    pub fn empty() -> Self {
        Self {
            rates: HashMap::new(),
        }
    }

    /// Get the fallback rate for a currency.
    pub fn get(&self, currency: &Currency) -> Option<Decimal> {
        self.rates.get(currency).copied()
    }

    pub fn contains(&self, currency: &Currency) -> bool {
        self.rates.contains_key(currency)
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }

    /// Iterate over the entries in code order.
    pub fn entries(&self) -> Vec<(Currency, Decimal)> {
        let mut entries: Vec<_> = self
            .rates
            .iter()
            .map(|(currency, rate)| (currency.clone(), *rate))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        entries
    }
}

impl Default for FallbackTable {
    fn default() -> Self {
        let rates = [
            ("USD", dec!(1)),
            ("EUR", dec!(0.85)),
            ("GBP", dec!(0.73)),
            ("JPY", dec!(110.0)),
            ("ARS", dec!(1000.0)),
            ("MXN", dec!(20.0)),
            ("BRL", dec!(5.3)),
            ("CLP", dec!(900.0)),
            ("COP", dec!(4000.0)),
        ];

        Self {
            rates: rates
                .into_iter()
                .map(|(code, rate)| (Currency::new(code), rate))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_table() {
        let table = FallbackTable::default();
        assert_eq!(table.len(), 9);
        assert_eq!(table.get(&Currency::ars()), Some(dec!(1000)));
        assert_eq!(table.get(&Currency::new("clp")), Some(dec!(900)));
        assert!(!table.contains(&Currency::new("CHF")));
    }

    #[test]
    fn test_rejects_non_positive_rate() {
        let result = FallbackTable::new(vec![
            (Currency::eur(), dec!(0.9)),
            (Currency::gbp(), dec!(0)),
        ]);
        assert!(matches!(result, Err(FxError::InvalidInput(_))));
    }

    #[test]
    fn test_entries_sorted() {
        let table = FallbackTable::new(vec![
            (Currency::gbp(), dec!(0.8)),
            (Currency::eur(), dec!(0.9)),
        ])
        .unwrap();

        let codes: Vec<_> = table.entries().into_iter().map(|(c, _)| c).collect();
        assert_eq!(codes, vec![Currency::eur(), Currency::gbp()]);
    }
}
