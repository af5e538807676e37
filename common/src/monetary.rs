//! Currency types for bookstore pricing.

use serde::{Deserialize, Serialize};
use std::fmt;

/// ISO 4217 currency code.
///
/// Codes are normalised to upper case on construction, so lookups keyed by
/// `Currency` are case-insensitive.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Currency(String);

impl Currency {
    /// Create a new currency from code.
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into().trim().to_uppercase())
    }

    /// Get the currency code.
    pub fn code(&self) -> &str {
        &self.0
    }

    /// Check that the code has the ISO 4217 shape: exactly three ASCII letters.
    ///
    /// This does not check the code against the list of assigned currencies.
    pub fn is_well_formed(&self) -> bool {
        self.0.len() == 3 && self.0.chars().all(|c| c.is_ascii_alphabetic())
    }

    /// The currency all rates are quoted against.
    pub fn usd() -> Self {
        Self::new("USD")
    }

    pub fn eur() -> Self {
        Self::new("EUR")
    }

    pub fn gbp() -> Self {
        Self::new("GBP")
    }

    pub fn jpy() -> Self {
        Self::new("JPY")
    }

    pub fn ars() -> Self {
        Self::new("ARS")
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Currency {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Currency {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<Currency> for String {
    fn from(currency: Currency) -> Self {
        currency.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_currency_is_case_insensitive() {
        assert_eq!(Currency::new("ars"), Currency::ars());
        assert_eq!(Currency::new(" eUr "), Currency::eur());
        assert_eq!(Currency::from("gbp").code(), "GBP");
    }

    #[test]
    fn test_currency_well_formed() {
        assert!(Currency::usd().is_well_formed());
        assert!(!Currency::new("US").is_well_formed());
        assert!(!Currency::new("EURO").is_well_formed());
        assert!(!Currency::new("U5D").is_well_formed());
    }

    #[test]
    fn test_currency_deserialize_normalises() {
        let currency: Currency = serde_json::from_str("\"mxn\"").unwrap();
        assert_eq!(currency.code(), "MXN");
        assert_eq!(serde_json::to_string(&currency).unwrap(), "\"MXN\"");
    }
}
