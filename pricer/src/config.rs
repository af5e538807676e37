//! Pricer configuration.

use std::path::PathBuf;
use std::time::Duration;

use bookstore_common::{constants, Currency, DurationExt};
use bookstore_fx::{FallbackTable, DEFAULT_PROFIT_MARGIN, DEFAULT_RATES_URL};
use rust_decimal::Decimal;
use tracing::warn;

/// Exchange-rate source configuration.
#[derive(Debug, Clone)]
pub struct RatesConfig {
    /// Upstream endpoint returning the USD rate table.
    pub api_url: String,
    /// How long a fetched table stays fresh.
    pub cache_ttl: chrono::Duration,
    /// Per-request timeout for the upstream call.
    pub request_timeout: Duration,
    /// Last-resort rates used when no table has the currency.
    pub fallback: FallbackTable,
}

impl Default for RatesConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_RATES_URL.to_string(),
            cache_ttl: constants::rate_cache_ttl(),
            request_timeout: constants::rate_request_timeout().as_std(),
            fallback: FallbackTable::default(),
        }
    }
}

/// Main pricer configuration.
#[derive(Debug, Clone)]
pub struct PricerConfig {
    /// Rate source configuration.
    pub rates: RatesConfig,
    /// Margin in percent applied when a request has none.
    pub default_margin: Decimal,
    /// JSON file with the book catalog; sample books are used when unset.
    pub catalog_path: Option<PathBuf>,
}

impl Default for PricerConfig {
    fn default() -> Self {
        Self {
            rates: RatesConfig::default(),
            default_margin: DEFAULT_PROFIT_MARGIN,
            catalog_path: None,
        }
    }
}

impl PricerConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(url) = std::env::var("EXCHANGE_RATE_API_URL") {
            config.rates.api_url = url;
        }

        if let Ok(secs) = std::env::var("EXCHANGE_RATE_TTL_SECS") {
            match secs.parse() {
                Ok(secs) => config.rates.cache_ttl = chrono::Duration::seconds(secs),
                Err(_) => warn!(value = %secs, "Ignoring invalid EXCHANGE_RATE_TTL_SECS"),
            }
        }

        if let Ok(ms) = std::env::var("EXCHANGE_RATE_TIMEOUT_MS") {
            match ms.parse() {
                Ok(ms) => config.rates.request_timeout = Duration::from_millis(ms),
                Err(_) => warn!(value = %ms, "Ignoring invalid EXCHANGE_RATE_TIMEOUT_MS"),
            }
        }

        if let Ok(rates) = std::env::var("FALLBACK_RATES") {
            match parse_fallback_rates(&rates) {
                Ok(table) => config.rates.fallback = table,
                Err(e) => warn!(error = %e, "Ignoring invalid FALLBACK_RATES"),
            }
        }

        if let Ok(margin) = std::env::var("DEFAULT_PROFIT_MARGIN") {
            match margin.parse() {
                Ok(margin) => config.default_margin = margin,
                Err(_) => warn!(value = %margin, "Ignoring invalid DEFAULT_PROFIT_MARGIN"),
            }
        }

        if let Ok(path) = std::env::var("BOOK_CATALOG_PATH") {
            config.catalog_path = Some(PathBuf::from(path));
        }

        config
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.rates.api_url.is_empty() {
            return Err("Exchange rate API URL cannot be empty".to_string());
        }

        if self.rates.cache_ttl <= chrono::Duration::zero() {
            return Err("Rate cache TTL must be positive".to_string());
        }

        if self.rates.request_timeout.is_zero() {
            return Err("Rate request timeout must be positive".to_string());
        }

        if self.default_margin < Decimal::ZERO || self.default_margin > Decimal::ONE_HUNDRED {
            return Err("Default profit margin must be between 0 and 100".to_string());
        }

        Ok(())
    }
}

/// Parse a fallback table written as `EUR=0.85,GBP=0.73`.
pub fn parse_fallback_rates(input: &str) -> Result<FallbackTable, String> {
    let mut entries = Vec::new();

    for entry in input.split(',').map(str::trim).filter(|e| !e.is_empty()) {
        let (code, rate) = entry
            .split_once('=')
            .ok_or_else(|| format!("expected CODE=RATE, got '{}'", entry))?;

        let currency = Currency::new(code);
        if !currency.is_well_formed() {
            return Err(format!("invalid currency code '{}'", code.trim()));
        }

        let rate: Decimal = rate
            .trim()
            .parse()
            .map_err(|_| format!("invalid rate for {}: '{}'", currency, rate.trim()))?;

        entries.push((currency, rate));
    }

    FallbackTable::new(entries).map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_default_config() {
        let config = PricerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.rates.cache_ttl, chrono::Duration::hours(1));
        assert_eq!(config.default_margin, dec!(30));
        assert_eq!(config.rates.fallback.len(), 9);
    }

    #[test]
    fn test_invalid_config() {
        let mut config = PricerConfig::default();
        config.default_margin = dec!(120);
        assert!(config.validate().is_err());

        let mut config = PricerConfig::default();
        config.rates.cache_ttl = chrono::Duration::zero();
        assert!(config.validate().is_err());

        let mut config = PricerConfig::default();
        config.rates.api_url = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_parse_fallback_rates() {
        let table = parse_fallback_rates("eur=0.85, GBP = 0.73,").unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.get(&Currency::eur()), Some(dec!(0.85)));
        assert_eq!(table.get(&Currency::gbp()), Some(dec!(0.73)));

        assert!(parse_fallback_rates("EUR").is_err());
        assert!(parse_fallback_rates("EURO=1").is_err());
        assert!(parse_fallback_rates("EUR=abc").is_err());
        assert!(parse_fallback_rates("EUR=-1").is_err());
    }
}
