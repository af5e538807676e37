//! Wiring of the rate cache, catalog and pricing service.

use std::sync::Arc;

use bookstore_common::{Book, BookId, Currency};
use bookstore_fx::{
    FxError, FxResult, HttpRateSource, PriceCalculator, PriceQuote, PricingService, RateCache,
    RateCacheConfig, RateSnapshot, RateSource, SharedRateCache,
};
use rust_decimal::Decimal;
use thiserror::Error;
use tracing::{info, instrument};

use crate::catalog::{BookCatalog, CatalogError};
use crate::config::PricerConfig;

/// Errors building a pricer.
#[derive(Debug, Error)]
pub enum PricerError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

/// Process-wide pricing entry point.
///
/// Owns the single rate cache shared by every quote.
pub struct Pricer {
    catalog: Arc<BookCatalog>,
    rates: SharedRateCache,
    pricing: PricingService,
}

impl Pricer {
    /// Build a pricer from configuration, using the HTTP rate source.
    pub fn from_config(config: &PricerConfig) -> Result<Self, PricerError> {
        let source = HttpRateSource::new(
            config.rates.api_url.clone(),
            config.rates.request_timeout,
        )
        .map_err(|e| PricerError::Config(e.to_string()))?;
        let source = Arc::new(source);

        let catalog = match &config.catalog_path {
            Some(path) => BookCatalog::load(path)?,
            None => {
                info!("No catalog path configured, using sample books");
                BookCatalog::sample()
            }
        };

        Self::new(config, source, Arc::new(catalog))
    }

    /// Build a pricer over an explicit rate source and catalog.
    pub fn new(
        config: &PricerConfig,
        source: Arc<dyn RateSource>,
        catalog: Arc<BookCatalog>,
    ) -> Result<Self, PricerError> {
        config.validate().map_err(PricerError::Config)?;

        let calculator = PriceCalculator::with_default_margin(config.default_margin)
            .map_err(|e| PricerError::Config(e.to_string()))?;

        let rates = Arc::new(RateCache::with_config(
            source,
            config.rates.fallback.clone(),
            RateCacheConfig {
                ttl: config.rates.cache_ttl,
            },
        ));

        let pricing = PricingService::with_calculator(rates.clone(), catalog.clone(), calculator);

        Ok(Self {
            catalog,
            rates,
            pricing,
        })
    }

    /// Quote a suggested price, validating the request first.
    #[instrument(skip(self))]
    pub async fn quote(
        &self,
        book_id: BookId,
        currency: &str,
        margin: Option<Decimal>,
    ) -> FxResult<PriceQuote> {
        let currency = Currency::new(currency);
        if !currency.is_well_formed() {
            return Err(FxError::InvalidInput(format!(
                "currency code must be exactly 3 letters, got '{}'",
                currency
            )));
        }

        if let Some(margin) = margin {
            if margin < Decimal::ZERO {
                return Err(FxError::InvalidInput(
                    "profit margin cannot be negative".to_string(),
                ));
            }
            if margin > Decimal::ONE_HUNDRED {
                return Err(FxError::InvalidInput(
                    "profit margin cannot exceed 100%".to_string(),
                ));
            }
        }

        self.pricing.calculate_price(book_id, &currency, margin).await
    }

    /// Get the full rate table.
    pub async fn rates(&self) -> FxResult<Arc<RateSnapshot>> {
        self.rates.get_all_rates().await
    }

    /// All books in the catalog.
    pub fn books(&self) -> Vec<Book> {
        self.catalog.list()
    }

    /// Get the shared rate cache.
    pub fn rate_cache(&self) -> &SharedRateCache {
        &self.rates
    }

    /// Get the catalog.
    pub fn catalog(&self) -> &Arc<BookCatalog> {
        &self.catalog
    }
}
