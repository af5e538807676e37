//! Bookstore FX and pricing core
//!
//! Fetches USD exchange rates from an upstream provider, caches them with a
//! TTL, and turns them into suggested resale prices for books.
//!
//! # Features
//!
//! - Single-flight rate table refresh with configurable TTL
//! - Stale table reuse when the upstream provider is down
//! - Static fallback rates as a last resort
//! - Suggested price calculation with half-up rounding to cents
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use bookstore_fx::{FallbackTable, HttpRateSource, PricingService, RateCache};
//!
//! let source = Arc::new(HttpRateSource::new(DEFAULT_RATES_URL, timeout)?);
//! let cache = Arc::new(RateCache::new(source, FallbackTable::default()));
//! let pricing = PricingService::new(cache, catalog);
//!
//! let quote = pricing.calculate_price(book_id, &Currency::ars(), None).await?;
//! ```

pub mod cache;
pub mod engine;
pub mod error;
pub mod fallback;
pub mod pricing;
pub mod provider;
pub mod quote;
pub mod snapshot;

pub use cache::{RateCache, RateCacheConfig, RateCacheStats, RateOrigin, SharedRateCache};
pub use engine::{BookLookup, PricingService};
pub use error::{FxError, FxResult};
pub use fallback::FallbackTable;
pub use pricing::{PriceCalculator, DEFAULT_PROFIT_MARGIN};
pub use provider::{HttpRateSource, RateSource, UpstreamRates, DEFAULT_RATES_URL};
#[cfg(any(test, feature = "test-utils"))]
pub use provider::MockRateSource;
pub use quote::{PriceQuote, PriceRequest};
pub use snapshot::RateSnapshot;
