//! Pricing service composing the rate cache and the price calculator.

use std::sync::Arc;

use async_trait::async_trait;
use bookstore_common::{Book, BookId, Currency};
use rust_decimal::Decimal;
use tracing::{info, instrument, warn};

use crate::cache::{RateOrigin, SharedRateCache};
use crate::error::{FxError, FxResult};
use crate::pricing::PriceCalculator;
use crate::quote::{PriceQuote, PriceRequest, QuoteParts};

/// Looks up books by ID. Implemented by the inventory store.
#[async_trait]
pub trait BookLookup: Send + Sync {
    /// Find a book, or `None` if the ID is unknown.
    async fn find_book(&self, id: BookId) -> Option<Book>;
}

/// Computes suggested resale prices.
pub struct PricingService {
    rates: SharedRateCache,
    books: Arc<dyn BookLookup>,
    calculator: PriceCalculator,
}

impl PricingService {
    /// Create a new pricing service using the default 30% margin.
    pub fn new(rates: SharedRateCache, books: Arc<dyn BookLookup>) -> Self {
        Self::with_calculator(rates, books, PriceCalculator::new())
    }

    /// Create a pricing service with a custom calculator.
    pub fn with_calculator(
        rates: SharedRateCache,
        books: Arc<dyn BookLookup>,
        calculator: PriceCalculator,
    ) -> Self {
        Self {
            rates,
            books,
            calculator,
        }
    }

    /// Quote a suggested price for `book_id` in `target`.
    #[instrument(skip(self, target), fields(currency = %target))]
    pub async fn calculate_price(
        &self,
        book_id: BookId,
        target: &Currency,
        profit_margin_percent: Option<Decimal>,
    ) -> FxResult<PriceQuote> {
        let book = self
            .books
            .find_book(book_id)
            .await
            .ok_or(FxError::NotFound(book_id))?;

        let margin = profit_margin_percent.unwrap_or(self.calculator.default_margin());
        let (rate, origin) = self.rates.get_rate_with_origin(target).await?;
        let suggested_price = self.calculator.calculate(book.cost_usd, rate, margin)?;

        if origin != RateOrigin::Fresh {
            warn!(origin = ?origin, "Quote priced from a degraded rate");
        }

        info!(
            rate = %rate,
            margin = %margin,
            suggested_price = %suggested_price,
            "Price calculated"
        );

        Ok(PriceQuote::from(QuoteParts {
            book_id: book.id,
            title: book.title,
            base_cost_usd: book.cost_usd,
            target_currency: target.clone(),
            exchange_rate: rate,
            rate_origin: origin,
            profit_margin_percent: margin,
            suggested_price,
        }))
    }

    /// Quote from a request record.
    pub async fn quote(&self, request: &PriceRequest) -> FxResult<PriceQuote> {
        self.calculate_price(
            request.book_id,
            &request.target_currency,
            request.profit_margin_percent,
        )
        .await
    }

    /// Get the shared rate cache.
    pub fn rates(&self) -> &SharedRateCache {
        &self.rates
    }

    /// Get the calculator.
    pub fn calculator(&self) -> &PriceCalculator {
        &self.calculator
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::RateCache;
    use crate::fallback::FallbackTable;
    use crate::provider::MockRateSource;
    use rust_decimal_macros::dec;
    use std::collections::HashMap;

    struct FixedBooks(HashMap<BookId, Book>);

    #[async_trait]
    impl BookLookup for FixedBooks {
        async fn find_book(&self, id: BookId) -> Option<Book> {
            self.0.get(&id).cloned()
        }
    }

    fn setup_service(source: Arc<MockRateSource>) -> PricingService {
        let book = Book::new(
            BookId::new(1),
            "El Quijote",
            "Miguel de Cervantes",
            "978-84-376-0494-7",
            dec!(45.00),
        );
        let books = Arc::new(FixedBooks(HashMap::from([(book.id, book)])));
        let cache = Arc::new(RateCache::new(source, FallbackTable::default()));
        PricingService::new(cache, books)
    }

    #[tokio::test]
    async fn test_calculate_price() {
        let source = Arc::new(MockRateSource::new("test"));
        source.set_rates("2024-01-15", &[("USD", dec!(1)), ("ARS", dec!(1000))]);
        let service = setup_service(source);

        let quote = service
            .calculate_price(BookId::new(1), &Currency::new("ars"), None)
            .await
            .unwrap();

        assert_eq!(quote.title, "El Quijote");
        assert_eq!(quote.target_currency, Currency::ars());
        assert_eq!(quote.exchange_rate, dec!(1000));
        assert_eq!(quote.profit_margin_percent, dec!(30));
        assert_eq!(quote.suggested_price, dec!(58500.00));
        assert_eq!(quote.rate_origin, RateOrigin::Fresh);
        assert!(!quote.is_degraded());
    }

    #[tokio::test]
    async fn test_calculate_price_with_margin() {
        let source = Arc::new(MockRateSource::new("test"));
        source.set_rates("2024-01-15", &[("EUR", dec!(0.92))]);
        let service = setup_service(source);

        let request = PriceRequest::new(BookId::new(1), "EUR").with_margin(dec!(10));
        let quote = service.quote(&request).await.unwrap();

        // 45 * 0.92 * 1.1 = 45.54
        assert_eq!(quote.suggested_price, dec!(45.54));
    }

    #[tokio::test]
    async fn test_unknown_book() {
        let source = Arc::new(MockRateSource::new("test"));
        let service = setup_service(source.clone());

        let result = service
            .calculate_price(BookId::new(99), &Currency::eur(), None)
            .await;

        assert!(matches!(result, Err(FxError::NotFound(id)) if id == BookId::new(99)));
        assert_eq!(source.calls(), 0);
    }

    #[tokio::test]
    async fn test_fallback_quote_when_upstream_down() {
        let source = Arc::new(MockRateSource::new("down"));
        let service = setup_service(source);

        let quote = service
            .calculate_price(BookId::new(1), &Currency::ars(), None)
            .await
            .unwrap();
        assert_eq!(quote.rate_origin, RateOrigin::Fallback);
        assert_eq!(quote.suggested_price, dec!(58500.00));

        let result = service
            .calculate_price(BookId::new(1), &Currency::new("CHF"), None)
            .await;
        assert!(matches!(result, Err(FxError::RateUnavailable(_))));
    }

    #[tokio::test]
    async fn test_invalid_margin() {
        let source = Arc::new(MockRateSource::new("test"));
        source.set_rates("2024-01-15", &[("EUR", dec!(0.92))]);
        let service = setup_service(source);

        let result = service
            .calculate_price(BookId::new(1), &Currency::eur(), Some(dec!(150)))
            .await;
        assert!(matches!(result, Err(FxError::InvalidInput(_))));
    }
}
