//! End-to-end pricing through the pricer wiring with a mock rate source.

use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use bookstore_common::{BookId, Currency};
use bookstore_fx::{FxError, MockRateSource, RateOrigin};
use bookstore_pricer::{BookCatalog, CatalogError, Pricer, PricerConfig, PricerError};
use rust_decimal_macros::dec;
use tokio_test::{assert_err, assert_ok};

fn setup(ttl: chrono::Duration) -> (Arc<MockRateSource>, Pricer) {
    let source = Arc::new(MockRateSource::new("test"));
    source.set_rates(
        "2024-01-15",
        &[("USD", dec!(1)), ("EUR", dec!(0.92)), ("ARS", dec!(815.5))],
    );

    let mut config = PricerConfig::default();
    config.rates.cache_ttl = ttl;

    let pricer = Pricer::new(&config, source.clone(), Arc::new(BookCatalog::sample())).unwrap();
    (source, pricer)
}

#[tokio::test]
async fn test_quote_with_default_margin() {
    let (source, pricer) = setup(chrono::Duration::hours(1));

    // Rayuela costs 45.00 USD: 45 * 815.5 * 1.3 = 47706.75
    let quote = assert_ok!(pricer.quote(BookId::new(4), "ars", None).await);
    assert_eq!(quote.title, "Rayuela");
    assert_eq!(quote.target_currency, Currency::ars());
    assert_eq!(quote.exchange_rate, dec!(815.5));
    assert_eq!(quote.suggested_price, dec!(47706.75));
    assert_eq!(quote.rate_origin, RateOrigin::Fresh);

    // Second quote reuses the cached table.
    assert_ok!(pricer.quote(BookId::new(1), "EUR", Some(dec!(0))).await);
    assert_eq!(source.calls(), 1);
}

#[tokio::test]
async fn test_request_validation() {
    let (source, pricer) = setup(chrono::Duration::hours(1));

    let err = assert_err!(pricer.quote(BookId::new(1), "EURO", None).await);
    assert!(matches!(err, FxError::InvalidInput(_)));

    let err = assert_err!(pricer.quote(BookId::new(1), "EUR", Some(dec!(-1))).await);
    assert!(matches!(err, FxError::InvalidInput(_)));

    let err = assert_err!(pricer.quote(BookId::new(1), "EUR", Some(dec!(101))).await);
    assert!(matches!(err, FxError::InvalidInput(_)));

    let err = assert_err!(pricer.quote(BookId::new(404), "EUR", None).await);
    assert_eq!(err.http_status(), 404);

    assert_eq!(source.calls(), 0);
}

#[tokio::test]
async fn test_degrades_to_stale_then_fallback() {
    let (source, pricer) = setup(chrono::Duration::milliseconds(50));
    assert_ok!(pricer.rates().await);

    tokio::time::sleep(Duration::from_millis(60)).await;
    source.set_failing();

    let quote = assert_ok!(pricer.quote(BookId::new(4), "ARS", None).await);
    assert_eq!(quote.rate_origin, RateOrigin::Stale);
    assert_eq!(quote.exchange_rate, dec!(815.5));

    // MXN is only in the fallback table.
    let quote = assert_ok!(pricer.quote(BookId::new(4), "MXN", None).await);
    assert_eq!(quote.rate_origin, RateOrigin::Fallback);
    assert_eq!(quote.suggested_price, dec!(1170.00));

    let err = assert_err!(pricer.quote(BookId::new(4), "CHF", None).await);
    assert_eq!(err.http_status(), 503);
}

#[tokio::test]
async fn test_rates_unavailable_without_any_table() {
    let source = Arc::new(MockRateSource::new("down"));
    let pricer = Pricer::new(
        &PricerConfig::default(),
        source,
        Arc::new(BookCatalog::sample()),
    )
    .unwrap();

    let err = assert_err!(pricer.rates().await);
    assert!(matches!(err, FxError::RatesUnavailable));

    let quote = assert_ok!(pricer.quote(BookId::new(1), "EUR", None).await);
    assert_eq!(quote.rate_origin, RateOrigin::Fallback);
    // 15.99 * 0.85 * 1.3 = 17.66895
    assert_eq!(quote.suggested_price, dec!(17.67));
}

#[test]
fn test_invalid_config_rejected() {
    let mut config = PricerConfig::default();
    config.default_margin = dec!(150);

    let result = Pricer::new(
        &config,
        Arc::new(MockRateSource::new("test")),
        Arc::new(BookCatalog::new()),
    );
    assert!(matches!(result, Err(PricerError::Config(_))));
}

#[tokio::test]
async fn test_catalog_loaded_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"[
            {{"id": 10, "title": "Pedro Páramo", "author": "Juan Rulfo", "isbn": "978-84-376-0476-3", "cost_usd": 9.5, "stock_quantity": 3}}
        ]"#
    )
    .unwrap();

    let catalog = BookCatalog::load(file.path()).unwrap();
    assert_eq!(catalog.len(), 1);

    let source = Arc::new(MockRateSource::new("test"));
    source.set_rates("2024-01-15", &[("EUR", dec!(0.9))]);
    let pricer = Pricer::new(&PricerConfig::default(), source, Arc::new(catalog)).unwrap();

    // 9.5 * 0.9 * 1.3 = 11.115
    let quote = assert_ok!(pricer.quote(BookId::new(10), "eur", None).await);
    assert_eq!(quote.suggested_price, dec!(11.12));
}

#[test]
fn test_catalog_parse_error() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "not json").unwrap();

    let result = BookCatalog::load(file.path());
    assert!(matches!(result, Err(CatalogError::Parse(_))));
}
