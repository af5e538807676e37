//! Price quote records.

use bookstore_common::{now, BookId, Currency, Timestamp};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::cache::RateOrigin;

/// A suggested resale price for one book in one currency.
///
/// Built per request and never stored.
#[derive(Debug, Clone, Serialize)]
pub struct PriceQuote {
    /// Unique quote ID.
    pub quote_id: Uuid,
    pub book_id: BookId,
    pub title: String,
    pub base_cost_usd: Decimal,
    pub target_currency: Currency,
    /// USD to `target_currency` multiplier used.
    pub exchange_rate: Decimal,
    /// Where `exchange_rate` came from.
    pub rate_origin: RateOrigin,
    pub profit_margin_percent: Decimal,
    pub suggested_price: Decimal,
    pub computed_at: Timestamp,
}

impl PriceQuote {
    /// Check if the quote was priced from a stale or fallback rate.
    pub fn is_degraded(&self) -> bool {
        self.rate_origin != RateOrigin::Fresh
    }
}

/// Request for a suggested price.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceRequest {
    pub book_id: BookId,
    pub target_currency: Currency,
    /// Margin in percent; the service default applies when absent.
    #[serde(default)]
    pub profit_margin_percent: Option<Decimal>,
}

impl PriceRequest {
    /// Create a request using the default margin.
    pub fn new(book_id: BookId, target_currency: impl Into<Currency>) -> Self {
        Self {
            book_id,
            target_currency: target_currency.into(),
            profit_margin_percent: None,
        }
    }

    /// Use a specific margin.
    pub fn with_margin(mut self, margin: Decimal) -> Self {
        self.profit_margin_percent = Some(margin);
        self
    }
}

pub(crate) struct QuoteParts {
    pub book_id: BookId,
    pub title: String,
    pub base_cost_usd: Decimal,
    pub target_currency: Currency,
    pub exchange_rate: Decimal,
    pub rate_origin: RateOrigin,
    pub profit_margin_percent: Decimal,
    pub suggested_price: Decimal,
}

impl From<QuoteParts> for PriceQuote {
    fn from(parts: QuoteParts) -> Self {
        Self {
            quote_id: Uuid::now_v7(),
            book_id: parts.book_id,
            title: parts.title,
            base_cost_usd: parts.base_cost_usd,
            target_currency: parts.target_currency,
            exchange_rate: parts.exchange_rate,
            rate_origin: parts.rate_origin,
            profit_margin_percent: parts.profit_margin_percent,
            suggested_price: parts.suggested_price,
            computed_at: now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_price_request_from_json() {
        let request: PriceRequest =
            serde_json::from_str(r#"{"book_id": 4, "target_currency": "ars"}"#).unwrap();
        assert_eq!(request.target_currency, Currency::ars());
        assert_eq!(request.profit_margin_percent, None);

        let request = PriceRequest::new(BookId::new(4), "eur").with_margin(dec!(15));
        assert_eq!(request.book_id, BookId::new(4));
        assert_eq!(request.profit_margin_percent, Some(dec!(15)));
    }

    #[test]
    fn test_quote_serialization() {
        let quote = PriceQuote::from(QuoteParts {
            book_id: BookId::new(1),
            title: "El Quijote".into(),
            base_cost_usd: dec!(45.00),
            target_currency: Currency::ars(),
            exchange_rate: dec!(1000),
            rate_origin: RateOrigin::Fallback,
            profit_margin_percent: dec!(30),
            suggested_price: dec!(58500.00),
        });

        assert!(quote.is_degraded());

        let json = serde_json::to_value(&quote).unwrap();
        assert_eq!(json["book_id"], 1);
        assert_eq!(json["target_currency"], "ARS");
        assert_eq!(json["rate_origin"], "fallback");
        assert_eq!(json["suggested_price"], "58500.00");
    }
}
