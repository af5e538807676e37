//! FX and pricing error types.

use bookstore_common::{BookId, Currency};
use thiserror::Error;

/// Errors that can occur in the FX and pricing core.
#[derive(Debug, Error)]
pub enum FxError {
    /// No fresh, stale or fallback rate exists for the currency.
    #[error("Exchange rate for {0} is not available")]
    RateUnavailable(Currency),

    /// No rate table could be obtained at all.
    #[error("Exchange rate data is not available")]
    RatesUnavailable,

    /// Arithmetic domain violation in price calculation.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The book lookup does not know the requested book.
    #[error("Book with ID {0} not found")]
    NotFound(BookId),

    /// Upstream rate fetch failed (network, status or payload).
    #[error("Rate fetch failed: {0}")]
    FetchFailed(String),

    /// The HTTP client for the rate source could not be set up.
    #[error("HTTP client error: {0}")]
    HttpClient(String),
}

impl FxError {
    /// Check if retrying the same call later may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            FxError::RateUnavailable(_) | FxError::RatesUnavailable | FxError::FetchFailed(_)
        )
    }

    /// Get a stable error code for callers.
    pub fn error_code(&self) -> &'static str {
        match self {
            FxError::RateUnavailable(_) => "RATE_UNAVAILABLE",
            FxError::RatesUnavailable => "RATES_UNAVAILABLE",
            FxError::InvalidInput(_) => "INVALID_INPUT",
            FxError::NotFound(_) => "NOT_FOUND",
            FxError::FetchFailed(_) => "FETCH_FAILED",
            FxError::HttpClient(_) => "HTTP_CLIENT_ERROR",
        }
    }

    /// HTTP status an outer API layer should answer with.
    pub fn http_status(&self) -> u16 {
        match self {
            FxError::RateUnavailable(_) | FxError::RatesUnavailable => 503,
            FxError::InvalidInput(_) => 400,
            FxError::NotFound(_) => 404,
            FxError::FetchFailed(_) => 502,
            FxError::HttpClient(_) => 500,
        }
    }
}

/// Result type for FX operations.
pub type FxResult<T> = Result<T, FxError>;
