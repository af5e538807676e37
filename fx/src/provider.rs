//! Upstream rate sources.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client as HttpClient;
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::debug;

use crate::error::{FxError, FxResult};

/// Default upstream endpoint, quoting against USD.
pub const DEFAULT_RATES_URL: &str = "https://api.exchangerate-api.com/v4/latest/USD";

/// Rate table payload returned by the upstream provider.
///
/// Only the fields used for pricing are kept; anything else in the body is
/// ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct UpstreamRates {
    pub base: String,
    pub date: String,
    pub rates: HashMap<String, Decimal>,
}

/// A source of full USD rate tables.
///
/// Implementations perform a single fetch per call and never retry or cache;
/// both are the job of [`RateCache`](crate::RateCache).
#[async_trait]
pub trait RateSource: Send + Sync {
    /// Get the source name.
    fn name(&self) -> &str;

    /// Fetch the current rate table.
    async fn fetch(&self) -> FxResult<UpstreamRates>;
}

/// Rate source backed by an HTTP JSON endpoint.
pub struct HttpRateSource {
    http: HttpClient,
    url: String,
}

impl HttpRateSource {
    /// Create a source for `url` with a per-request timeout.
    ///
    /// Fails rather than falling back to a client without the timeout.
    pub fn new(url: impl Into<String>, timeout: Duration) -> FxResult<Self> {
        let http = HttpClient::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FxError::HttpClient(e.to_string()))?;

        Ok(Self {
            http,
            url: url.into(),
        })
    }

    /// Get the endpoint URL.
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl RateSource for HttpRateSource {
    fn name(&self) -> &str {
        "exchangerate-api"
    }

    async fn fetch(&self) -> FxResult<UpstreamRates> {
        debug!(url = %self.url, "Requesting rate table");

        let response = self
            .http
            .get(&self.url)
            .send()
            .await
            .map_err(|e| FxError::FetchFailed(format!("request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FxError::FetchFailed(format!(
                "API responded with status {}",
                status
            )));
        }

        response
            .json::<UpstreamRates>()
            .await
            .map_err(|e| FxError::FetchFailed(format!("malformed payload: {}", e)))
    }
}

/// Mock rate source for testing.
#[cfg(any(test, feature = "test-utils"))]
pub struct MockRateSource {
    name: String,
    response: parking_lot::Mutex<Option<UpstreamRates>>,
    delay: parking_lot::Mutex<Duration>,
    calls: std::sync::atomic::AtomicUsize,
}

#[cfg(any(test, feature = "test-utils"))]
impl MockRateSource {
    /// Create a mock that fails until rates are set.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            response: parking_lot::Mutex::new(None),
            delay: parking_lot::Mutex::new(Duration::ZERO),
            calls: std::sync::atomic::AtomicUsize::new(0),
        }
    }

    /// Serve the given table on every fetch.
    pub fn set_rates(&self, date: &str, rates: &[(&str, Decimal)]) {
        let payload = UpstreamRates {
            base: "USD".to_string(),
            date: date.to_string(),
            rates: rates
                .iter()
                .map(|(code, rate)| (code.to_string(), *rate))
                .collect(),
        };
        *self.response.lock() = Some(payload);
    }

    /// Fail every fetch from now on.
    pub fn set_failing(&self) {
        *self.response.lock() = None;
    }

    /// Delay each fetch, to hold a refresh in flight.
    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock() = delay;
    }

    /// Number of fetches issued so far.
    pub fn calls(&self) -> usize {
        self.calls.load(std::sync::atomic::Ordering::SeqCst)
    }
}

#[cfg(any(test, feature = "test-utils"))]
#[async_trait]
impl RateSource for MockRateSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch(&self) -> FxResult<UpstreamRates> {
        self.calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst);

        let delay = *self.delay.lock();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        self.response
            .lock()
            .clone()
            .ok_or_else(|| FxError::FetchFailed("mock source unavailable".to_string()))
    }
}
