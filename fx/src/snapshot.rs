//! Exchange-rate snapshots.

use std::collections::HashMap;
use std::time::Instant;

use bookstore_common::{Currency, DurationExt, Timestamp};
use chrono::Duration;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::warn;

use crate::error::{FxError, FxResult};
use crate::provider::UpstreamRates;

/// A full rate table as fetched from the upstream provider.
///
/// Snapshots are immutable once built. The cache replaces the held snapshot
/// as a whole and never edits one in place.
///
/// `fetched_at` is the wall-clock time reported to callers. Freshness and
/// install ordering use `received_at`, a monotonic instant, so a system
/// clock step does not make a table look newer or older than it is.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RateSnapshot {
    /// Currency the rates are quoted against.
    pub base: Currency,
    /// Date reported by the upstream provider.
    pub as_of_date: String,
    /// Multiplier from `base` to each currency. All values are positive.
    pub rates: HashMap<Currency, Decimal>,
    /// When this snapshot was retrieved locally.
    pub fetched_at: Timestamp,
    #[serde(skip)]
    received_at: Instant,
}

impl RateSnapshot {
    /// Build a snapshot, dropping entries that are not strictly positive.
    pub fn new(
        base: Currency,
        as_of_date: impl Into<String>,
        rates: impl IntoIterator<Item = (Currency, Decimal)>,
        fetched_at: Timestamp,
    ) -> FxResult<Self> {
        let rates: HashMap<Currency, Decimal> = rates
            .into_iter()
            .filter(|(currency, rate)| {
                if *rate > Decimal::ZERO {
                    true
                } else {
                    warn!(currency = %currency, rate = %rate, "Dropping non-positive rate");
                    false
                }
            })
            .collect();

        if rates.is_empty() {
            return Err(FxError::FetchFailed(
                "rate table contains no usable rates".to_string(),
            ));
        }

        Ok(Self {
            base,
            as_of_date: as_of_date.into(),
            rates,
            fetched_at,
            received_at: Instant::now(),
        })
    }

    /// Build a snapshot from an upstream payload.
    pub fn from_upstream(payload: UpstreamRates, fetched_at: Timestamp) -> FxResult<Self> {
        Self::new(
            Currency::new(payload.base),
            payload.date,
            payload
                .rates
                .into_iter()
                .map(|(code, rate)| (Currency::new(code), rate)),
            fetched_at,
        )
    }

    /// Get the rate for a currency.
    pub fn rate(&self, currency: &Currency) -> Option<Decimal> {
        self.rates.get(currency).copied()
    }

    /// Monotonic instant at which the snapshot was built.
    pub fn received_at(&self) -> Instant {
        self.received_at
    }

    /// Check if the snapshot was built less than `ttl` ago.
    pub fn is_fresh(&self, ttl: Duration) -> bool {
        self.received_at.elapsed() < ttl.as_std()
    }

    /// Number of currencies in the table.
    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }
}
