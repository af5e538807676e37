//! Exchange-rate caching with TTL, stale fallback and static fallback rates.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use bookstore_common::{constants, now, Currency};
use chrono::Duration;
use parking_lot::RwLock;
use rust_decimal::Decimal;
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{debug, error, info, instrument, warn};

use crate::error::{FxError, FxResult};
use crate::fallback::FallbackTable;
use crate::provider::RateSource;
use crate::snapshot::RateSnapshot;

/// Configuration for rate cache.
#[derive(Debug, Clone)]
pub struct RateCacheConfig {
    /// How long a fetched snapshot stays fresh.
    pub ttl: Duration,
}

impl Default for RateCacheConfig {
    fn default() -> Self {
        Self {
            ttl: constants::rate_cache_ttl(),
        }
    }
}

/// Where a returned rate came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RateOrigin {
    /// Snapshot fetched within the TTL.
    Fresh,
    /// Snapshot older than the TTL, kept because the upstream failed.
    Stale,
    /// Hardcoded fallback table.
    Fallback,
}

#[derive(Debug, Default)]
struct Counters {
    refresh_attempts: AtomicU64,
    refresh_failures: AtomicU64,
    stale_hits: AtomicU64,
    fallback_hits: AtomicU64,
}

/// Caches the upstream USD rate table for one process.
///
/// The cache starts with no snapshot. Read operations refresh it when it is
/// missing or older than the TTL. Refreshes are single-flight: concurrent
/// callers that find the cache stale queue on one gate, and a caller that
/// gets through after another refresh attempt finished takes that attempt's
/// outcome instead of fetching again, whether it succeeded or failed. A
/// failed refresh never discards the snapshot already held.
pub struct RateCache {
    source: Arc<dyn RateSource>,
    fallback: FallbackTable,
    config: RateCacheConfig,
    snapshot: RwLock<Option<Arc<RateSnapshot>>>,
    refresh_gate: Mutex<()>,
    counters: Counters,
}

impl RateCache {
    /// Create a new rate cache with default configuration.
    pub fn new(source: Arc<dyn RateSource>, fallback: FallbackTable) -> Self {
        Self::with_config(source, fallback, RateCacheConfig::default())
    }

    /// Create a new rate cache with custom configuration.
    pub fn with_config(
        source: Arc<dyn RateSource>,
        fallback: FallbackTable,
        config: RateCacheConfig,
    ) -> Self {
        Self {
            source,
            fallback,
            config,
            snapshot: RwLock::new(None),
            refresh_gate: Mutex::new(()),
            counters: Counters::default(),
        }
    }

    /// Get the USD rate for `target`.
    ///
    /// Falls back to a stale snapshot, then to the fallback table, before
    /// giving up with [`FxError::RateUnavailable`].
    pub async fn get_rate(&self, target: &Currency) -> FxResult<Decimal> {
        self.get_rate_with_origin(target)
            .await
            .map(|(rate, _)| rate)
    }

    /// Same as [`get_rate`](Self::get_rate), also reporting where the rate
    /// came from.
    #[instrument(skip(self, target), fields(currency = %target))]
    pub async fn get_rate_with_origin(&self, target: &Currency) -> FxResult<(Decimal, RateOrigin)> {
        match self.fresh_snapshot() {
            Some(snapshot) => {
                if let Some(rate) = snapshot.rate(target) {
                    debug!("Cache hit");
                    return Ok((rate, RateOrigin::Fresh));
                }
            }
            None => {
                if let Err(e) = self.refresh().await {
                    debug!(error = %e, "No rate table available after refresh");
                }
            }
        }

        if let Some(snapshot) = self.snapshot() {
            if let Some(rate) = snapshot.rate(target) {
                if snapshot.is_fresh(self.config.ttl) {
                    return Ok((rate, RateOrigin::Fresh));
                }
                self.counters.stale_hits.fetch_add(1, Ordering::Relaxed);
                warn!(
                    fetched_at = %snapshot.fetched_at,
                    "Using stale rate, exchange rate API may be unavailable"
                );
                return Ok((rate, RateOrigin::Stale));
            }
        }

        if let Some(rate) = self.fallback.get(target) {
            self.counters.fallback_hits.fetch_add(1, Ordering::Relaxed);
            warn!(rate = %rate, "Using fallback rate, exchange rate API may be unavailable");
            return Ok((rate, RateOrigin::Fallback));
        }

        Err(FxError::RateUnavailable(target.clone()))
    }

    /// Get the whole rate table, refreshing it first if it is stale.
    ///
    /// A stale table is returned when the refresh fails. The fallback table
    /// is never used here since it only covers a handful of currencies.
    #[instrument(skip(self))]
    pub async fn get_all_rates(&self) -> FxResult<Arc<RateSnapshot>> {
        if let Some(snapshot) = self.fresh_snapshot() {
            return Ok(snapshot);
        }

        match self.refresh().await {
            Ok(snapshot) => {
                if !snapshot.is_fresh(self.config.ttl) {
                    warn!(fetched_at = %snapshot.fetched_at, "Returning stale rate table");
                }
                Ok(snapshot)
            }
            Err(e) => {
                debug!(error = %e, "No rate table available after refresh");
                Err(FxError::RatesUnavailable)
            }
        }
    }

    /// Check if a snapshot exists and was fetched within the TTL.
    pub fn is_fresh(&self) -> bool {
        self.fresh_snapshot().is_some()
    }

    /// Get the held snapshot without refreshing.
    pub fn snapshot(&self) -> Option<Arc<RateSnapshot>> {
        self.snapshot.read().clone()
    }

    /// Get the fallback table.
    pub fn fallback(&self) -> &FallbackTable {
        &self.fallback
    }

    /// Get the configured TTL.
    pub fn ttl(&self) -> Duration {
        self.config.ttl
    }

    /// Get cache statistics.
    pub fn stats(&self) -> RateCacheStats {
        let snapshot = self.snapshot();
        RateCacheStats {
            refresh_attempts: self.counters.refresh_attempts.load(Ordering::Relaxed),
            refresh_failures: self.counters.refresh_failures.load(Ordering::Relaxed),
            stale_hits: self.counters.stale_hits.load(Ordering::Relaxed),
            fallback_hits: self.counters.fallback_hits.load(Ordering::Relaxed),
            has_snapshot: snapshot.is_some(),
            fresh: snapshot.map_or(false, |s| s.is_fresh(self.config.ttl)),
        }
    }

    fn fresh_snapshot(&self) -> Option<Arc<RateSnapshot>> {
        self.snapshot()
            .filter(|snapshot| snapshot.is_fresh(self.config.ttl))
    }

    /// Refresh the held snapshot.
    ///
    /// On fetch failure the existing snapshot is returned unchanged; the
    /// error only surfaces when there is nothing to fall back on.
    async fn refresh(&self) -> FxResult<Arc<RateSnapshot>> {
        // Attempts are counted under the gate once they finish, so a changed
        // count means another caller fetched while this one was queued.
        let seen = self.counters.refresh_attempts.load(Ordering::Acquire);
        let _gate = self.refresh_gate.lock().await;

        if self.counters.refresh_attempts.load(Ordering::Acquire) != seen {
            debug!("Rate table refreshed by a concurrent caller");
            return self.snapshot().ok_or_else(|| {
                FxError::FetchFailed("concurrent refresh failed".to_string())
            });
        }

        if let Some(snapshot) = self.fresh_snapshot() {
            return Ok(snapshot);
        }

        info!(source = self.source.name(), "Fetching exchange rates");
        let fetched = self.fetch_snapshot().await;
        self.counters.refresh_attempts.fetch_add(1, Ordering::Release);

        match fetched {
            Ok(snapshot) => {
                info!(
                    base = %snapshot.base,
                    date = %snapshot.as_of_date,
                    currencies = snapshot.len(),
                    "Fetched exchange rates"
                );
                Ok(self.install(snapshot))
            }
            Err(e) => {
                self.counters.refresh_failures.fetch_add(1, Ordering::Relaxed);
                error!(error = %e, "Failed to fetch exchange rates");

                match self.snapshot() {
                    Some(existing) => {
                        warn!("Keeping stale rate table after fetch failure");
                        Ok(existing)
                    }
                    None => Err(e),
                }
            }
        }
    }

    async fn fetch_snapshot(&self) -> FxResult<RateSnapshot> {
        let payload = self.source.fetch().await?;
        RateSnapshot::from_upstream(payload, now())
    }

    /// Swap in a new snapshot unless the held one is newer.
    fn install(&self, snapshot: RateSnapshot) -> Arc<RateSnapshot> {
        let mut held = self.snapshot.write();

        if let Some(current) = held.as_ref() {
            if current.received_at() > snapshot.received_at() {
                warn!("Discarding rate table older than the held one");
                return current.clone();
            }
        }

        let snapshot = Arc::new(snapshot);
        *held = Some(snapshot.clone());
        snapshot
    }
}

/// Cache statistics.
#[derive(Debug, Clone, Serialize)]
pub struct RateCacheStats {
    pub refresh_attempts: u64,
    pub refresh_failures: u64,
    pub stale_hits: u64,
    pub fallback_hits: u64,
    pub has_snapshot: bool,
    pub fresh: bool,
}

/// Shared rate cache.
pub type SharedRateCache = Arc<RateCache>;
