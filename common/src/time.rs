//! Time utilities and constants for bookstore pricing.

use chrono::{DateTime, Duration, Utc};

/// Timing constants.
pub mod constants {
    use super::Duration;

    /// How long a fetched exchange-rate table stays fresh (1 hour).
    pub fn rate_cache_ttl() -> Duration {
        Duration::hours(1)
    }

    /// Upper bound on a single upstream rate request (5 seconds).
    pub fn rate_request_timeout() -> Duration {
        Duration::seconds(5)
    }
}

/// A timestamp with timezone (always UTC).
pub type Timestamp = DateTime<Utc>;

/// Get the current timestamp.
pub fn now() -> Timestamp {
    Utc::now()
}

/// Duration extensions for convenient conversion.
pub trait DurationExt {
    fn as_std(&self) -> std::time::Duration;
}

impl DurationExt for Duration {
    fn as_std(&self) -> std::time::Duration {
        self.to_std().unwrap_or(std::time::Duration::ZERO)
    }
}
