//! Configuration for the renewal engine.
//!
//! The defaults follow RFC 6762 §5.2: a record that stops being refreshed is
//! queried at 80%, 85%, 90% and 95% of its TTL and considered expired at
//! 100%.
//!
//! ```rust
//! use mdns_renewer::RenewerConfig;
//!
//! // Three queries at 25%, 50% and 75% of the TTL, expiry at 100%.
//! let config = RenewerConfig::default()
//!     .with_first_query_per_thousand(250)
//!     .with_query_interval_per_thousand(250)
//!     .with_queries_to_attempt(3);
//! assert_eq!(config.queries_to_attempt, 3);
//! ```

use std::time::Duration;

/// Default delay before the first renewal query, in thousandths of the TTL.
pub(crate) const DEFAULT_FIRST_QUERY_PER_THOUSAND: u32 = 800;

/// Default spacing between renewal queries, in thousandths of the TTL.
pub(crate) const DEFAULT_QUERY_INTERVAL_PER_THOUSAND: u32 = 50;

/// Default number of renewal queries sent before a record expires.
pub(crate) const DEFAULT_QUERIES_TO_ATTEMPT: u32 = 4;

/// Configuration for a [`Renewer`](crate::Renewer).
///
/// # Fields
///
/// - `first_query_per_thousand`: delay before the first query (default: 800)
/// - `query_interval_per_thousand`: spacing between queries (default: 50)
/// - `queries_to_attempt`: queries sent before expiry (default: 4)
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenewerConfig {
    /// Delay between observing a record and sending the first renewal query,
    /// in thousandths of the record's TTL.
    pub first_query_per_thousand: u32,

    /// Spacing between successive renewal queries, in thousandths of the
    /// record's TTL.
    ///
    /// A value of zero falls back to the default.
    pub query_interval_per_thousand: u32,

    /// Number of renewal queries sent before the record is declared expired.
    pub queries_to_attempt: u32,
}

impl Default for RenewerConfig {
    fn default() -> Self {
        Self {
            first_query_per_thousand: DEFAULT_FIRST_QUERY_PER_THOUSAND,
            query_interval_per_thousand: DEFAULT_QUERY_INTERVAL_PER_THOUSAND,
            queries_to_attempt: DEFAULT_QUERIES_TO_ATTEMPT,
        }
    }
}

impl RenewerConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the delay before the first renewal query.
    pub fn with_first_query_per_thousand(mut self, per_thousand: u32) -> Self {
        self.first_query_per_thousand = per_thousand;
        self
    }

    /// Set the spacing between renewal queries.
    ///
    /// A value of zero will use the default spacing.
    pub fn with_query_interval_per_thousand(mut self, per_thousand: u32) -> Self {
        self.query_interval_per_thousand = per_thousand;
        self
    }

    /// Set the number of renewal queries sent before a record expires.
    pub fn with_queries_to_attempt(mut self, queries: u32) -> Self {
        self.queries_to_attempt = queries;
        self
    }

    /// Delay before the first renewal query for a record with `ttl` seconds.
    pub(crate) fn first_query_delay(&self, ttl: u32) -> Duration {
        per_thousand_of(ttl, self.first_query_per_thousand)
    }

    /// Spacing between renewal queries for a record with `ttl` seconds.
    pub(crate) fn query_interval(&self, ttl: u32) -> Duration {
        let per_thousand = if self.query_interval_per_thousand == 0 {
            DEFAULT_QUERY_INTERVAL_PER_THOUSAND
        } else {
            self.query_interval_per_thousand
        };
        per_thousand_of(ttl, per_thousand)
    }
}

fn per_thousand_of(ttl: u32, per_thousand: u32) -> Duration {
    Duration::from_millis(u64::from(ttl) * u64::from(per_thousand))
}
