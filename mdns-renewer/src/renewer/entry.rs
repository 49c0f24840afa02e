use std::fmt;
use std::time::{Duration, Instant};

use crate::config::RenewerConfig;
use crate::message::{DnsType, IpVersions, Media};

/// Identity of a renewal: one entry exists per (name, type).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RenewalKey {
    /// Fully-qualified record name.
    pub name: String,
    pub typ: DnsType,
}

impl fmt::Display for RenewalKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.name, self.typ)
    }
}

/// Renewal schedule for a single cached record.
#[derive(Debug, Clone)]
pub struct RenewalEntry {
    pub(crate) key: RenewalKey,
    pub(crate) media: Media,
    pub(crate) ip_versions: IpVersions,
    /// Next wake time.
    pub(crate) time: Instant,
    /// Wake time the entry is keyed by in the schedule. Lags `time` when the
    /// entry was renewed again after being queued.
    pub(crate) schedule_time: Instant,
    pub(crate) interval: Duration,
    pub(crate) queries_remaining: u32,
    pub(crate) delete: bool,
}

impl RenewalEntry {
    pub(crate) fn new(
        key: RenewalKey,
        media: Media,
        ip_versions: IpVersions,
        now: Instant,
    ) -> Self {
        Self {
            key,
            media,
            ip_versions,
            time: now,
            schedule_time: now,
            interval: Duration::ZERO,
            queries_remaining: 0,
            delete: false,
        }
    }

    /// Restarts the renewal clock for a record just observed with `ttl`.
    pub(crate) fn set_first_query(&mut self, now: Instant, ttl: u32, config: &RenewerConfig) {
        self.time = now + config.first_query_delay(ttl);
        self.interval = config.query_interval(ttl);
        self.queries_remaining = config.queries_to_attempt;
    }

    /// Advances to the next query slot, spending one query from the budget.
    ///
    /// # Panics
    ///
    /// Panics if the query budget is already exhausted.
    pub(crate) fn set_next_query_or_expiration(&mut self) {
        assert!(
            self.queries_remaining > 0,
            "renewal of {} has no queries remaining",
            self.key
        );
        self.time += self.interval;
        self.queries_remaining -= 1;
    }

    /// Whether the schedule key is stale relative to the next wake time.
    pub(crate) fn is_postponed(&self) -> bool {
        self.schedule_time != self.time
    }

    pub fn key(&self) -> &RenewalKey {
        &self.key
    }

    pub fn name(&self) -> &str {
        &self.key.name
    }

    pub fn typ(&self) -> DnsType {
        self.key.typ
    }

    pub fn media(&self) -> Media {
        self.media
    }

    pub fn ip_versions(&self) -> IpVersions {
        self.ip_versions
    }

    pub fn time(&self) -> Instant {
        self.time
    }

    pub fn schedule_time(&self) -> Instant {
        self.schedule_time
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn queries_remaining(&self) -> u32 {
        self.queries_remaining
    }

    /// Whether the record was seen on the wire within this entry's scope and
    /// is waiting to be dropped on the next pass.
    pub fn is_pending_delete(&self) -> bool {
        self.delete
    }
}
