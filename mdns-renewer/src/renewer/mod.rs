//! Sans-I/O mDNS resource renewer.
//!
//! This module provides [`Renewer`], the agent that keeps cached mDNS records
//! fresh (RFC 6762 §5.2, §10.1). Records that keep being refreshed on the
//! wire are left alone. Records that stop being refreshed are queried a few
//! times before their TTL runs out and are announced as expired if nobody
//! answers.
//!
//! # Overview
//!
//! The [`Renewer`] performs no I/O and never reads the clock. The caller is
//! responsible for:
//!
//! 1. **Renewal intents**: calling [`Renewer::renew()`] (or
//!    [`handle_write()`](sansio::Protocol::handle_write)) whenever a record
//!    lands in the cache
//! 2. **Wire observations**: calling [`Renewer::receive_resource()`] (or
//!    [`handle_read()`](sansio::Protocol::handle_read)) for every record
//!    received from the network
//! 3. **Timing**: calling `handle_timeout()` when `poll_timeout()` expires
//! 4. **Sending**: draining `poll_write()` and handing each [`Transmit`] to
//!    the transceiver
//!
//! # Entry lifecycle
//!
//! ```text
//! [new] --renew()--> [ACTIVE, queries_remaining=N]
//! [ACTIVE] --timeout, budget>0--> [ACTIVE, queries_remaining-1]  (question sent)
//! [ACTIVE] --timeout, budget==0--> [EXPIRED]                     (TTL 0 sent, entry dropped)
//! [ACTIVE] --receive_resource(in scope)--> [PENDING_DELETE]
//! [PENDING_DELETE] --timeout--> [DELETED]                        (TTL 0 sent, entry dropped)
//! [ACTIVE]/[PENDING_DELETE] --renew()--> [ACTIVE, queries_remaining=N]
//! ```

#[cfg(test)]
mod renewer_test;

pub(crate) mod entry;
pub(crate) mod store;

use std::collections::VecDeque;
use std::time::Instant;

use crate::config::RenewerConfig;
use crate::error::{Error, Result};
use crate::message::{
    DnsQuestion, DnsResource, DnsType, IpVersions, Media, ReplyAddress, ResourceSection,
    fully_qualified,
};
use entry::{RenewalEntry, RenewalKey};
use store::RenewalStore;

/// A request to keep a cached record fresh.
///
/// Written to the renewer with [`handle_write()`](sansio::Protocol::handle_write);
/// equivalent to calling [`Renewer::renew()`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenewRequest {
    /// When the record was observed.
    pub now: Instant,
    /// The record, with the TTL it was observed with.
    pub resource: DnsResource,
    /// Media the record was learned over.
    pub media: Media,
    /// IP families the record was learned over.
    pub ip_versions: IpVersions,
}

/// A record received from the network, already parsed.
///
/// Read into the renewer with [`handle_read()`](sansio::Protocol::handle_read);
/// equivalent to calling [`Renewer::receive_resource()`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceivedResource {
    pub resource: DnsResource,
    /// Section of the message the record appeared in.
    pub section: ResourceSection,
    /// Where the message came from.
    pub sender: ReplyAddress,
}

/// Outbound traffic produced by the renewer.
///
/// Retrieve with [`poll_write()`](sansio::Protocol::poll_write).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transmit {
    /// A renewal query to multicast to `destination`.
    Question {
        question: DnsQuestion,
        destination: ReplyAddress,
    },
    /// A resource to deliver to `destination`.
    ///
    /// The renewer only produces TTL 0 records in the
    /// [`Expired`](ResourceSection::Expired) section, announcing that a
    /// cached record is gone.
    Resource {
        resource: DnsResource,
        section: ResourceSection,
        destination: ReplyAddress,
    },
}

/// Sans-I/O mDNS resource renewer.
///
/// Tracks one renewal schedule per (name, type). Each schedule starts at a
/// fraction of the record's TTL, sends a bounded number of renewal queries
/// spaced by a fixed interval, and ends either when the record is seen again
/// on the wire or when the budget runs out and the record is declared
/// expired.
///
/// # Example
///
/// ```rust
/// use bytes::Bytes;
/// use mdns_renewer::{
///     DnsResource, DnsType, IpVersions, Media, Renewer, RenewerConfig, Transmit,
/// };
/// use sansio::Protocol;
/// use std::time::{Duration, Instant};
///
/// let mut renewer = Renewer::new(RenewerConfig::default());
/// let start = Instant::now();
///
/// let record = DnsResource::new("printer.local", DnsType::A, 100, Bytes::new());
/// renewer
///     .renew(start, &record, Media::Wired, IpVersions::V4)
///     .unwrap();
///
/// // The first renewal query is due at 80% of the TTL.
/// let deadline = renewer.poll_timeout().unwrap();
/// assert_eq!(deadline, start + Duration::from_secs(80));
///
/// renewer.handle_timeout(deadline).unwrap();
/// match renewer.poll_write() {
///     Some(Transmit::Question { question, .. }) => {
///         assert_eq!(question.name, "printer.local.");
///     }
///     other => panic!("expected a renewal query, got {other:?}"),
/// }
/// ```
pub struct Renewer {
    config: RenewerConfig,

    /// Entries, identity index and schedule
    store: RenewalStore,

    /// Outgoing transmit queue
    transmits: VecDeque<Transmit>,

    /// Whether the renewer is closed
    closed: bool,
}

impl Renewer {
    /// Create a new renewer with the given configuration.
    pub fn new(config: RenewerConfig) -> Self {
        Self {
            config,
            store: RenewalStore::new(),
            transmits: VecDeque::new(),
            closed: false,
        }
    }

    /// Start, or restart, renewal of `resource`.
    ///
    /// A record seen for the first time gets a new schedule. A record that is
    /// already tracked has its clock reset, its pending deletion cancelled,
    /// and its scope widened to cover `media` and `ip_versions` as well.
    ///
    /// # Errors
    ///
    /// - [`Error::ErrZeroTtlRenewal`] if `resource` has a TTL of 0
    /// - [`Error::ErrRenewerClosed`] if the renewer has been closed
    pub fn renew(
        &mut self,
        now: Instant,
        resource: &DnsResource,
        media: Media,
        ip_versions: IpVersions,
    ) -> Result<()> {
        if self.closed {
            return Err(Error::ErrRenewerClosed);
        }
        if resource.ttl == 0 {
            log::warn!(
                "Refusing to renew {} {} with zero ttl",
                resource.name,
                resource.typ
            );
            return Err(Error::ErrZeroTtlRenewal(resource.name.clone(), resource.typ));
        }

        let key = RenewalKey {
            name: fully_qualified(&resource.name),
            typ: resource.typ,
        };

        if let Some(entry) = self.store.get_mut(&key) {
            entry.set_first_query(now, resource.ttl, &self.config);
            entry.delete = false;
            entry.media = entry.media.union(media);
            entry.ip_versions = entry.ip_versions.union(ip_versions);
            log::debug!(
                "Restarted renewal of {} over {}/{}",
                entry.key,
                entry.media,
                entry.ip_versions
            );
        } else {
            let mut entry = RenewalEntry::new(key, media, ip_versions, now);
            entry.set_first_query(now, resource.ttl, &self.config);
            log::debug!(
                "Started renewal of {} over {}/{}, first query in {:?}",
                entry.key,
                media,
                ip_versions,
                entry.time.saturating_duration_since(now)
            );
            self.store.insert(entry);
        }

        Ok(())
    }

    /// Note that `resource` was received from the network.
    ///
    /// If the record is being renewed and `sender` lies within the scope the
    /// renewal covers, the renewal is marked for deletion. The entry stays in
    /// the schedule until its slot next comes due.
    ///
    /// # Errors
    ///
    /// - [`Error::ErrExpiredSectionReceived`] if `section` is
    ///   [`ResourceSection::Expired`]
    /// - [`Error::ErrRenewerClosed`] if the renewer has been closed
    pub fn receive_resource(
        &mut self,
        resource: &DnsResource,
        section: ResourceSection,
        sender: &ReplyAddress,
    ) -> Result<()> {
        if self.closed {
            return Err(Error::ErrRenewerClosed);
        }
        if section == ResourceSection::Expired {
            log::warn!(
                "Ignoring {} {} received in the expired section",
                resource.name,
                resource.typ
            );
            return Err(Error::ErrExpiredSectionReceived);
        }

        let key = RenewalKey {
            name: fully_qualified(&resource.name),
            typ: resource.typ,
        };

        if let Some(entry) = self.store.get_mut(&key)
            && sender.matches_media(entry.media)
            && sender.matches_ip_versions(entry.ip_versions)
        {
            log::debug!(
                "Renewal of {} satisfied by {} from {}",
                entry.key,
                section,
                sender.socket_address
            );
            entry.delete = true;
        }

        Ok(())
    }

    /// Number of records currently being renewed.
    pub fn entry_count(&self) -> usize {
        self.store.len()
    }

    /// Whether a renewal is tracked for `name` and `typ`.
    pub fn is_renewing(&self, name: &str, typ: DnsType) -> bool {
        self.entry(name, typ).is_some()
    }

    /// The renewal tracked for `name` and `typ`, if any.
    pub fn entry(&self, name: &str, typ: DnsType) -> Option<&RenewalEntry> {
        self.store.get(&RenewalKey {
            name: fully_qualified(name),
            typ,
        })
    }

    /// All tracked renewals, in no particular order.
    pub fn entries(&self) -> impl Iterator<Item = &RenewalEntry> {
        self.store.iter()
    }

    fn fire(&mut self, now: Instant) {
        while let Some(mut entry) = self.store.pop_due(now) {
            if entry.delete {
                log::trace!("Dropping renewal of {}", entry.key);
                self.send_expiration(&entry);
            } else if entry.is_postponed() {
                log::trace!(
                    "Renewal of {} postponed by {:?}",
                    entry.key,
                    entry.time.saturating_duration_since(entry.schedule_time)
                );
                self.store.insert(entry);
            } else if entry.queries_remaining == 0 {
                log::trace!("Renewal of {} ran out of queries", entry.key);
                self.send_expiration(&entry);
            } else {
                self.send_question(&entry);
                entry.set_next_query_or_expiration();
                self.store.insert(entry);
            }
        }
    }

    fn send_question(&mut self, entry: &RenewalEntry) {
        log::trace!(
            "Queuing renewal query for {} ({} remaining)",
            entry.key,
            entry.queries_remaining
        );
        self.transmits.push_back(Transmit::Question {
            question: DnsQuestion::new(&entry.key.name, entry.key.typ),
            destination: ReplyAddress::multicast(entry.media, entry.ip_versions),
        });
    }

    fn send_expiration(&mut self, entry: &RenewalEntry) {
        log::trace!("Queuing expiration of {}", entry.key);
        self.transmits.push_back(Transmit::Resource {
            resource: DnsResource {
                name: entry.key.name.clone(),
                typ: entry.key.typ,
                ttl: 0,
                ..Default::default()
            },
            section: ResourceSection::Expired,
            destination: ReplyAddress::multicast(entry.media, entry.ip_versions),
        });
    }
}

impl sansio::Protocol<ReceivedResource, RenewRequest, ()> for Renewer {
    type Rout = ();
    type Wout = Transmit;
    type Eout = ();
    type Error = Error;
    type Time = Instant;

    /// Process a record received from the network.
    ///
    /// # Errors
    ///
    /// Same as [`Renewer::receive_resource()`].
    fn handle_read(&mut self, msg: ReceivedResource) -> Result<()> {
        self.receive_resource(&msg.resource, msg.section, &msg.sender)
    }

    /// The renewer doesn't produce read outputs.
    fn poll_read(&mut self) -> Option<Self::Rout> {
        None
    }

    /// Start or restart renewal of a record.
    ///
    /// # Errors
    ///
    /// Same as [`Renewer::renew()`].
    fn handle_write(&mut self, msg: RenewRequest) -> Result<()> {
        self.renew(msg.now, &msg.resource, msg.media, msg.ip_versions)
    }

    /// Get the next transmit.
    ///
    /// Transmits are queued by `handle_timeout()`: renewal queries for
    /// records that are due, and TTL 0 expirations for records that were
    /// refreshed on the wire or ran out of queries.
    fn poll_write(&mut self) -> Option<Self::Wout> {
        self.transmits.pop_front()
    }

    /// The renewer does not use external events.
    fn handle_event(&mut self, _evt: ()) -> Result<()> {
        Ok(())
    }

    /// The renewer doesn't produce events.
    fn poll_event(&mut self) -> Option<Self::Eout> {
        None
    }

    /// Process every renewal due at `now`.
    ///
    /// Due entries are handled in ascending schedule order until the
    /// earliest remaining one lies in the future. Calling this early, or with
    /// nothing scheduled, does nothing.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ErrRenewerClosed`] if the renewer has been closed.
    fn handle_timeout(&mut self, now: Self::Time) -> Result<()> {
        if self.closed {
            return Err(Error::ErrRenewerClosed);
        }
        self.fire(now);
        Ok(())
    }

    /// Get the next timeout deadline.
    ///
    /// Returns the schedule time of the earliest renewal, or `None` when
    /// nothing is being renewed.
    fn poll_timeout(&mut self) -> Option<Self::Time> {
        self.store.next_wake()
    }

    /// Close the renewer.
    ///
    /// This drops every renewal and queued transmit. After closing,
    /// `renew()`, `receive_resource()` and `handle_timeout()` return
    /// [`Error::ErrRenewerClosed`].
    fn close(&mut self) -> Result<()> {
        self.closed = true;
        self.store.clear();
        self.transmits.clear();
        Ok(())
    }
}
