//! # mdns-renewer
//!
//! A sans-I/O mDNS cache record renewal engine for Rust.
//!
//! RFC 6762 §5.2 asks a querier that wants to keep a cached record alive to
//! re-query for it as the record approaches the end of its lifetime, and
//! §10.1 has records whose TTL runs out removed from the cache. This crate
//! implements that bookkeeping as a [`sansio::Protocol`], so it can be
//! plugged into any event loop (tokio, async-std, smol, or synchronous I/O).
//!
//! ## Sans-I/O Design
//!
//! The [`Renewer`] never touches a socket and never reads the clock:
//!
//! - Records that land in the cache are fed in with [`Renewer::renew()`]
//! - Records observed on the wire are fed in with [`Renewer::receive_resource()`]
//! - `poll_timeout()` says when the next renewal is due and
//!   `handle_timeout()` processes it
//! - `poll_write()` yields the renewal queries and TTL 0 expirations to send
//!
//! ## Quick Start
//!
//! ```rust
//! use bytes::Bytes;
//! use mdns_renewer::{
//!     DnsResource, DnsType, IpVersions, Media, Renewer, RenewerConfig, ResourceSection,
//!     Transmit,
//! };
//! use sansio::Protocol;
//! use std::time::Instant;
//!
//! let mut renewer = Renewer::new(RenewerConfig::default());
//! let start = Instant::now();
//!
//! let record = DnsResource::new("nas.local", DnsType::Aaaa, 120, Bytes::new());
//! renewer
//!     .renew(start, &record, Media::Both, IpVersions::V6)
//!     .unwrap();
//!
//! // Nobody refreshes the record: four queries, then an expiration.
//! let mut questions = 0;
//! while let Some(deadline) = renewer.poll_timeout() {
//!     renewer.handle_timeout(deadline).unwrap();
//!     while let Some(transmit) = renewer.poll_write() {
//!         match transmit {
//!             Transmit::Question { .. } => questions += 1,
//!             Transmit::Resource { resource, section, .. } => {
//!                 assert_eq!(section, ResourceSection::Expired);
//!                 assert_eq!(resource.ttl, 0);
//!             }
//!         }
//!     }
//! }
//! assert_eq!(questions, 4);
//! assert_eq!(renewer.entry_count(), 0);
//! ```
//!
//! ## Event Loop Pattern
//!
//! ```text
//! loop {
//!     // 1. Send any queued transmits
//!     while let Some(transmit) = renewer.poll_write() {
//!         transceiver.send(transmit);
//!     }
//!
//!     // 2. Wait for network activity or the next renewal
//!     select! {
//!         (resource, section, sender) = transceiver.recv() => {
//!             renewer.receive_resource(&resource, section, &sender);
//!         }
//!         _ = sleep_until(renewer.poll_timeout()) => {
//!             renewer.handle_timeout(Instant::now());
//!         }
//!     }
//! }
//! ```

#![warn(rust_2018_idioms)]

pub(crate) mod config;
pub mod error;
pub(crate) mod message;
pub(crate) mod renewer;

pub use config::RenewerConfig;
pub use error::{Error, Result};
pub use message::{
    DnsQuestion, DnsResource, DnsType, IpVersions, MDNS_DEST_ADDR, MDNS_DEST_ADDR_V6,
    MDNS_MULTICAST_IPV4, MDNS_MULTICAST_IPV6, MDNS_PORT, Media, ReplyAddress, ResourceSection,
};
pub use renewer::entry::{RenewalEntry, RenewalKey};
pub use renewer::{ReceivedResource, RenewRequest, Renewer, Transmit};
