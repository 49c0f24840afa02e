use super::*;
use crate::message::{MDNS_DEST_ADDR, MDNS_DEST_ADDR_V6, MDNS_PORT};
use bytes::Bytes;
use sansio::Protocol;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};
use std::time::Duration;

/// Three queries at 25%, 50% and 75% of the TTL, expiry at 100%.
fn quarter_config() -> RenewerConfig {
    RenewerConfig::default()
        .with_first_query_per_thousand(250)
        .with_query_interval_per_thousand(250)
        .with_queries_to_attempt(3)
}

fn record(name: &str, typ: DnsType, ttl: u32) -> DnsResource {
    DnsResource::new(name, typ, ttl, Bytes::from_static(&[192, 168, 1, 10]))
}

fn sender_v4(media: Media) -> ReplyAddress {
    ReplyAddress::new(
        SocketAddr::new(IpAddr::V4(Ipv4Addr::new(192, 168, 1, 10)), MDNS_PORT),
        IpAddr::V4(Ipv4Addr::new(192, 168, 1, 2)),
        media,
    )
}

fn sender_v6(media: Media) -> ReplyAddress {
    ReplyAddress::new(
        SocketAddr::new(
            IpAddr::V6(Ipv6Addr::new(0xfe80, 0, 0, 0, 0, 0, 0, 0x10)),
            MDNS_PORT,
        ),
        IpAddr::V6(Ipv6Addr::new(0xfe80, 0, 0, 0, 0, 0, 0, 0x2)),
        media,
    )
}

fn drain(renewer: &mut Renewer) -> Vec<Transmit> {
    std::iter::from_fn(|| renewer.poll_write()).collect()
}

fn secs(n: u64) -> Duration {
    Duration::from_secs(n)
}

fn assert_question(transmit: &Transmit, name: &str, typ: DnsType) {
    match transmit {
        Transmit::Question {
            question,
            destination,
        } => {
            assert_eq!(question.name, name);
            assert_eq!(question.typ, typ);
            assert!(!question.unicast_response);
            assert!(destination.is_multicast());
        }
        other => panic!("expected a renewal query, got {other:?}"),
    }
}

fn assert_expiration(transmit: &Transmit, name: &str, typ: DnsType) {
    match transmit {
        Transmit::Resource {
            resource,
            section,
            destination,
        } => {
            assert_eq!(resource.name, name);
            assert_eq!(resource.typ, typ);
            assert_eq!(resource.ttl, 0);
            assert_eq!(*section, ResourceSection::Expired);
            assert!(destination.is_multicast());
        }
        other => panic!("expected an expiration, got {other:?}"),
    }
}

#[test]
fn test_renew_creates_entry() {
    let start = Instant::now();
    let mut renewer = Renewer::new(quarter_config());

    renewer
        .renew(start, &record("foo.local", DnsType::A, 4), Media::Wired, IpVersions::V4)
        .unwrap();

    assert_eq!(renewer.entry_count(), 1);
    assert!(renewer.is_renewing("foo.local", DnsType::A));
    assert!(renewer.is_renewing("foo.local.", DnsType::A));
    assert!(!renewer.is_renewing("foo.local", DnsType::Aaaa));

    let entry = renewer.entry("foo.local", DnsType::A).unwrap();
    assert_eq!(entry.name(), "foo.local.");
    assert_eq!(entry.typ(), DnsType::A);
    assert_eq!(entry.media(), Media::Wired);
    assert_eq!(entry.ip_versions(), IpVersions::V4);
    assert_eq!(entry.queries_remaining(), 3);
    assert_eq!(entry.time(), start + secs(1));
    assert_eq!(entry.schedule_time(), start + secs(1));
    assert_eq!(entry.interval(), secs(1));
    assert!(!entry.is_pending_delete());

    assert_eq!(renewer.poll_timeout(), Some(start + secs(1)));
    assert!(renewer.poll_write().is_none());
}

#[test]
fn test_unrefreshed_record_is_queried_then_expires() {
    let start = Instant::now();
    let mut renewer = Renewer::new(quarter_config());
    let foo = record("foo.local", DnsType::A, 4);
    renewer
        .renew(start, &foo, Media::Wired, IpVersions::V4)
        .unwrap();

    for (tick, remaining) in [(1, 2), (2, 1), (3, 0)] {
        assert_eq!(renewer.poll_timeout(), Some(start + secs(tick)));
        renewer.handle_timeout(start + secs(tick)).unwrap();

        let transmits = drain(&mut renewer);
        assert_eq!(transmits.len(), 1);
        assert_question(&transmits[0], "foo.local.", DnsType::A);
        if let Transmit::Question { destination, .. } = &transmits[0] {
            assert_eq!(*destination, ReplyAddress::multicast(Media::Wired, IpVersions::V4));
            assert_eq!(destination.socket_address, MDNS_DEST_ADDR);
        }

        let entry = renewer.entry("foo.local", DnsType::A).unwrap();
        assert_eq!(entry.queries_remaining(), remaining);
        assert_eq!(entry.time(), start + secs(tick + 1));
    }

    assert_eq!(renewer.poll_timeout(), Some(start + secs(4)));
    renewer.handle_timeout(start + secs(4)).unwrap();

    let transmits = drain(&mut renewer);
    assert_eq!(transmits.len(), 1);
    assert_expiration(&transmits[0], "foo.local.", DnsType::A);
    if let Transmit::Resource { resource, .. } = &transmits[0] {
        assert_eq!(*resource, foo.expired());
    }

    assert_eq!(renewer.entry_count(), 0);
    assert!(!renewer.is_renewing("foo.local", DnsType::A));
    assert_eq!(renewer.poll_timeout(), None);
}

#[test]
fn test_overdue_timeout_catches_up_in_one_pass() {
    let start = Instant::now();
    let mut renewer = Renewer::new(quarter_config());
    renewer
        .renew(start, &record("foo.local", DnsType::A, 4), Media::Wired, IpVersions::V4)
        .unwrap();

    // One late wake-up processes every slot that has come due.
    renewer.handle_timeout(start + secs(10)).unwrap();

    let transmits = drain(&mut renewer);
    assert_eq!(transmits.len(), 4);
    for transmit in &transmits[..3] {
        assert_question(transmit, "foo.local.", DnsType::A);
    }
    assert_expiration(&transmits[3], "foo.local.", DnsType::A);
    assert_eq!(renewer.entry_count(), 0);
}

#[test]
fn test_received_resource_in_scope_deletes_entry() {
    let start = Instant::now();
    let mut renewer = Renewer::new(quarter_config());
    let foo = record("foo.local", DnsType::A, 4);
    renewer
        .renew(start, &foo, Media::Wired, IpVersions::V4)
        .unwrap();

    renewer
        .receive_resource(&foo, ResourceSection::Answer, &sender_v4(Media::Wired))
        .unwrap();

    // Deletion is deferred until the entry's slot comes due.
    let entry = renewer.entry("foo.local", DnsType::A).unwrap();
    assert!(entry.is_pending_delete());
    assert_eq!(renewer.entry_count(), 1);
    assert_eq!(renewer.poll_timeout(), Some(start + secs(1)));
    assert!(renewer.poll_write().is_none());

    renewer.handle_timeout(start + secs(1)).unwrap();

    let transmits = drain(&mut renewer);
    assert_eq!(transmits.len(), 1);
    assert_expiration(&transmits[0], "foo.local.", DnsType::A);
    assert_eq!(renewer.entry_count(), 0);
    assert_eq!(renewer.poll_timeout(), None);
}

#[test]
fn test_received_resource_out_of_scope_is_ignored() {
    let start = Instant::now();
    let mut renewer = Renewer::new(quarter_config());
    let foo = record("foo.local", DnsType::A, 4);
    renewer
        .renew(start, &foo, Media::Wired, IpVersions::V4)
        .unwrap();

    renewer
        .receive_resource(&foo, ResourceSection::Answer, &sender_v4(Media::Wireless))
        .unwrap();
    renewer
        .receive_resource(&foo, ResourceSection::Additional, &sender_v6(Media::Wired))
        .unwrap();

    assert!(
        !renewer
            .entry("foo.local", DnsType::A)
            .unwrap()
            .is_pending_delete()
    );

    renewer.handle_timeout(start + secs(1)).unwrap();
    let transmits = drain(&mut renewer);
    assert_eq!(transmits.len(), 1);
    assert_question(&transmits[0], "foo.local.", DnsType::A);
    assert_eq!(renewer.entry_count(), 1);
}

#[test]
fn test_received_resource_matches_widened_scope() {
    let start = Instant::now();
    let mut renewer = Renewer::new(quarter_config());
    let foo = record("foo.local", DnsType::A, 4);
    renewer
        .renew(start, &foo, Media::Both, IpVersions::Both)
        .unwrap();

    renewer
        .receive_resource(&foo, ResourceSection::Answer, &sender_v6(Media::Wireless))
        .unwrap();
    assert!(
        renewer
            .entry("foo.local", DnsType::A)
            .unwrap()
            .is_pending_delete()
    );
}

#[test]
fn test_received_unknown_resource_is_ignored() {
    let start = Instant::now();
    let mut renewer = Renewer::new(quarter_config());
    renewer
        .renew(start, &record("foo.local", DnsType::A, 4), Media::Wired, IpVersions::V4)
        .unwrap();

    renewer
        .receive_resource(
            &record("bar.local", DnsType::A, 4),
            ResourceSection::Answer,
            &sender_v4(Media::Wired),
        )
        .unwrap();
    renewer
        .receive_resource(
            &record("foo.local", DnsType::Aaaa, 4),
            ResourceSection::Answer,
            &sender_v4(Media::Wired),
        )
        .unwrap();

    assert!(
        !renewer
            .entry("foo.local", DnsType::A)
            .unwrap()
            .is_pending_delete()
    );
    assert_eq!(renewer.entry_count(), 1);
}

#[test]
fn test_renew_widens_scope() {
    let start = Instant::now();
    let mut renewer = Renewer::new(quarter_config());
    let foo = record("foo.local", DnsType::A, 4);

    renewer
        .renew(start, &foo, Media::Wired, IpVersions::V4)
        .unwrap();
    renewer
        .renew(start, &foo, Media::Wired, IpVersions::V4)
        .unwrap();
    let entry = renewer.entry("foo.local", DnsType::A).unwrap();
    assert_eq!(entry.media(), Media::Wired);
    assert_eq!(entry.ip_versions(), IpVersions::V4);

    renewer
        .renew(start, &foo, Media::Wireless, IpVersions::V6)
        .unwrap();
    let entry = renewer.entry("foo.local", DnsType::A).unwrap();
    assert_eq!(entry.media(), Media::Both);
    assert_eq!(entry.ip_versions(), IpVersions::Both);

    // Unions never narrow.
    renewer
        .renew(start, &foo, Media::Wired, IpVersions::V4)
        .unwrap();
    let entry = renewer.entry("foo.local", DnsType::A).unwrap();
    assert_eq!(entry.media(), Media::Both);
    assert_eq!(entry.ip_versions(), IpVersions::Both);

    assert_eq!(renewer.entry_count(), 1);
}

#[test]
fn test_renew_resets_clock_and_clears_delete() {
    let start = Instant::now();
    let mut renewer = Renewer::new(quarter_config());
    let foo = record("foo.local", DnsType::A, 4);
    renewer
        .renew(start, &foo, Media::Wired, IpVersions::V4)
        .unwrap();

    renewer.handle_timeout(start + secs(1)).unwrap();
    renewer.handle_timeout(start + secs(2)).unwrap();
    assert_eq!(drain(&mut renewer).len(), 2);
    renewer
        .receive_resource(&foo, ResourceSection::Answer, &sender_v4(Media::Wired))
        .unwrap();

    let entry = renewer.entry("foo.local", DnsType::A).unwrap();
    assert_eq!(entry.queries_remaining(), 1);
    assert!(entry.is_pending_delete());

    renewer
        .renew(start + secs(2), &foo, Media::Wired, IpVersions::V4)
        .unwrap();

    let entry = renewer.entry("foo.local", DnsType::A).unwrap();
    assert_eq!(entry.queries_remaining(), 3);
    assert!(!entry.is_pending_delete());
    assert_eq!(entry.time(), start + secs(3));

    // The entry still sits in its slot at start + 3s, which now matches its
    // reset clock, so a renewal query goes out rather than an expiration.
    renewer.handle_timeout(start + secs(3)).unwrap();
    let transmits = drain(&mut renewer);
    assert_eq!(transmits.len(), 1);
    assert_question(&transmits[0], "foo.local.", DnsType::A);
    assert_eq!(
        renewer
            .entry("foo.local", DnsType::A)
            .unwrap()
            .queries_remaining(),
        2
    );
}

#[test]
fn test_renew_of_queued_entry_postpones_it() {
    let start = Instant::now();
    let mut renewer = Renewer::new(quarter_config());
    let foo = record("foo.local", DnsType::A, 4);
    renewer
        .renew(start, &foo, Media::Wired, IpVersions::V4)
        .unwrap();

    // Seen again half a second later: the clock moves, the slot does not.
    renewer
        .renew(start + Duration::from_millis(500), &foo, Media::Wired, IpVersions::V4)
        .unwrap();
    let entry = renewer.entry("foo.local", DnsType::A).unwrap();
    assert_eq!(entry.schedule_time(), start + secs(1));
    assert_eq!(entry.time(), start + Duration::from_millis(1500));
    assert_eq!(renewer.poll_timeout(), Some(start + secs(1)));

    // The stale slot fires silently and moves the entry to its real time.
    renewer.handle_timeout(start + secs(1)).unwrap();
    assert!(renewer.poll_write().is_none());
    assert_eq!(renewer.entry_count(), 1);
    assert_eq!(renewer.poll_timeout(), Some(start + Duration::from_millis(1500)));
    assert_eq!(
        renewer
            .entry("foo.local", DnsType::A)
            .unwrap()
            .queries_remaining(),
        3
    );

    renewer
        .handle_timeout(start + Duration::from_millis(1500))
        .unwrap();
    let transmits = drain(&mut renewer);
    assert_eq!(transmits.len(), 1);
    assert_question(&transmits[0], "foo.local.", DnsType::A);
}

#[test]
fn test_renew_with_shorter_ttl_fires_at_old_slot() {
    let start = Instant::now();
    let mut renewer = Renewer::new(quarter_config());
    renewer
        .renew(start, &record("foo.local", DnsType::A, 8), Media::Wired, IpVersions::V4)
        .unwrap();
    renewer
        .renew(start, &record("foo.local", DnsType::A, 4), Media::Wired, IpVersions::V4)
        .unwrap();

    // The earlier clock is only noticed when the existing slot comes due.
    assert_eq!(renewer.poll_timeout(), Some(start + secs(2)));
    renewer.handle_timeout(start + secs(1)).unwrap();
    assert!(renewer.poll_write().is_none());

    // Moved back to its real time, the entry is overdue and catches up on
    // both the missed query at 1s and the one due at 2s.
    renewer.handle_timeout(start + secs(2)).unwrap();
    let transmits = drain(&mut renewer);
    assert_eq!(transmits.len(), 2);
    for transmit in &transmits {
        assert_question(transmit, "foo.local.", DnsType::A);
    }

    let entry = renewer.entry("foo.local", DnsType::A).unwrap();
    assert_eq!(entry.queries_remaining(), 1);
    assert_eq!(entry.time(), start + secs(3));
    assert_eq!(renewer.poll_timeout(), Some(start + secs(3)));
}

#[test]
fn test_timeout_only_processes_due_entries() {
    let start = Instant::now();
    let mut renewer = Renewer::new(quarter_config());
    renewer
        .renew(start, &record("r1.local", DnsType::A, 4), Media::Wired, IpVersions::V4)
        .unwrap();
    renewer
        .renew(start, &record("r2.local", DnsType::A, 8), Media::Wired, IpVersions::V4)
        .unwrap();
    assert_eq!(renewer.poll_timeout(), Some(start + secs(1)));

    renewer.handle_timeout(start + secs(1)).unwrap();

    let transmits = drain(&mut renewer);
    assert_eq!(transmits.len(), 1);
    assert_question(&transmits[0], "r1.local.", DnsType::A);

    let r2 = renewer.entry("r2.local", DnsType::A).unwrap();
    assert_eq!(r2.queries_remaining(), 3);
    assert_eq!(r2.schedule_time(), start + secs(2));
    assert_eq!(renewer.entry_count(), 2);
    assert_eq!(renewer.poll_timeout(), Some(start + secs(2)));
}

#[test]
fn test_premature_timeout_does_nothing() {
    let start = Instant::now();
    let mut renewer = Renewer::new(quarter_config());
    renewer
        .renew(start, &record("foo.local", DnsType::A, 4), Media::Wired, IpVersions::V4)
        .unwrap();

    renewer
        .handle_timeout(start + Duration::from_millis(999))
        .unwrap();

    assert!(renewer.poll_write().is_none());
    assert_eq!(renewer.poll_timeout(), Some(start + secs(1)));
    assert_eq!(
        renewer
            .entry("foo.local", DnsType::A)
            .unwrap()
            .queries_remaining(),
        3
    );
}

#[test]
fn test_idle_timeout_does_nothing() {
    let mut renewer = Renewer::new(RenewerConfig::default());

    renewer.handle_timeout(Instant::now()).unwrap();

    assert!(renewer.poll_write().is_none());
    assert_eq!(renewer.poll_timeout(), None);
    assert_eq!(renewer.entry_count(), 0);
}

#[test]
fn test_same_name_different_types_are_independent() {
    let start = Instant::now();
    let mut renewer = Renewer::new(quarter_config());
    renewer
        .renew(start, &record("host.local", DnsType::A, 4), Media::Wired, IpVersions::V4)
        .unwrap();
    renewer
        .renew(start, &record("host.local", DnsType::Aaaa, 4), Media::Wired, IpVersions::V6)
        .unwrap();
    assert_eq!(renewer.entry_count(), 2);

    renewer
        .receive_resource(
            &record("host.local", DnsType::A, 4),
            ResourceSection::Answer,
            &sender_v4(Media::Wired),
        )
        .unwrap();

    renewer.handle_timeout(start + secs(1)).unwrap();
    let transmits = drain(&mut renewer);
    assert_eq!(transmits.len(), 2);
    assert_expiration(&transmits[0], "host.local.", DnsType::A);
    assert_question(&transmits[1], "host.local.", DnsType::Aaaa);
    if let Transmit::Question { destination, .. } = &transmits[1] {
        assert_eq!(destination.socket_address, MDNS_DEST_ADDR_V6);
        assert_eq!(destination.ip_versions, IpVersions::V6);
    }
    assert_eq!(renewer.entry_count(), 1);
}

#[test]
fn test_zero_ttl_renewal_is_rejected() {
    let start = Instant::now();
    let mut renewer = Renewer::new(quarter_config());

    let result = renewer.renew(
        start,
        &record("foo.local", DnsType::A, 0),
        Media::Wired,
        IpVersions::V4,
    );
    assert_eq!(
        result,
        Err(Error::ErrZeroTtlRenewal("foo.local.".to_string(), DnsType::A))
    );
    assert_eq!(renewer.entry_count(), 0);
    assert_eq!(renewer.poll_timeout(), None);
}

#[test]
fn test_expired_section_is_rejected() {
    let start = Instant::now();
    let mut renewer = Renewer::new(quarter_config());
    let foo = record("foo.local", DnsType::A, 4);
    renewer
        .renew(start, &foo, Media::Wired, IpVersions::V4)
        .unwrap();

    let result = renewer.receive_resource(
        &foo.expired(),
        ResourceSection::Expired,
        &sender_v4(Media::Wired),
    );
    assert_eq!(result, Err(Error::ErrExpiredSectionReceived));
    assert!(
        !renewer
            .entry("foo.local", DnsType::A)
            .unwrap()
            .is_pending_delete()
    );
}

#[test]
fn test_protocol_read_and_write() {
    let start = Instant::now();
    let mut renewer = Renewer::new(quarter_config());
    let foo = record("foo.local", DnsType::Srv, 4);

    renewer
        .handle_write(RenewRequest {
            now: start,
            resource: foo.clone(),
            media: Media::Wireless,
            ip_versions: IpVersions::V4,
        })
        .unwrap();
    assert!(renewer.is_renewing("foo.local", DnsType::Srv));

    renewer
        .handle_read(ReceivedResource {
            resource: foo,
            section: ResourceSection::Answer,
            sender: sender_v4(Media::Wireless),
        })
        .unwrap();
    assert!(
        renewer
            .entry("foo.local", DnsType::Srv)
            .unwrap()
            .is_pending_delete()
    );

    assert!(renewer.poll_read().is_none());
    assert!(renewer.handle_event(()).is_ok());
    assert!(renewer.poll_event().is_none());
}

#[test]
fn test_close() {
    let start = Instant::now();
    let mut renewer = Renewer::new(quarter_config());
    let foo = record("foo.local", DnsType::A, 4);
    renewer
        .renew(start, &foo, Media::Wired, IpVersions::V4)
        .unwrap();
    renewer.handle_timeout(start + secs(1)).unwrap();

    renewer.close().unwrap();

    assert_eq!(renewer.entry_count(), 0);
    assert!(renewer.poll_write().is_none());
    assert!(renewer.poll_timeout().is_none());

    assert_eq!(
        renewer.renew(start, &foo, Media::Wired, IpVersions::V4),
        Err(Error::ErrRenewerClosed)
    );
    assert_eq!(
        renewer.receive_resource(&foo, ResourceSection::Answer, &sender_v4(Media::Wired)),
        Err(Error::ErrRenewerClosed)
    );
    assert_eq!(
        renewer.handle_timeout(start + secs(2)),
        Err(Error::ErrRenewerClosed)
    );
}

#[test]
fn test_entries_iterates_all_renewals() {
    let start = Instant::now();
    let mut renewer = Renewer::new(quarter_config());
    for name in ["a.local", "b.local", "c.local"] {
        renewer
            .renew(start, &record(name, DnsType::Ptr, 4), Media::Both, IpVersions::Both)
            .unwrap();
    }

    let mut names: Vec<&str> = renewer.entries().map(|entry| entry.name()).collect();
    names.sort();
    assert_eq!(names, vec!["a.local.", "b.local.", "c.local."]);
}
