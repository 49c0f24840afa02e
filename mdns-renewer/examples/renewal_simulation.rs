//! mDNS Renewal Simulation Example
//!
//! This example drives the sans-I/O mdns-renewer library from a tokio event
//! loop against a simulated network. A record is placed in the cache once;
//! the simulated responder then answers the renewer's queries (or stays
//! silent) and the cache refreshes the record whenever an answer arrives.
//!
//! # Usage
//!
//! Record that is never answered, so it expires after four queries:
//! ```
//! cargo run --package mdns-renewer --example renewal_simulation
//! ```
//!
//! Responder that answers every second query:
//! ```
//! cargo run --package mdns-renewer --example renewal_simulation -- --answer-every 2 --duration 30
//! ```

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

use bytes::Bytes;
use clap::Parser;
use mdns_renewer::{
    DnsResource, DnsType, IpVersions, MDNS_PORT, Media, ReceivedResource, RenewRequest, Renewer,
    RenewerConfig, ReplyAddress, ResourceSection, Transmit,
};
use sansio::Protocol;
use tokio::time::Instant;

#[derive(Parser, Debug)]
#[command(name = "mDNS Renewal Simulation")]
#[command(version = "0.1.0")]
#[command(about = "An example of cache record renewal using sans-I/O mdns-renewer")]
struct Args {
    /// Name of the cached record
    #[arg(long, default_value = "webrtc-rs-test.local")]
    name: String,

    /// TTL of the cached record in seconds
    #[arg(long, default_value = "5")]
    ttl: u32,

    /// Answer every Nth renewal query (0 = never answer)
    #[arg(long, default_value = "0")]
    answer_every: u32,

    /// Number of renewal queries sent before a record expires
    #[arg(long, default_value = "4")]
    queries: u32,

    /// Simulation length in seconds
    #[arg(long, default_value = "20")]
    duration: u64,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("trace")).init();

    let args = Args::parse();
    let record = DnsResource::new(
        &args.name,
        DnsType::A,
        args.ttl,
        Bytes::from_static(&[192, 168, 1, 42]),
    );
    let responder = ReplyAddress::new(
        SocketAddr::new(IpAddr::V4(Ipv4Addr::new(192, 168, 1, 42)), MDNS_PORT),
        IpAddr::V4(Ipv4Addr::new(192, 168, 1, 2)),
        Media::Wired,
    );

    let config = RenewerConfig::default().with_queries_to_attempt(args.queries);
    let mut renewer = Renewer::new(config);

    let start = Instant::now();
    let end = start + Duration::from_secs(args.duration);

    renewer.handle_write(RenewRequest {
        now: start.into_std(),
        resource: record.clone(),
        media: Media::Wired,
        ip_versions: IpVersions::V4,
    })?;
    log::info!("Cached {} with ttl {}s", record, args.ttl);

    let mut questions = 0u32;
    loop {
        let Some(deadline) = renewer.poll_timeout().map(Instant::from_std) else {
            log::info!("Nothing left to renew, exiting");
            break;
        };
        if deadline > end {
            log::info!("Simulation time is up, exiting");
            break;
        }

        tokio::time::sleep_until(deadline).await;
        if let Err(err) = renewer.handle_timeout(Instant::now().into_std()) {
            log::warn!("Failed to handle timeout: {err}");
        }

        while let Some(transmit) = renewer.poll_write() {
            let elapsed = start.elapsed();
            match transmit {
                Transmit::Question {
                    question,
                    destination,
                } => {
                    questions += 1;
                    println!(
                        "{:>6.2}s  query   {} -> {}",
                        elapsed.as_secs_f64(),
                        question,
                        destination.socket_address
                    );

                    if args.answer_every != 0 && questions % args.answer_every == 0 {
                        let now = Instant::now().into_std();
                        renewer.handle_read(ReceivedResource {
                            resource: record.clone(),
                            section: ResourceSection::Answer,
                            sender: responder,
                        })?;
                        // The cache takes the fresh copy, which restarts the clock.
                        renewer.handle_write(RenewRequest {
                            now,
                            resource: record.clone(),
                            media: responder.media,
                            ip_versions: responder.ip_versions,
                        })?;
                        println!(
                            "{:>6.2}s  answer  from {}",
                            elapsed.as_secs_f64(),
                            responder.socket_address
                        );
                    }
                }
                Transmit::Resource {
                    resource, section, ..
                } => {
                    println!(
                        "{:>6.2}s  {}  {}",
                        elapsed.as_secs_f64(),
                        section,
                        resource
                    );
                }
            }
        }
    }

    renewer.close()?;
    Ok(())
}
