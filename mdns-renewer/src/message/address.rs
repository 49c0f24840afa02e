use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};

use super::scope::{IpVersions, Media};

/// The mDNS IPv4 multicast group address (224.0.0.251).
pub const MDNS_MULTICAST_IPV4: Ipv4Addr = Ipv4Addr::new(224, 0, 0, 251);

/// The mDNS IPv6 multicast group address (ff02::fb).
pub const MDNS_MULTICAST_IPV6: Ipv6Addr = Ipv6Addr::new(0xff02, 0, 0, 0, 0, 0, 0, 0xfb);

/// The standard mDNS port (5353).
pub const MDNS_PORT: u16 = 5353;

/// mDNS IPv4 multicast destination address (224.0.0.251:5353).
///
/// ```rust
/// use mdns_renewer::MDNS_DEST_ADDR;
///
/// assert_eq!(MDNS_DEST_ADDR.to_string(), "224.0.0.251:5353");
/// ```
pub const MDNS_DEST_ADDR: SocketAddr =
    SocketAddr::new(IpAddr::V4(MDNS_MULTICAST_IPV4), MDNS_PORT);

/// mDNS IPv6 multicast destination address ([ff02::fb]:5353).
pub const MDNS_DEST_ADDR_V6: SocketAddr =
    SocketAddr::new(IpAddr::V6(MDNS_MULTICAST_IPV6), MDNS_PORT);

/// Where a packet came from, or where it should be sent.
///
/// For received records this describes the sender and the interface the
/// packet arrived on. For outbound traffic produced by the renewer it is
/// always a multicast destination built with [`ReplyAddress::multicast`];
/// the transceiver fans it out to every interface within `media` and
/// `ip_versions`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct ReplyAddress {
    /// Remote socket address (or multicast group for outbound traffic).
    pub socket_address: SocketAddr,
    /// Address of the local interface involved.
    pub interface_address: IpAddr,
    /// Link-layer class of the interface involved.
    pub media: Media,
    /// IP families the address applies to.
    pub ip_versions: IpVersions,
}

impl ReplyAddress {
    /// Creates the address of a packet received from `socket_address` on the
    /// interface `interface_address`.
    pub fn new(socket_address: SocketAddr, interface_address: IpAddr, media: Media) -> Self {
        let ip_versions = if socket_address.is_ipv4() {
            IpVersions::V4
        } else {
            IpVersions::V6
        };

        Self {
            socket_address,
            interface_address,
            media,
            ip_versions,
        }
    }

    /// Creates a multicast destination covering `media` and `ip_versions`.
    ///
    /// ```rust
    /// use mdns_renewer::{IpVersions, MDNS_DEST_ADDR_V6, Media, ReplyAddress};
    ///
    /// let dest = ReplyAddress::multicast(Media::Wired, IpVersions::V6);
    /// assert_eq!(dest.socket_address, MDNS_DEST_ADDR_V6);
    /// assert!(dest.is_multicast());
    /// ```
    pub fn multicast(media: Media, ip_versions: IpVersions) -> Self {
        let (socket_address, interface_address) = match ip_versions {
            IpVersions::V6 => (MDNS_DEST_ADDR_V6, IpAddr::V6(Ipv6Addr::UNSPECIFIED)),
            IpVersions::V4 | IpVersions::Both => {
                (MDNS_DEST_ADDR, IpAddr::V4(Ipv4Addr::UNSPECIFIED))
            }
        };

        Self {
            socket_address,
            interface_address,
            media,
            ip_versions,
        }
    }

    /// Whether this is one of the mDNS multicast destinations.
    pub fn is_multicast(&self) -> bool {
        self.socket_address == MDNS_DEST_ADDR || self.socket_address == MDNS_DEST_ADDR_V6
    }

    /// Whether this address lies within the `media` scope.
    pub fn matches_media(&self, media: Media) -> bool {
        media == Media::Both || media == self.media
    }

    /// Whether this address lies within the `ip_versions` scope.
    pub fn matches_ip_versions(&self, ip_versions: IpVersions) -> bool {
        match ip_versions {
            IpVersions::Both => true,
            IpVersions::V4 => self.socket_address.is_ipv4(),
            IpVersions::V6 => self.socket_address.is_ipv6(),
        }
    }
}
