//! Value types exchanged between the renewer and its collaborators.
//!
//! The renewer never touches the DNS wire format. Records reach it already
//! parsed, and the questions/resources it produces are handed back to the
//! caller, which owns serialization and the sockets.


pub(crate) mod address;
pub(crate) mod question;
pub(crate) mod resource;
pub(crate) mod scope;

use std::fmt;

pub use address::{
    MDNS_DEST_ADDR, MDNS_DEST_ADDR_V6, MDNS_MULTICAST_IPV4, MDNS_MULTICAST_IPV6, MDNS_PORT,
    ReplyAddress,
};
pub use question::DnsQuestion;
pub use resource::{DnsResource, ResourceSection};
pub use scope::{IpVersions, Media};

/// DNS resource record type.
#[derive(Default, Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DnsType {
    A = 1,
    Ns = 2,
    Cname = 5,
    Soa = 6,
    Ptr = 12,
    Mx = 15,
    Txt = 16,
    Aaaa = 28,
    Srv = 33,
    Opt = 41,
    Nsec = 47,
    Any = 255,

    #[default]
    Unsupported = 0,
}

impl From<u16> for DnsType {
    fn from(v: u16) -> Self {
        match v {
            1 => DnsType::A,
            2 => DnsType::Ns,
            5 => DnsType::Cname,
            6 => DnsType::Soa,
            12 => DnsType::Ptr,
            15 => DnsType::Mx,
            16 => DnsType::Txt,
            28 => DnsType::Aaaa,
            33 => DnsType::Srv,
            41 => DnsType::Opt,
            47 => DnsType::Nsec,
            255 => DnsType::Any,
            _ => DnsType::Unsupported,
        }
    }
}

impl From<DnsType> for u16 {
    fn from(t: DnsType) -> u16 {
        t as u16
    }
}

impl fmt::Display for DnsType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match *self {
            DnsType::A => "A",
            DnsType::Ns => "NS",
            DnsType::Cname => "CNAME",
            DnsType::Soa => "SOA",
            DnsType::Ptr => "PTR",
            DnsType::Mx => "MX",
            DnsType::Txt => "TXT",
            DnsType::Aaaa => "AAAA",
            DnsType::Srv => "SRV",
            DnsType::Opt => "OPT",
            DnsType::Nsec => "NSEC",
            DnsType::Any => "ANY",
            DnsType::Unsupported => "Unsupported",
        };
        write!(f, "{s}")
    }
}

/// Returns `name` in fully-qualified form, with a single trailing dot.
pub(crate) fn fully_qualified(name: &str) -> String {
    if name.ends_with('.') {
        name.to_string()
    } else {
        format!("{name}.")
    }
}
