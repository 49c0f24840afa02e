use std::fmt;

use bytes::Bytes;

use super::{DnsType, fully_qualified};

/// Role a resource played in the message it arrived in.
///
/// `Expired` never appears on the wire. The renewer uses it to announce that
/// a cached record has reached the end of its lifetime.
#[derive(Default, Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ResourceSection {
    #[default]
    Answer,
    Authority,
    Additional,
    Expired,
}

impl fmt::Display for ResourceSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match *self {
            ResourceSection::Answer => "answer",
            ResourceSection::Authority => "authority",
            ResourceSection::Additional => "additional",
            ResourceSection::Expired => "expired",
        };
        write!(f, "{s}")
    }
}

/// A parsed DNS resource record.
///
/// The record data is kept opaque; the renewer only cares about identity
/// (name and type) and lifetime.
#[derive(Default, Debug, PartialEq, Eq, Clone)]
pub struct DnsResource {
    /// Fully-qualified owner name.
    pub name: String,
    pub typ: DnsType,
    /// Time to live in seconds.
    pub ttl: u32,
    /// The cache-flush bit (RFC 6762 §10.2).
    pub cache_flush: bool,
    /// Raw record data.
    pub data: Bytes,
}

impl fmt::Display for DnsResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "dnsmessage.Resource{{Name: {}, Type: {}, TTL: {}, Length: {}}}",
            self.name,
            self.typ,
            self.ttl,
            self.data.len()
        )
    }
}

impl DnsResource {
    pub fn new(name: &str, typ: DnsType, ttl: u32, data: Bytes) -> Self {
        Self {
            name: fully_qualified(name),
            typ,
            ttl,
            cache_flush: false,
            data,
        }
    }

    /// A goodbye copy of this record: same name and type, TTL 0, no data.
    pub fn expired(&self) -> Self {
        Self {
            name: self.name.clone(),
            typ: self.typ,
            ttl: 0,
            cache_flush: false,
            data: Bytes::new(),
        }
    }
}
