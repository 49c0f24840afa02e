use std::fmt;

use super::{DnsType, fully_qualified};

/// A DNS question, as handed to the transceiver for serialization.
#[derive(Default, Debug, PartialEq, Eq, Clone)]
pub struct DnsQuestion {
    /// Fully-qualified name being asked about.
    pub name: String,
    pub typ: DnsType,
    /// Requests a unicast reply (the QU bit, RFC 6762 §5.4).
    pub unicast_response: bool,
}

impl fmt::Display for DnsQuestion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "dnsmessage.question{{Name: {}, Type: {}, QU: {}}}",
            self.name, self.typ, self.unicast_response
        )
    }
}

impl DnsQuestion {
    /// Creates a multicast (QM) question for `name`.
    pub fn new(name: &str, typ: DnsType) -> Self {
        Self {
            name: fully_qualified(name),
            typ,
            unicast_response: false,
        }
    }
}
