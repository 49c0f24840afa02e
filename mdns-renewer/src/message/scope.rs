use std::fmt;

/// Link-layer class a record was learned over, or must be renewed over.
///
/// `Both` is the top of the lattice: the union of two different media is
/// always `Both`.
#[derive(Default, Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Media {
    Wired,
    Wireless,
    #[default]
    Both,
}

impl Media {
    /// Smallest scope covering both `self` and `other`.
    pub fn union(self, other: Media) -> Media {
        if self == other { self } else { Media::Both }
    }
}

impl fmt::Display for Media {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match *self {
            Media::Wired => "wired",
            Media::Wireless => "wireless",
            Media::Both => "both",
        };
        write!(f, "{s}")
    }
}

/// IP families a record was learned over, or must be renewed over.
#[derive(Default, Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum IpVersions {
    V4,
    V6,
    #[default]
    Both,
}

impl IpVersions {
    /// Smallest scope covering both `self` and `other`.
    pub fn union(self, other: IpVersions) -> IpVersions {
        if self == other {
            self
        } else {
            IpVersions::Both
        }
    }
}

impl fmt::Display for IpVersions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match *self {
            IpVersions::V4 => "v4",
            IpVersions::V6 => "v6",
            IpVersions::Both => "both",
        };
        write!(f, "{s}")
    }
}
