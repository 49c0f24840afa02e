use thiserror::Error;

use crate::message::DnsType;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug, PartialEq, Eq, Clone)]
#[non_exhaustive]
pub enum Error {
    #[error("renewer: closed")]
    ErrRenewerClosed,
    #[error("renewer: resource {0} {1} has zero ttl and cannot be renewed")]
    ErrZeroTtlRenewal(String, DnsType),
    #[error("renewer: resources in the expired section are only produced locally")]
    ErrExpiredSectionReceived,
}
