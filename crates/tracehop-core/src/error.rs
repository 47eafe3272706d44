use std::fmt::{Display, Formatter};
use std::io;
use std::net::SocketAddr;
use thiserror::Error;

/// A tracer error result.
pub type Result<T> = std::result::Result<T, Error>;

/// A tracer error.
#[derive(Error, Debug)]
pub enum Error {
    #[error("invalid config: {0}")]
    BadConfig(String),
    #[error("failed to resolve {0}: {1}")]
    LookupFailed(String, tracehop_dns::Error),
    #[error("no IPv4 address found for {0}")]
    NoIpv4Addr(String),
    #[error("failed to open packet channel: {0}")]
    ChannelSetup(IoError),
    #[error("IO error: {0}")]
    IoError(#[from] IoError),
    #[error("Probe failed to send: {0}")]
    ProbeFailed(IoError),
    #[error("invalid packet: {0}")]
    PacketError(#[from] tracehop_packet::error::Error),
}

impl Error {
    /// The category of this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::BadConfig(_)
            | Self::LookupFailed(..)
            | Self::NoIpv4Addr(_)
            | Self::ChannelSetup(_) => ErrorKind::Precondition,
            Self::IoError(_) | Self::ProbeFailed(_) => ErrorKind::Transport,
            Self::PacketError(_) => ErrorKind::Protocol,
        }
    }
}

/// The category of a tracer [`Error`].
///
/// A read timeout is never an error, an unanswered probe is reported as a
/// timed out hop instead.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ErrorKind {
    /// The trace could not start: bad configuration, unresolvable target or
    /// the raw packet channel could not be acquired.
    Precondition,
    /// Sending or receiving a probe failed.
    Transport,
    /// A packet could not be encoded or decoded.
    Protocol,
}

/// Custom IO error result.
pub type IoResult<T> = std::result::Result<T, IoError>;

/// Custom IO error.
#[derive(Error, Debug)]
pub enum IoError {
    #[error("Bind error for {1}: {0}")]
    Bind(io::Error, SocketAddr),
    #[error("Sendto error for {1}: {0}")]
    SendTo(io::Error, SocketAddr),
    #[error("Failed to {1}: {0}")]
    Other(io::Error, IoOperation),
}

/// Io operation.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum IoOperation {
    NewSocket,
    SetPacketInfo,
    SetTtl,
    Select,
    RecvMsg,
}

impl Display for IoOperation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NewSocket => write!(f, "create new socket"),
            Self::SetPacketInfo => write!(f, "set packet info"),
            Self::SetTtl => write!(f, "set TTL"),
            Self::Select => write!(f, "select"),
            Self::RecvMsg => write!(f, "recv msg"),
        }
    }
}
