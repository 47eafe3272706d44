use crate::error::Result;
use crate::probe::{ProbeRequest, Response};
use std::time::Instant;

/// IPv4 implementation.
mod ipv4;

/// Platform specific network code.
mod platform;

/// A network socket.
mod socket;

/// A channel for sending and receiving probes.
pub mod channel;

/// The platform specific socket type.
pub use platform::SocketImpl;

/// An abstraction over a network interface for tracing.
#[cfg_attr(test, mockall::automock)]
pub trait Network {
    /// Send a `ProbeRequest`.
    ///
    /// Returns the instant the probe was handed to the socket.
    fn send_probe(&mut self, probe: &ProbeRequest) -> Result<Instant>;

    /// Receive the next ICMP packet, waiting no later than `deadline`.
    ///
    /// Returns `None` if the deadline passes before a packet is read.
    fn recv_probe(&mut self, deadline: Instant) -> Result<Option<Response>>;
}
