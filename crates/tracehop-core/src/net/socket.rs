use crate::error::IoResult as Result;
use std::net::{Ipv4Addr, SocketAddr};
use std::time::Duration;

#[cfg_attr(test, mockall::automock)]
pub trait Socket
where
    Self: Sized,
{
    /// Create a raw IPv4 socket for sending and receiving ICMP packets.
    fn new_icmp_socket_ipv4() -> Result<Self>;
    fn bind(&mut self, address: SocketAddr) -> Result<()>;
    /// Request that the destination and interface of received packets be delivered.
    fn set_packet_info(&mut self, enabled: bool) -> Result<()>;
    fn set_ttl(&mut self, ttl: u32) -> Result<()>;
    fn send_to(&mut self, buf: &[u8], addr: SocketAddr) -> Result<()>;
    /// Returns true if the socket becomes readable before the timeout, false otherwise.
    fn is_readable(&mut self, timeout: Duration) -> Result<bool>;
    fn recv_msg(&mut self, buf: &mut [u8]) -> Result<(usize, Option<PacketInfo>)>;
}

/// The packet info control message of a received packet.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct PacketInfo {
    /// The destination address of the packet.
    pub dst: Ipv4Addr,
    /// The index of the interface the packet was received on.
    pub interface: Option<u32>,
}
