use crate::error::{IoError, IoOperation, IoResult};
use crate::net::socket::{PacketInfo, Socket};
use itertools::Itertools;
use nix::sys::select::FdSet;
use nix::sys::socket::{recvmsg, setsockopt, sockopt, ControlMessageOwned, MsgFlags, SockaddrIn};
use nix::sys::time::{TimeVal, TimeValLike};
use socket2::{Domain, Protocol, SockAddr, Type};
use std::io::{self, IoSliceMut};
use std::net::{Ipv4Addr, SocketAddr};
use std::os::fd::{AsFd, AsRawFd};
use std::time::Duration;
use tracing::instrument;

/// A network socket.
pub struct SocketImpl {
    inner: socket2::Socket,
}

impl SocketImpl {
    fn new_raw_ipv4(protocol: Protocol) -> IoResult<Self> {
        Ok(Self {
            inner: socket2::Socket::new(Domain::IPV4, Type::RAW, Some(protocol))
                .map_err(|err| IoError::Other(err, IoOperation::NewSocket))?,
        })
    }
}

impl Socket for SocketImpl {
    #[instrument(level = "trace")]
    fn new_icmp_socket_ipv4() -> IoResult<Self> {
        Self::new_raw_ipv4(Protocol::ICMPV4)
    }
    #[instrument(skip(self), level = "trace")]
    fn bind(&mut self, address: SocketAddr) -> IoResult<()> {
        self.inner
            .bind(&SockAddr::from(address))
            .map_err(|err| IoError::Bind(err, address))
    }
    #[instrument(skip(self), level = "trace")]
    fn set_packet_info(&mut self, enabled: bool) -> IoResult<()> {
        setsockopt(&self.inner, sockopt::Ipv4PacketInfo, &enabled)
            .map_err(|err| IoError::Other(io::Error::from(err), IoOperation::SetPacketInfo))
    }
    #[instrument(skip(self), level = "trace")]
    fn set_ttl(&mut self, ttl: u32) -> IoResult<()> {
        self.inner
            .set_ttl_v4(ttl)
            .map_err(|err| IoError::Other(err, IoOperation::SetTtl))
    }
    #[instrument(skip(self, buf), level = "trace")]
    fn send_to(&mut self, buf: &[u8], addr: SocketAddr) -> IoResult<()> {
        tracing::trace!(buf = format!("{:02x?}", buf.iter().format(" ")), ?addr);
        self.inner
            .send_to(buf, &SockAddr::from(addr))
            .map_err(|err| IoError::SendTo(err, addr))?;
        Ok(())
    }
    #[instrument(skip(self), level = "trace")]
    fn is_readable(&mut self, timeout: Duration) -> IoResult<bool> {
        let mut read = FdSet::new();
        read.insert(self.inner.as_fd());
        let timeout_us = i64::try_from(timeout.as_micros()).unwrap_or(i64::MAX);
        let readable = nix::sys::select::select(
            None,
            Some(&mut read),
            None,
            None,
            Some(&mut TimeVal::microseconds(timeout_us)),
        );
        match readable {
            Ok(readable) => Ok(readable == 1),
            Err(nix::Error::EINTR) => Ok(false),
            Err(err) => Err(IoError::Other(io::Error::from(err), IoOperation::Select)),
        }
    }
    #[instrument(skip(self, buf), level = "trace")]
    fn recv_msg(&mut self, buf: &mut [u8]) -> IoResult<(usize, Option<PacketInfo>)> {
        let mut cmsg_buf = nix::cmsg_space!(nix::libc::in_pktinfo);
        let (bytes_read, info) = {
            let mut iov = [IoSliceMut::new(&mut *buf)];
            let msg = recvmsg::<SockaddrIn>(
                self.inner.as_raw_fd(),
                &mut iov,
                Some(&mut cmsg_buf),
                MsgFlags::empty(),
            )
            .map_err(|err| IoError::Other(io::Error::from(err), IoOperation::RecvMsg))?;
            let info = msg.cmsgs().find_map(|cmsg| match cmsg {
                ControlMessageOwned::Ipv4PacketInfo(pktinfo) => Some(PacketInfo {
                    dst: Ipv4Addr::from(u32::from_be(pktinfo.ipi_addr.s_addr)),
                    interface: u32::try_from(pktinfo.ipi_ifindex).ok(),
                }),
                _ => None,
            });
            (msg.bytes, info)
        };
        tracing::trace!(
            buf = format!("{:02x?}", buf[..bytes_read].iter().format(" ")),
            bytes_read,
            ?info
        );
        Ok((bytes_read, info))
    }
}
