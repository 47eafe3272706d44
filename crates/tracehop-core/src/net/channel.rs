use crate::config::ChannelConfig;
use crate::error::{Error, IoResult, Result};
use crate::net::ipv4::Ipv4;
use crate::net::socket::Socket;
use crate::net::Network;
use crate::probe::{ProbeRequest, Response};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Instant;
use tracing::instrument;

/// A channel for sending and receiving `ProbeRequest` packets.
///
/// A single raw socket is used for both sending and receiving and is closed
/// when the channel is dropped.
pub struct Channel<S: Socket> {
    ipv4: Ipv4,
    icmp_socket: S,
}

impl<S: Socket> Channel<S> {
    /// Create a `Channel`.
    ///
    /// This operation requires the `CAP_NET_RAW` capability on Linux.
    #[instrument(skip_all, level = "trace")]
    pub fn connect(config: &ChannelConfig) -> Result<Self> {
        tracing::debug!(?config);
        let icmp_socket = make_icmp_socket().map_err(Error::ChannelSetup)?;
        Ok(Self {
            ipv4: Ipv4 {
                dest_addr: config.target_addr,
            },
            icmp_socket,
        })
    }
}

impl<S: Socket> Network for Channel<S> {
    #[instrument(skip(self), level = "trace")]
    fn send_probe(&mut self, probe: &ProbeRequest) -> Result<Instant> {
        tracing::debug!(?probe);
        self.ipv4.dispatch_icmp_probe(&mut self.icmp_socket, probe)
    }

    #[instrument(skip(self), level = "trace")]
    fn recv_probe(&mut self, deadline: Instant) -> Result<Option<Response>> {
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Ok(None);
            }
            if self.icmp_socket.is_readable(remaining)? {
                let resp = self.ipv4.recv_icmp_probe(&mut self.icmp_socket)?;
                tracing::debug!(?resp);
                return Ok(Some(resp));
            }
        }
    }
}

impl<S: Socket> Drop for Channel<S> {
    fn drop(&mut self) {
        tracing::debug!(dest_addr = %self.ipv4.dest_addr, "closing channel");
    }
}

/// Make a raw socket for sending and receiving `ICMP` packets.
#[instrument(level = "trace")]
fn make_icmp_socket<S: Socket>() -> IoResult<S> {
    let mut socket = S::new_icmp_socket_ipv4()?;
    socket.bind(SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), 0))?;
    socket.set_packet_info(true)?;
    Ok(socket)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ErrorKind, IoError, IoOperation};
    use crate::mocket_recv_msg;
    use crate::net::socket::{MockSocket, PacketInfo};
    use crate::probe::ProbeIdentity;
    use crate::types::{Sequence, TimeToLive, TraceId};
    use mockall::predicate;
    use std::io;
    use std::sync::Mutex;
    use std::time::Duration;

    static MTX: Mutex<()> = Mutex::new(());

    const TARGET: Ipv4Addr = Ipv4Addr::new(142, 251, 222, 206);

    fn config() -> ChannelConfig {
        ChannelConfig {
            target_addr: TARGET,
        }
    }

    fn wildcard() -> SocketAddr {
        SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), 0)
    }

    #[test]
    fn test_connect() -> anyhow::Result<()> {
        let _m = MTX.lock();
        let ctx = MockSocket::new_icmp_socket_ipv4_context();
        ctx.expect().times(1).returning(|| {
            let mut mocket = MockSocket::new();
            mocket
                .expect_bind()
                .with(predicate::eq(wildcard()))
                .times(1)
                .returning(|_| Ok(()));
            mocket
                .expect_set_packet_info()
                .with(predicate::eq(true))
                .times(1)
                .returning(|_| Ok(()));
            Ok(mocket)
        });
        let _channel = Channel::<MockSocket>::connect(&config())?;
        Ok(())
    }

    #[test]
    fn test_connect_new_socket_failed() {
        let _m = MTX.lock();
        let ctx = MockSocket::new_icmp_socket_ipv4_context();
        ctx.expect().times(1).returning(|| {
            Err(IoError::Other(
                io::Error::from(io::ErrorKind::PermissionDenied),
                IoOperation::NewSocket,
            ))
        });
        let err = Channel::<MockSocket>::connect(&config()).err().unwrap();
        assert!(matches!(
            err,
            Error::ChannelSetup(IoError::Other(_, IoOperation::NewSocket))
        ));
        assert_eq!(ErrorKind::Precondition, err.kind());
    }

    #[test]
    fn test_connect_set_packet_info_failed() {
        let _m = MTX.lock();
        let ctx = MockSocket::new_icmp_socket_ipv4_context();
        ctx.expect().times(1).returning(|| {
            let mut mocket = MockSocket::new();
            mocket.expect_bind().times(1).returning(|_| Ok(()));
            mocket.expect_set_packet_info().times(1).returning(|_| {
                Err(IoError::Other(
                    io::Error::from(io::ErrorKind::Unsupported),
                    IoOperation::SetPacketInfo,
                ))
            });
            Ok(mocket)
        });
        let err = Channel::<MockSocket>::connect(&config()).err().unwrap();
        assert!(matches!(
            err,
            Error::ChannelSetup(IoError::Other(_, IoOperation::SetPacketInfo))
        ));
        assert_eq!(ErrorKind::Precondition, err.kind());
    }

    #[test]
    fn test_send_probe() -> anyhow::Result<()> {
        let mut mocket = MockSocket::new();
        mocket
            .expect_set_ttl()
            .with(predicate::eq(5))
            .times(1)
            .returning(|_| Ok(()));
        mocket
            .expect_send_to()
            .withf(|buf, addr| buf.len() == 23 && *addr == SocketAddr::new(IpAddr::V4(TARGET), 0))
            .times(1)
            .returning(|_, _| Ok(()));
        let mut channel = Channel {
            ipv4: Ipv4 { dest_addr: TARGET },
            icmp_socket: mocket,
        };
        let probe = ProbeRequest::new(TraceId(1), TimeToLive(5), b"HELLO-R-U-THERE");
        channel.send_probe(&probe)?;
        Ok(())
    }

    #[test]
    fn test_recv_probe_deadline_passed() -> anyhow::Result<()> {
        let mut mocket = MockSocket::new();
        mocket.expect_is_readable().times(0);
        mocket.expect_recv_msg().times(0);
        let mut channel = Channel {
            ipv4: Ipv4 { dest_addr: TARGET },
            icmp_socket: mocket,
        };
        assert_eq!(None, channel.recv_probe(Instant::now())?);
        Ok(())
    }

    #[test]
    fn test_recv_probe_not_readable_until_deadline() -> anyhow::Result<()> {
        let mut mocket = MockSocket::new();
        mocket.expect_is_readable().returning(|timeout| {
            std::thread::sleep(timeout);
            Ok(false)
        });
        mocket.expect_recv_msg().times(0);
        let mut channel = Channel {
            ipv4: Ipv4 { dest_addr: TARGET },
            icmp_socket: mocket,
        };
        let deadline = Instant::now() + Duration::from_millis(20);
        assert_eq!(None, channel.recv_probe(deadline)?);
        assert!(Instant::now() >= deadline);
        Ok(())
    }

    #[test]
    fn test_recv_probe_readable() -> anyhow::Result<()> {
        let buf = hex_literal::hex!(
            "
            45 20 00 54 00 00 00 00 3b 01 50 02 8e fb de ce
            c0 a8 01 15 00 00 09 0f 75 d7 81 19 00 00 00 00
            "
        );
        let info = PacketInfo {
            dst: Ipv4Addr::new(192, 168, 1, 21),
            interface: Some(3),
        };
        let mut mocket = MockSocket::new();
        mocket
            .expect_is_readable()
            .times(1)
            .returning(|_| Ok(true));
        mocket
            .expect_recv_msg()
            .times(1)
            .returning(mocket_recv_msg!(buf, Some(info)));
        let mut channel = Channel {
            ipv4: Ipv4 { dest_addr: TARGET },
            icmp_socket: mocket,
        };
        let resp = channel
            .recv_probe(Instant::now() + Duration::from_secs(3))?
            .unwrap();
        assert_eq!(TARGET, resp.addr);
        assert_eq!(
            ProbeIdentity::Echo {
                identifier: TraceId(30167),
                sequence: Sequence(33049)
            },
            resp.identity
        );
        assert_eq!(Some(3), resp.metadata.interface);
        Ok(())
    }

    #[test]
    fn test_recv_probe_select_failed() {
        let mut mocket = MockSocket::new();
        mocket.expect_is_readable().times(1).returning(|_| {
            Err(IoError::Other(
                io::Error::from(io::ErrorKind::InvalidInput),
                IoOperation::Select,
            ))
        });
        let mut channel = Channel {
            ipv4: Ipv4 { dest_addr: TARGET },
            icmp_socket: mocket,
        };
        let err = channel
            .recv_probe(Instant::now() + Duration::from_secs(3))
            .unwrap_err();
        assert_eq!(ErrorKind::Transport, err.kind());
    }
}
