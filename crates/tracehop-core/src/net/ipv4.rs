use crate::constants::MAX_PACKET_SIZE;
use crate::error::{Error, Result};
use crate::net::socket::{PacketInfo, Socket};
use crate::probe::{ControlMetadata, ProbeIdentity, ProbeRequest, Response};
use crate::types::{Sequence, TraceId};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Instant;
use tracing::instrument;
use tracehop_packet::checksum::icmp_ipv4_checksum;
use tracehop_packet::icmpv4::echo_reply::EchoReplyPacket;
use tracehop_packet::icmpv4::echo_request::EchoRequestPacket;
use tracehop_packet::icmpv4::time_exceeded::TimeExceededPacket;
use tracehop_packet::icmpv4::{IcmpCode, IcmpPacket, IcmpType};
use tracehop_packet::ipv4::Ipv4Packet;
use tracehop_packet::IpProtocol;

/// The maximum size of ICMP packet we allow.
const MAX_ICMP_PACKET_BUF: usize = MAX_PACKET_SIZE - Ipv4Packet::minimum_packet_size();

/// IPv4 configuration.
#[derive(Debug)]
pub struct Ipv4 {
    pub dest_addr: Ipv4Addr,
}

impl Ipv4 {
    /// Dispatch an ICMP probe.
    ///
    /// The time-to-live of the socket is set to that of the probe before it is sent.
    #[instrument(skip(self, icmp_socket), level = "trace")]
    pub fn dispatch_icmp_probe<S: Socket>(
        &self,
        icmp_socket: &mut S,
        probe: &ProbeRequest,
    ) -> Result<Instant> {
        let mut icmp_buf = [0_u8; MAX_ICMP_PACKET_BUF];
        let echo_request = make_echo_request_icmp_packet(&mut icmp_buf, probe)?;
        icmp_socket.set_ttl(u32::from(probe.ttl.0))?;
        let remote_addr = SocketAddr::new(IpAddr::V4(self.dest_addr), 0);
        let sent = Instant::now();
        icmp_socket
            .send_to(echo_request.packet(), remote_addr)
            .map_err(Error::ProbeFailed)?;
        Ok(sent)
    }

    /// Receive the next ICMP packet.
    ///
    /// The socket must be readable.
    #[instrument(skip(self, icmp_socket), level = "trace")]
    pub fn recv_icmp_probe<S: Socket>(&self, icmp_socket: &mut S) -> Result<Response> {
        let mut buf = [0_u8; MAX_PACKET_SIZE];
        let (bytes_read, info) = icmp_socket.recv_msg(&mut buf)?;
        let received = Instant::now();
        let ipv4 = Ipv4Packet::new_view(&buf[..bytes_read])?;
        extract_probe_resp(&ipv4, info, received)
    }
}

/// Create an ICMP `EchoRequest` packet.
fn make_echo_request_icmp_packet<'a>(
    icmp_buf: &'a mut [u8],
    probe: &ProbeRequest,
) -> Result<EchoRequestPacket<'a>> {
    let packet_size =
        (EchoRequestPacket::minimum_packet_size() + probe.payload.len()).min(icmp_buf.len());
    let mut icmp = EchoRequestPacket::new(&mut icmp_buf[..packet_size])?;
    icmp.set_icmp_type(IcmpType::EchoRequest);
    icmp.set_icmp_code(IcmpCode(0));
    icmp.set_identifier(probe.identifier.0);
    icmp.set_sequence(probe.sequence.0);
    icmp.set_payload(&probe.payload)?;
    icmp.set_checksum(icmp_ipv4_checksum(icmp.packet()));
    Ok(icmp)
}

#[instrument(skip(ipv4), level = "trace")]
fn extract_probe_resp(
    ipv4: &Ipv4Packet<'_>,
    info: Option<PacketInfo>,
    received: Instant,
) -> Result<Response> {
    let icmp_v4 = IcmpPacket::new_view(ipv4.payload())?;
    let icmp_type = icmp_v4.get_icmp_type();
    let identity = match icmp_type {
        IcmpType::EchoReply => {
            let packet = EchoReplyPacket::new_view(icmp_v4.packet())?;
            ProbeIdentity::Echo {
                identifier: TraceId(packet.get_identifier()),
                sequence: Sequence(packet.get_sequence()),
            }
        }
        IcmpType::TimeExceeded => {
            let packet = TimeExceededPacket::new_view(icmp_v4.packet())?;
            extract_original_identity(packet.payload())
        }
        _ => ProbeIdentity::Unknown,
    };
    let metadata = ControlMetadata {
        ttl: ipv4.get_ttl(),
        src: ipv4.get_source(),
        dst: info.map_or_else(|| ipv4.get_destination(), |info| info.dst),
        interface: info.and_then(|info| info.interface),
    };
    Ok(Response {
        icmp_type,
        icmp_code: icmp_v4.get_icmp_code(),
        addr: ipv4.get_source(),
        identity,
        metadata,
        received,
    })
}

/// Recover the echo request from the original datagram quoted in an ICMP error.
#[instrument(level = "trace")]
fn extract_original_identity(original: &[u8]) -> ProbeIdentity {
    let Ok(nested_ipv4) = Ipv4Packet::new_view(original) else {
        return ProbeIdentity::Unknown;
    };
    if nested_ipv4.get_protocol() != IpProtocol::Icmp {
        return ProbeIdentity::Foreign;
    }
    match EchoRequestPacket::new_view(nested_ipv4.payload()) {
        Ok(echo) if echo.get_icmp_type() == IcmpType::EchoRequest => ProbeIdentity::Echo {
            identifier: TraceId(echo.get_identifier()),
            sequence: Sequence(echo.get_sequence()),
        },
        Ok(_) => ProbeIdentity::Foreign,
        Err(_) => ProbeIdentity::Unknown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ErrorKind, IoError, IoOperation, IoResult};
    use crate::mocket_recv_msg;
    use crate::net::socket::MockSocket;
    use crate::types::TimeToLive;
    use mockall::predicate;
    use std::str::FromStr;

    const ECHO_REPLY: [u8; 84] = hex_literal::hex!(
        "
        45 20 00 54 00 00 00 00 3b 01 50 02 8e fb de ce
        c0 a8 01 15 00 00 09 0f 75 d7 81 19 00 00 00 00
        00 00 00 00 00 00 00 00 00 00 00 00 00 00 00 00
        00 00 00 00 00 00 00 00 00 00 00 00 00 00 00 00
        00 00 00 00 00 00 00 00 00 00 00 00 00 00 00 00
        00 00 00 00
        "
    );

    const TIME_EXCEEDED: [u8; 112] = hex_literal::hex!(
        "
        45 20 00 70 07 d7 00 00 3b 01 e9 5d 8e fa 3d 81
        c0 a8 01 15 0b 00 f4 ff 00 00 00 00 45 60 00 54
        65 b0 40 00 01 01 e4 11 c0 a8 01 15 8e fb de ce
        08 00 01 11 75 d7 81 17 00 00 00 00 00 00 00 00
        00 00 00 00 00 00 00 00 00 00 00 00 00 00 00 00
        00 00 00 00 00 00 00 00 00 00 00 00 00 00 00 00
        00 00 00 00 00 00 00 00 00 00 00 00 00 00 00 00
        "
    );

    #[test]
    fn test_dispatch_icmp_probe_no_payload() -> anyhow::Result<()> {
        let probe = ProbeRequest::new(TraceId(1234), TimeToLive(10), &[]);
        let dest_addr = Ipv4Addr::from_str("5.6.7.8")?;
        let expected_send_to_buf = hex_literal::hex!("08 00 f3 23 04 d2 00 0a");
        let expected_send_to_addr = SocketAddr::new(IpAddr::V4(dest_addr), 0);

        let mut seq = mockall::Sequence::new();
        let mut mocket = MockSocket::new();
        mocket
            .expect_set_ttl()
            .with(predicate::eq(10))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));
        mocket
            .expect_send_to()
            .with(
                predicate::eq(expected_send_to_buf),
                predicate::eq(expected_send_to_addr),
            )
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(()));

        let ipv4 = Ipv4 { dest_addr };
        let before = Instant::now();
        let sent = ipv4.dispatch_icmp_probe(&mut mocket, &probe)?;
        assert!(sent >= before);
        Ok(())
    }

    #[test]
    fn test_dispatch_icmp_probe_with_payload() -> anyhow::Result<()> {
        let probe = ProbeRequest::new(TraceId(1234), TimeToLive(1), b"HELLO-R-U-THERE");
        let dest_addr = Ipv4Addr::from_str("5.6.7.8")?;
        let expected_send_to_buf = hex_literal::hex!(
            "
            08 00 89 78 04 d2 00 01 48 45 4c 4c 4f 2d 52 2d
            55 2d 54 48 45 52 45
            "
        );
        let expected_send_to_addr = SocketAddr::new(IpAddr::V4(dest_addr), 0);

        let mut mocket = MockSocket::new();
        mocket
            .expect_set_ttl()
            .with(predicate::eq(1))
            .times(1)
            .returning(|_| Ok(()));
        mocket
            .expect_send_to()
            .with(
                predicate::eq(expected_send_to_buf),
                predicate::eq(expected_send_to_addr),
            )
            .times(1)
            .returning(|_, _| Ok(()));

        let ipv4 = Ipv4 { dest_addr };
        ipv4.dispatch_icmp_probe(&mut mocket, &probe)?;
        Ok(())
    }

    #[test]
    fn test_dispatch_icmp_probe_payload_too_large() {
        let probe = ProbeRequest::new(TraceId(1234), TimeToLive(1), &[0xff; MAX_PACKET_SIZE]);
        let mut mocket = MockSocket::new();
        mocket.expect_set_ttl().times(0);
        mocket.expect_send_to().times(0);
        let ipv4 = Ipv4 {
            dest_addr: Ipv4Addr::LOCALHOST,
        };
        let err = ipv4.dispatch_icmp_probe(&mut mocket, &probe).unwrap_err();
        assert!(matches!(err, Error::PacketError(_)));
        assert_eq!(ErrorKind::Protocol, err.kind());
    }

    #[test]
    fn test_dispatch_icmp_probe_set_ttl_failed() {
        let probe = ProbeRequest::new(TraceId(1234), TimeToLive(3), &[]);
        let mut mocket = MockSocket::new();
        mocket.expect_set_ttl().times(1).returning(|_| {
            Err(IoError::Other(
                std::io::Error::from(std::io::ErrorKind::InvalidInput),
                IoOperation::SetTtl,
            ))
        });
        mocket.expect_send_to().times(0);
        let ipv4 = Ipv4 {
            dest_addr: Ipv4Addr::LOCALHOST,
        };
        let err = ipv4.dispatch_icmp_probe(&mut mocket, &probe).unwrap_err();
        assert!(matches!(err, Error::IoError(_)));
        assert_eq!(ErrorKind::Transport, err.kind());
    }

    #[test]
    fn test_dispatch_icmp_probe_send_failed() {
        let probe = ProbeRequest::new(TraceId(1234), TimeToLive(3), &[]);
        let mut mocket = MockSocket::new();
        mocket.expect_set_ttl().times(1).returning(|_| Ok(()));
        mocket.expect_send_to().times(1).returning(|_, addr| {
            Err(IoError::SendTo(
                std::io::Error::from(std::io::ErrorKind::PermissionDenied),
                addr,
            ))
        });
        let ipv4 = Ipv4 {
            dest_addr: Ipv4Addr::LOCALHOST,
        };
        let err = ipv4.dispatch_icmp_probe(&mut mocket, &probe).unwrap_err();
        assert!(matches!(err, Error::ProbeFailed(_)));
        assert_eq!(ErrorKind::Transport, err.kind());
    }

    #[test]
    fn test_recv_icmp_probe_echo_reply() -> anyhow::Result<()> {
        let info = PacketInfo {
            dst: Ipv4Addr::from_str("192.168.1.21")?,
            interface: Some(2),
        };
        let mut mocket = MockSocket::new();
        mocket
            .expect_recv_msg()
            .times(1)
            .returning(mocket_recv_msg!(ECHO_REPLY, Some(info)));
        let ipv4 = Ipv4 {
            dest_addr: Ipv4Addr::from_str("142.251.222.206")?,
        };
        let resp = ipv4.recv_icmp_probe(&mut mocket)?;
        assert_eq!(IcmpType::EchoReply, resp.icmp_type);
        assert_eq!(IcmpCode(0), resp.icmp_code);
        assert_eq!(Ipv4Addr::from_str("142.251.222.206")?, resp.addr);
        assert_eq!(
            ProbeIdentity::Echo {
                identifier: TraceId(30167),
                sequence: Sequence(33049)
            },
            resp.identity
        );
        assert_eq!(
            ControlMetadata {
                ttl: 59,
                src: Ipv4Addr::from_str("142.251.222.206")?,
                dst: Ipv4Addr::from_str("192.168.1.21")?,
                interface: Some(2),
            },
            resp.metadata
        );
        Ok(())
    }

    #[test]
    fn test_recv_icmp_probe_time_exceeded() -> anyhow::Result<()> {
        let mut mocket = MockSocket::new();
        mocket
            .expect_recv_msg()
            .times(1)
            .returning(mocket_recv_msg!(TIME_EXCEEDED, None));
        let ipv4 = Ipv4 {
            dest_addr: Ipv4Addr::from_str("142.251.222.206")?,
        };
        let resp = ipv4.recv_icmp_probe(&mut mocket)?;
        assert_eq!(IcmpType::TimeExceeded, resp.icmp_type);
        assert_eq!(Ipv4Addr::from_str("142.250.61.129")?, resp.addr);
        assert_eq!(
            ProbeIdentity::Echo {
                identifier: TraceId(30167),
                sequence: Sequence(33047)
            },
            resp.identity
        );
        // without packet info the destination comes from the IPv4 header
        assert_eq!(Ipv4Addr::from_str("192.168.1.21")?, resp.metadata.dst);
        assert_eq!(None, resp.metadata.interface);
        assert_eq!(59, resp.metadata.ttl);
        Ok(())
    }

    #[test]
    fn test_recv_icmp_probe_time_exceeded_foreign_datagram() -> anyhow::Result<()> {
        let mut buf = TIME_EXCEEDED;
        // nested IPv4 protocol is UDP
        buf[37] = 0x11;
        let mut mocket = MockSocket::new();
        mocket
            .expect_recv_msg()
            .times(1)
            .returning(mocket_recv_msg!(buf, None));
        let ipv4 = Ipv4 {
            dest_addr: Ipv4Addr::LOCALHOST,
        };
        let resp = ipv4.recv_icmp_probe(&mut mocket)?;
        assert_eq!(IcmpType::TimeExceeded, resp.icmp_type);
        assert_eq!(ProbeIdentity::Foreign, resp.identity);
        Ok(())
    }

    #[test]
    fn test_recv_icmp_probe_time_exceeded_truncated_datagram() -> anyhow::Result<()> {
        // outer IPv4 header, time exceeded header, nested IPv4 header and 4 bytes of ICMP
        let buf: [u8; 52] = TIME_EXCEEDED[..52].try_into()?;
        let mut mocket = MockSocket::new();
        mocket
            .expect_recv_msg()
            .times(1)
            .returning(mocket_recv_msg!(buf, None));
        let ipv4 = Ipv4 {
            dest_addr: Ipv4Addr::LOCALHOST,
        };
        let resp = ipv4.recv_icmp_probe(&mut mocket)?;
        assert_eq!(ProbeIdentity::Unknown, resp.identity);
        Ok(())
    }

    #[test]
    fn test_recv_icmp_probe_other_type() -> anyhow::Result<()> {
        let buf = hex_literal::hex!(
            "
            45 00 00 1c 00 00 00 00 40 01 00 00 0a 00 00 01
            0a 00 00 02 0d 00 00 00 00 00 00 00
            "
        );
        let mut mocket = MockSocket::new();
        mocket
            .expect_recv_msg()
            .times(1)
            .returning(mocket_recv_msg!(buf, None));
        let ipv4 = Ipv4 {
            dest_addr: Ipv4Addr::LOCALHOST,
        };
        let resp = ipv4.recv_icmp_probe(&mut mocket)?;
        assert_eq!(IcmpType::Other(13), resp.icmp_type);
        assert_eq!(ProbeIdentity::Unknown, resp.identity);
        assert_eq!(Ipv4Addr::new(10, 0, 0, 1), resp.addr);
        assert_eq!(64, resp.metadata.ttl);
        Ok(())
    }

    #[test]
    fn test_recv_icmp_probe_truncated_packet() {
        let buf = hex_literal::hex!("45 00 00 1c 00 00");
        let mut mocket = MockSocket::new();
        mocket
            .expect_recv_msg()
            .times(1)
            .returning(mocket_recv_msg!(buf, None));
        let ipv4 = Ipv4 {
            dest_addr: Ipv4Addr::LOCALHOST,
        };
        let err = ipv4.recv_icmp_probe(&mut mocket).unwrap_err();
        assert_eq!(ErrorKind::Protocol, err.kind());
    }

    #[test]
    fn test_recv_icmp_probe_recv_failed() {
        let mut mocket = MockSocket::new();
        mocket.expect_recv_msg().times(1).returning(|_| {
            Err(IoError::Other(
                std::io::Error::from(std::io::ErrorKind::ConnectionReset),
                IoOperation::RecvMsg,
            ))
        });
        let ipv4 = Ipv4 {
            dest_addr: Ipv4Addr::LOCALHOST,
        };
        let err = ipv4.recv_icmp_probe(&mut mocket).unwrap_err();
        assert_eq!(ErrorKind::Transport, err.kind());
    }
}
