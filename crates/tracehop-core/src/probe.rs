use crate::types::{Sequence, TimeToLive, TraceId};
use std::fmt::{Display, Formatter};
use std::net::Ipv4Addr;
use std::time::{Duration, Instant};
use tracehop_packet::icmpv4::{IcmpCode, IcmpType};

/// An ICMP echo request to be sent with a given time-to-live.
///
/// The `sequence` of a probe always equals its `ttl`.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct ProbeRequest {
    /// The identifier of the trace, shared by all probes of a run.
    pub identifier: TraceId,
    /// The echo sequence number.
    pub sequence: Sequence,
    /// The IP time-to-live the probe is sent with.
    pub ttl: TimeToLive,
    /// The echo request payload.
    pub payload: Vec<u8>,
}

impl ProbeRequest {
    #[must_use]
    pub fn new(identifier: TraceId, ttl: TimeToLive, payload: &[u8]) -> Self {
        Self {
            identifier,
            sequence: Sequence::from(ttl),
            ttl,
            payload: payload.to_vec(),
        }
    }
}

/// The echo request a response refers to, as far as it can be recovered.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ProbeIdentity {
    /// The identifier and sequence of the echo request.
    Echo {
        identifier: TraceId,
        sequence: Sequence,
    },
    /// The quoted original datagram is not an ICMP echo request.
    Foreign,
    /// The quoted original datagram is too short to recover the echo request.
    Unknown,
}

impl ProbeIdentity {
    /// Does this identity refer to `probe`?
    ///
    /// An `Unknown` identity is assumed to match.
    #[must_use]
    pub fn matches(&self, probe: &ProbeRequest) -> bool {
        match self {
            Self::Echo {
                identifier,
                sequence,
            } => *identifier == probe.identifier && *sequence == probe.sequence,
            Self::Foreign => false,
            Self::Unknown => true,
        }
    }
}

/// An ICMP packet read from the packet channel.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Response {
    pub icmp_type: IcmpType,
    pub icmp_code: IcmpCode,
    /// The sender of the ICMP packet.
    pub addr: Ipv4Addr,
    pub identity: ProbeIdentity,
    pub metadata: ControlMetadata,
    pub received: Instant,
}

/// The classification of an ICMP response.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ResponseKind {
    /// An intermediate router discarded the probe.
    TimeExceeded,
    /// The target answered the probe.
    EchoReply,
    /// Any other ICMP message.
    Other,
}

/// The IP level data of a received packet.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct ControlMetadata {
    /// The time-to-live of the received packet.
    pub ttl: u8,
    /// The source address of the received packet.
    pub src: Ipv4Addr,
    /// The destination address of the received packet.
    pub dst: Ipv4Addr,
    /// The index of the interface the packet was received on, if known.
    pub interface: Option<u32>,
}

impl Display for ControlMetadata {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "ttl={} src={} dst={}", self.ttl, self.src, self.dst)?;
        if let Some(interface) = self.interface {
            write!(f, " ifindex={interface}")?;
        }
        Ok(())
    }
}

/// A response accepted for a probe.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct ProbeResponse {
    pub kind: ResponseKind,
    /// The address of the responding host.
    pub addr: Ipv4Addr,
    /// The hostnames of `addr`, empty if reverse DNS is disabled or failed.
    pub hostnames: Vec<String>,
    pub metadata: ControlMetadata,
    /// The round trip time, measured from the instant the probe was sent.
    pub rtt: Duration,
}

/// The outcome of probing a single time-to-live.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum HopResult {
    Responded(ProbeResponse),
    TimedOut,
}

/// A single hop of a trace.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Hop {
    pub ttl: TimeToLive,
    pub result: HopResult,
}

impl Hop {
    #[must_use]
    pub const fn new(ttl: TimeToLive, result: HopResult) -> Self {
        Self { ttl, result }
    }

    /// Is this hop the target?
    #[must_use]
    pub const fn is_target(&self) -> bool {
        matches!(
            self.result,
            HopResult::Responded(ProbeResponse {
                kind: ResponseKind::EchoReply,
                ..
            })
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    const ID: TraceId = TraceId(1234);

    #[test]
    fn test_probe_sequence_is_ttl() {
        let probe = ProbeRequest::new(ID, TimeToLive(7), b"HELLO-R-U-THERE");
        assert_eq!(Sequence(7), probe.sequence);
        assert_eq!(TimeToLive(7), probe.ttl);
        assert_eq!(b"HELLO-R-U-THERE", probe.payload.as_slice());
    }

    #[test_case(ProbeIdentity::Echo { identifier: ID, sequence: Sequence(7) }, true; "same echo")]
    #[test_case(ProbeIdentity::Echo { identifier: TraceId(1), sequence: Sequence(7) }, false; "other identifier")]
    #[test_case(ProbeIdentity::Echo { identifier: ID, sequence: Sequence(6) }, false; "other sequence")]
    #[test_case(ProbeIdentity::Foreign, false; "foreign")]
    #[test_case(ProbeIdentity::Unknown, true; "unknown")]
    fn test_identity_matches(identity: ProbeIdentity, expected: bool) {
        let probe = ProbeRequest::new(ID, TimeToLive(7), &[]);
        assert_eq!(expected, identity.matches(&probe));
    }

    #[test]
    fn test_metadata_display() {
        let mut metadata = ControlMetadata {
            ttl: 59,
            src: Ipv4Addr::new(142, 251, 222, 206),
            dst: Ipv4Addr::new(192, 168, 1, 21),
            interface: Some(2),
        };
        assert_eq!(
            "ttl=59 src=142.251.222.206 dst=192.168.1.21 ifindex=2",
            metadata.to_string()
        );
        metadata.interface = None;
        assert_eq!(
            "ttl=59 src=142.251.222.206 dst=192.168.1.21",
            metadata.to_string()
        );
    }

    #[test]
    fn test_hop_is_target() {
        let response = ProbeResponse {
            kind: ResponseKind::EchoReply,
            addr: Ipv4Addr::LOCALHOST,
            hostnames: vec![],
            metadata: ControlMetadata {
                ttl: 64,
                src: Ipv4Addr::LOCALHOST,
                dst: Ipv4Addr::LOCALHOST,
                interface: None,
            },
            rtt: Duration::ZERO,
        };
        let hop = Hop::new(TimeToLive(1), HopResult::Responded(response.clone()));
        assert!(hop.is_target());
        let hop = Hop::new(
            TimeToLive(1),
            HopResult::Responded(ProbeResponse {
                kind: ResponseKind::TimeExceeded,
                ..response
            }),
        );
        assert!(!hop.is_target());
        assert!(!Hop::new(TimeToLive(1), HopResult::TimedOut).is_target());
    }
}
