use crate::probe::ResponseKind;
use tracehop_packet::icmpv4::IcmpType;

/// Classify a received ICMP message type.
#[must_use]
pub const fn classify(icmp_type: IcmpType) -> ResponseKind {
    match icmp_type {
        IcmpType::TimeExceeded => ResponseKind::TimeExceeded,
        IcmpType::EchoReply => ResponseKind::EchoReply,
        IcmpType::EchoRequest | IcmpType::DestinationUnreachable | IcmpType::Other(_) => {
            ResponseKind::Other
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(IcmpType::TimeExceeded, ResponseKind::TimeExceeded)]
    #[test_case(IcmpType::EchoReply, ResponseKind::EchoReply)]
    #[test_case(IcmpType::EchoRequest, ResponseKind::Other)]
    #[test_case(IcmpType::DestinationUnreachable, ResponseKind::Other)]
    #[test_case(IcmpType::Other(5), ResponseKind::Other)]
    #[test_case(IcmpType::from(13), ResponseKind::Other)]
    fn test_classify(icmp_type: IcmpType, expected: ResponseKind) {
        assert_eq!(expected, classify(icmp_type));
    }
}
