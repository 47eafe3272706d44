//! Internet checksums (RFC 1071) for `IPv4` headers and `ICMPv4` messages.

/// The index of the checksum word in an `IPv4` header.
const IPV4_CHECKSUM_WORD: usize = 5;

/// The index of the checksum word in an `ICMPv4` message.
const ICMP_CHECKSUM_WORD: usize = 1;

/// Calculate the checksum for an `IPv4` header.
///
/// The existing checksum field is ignored.
#[must_use]
pub fn ipv4_header_checksum(data: &[u8]) -> u16 {
    checksum(data, IPV4_CHECKSUM_WORD)
}

/// Calculate the checksum for an `IPv4` `ICMP` message.
///
/// The existing checksum field is ignored.
#[must_use]
pub fn icmp_ipv4_checksum(data: &[u8]) -> u16 {
    checksum(data, ICMP_CHECKSUM_WORD)
}

fn checksum(data: &[u8], ignore_word: usize) -> u16 {
    if data.is_empty() {
        return 0;
    }
    finalize_checksum(sum_be_words(data, ignore_word))
}

fn sum_be_words(data: &[u8], ignore_word: usize) -> u32 {
    data.chunks(2)
        .enumerate()
        .filter(|(i, _)| *i != ignore_word)
        .map(|(_, word)| match *word {
            [hi, lo] => u32::from(u16::from_be_bytes([hi, lo])),
            [hi] => u32::from(hi) << 8,
            _ => 0,
        })
        .sum()
}

const fn finalize_checksum(mut sum: u32) -> u16 {
    while sum >> 16 != 0 {
        sum = (sum >> 16) + (sum & 0xFFFF);
    }
    !sum as u16
}
