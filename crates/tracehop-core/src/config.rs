use crate::types::{TimeToLive, TraceId};
use std::net::Ipv4Addr;
use std::time::Duration;

/// Default values for configuration.
pub mod defaults {
    use std::time::Duration;

    /// The default value for `max-ttl`.
    pub const DEFAULT_STRATEGY_MAX_TTL: u8 = 64;

    /// The default value for `read-timeout`.
    pub const DEFAULT_STRATEGY_READ_TIMEOUT: Duration = Duration::from_secs(3);

    /// The default echo request payload.
    pub const DEFAULT_STRATEGY_PAYLOAD: &[u8] = b"HELLO-R-U-THERE";

    /// The default value for `reverse-dns`.
    pub const DEFAULT_REVERSE_DNS: bool = true;
}

/// Tracer network channel configuration.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct ChannelConfig {
    pub target_addr: Ipv4Addr,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            target_addr: Ipv4Addr::UNSPECIFIED,
        }
    }
}

/// Tracing strategy configuration.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct StrategyConfig {
    pub target_addr: Ipv4Addr,
    pub trace_identifier: TraceId,
    pub max_ttl: TimeToLive,
    pub read_timeout: Duration,
    pub payload: Vec<u8>,
    pub reverse_dns: bool,
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self {
            target_addr: Ipv4Addr::UNSPECIFIED,
            trace_identifier: TraceId::default(),
            max_ttl: TimeToLive(defaults::DEFAULT_STRATEGY_MAX_TTL),
            read_timeout: defaults::DEFAULT_STRATEGY_READ_TIMEOUT,
            payload: defaults::DEFAULT_STRATEGY_PAYLOAD.to_vec(),
            reverse_dns: defaults::DEFAULT_REVERSE_DNS,
        }
    }
}
