use crate::classifier::classify;
use crate::config::StrategyConfig;
use crate::error::Result;
use crate::net::Network;
use crate::probe::{Hop, HopResult, ProbeRequest, ProbeResponse, Response, ResponseKind};
use crate::types::TimeToLive;
use std::net::Ipv4Addr;
use std::time::Instant;
use tracehop_dns::Resolver;
use tracing::instrument;

/// Indicates what triggered the completion of the trace.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum CompletionReason {
    /// The trace ended because the target replied.
    TargetFound,
    /// The trace ended because the maximum time-to-live was probed without
    /// reaching the target.
    MaxTtlExhausted,
}

/// The output of a completed trace.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Trace {
    pub target_addr: Ipv4Addr,
    /// One hop per time-to-live probed, in order, starting from 1.
    pub hops: Vec<Hop>,
    pub reason: CompletionReason,
}

impl Trace {
    #[must_use]
    pub fn target_found(&self) -> bool {
        self.reason == CompletionReason::TargetFound
    }
}

/// The state of a sweep.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
enum SweepState {
    /// The next probe is to be sent with the given ttl.
    Probing(TimeToLive),
    Done(CompletionReason),
}

impl SweepState {
    /// The state following a completed `hop`.
    fn next(self, hop: &Hop, max_ttl: TimeToLive) -> Self {
        match self {
            Self::Probing(_) if hop.is_target() => Self::Done(CompletionReason::TargetFound),
            Self::Probing(ttl) if ttl >= max_ttl => Self::Done(CompletionReason::MaxTtlExhausted),
            Self::Probing(ttl) => Self::Probing(ttl + TimeToLive(1)),
            Self::Done(reason) => Self::Done(reason),
        }
    }
}

/// Trace a path to a target by sweeping the time-to-live.
#[derive(Debug)]
pub struct Strategy<'a, R, F> {
    config: StrategyConfig,
    resolver: &'a R,
    publish: F,
}

impl<'a, R: Resolver, F: FnMut(&Hop)> Strategy<'a, R, F> {
    #[instrument(skip_all, level = "trace")]
    pub fn new(config: StrategyConfig, resolver: &'a R, publish: F) -> Self {
        tracing::debug!(?config);
        Self {
            config,
            resolver,
            publish,
        }
    }

    /// Probe each ttl in turn until the target replies or the maximum ttl
    /// has been probed.
    ///
    /// Each hop is published as soon as it is known.
    #[instrument(skip(self, network), level = "trace")]
    pub fn run<N: Network>(mut self, mut network: N) -> Result<Trace> {
        let mut hops = Vec::with_capacity(usize::from(self.config.max_ttl.0));
        let mut state = SweepState::Probing(TimeToLive(1));
        loop {
            match state {
                SweepState::Probing(ttl) => {
                    let hop = self.probe(&mut network, ttl)?;
                    (self.publish)(&hop);
                    state = state.next(&hop, self.config.max_ttl);
                    hops.push(hop);
                }
                SweepState::Done(reason) => {
                    tracing::debug!(?reason, hops = hops.len(), "trace complete");
                    return Ok(Trace {
                        target_addr: self.config.target_addr,
                        hops,
                        reason,
                    });
                }
            }
        }
    }

    /// Send a single probe and wait for the response to it.
    ///
    /// Packets which are unrecognized or belong to some other probe are
    /// discarded and do not extend the deadline.
    #[instrument(skip(self, network), level = "trace")]
    fn probe<N: Network>(&self, network: &mut N, ttl: TimeToLive) -> Result<Hop> {
        let probe = ProbeRequest::new(self.config.trace_identifier, ttl, &self.config.payload);
        let sent = network.send_probe(&probe)?;
        let deadline = sent + self.config.read_timeout;
        while let Some(resp) = network.recv_probe(deadline)? {
            match classify(resp.icmp_type) {
                ResponseKind::Other => {
                    tracing::warn!(
                        icmp_type = ?resp.icmp_type,
                        icmp_code = ?resp.icmp_code,
                        addr = %resp.addr,
                        "unrecognized ICMP message"
                    );
                }
                kind if resp.identity.matches(&probe) => {
                    let resp = self.probe_response(kind, resp, sent);
                    return Ok(Hop::new(ttl, HopResult::Responded(resp)));
                }
                kind => {
                    tracing::debug!(
                        ?kind,
                        identity = ?resp.identity,
                        addr = %resp.addr,
                        "ignoring response to another probe"
                    );
                }
            }
        }
        Ok(Hop::new(ttl, HopResult::TimedOut))
    }

    fn probe_response(&self, kind: ResponseKind, resp: Response, sent: Instant) -> ProbeResponse {
        let hostnames = if self.config.reverse_dns {
            self.resolver
                .reverse_lookup(resp.addr)
                .hostnames()
                .map(String::from)
                .collect()
        } else {
            vec![]
        };
        ProbeResponse {
            kind,
            addr: resp.addr,
            hostnames,
            metadata: resp.metadata,
            rtt: resp.received.saturating_duration_since(sent),
        }
    }
}
