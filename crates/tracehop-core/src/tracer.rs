use crate::config::{ChannelConfig, StrategyConfig};
use crate::error::Result;
use crate::net::channel::Channel;
use crate::net::SocketImpl;
use crate::probe::Hop;
use crate::strategy::{Strategy, Trace};
use crate::types::{TimeToLive, TraceId};
use std::net::Ipv4Addr;
use std::time::Duration;
use tracehop_dns::Resolver;
use tracing::instrument;

/// A traceroute implementation.
///
/// See the [`crate`] documentation for more information.
#[derive(Debug, Clone)]
pub struct Tracer {
    target_addr: Ipv4Addr,
    trace_identifier: TraceId,
    max_ttl: TimeToLive,
    read_timeout: Duration,
    payload: Vec<u8>,
    reverse_dns: bool,
}

impl Tracer {
    /// Create a `Tracer`.
    ///
    /// Use the [`crate::Builder`] type to create a [`Tracer`].
    #[must_use]
    pub(crate) const fn new(
        target_addr: Ipv4Addr,
        trace_identifier: TraceId,
        max_ttl: TimeToLive,
        read_timeout: Duration,
        payload: Vec<u8>,
        reverse_dns: bool,
    ) -> Self {
        Self {
            target_addr,
            trace_identifier,
            max_ttl,
            read_timeout,
            payload,
            reverse_dns,
        }
    }

    /// Run the [`Tracer`].
    ///
    /// This method will block until the target replies, the maximum ttl has
    /// been probed or the trace fails.
    ///
    /// The `resolver` is used for the reverse DNS lookup of each responding
    /// host.
    ///
    /// # Example
    ///
    /// ```no_run
    /// # fn main() -> anyhow::Result<()> {
    /// use std::net::Ipv4Addr;
    /// use tracehop_core::Builder;
    /// use tracehop_dns::{Config, DnsResolver};
    ///
    /// let resolver = DnsResolver::start(Config::default())?;
    /// let trace = Builder::new(Ipv4Addr::new(1, 1, 1, 1)).build()?.run(&resolver)?;
    /// println!("{} hops", trace.hops.len());
    /// # Ok(())
    /// # }
    /// ```
    ///
    /// # See Also
    ///
    /// - [`Tracer::run_with`] - Run the tracer with a custom hop handler.
    pub fn run<R: Resolver>(&self, resolver: &R) -> Result<Trace> {
        self.run_with(resolver, |_| ())
    }

    /// Run the [`Tracer`] with a custom hop handler.
    ///
    /// This method behaves as [`Tracer::run`] and additionally calls `func`
    /// for each hop as soon as it is known.
    ///
    /// The raw socket is opened before the first probe is sent and closed
    /// when this method returns, whatever the outcome.
    ///
    /// # Example
    ///
    /// ```no_run
    /// # fn main() -> anyhow::Result<()> {
    /// use std::net::Ipv4Addr;
    /// use tracehop_core::Builder;
    /// use tracehop_dns::{Config, DnsResolver};
    ///
    /// let resolver = DnsResolver::start(Config::default())?;
    /// Builder::new(Ipv4Addr::new(1, 1, 1, 1))
    ///     .build()?
    ///     .run_with(&resolver, |hop| println!("{hop:?}"))?;
    /// # Ok(())
    /// # }
    /// ```
    #[instrument(skip_all, level = "trace")]
    pub fn run_with<R: Resolver, F: FnMut(&Hop)>(&self, resolver: &R, func: F) -> Result<Trace> {
        let channel = Channel::<SocketImpl>::connect(&self.make_channel_config())?;
        Strategy::new(self.make_strategy_config(), resolver, func).run(channel)
    }

    /// The target address of the tracer.
    #[must_use]
    pub const fn target_addr(&self) -> Ipv4Addr {
        self.target_addr
    }

    /// The identifier of the tracer.
    #[must_use]
    pub const fn trace_identifier(&self) -> TraceId {
        self.trace_identifier
    }

    /// The maximum time-to-live of the tracer.
    #[must_use]
    pub const fn max_ttl(&self) -> TimeToLive {
        self.max_ttl
    }

    /// The read timeout of each probe.
    #[must_use]
    pub const fn read_timeout(&self) -> Duration {
        self.read_timeout
    }

    /// The echo request payload.
    #[must_use]
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Whether responding hosts are reverse resolved.
    #[must_use]
    pub const fn reverse_dns(&self) -> bool {
        self.reverse_dns
    }

    const fn make_channel_config(&self) -> ChannelConfig {
        ChannelConfig {
            target_addr: self.target_addr,
        }
    }

    fn make_strategy_config(&self) -> StrategyConfig {
        StrategyConfig {
            target_addr: self.target_addr,
            trace_identifier: self.trace_identifier,
            max_ttl: self.max_ttl,
            read_timeout: self.read_timeout,
            payload: self.payload.clone(),
            reverse_dns: self.reverse_dns,
        }
    }
}
