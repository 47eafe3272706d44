use crate::config::StrategyConfig;
use crate::constants::{MAX_PAYLOAD_SIZE, MAX_TTL};
use crate::error::{Error, Result};
use crate::types::{TimeToLive, TraceId};
use crate::Tracer;
use std::net::Ipv4Addr;
use std::time::Duration;

/// Build a tracer.
///
/// This is a convenience builder to simplify the creation of a tracer.
///
/// # Examples
///
/// ```no_run
/// # fn main() -> anyhow::Result<()> {
/// use std::time::Duration;
/// use tracehop_core::Builder;
///
/// let addr = std::net::Ipv4Addr::new(1, 2, 3, 4);
/// let tracer = Builder::new(addr)
///     .max_ttl(30)
///     .read_timeout(Duration::from_secs(1))
///     .reverse_dns(false)
///     .build()?;
/// # Ok(())
/// # }
/// ```
///
/// # See Also
///
/// - [`Tracer`] - A traceroute implementation.
#[derive(Debug)]
pub struct Builder {
    target_addr: Ipv4Addr,
    trace_identifier: TraceId,
    max_ttl: TimeToLive,
    read_timeout: Duration,
    payload: Vec<u8>,
    reverse_dns: bool,
}

impl Default for Builder {
    fn default() -> Self {
        let config = StrategyConfig::default();
        Self {
            target_addr: config.target_addr,
            trace_identifier: process_trace_identifier(),
            max_ttl: config.max_ttl,
            read_timeout: config.read_timeout,
            payload: config.payload,
            reverse_dns: config.reverse_dns,
        }
    }
}

impl Builder {
    /// Build a tracer builder for a given target.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # fn main() -> anyhow::Result<()> {
    /// use tracehop_core::Builder;
    ///
    /// let addr = std::net::Ipv4Addr::new(1, 1, 1, 1);
    /// let tracer = Builder::new(addr).build()?;
    /// # Ok(())
    /// # }
    /// ```
    #[must_use]
    pub fn new(target_addr: Ipv4Addr) -> Self {
        Self {
            target_addr,
            ..Default::default()
        }
    }

    /// Set the trace identifier.
    ///
    /// If not set then the lower 16 bits of the process id will be used.
    #[must_use]
    pub fn trace_identifier(self, trace_id: u16) -> Self {
        Self {
            trace_identifier: TraceId(trace_id),
            ..self
        }
    }

    /// Set the maximum time-to-live.
    ///
    /// If not set then 64 will be used.
    #[must_use]
    pub fn max_ttl(self, max_ttl: u8) -> Self {
        Self {
            max_ttl: TimeToLive(max_ttl),
            ..self
        }
    }

    /// Set the read timeout of each probe.
    ///
    /// The timeout is measured from the instant each probe is sent.
    #[must_use]
    pub fn read_timeout(self, read_timeout: Duration) -> Self {
        Self {
            read_timeout,
            ..self
        }
    }

    /// Set the echo request payload.
    #[must_use]
    pub fn payload(self, payload: impl Into<Vec<u8>>) -> Self {
        Self {
            payload: payload.into(),
            ..self
        }
    }

    /// Set whether responding hosts are reverse resolved.
    #[must_use]
    pub fn reverse_dns(self, reverse_dns: bool) -> Self {
        Self {
            reverse_dns,
            ..self
        }
    }

    /// Build the `Tracer`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::BadConfig`] if the maximum ttl is zero or above
    /// [`MAX_TTL`], the read timeout is zero or the payload is larger than
    /// [`MAX_PAYLOAD_SIZE`].
    pub fn build(self) -> Result<Tracer> {
        if !(1..=MAX_TTL).contains(&self.max_ttl.0) {
            return Err(Error::BadConfig(format!(
                "max_ttl {} must be in 1..={MAX_TTL}",
                self.max_ttl.0
            )));
        }
        if self.read_timeout.is_zero() {
            return Err(Error::BadConfig(String::from(
                "read_timeout must be greater than zero",
            )));
        }
        if self.payload.len() > MAX_PAYLOAD_SIZE {
            return Err(Error::BadConfig(format!(
                "payload length {} > {MAX_PAYLOAD_SIZE}",
                self.payload.len()
            )));
        }
        Ok(Tracer::new(
            self.target_addr,
            self.trace_identifier,
            self.max_ttl,
            self.read_timeout,
            self.payload,
            self.reverse_dns,
        ))
    }
}

/// The lower 16 bits of the process id.
fn process_trace_identifier() -> TraceId {
    TraceId((std::process::id() & u32::from(u16::MAX)) as u16)
}
