use crate::error::{Error, Result};
use std::net::{IpAddr, Ipv4Addr};
use std::str::FromStr;
use tracehop_dns::Resolver;
use tracing::instrument;

/// Resolve the IPv4 address to trace for a `hostname`.
///
/// An IPv4 literal is used as is, otherwise the first IPv4 address returned
/// by the `resolver` is chosen.
///
/// # Errors
///
/// Returns [`Error::LookupFailed`] if the lookup fails and [`Error::NoIpv4Addr`]
/// if the hostname has no IPv4 address.
#[instrument(skip(resolver), level = "trace")]
pub fn resolve_target<R: Resolver>(resolver: &R, hostname: &str) -> Result<Ipv4Addr> {
    if let Ok(addr) = Ipv4Addr::from_str(hostname) {
        return Ok(addr);
    }
    let addrs = resolver
        .lookup(hostname)
        .map_err(|err| Error::LookupFailed(hostname.to_string(), err))?;
    tracing::debug!(?addrs);
    addrs
        .into_iter()
        .find_map(|addr| match addr {
            IpAddr::V4(addr) => Some(addr),
            IpAddr::V6(_) => None,
        })
        .ok_or_else(|| Error::NoIpv4Addr(hostname.to_string()))
}
