use crate::config::Config;
use crate::resolver::{DnsEntry, Error, ResolvedIpAddrs, Resolver, Result};
use std::net::IpAddr;

/// How DNS queries will be resolved.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ResolveMethod {
    /// Resolve using the OS resolver.
    System,
    /// Resolve using the `/etc/resolv.conf` DNS configuration.
    Resolv,
    /// Resolve using the Google `8.8.8.8` DNS service.
    Google,
    /// Resolve using the Cloudflare `1.1.1.1` DNS service.
    Cloudflare,
}

/// A blocking DNS resolver.
///
/// Every call performs a fresh query, nothing is cached. Forward lookups
/// only return `IPv4` addresses.
pub struct DnsResolver {
    config: Config,
    provider: DnsProvider,
}

enum DnsProvider {
    Hickory(Box<hickory_resolver::Resolver>),
    DnsLookup,
}

impl DnsResolver {
    /// Create a resolver for the given `Config`.
    ///
    /// Fails if the stub resolver cannot be created, for instance if
    /// `/etc/resolv.conf` cannot be read for [`ResolveMethod::Resolv`].
    pub fn start(config: Config) -> std::io::Result<Self> {
        use hickory_resolver::config::{LookupIpStrategy, ResolverConfig, ResolverOpts};
        use hickory_resolver::system_conf::read_system_conf;
        let (resolver_cfg, mut options) = match config.resolve_method {
            ResolveMethod::System => {
                return Ok(Self {
                    config,
                    provider: DnsProvider::DnsLookup,
                })
            }
            ResolveMethod::Resolv => read_system_conf()?,
            ResolveMethod::Google => (ResolverConfig::google(), ResolverOpts::default()),
            ResolveMethod::Cloudflare => (ResolverConfig::cloudflare(), ResolverOpts::default()),
        };
        options.timeout = config.timeout;
        options.ip_strategy = LookupIpStrategy::Ipv4Only;
        let resolver = hickory_resolver::Resolver::new(resolver_cfg, options)?;
        Ok(Self {
            config,
            provider: DnsProvider::Hickory(Box::new(resolver)),
        })
    }

    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }
}

impl Resolver for DnsResolver {
    fn lookup(&self, hostname: impl AsRef<str>) -> Result<ResolvedIpAddrs> {
        let all = match &self.provider {
            DnsProvider::Hickory(resolver) => match resolver.lookup_ip(hostname.as_ref()) {
                Ok(lookup) => lookup.iter().collect::<Vec<_>>(),
                Err(err) => no_records_or_failed(err)?,
            },
            DnsProvider::DnsLookup => dns_lookup::lookup_host(hostname.as_ref())
                .map_err(|err| Error::LookupFailed(Box::new(err)))?,
        };
        Ok(ResolvedIpAddrs(ipv4_only(all)))
    }

    fn reverse_lookup(&self, addr: impl Into<IpAddr>) -> DnsEntry {
        let addr = addr.into();
        match &self.provider {
            // the system resolver cannot distinguish a missing record from a
            // failure and falls back to the numeric form of the address.
            DnsProvider::DnsLookup => match dns_lookup::lookup_addr(&addr) {
                Ok(host) if host != addr.to_string() => DnsEntry::Resolved(addr, vec![host]),
                Ok(_) | Err(_) => DnsEntry::NotFound(addr),
            },
            DnsProvider::Hickory(resolver) => match resolver.reverse_lookup(addr) {
                Ok(names) => {
                    let hostnames = names
                        .into_iter()
                        .map(|mut ptr| {
                            ptr.0.set_fqdn(false);
                            ptr.to_string()
                        })
                        .collect::<Vec<_>>();
                    if hostnames.is_empty() {
                        DnsEntry::NotFound(addr)
                    } else {
                        DnsEntry::Resolved(addr, hostnames)
                    }
                }
                Err(err) => match err.kind() {
                    hickory_resolver::error::ResolveErrorKind::NoRecordsFound { .. } => {
                        DnsEntry::NotFound(addr)
                    }
                    _ => DnsEntry::Failed(addr),
                },
            },
        }
    }
}

fn ipv4_only(all: Vec<IpAddr>) -> Vec<IpAddr> {
    all.into_iter().filter(IpAddr::is_ipv4).collect()
}

/// A host with no `A` records is not a failed lookup, it has no addresses.
fn no_records_or_failed(err: hickory_resolver::error::ResolveError) -> Result<Vec<IpAddr>> {
    match err.kind() {
        hickory_resolver::error::ResolveErrorKind::NoRecordsFound { .. } => Ok(vec![]),
        _ => Err(Error::LookupFailed(Box::new(err))),
    }
}
