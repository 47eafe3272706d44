//! This crate provides a blocking forward and reverse DNS resolver.
//!
//! Lookups are performed either with the operating system resolver or with
//! a stub resolver querying the `/etc/resolv.conf` servers, Google or
//! Cloudflare directly.
//!
//! Reverse lookups never fail: an address which cannot be resolved yields
//! a [`DnsEntry`] without hostnames.
//!
//! # Example
//!
//! The following example resolves a hostname and then performs a reverse
//! lookup of the first address found:
//!
//! ```no_run
//! # fn main() -> anyhow::Result<()> {
//! use tracehop_dns::{Builder, DnsResolver, Resolver};
//!
//! let config = Builder::new().build();
//! let resolver = DnsResolver::start(config)?;
//! let addrs = resolver.lookup("example.com")?;
//! if let Some(addr) = addrs.iter().next() {
//!     let entry = resolver.reverse_lookup(*addr);
//!     println!("{addr} is {}", entry.hostnames().collect::<Vec<_>>().join(" "));
//! }
//! # Ok(())
//! # }
//! ```
#![warn(clippy::all, clippy::pedantic, clippy::nursery, rust_2018_idioms)]
#![allow(clippy::module_name_repetitions)]
#![forbid(unsafe_code)]

mod blocking_resolver;
mod config;
mod resolver;

pub use blocking_resolver::{DnsResolver, ResolveMethod};
pub use config::{Builder, Config};
pub use resolver::{DnsEntry, Error, ResolvedHostnames, ResolvedIpAddrs, Resolver, Result};
