//! tracehop - discover the hops to a host by sweeping the IP time-to-live.
//!
//! This crate provides the hop prober used by the `tracehop` command line
//! tool.  ICMP echo requests are sent with a time-to-live of 1, 2, 3 and so
//! on, one probe in flight at a time, and the router which discards each
//! probe (or the target itself) is recorded.
//!
//! The trace stops as soon as the target replies or once the maximum
//! time-to-live has been probed.  A probe which receives no reply before the
//! read timeout is recorded as a timed out hop and is never retried.
//!
//! Raw sockets are used and so elevated privileges (such as the `CAP_NET_RAW`
//! capability on Linux) are required.
//!
//! # Example
//!
//! The following example resolves a host, traces the route to it and prints
//! each hop as it is discovered:
//!
//! ```no_run
//! # fn main() -> anyhow::Result<()> {
//! use tracehop_core::{resolve_target, Builder};
//! use tracehop_dns::{Config, DnsResolver};
//!
//! let resolver = DnsResolver::start(Config::default())?;
//! let addr = resolve_target(&resolver, "example.com")?;
//! let trace = Builder::new(addr)
//!     .max_ttl(30)
//!     .build()?
//!     .run_with(&resolver, |hop| println!("{hop:?}"))?;
//! println!("{:?}", trace.reason);
//! # Ok(())
//! # }
//! ```
//!
//! # See Also
//!
//! - [`Builder`] - Build a [`Tracer`].
//! - [`Tracer::run`] - Run the tracer on the current thread.
//! - [`Tracer::run_with`] - Run the tracer with a custom hop handler.
#![warn(clippy::all, clippy::pedantic, clippy::nursery, rust_2018_idioms)]
#![allow(
    clippy::module_name_repetitions,
    clippy::struct_field_names,
    clippy::use_self,
    clippy::option_if_let_else,
    clippy::missing_const_for_fn,
    clippy::cast_possible_truncation,
    clippy::missing_errors_doc
)]
#![deny(unsafe_code)]

mod builder;
mod classifier;
mod config;
mod constants;
mod error;
mod net;
mod probe;
mod strategy;
mod target;
mod tracer;
mod types;

pub use builder::Builder;
pub use classifier::classify;
pub use config::defaults;
pub use constants::{MAX_PAYLOAD_SIZE, MAX_TTL};
pub use error::{Error, ErrorKind, IoError, IoOperation, Result};
pub use probe::{ControlMetadata, Hop, HopResult, ProbeResponse, ResponseKind};
pub use strategy::{CompletionReason, Trace};
pub use target::resolve_target;
pub use tracer::Tracer;
pub use types::{Sequence, TimeToLive, TraceId};
