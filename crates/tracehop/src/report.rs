use itertools::Itertools;
use std::net::Ipv4Addr;
use tracehop_core::{Hop, HopResult, Trace, Tracer};
use tracehop_dns::Resolver;
use tracing::instrument;

/// Run the tracer and print each hop as it is discovered.
#[instrument(skip_all, level = "trace")]
pub fn report<R: Resolver>(
    tracer: &Tracer,
    target_hostname: &str,
    resolver: &R,
) -> anyhow::Result<Trace> {
    println!("{}", banner(tracer.target_addr(), target_hostname));
    Ok(tracer.run_with(resolver, |hop| println!("{}", format_hop(hop)))?)
}

fn banner(target_addr: Ipv4Addr, target_hostname: &str) -> String {
    format!("Using {target_addr} for tracing an IP packet route to {target_hostname}")
}

/// Format a hop.
///
/// A hop which responded spans two lines, the second holding the control
/// metadata of the response.
fn format_hop(hop: &Hop) -> String {
    match &hop.result {
        HopResult::Responded(response) => format!(
            "{}\t{} [{}] {:?}\n\t{}",
            hop.ttl,
            response.addr,
            response.hostnames.iter().join(" "),
            response.rtt,
            response.metadata
        ),
        HopResult::TimedOut => format!("{}\t*", hop.ttl),
    }
}
