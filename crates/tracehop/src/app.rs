use crate::config::{quiet_log_filter, LogFormat, LogSpanEvents, TracehopConfig};
use crate::report;
use tracehop_core::{resolve_target, Builder, Trace};
use tracehop_dns::DnsResolver;
use tracing_subscriber::fmt::format::FmtSpan;

/// Run the tracehop application.
pub fn run_tracehop(cfg: &TracehopConfig) -> anyhow::Result<Trace> {
    configure_logging(cfg);
    let resolver = start_dns_resolver(cfg)?;
    let target_addr = resolve_target(&resolver, &cfg.target)?;
    let tracer = Builder::new(target_addr)
        .trace_identifier(cfg.trace_identifier)
        .max_ttl(cfg.max_ttl)
        .read_timeout(cfg.read_timeout)
        .payload(cfg.payload.as_bytes())
        .reverse_dns(cfg.reverse_dns)
        .build()?;
    report::report(&tracer, &cfg.target, &resolver)
}

/// Start the DNS resolver.
fn start_dns_resolver(cfg: &TracehopConfig) -> anyhow::Result<DnsResolver> {
    Ok(DnsResolver::start(tracehop_dns::Config::new(
        cfg.dns_resolve_method,
        cfg.dns_timeout,
    ))?)
}

fn configure_logging(cfg: &TracehopConfig) {
    if cfg.verbose {
        let fmt_span = match cfg.log_span_events {
            LogSpanEvents::Off => FmtSpan::NONE,
            LogSpanEvents::Active => FmtSpan::ACTIVE,
            LogSpanEvents::Full => FmtSpan::FULL,
        };
        match cfg.log_format {
            LogFormat::Compact => {
                tracing_subscriber::fmt()
                    .with_writer(std::io::stderr)
                    .with_span_events(fmt_span)
                    .with_env_filter(&cfg.log_filter)
                    .compact()
                    .init();
            }
            LogFormat::Pretty => {
                tracing_subscriber::fmt()
                    .with_writer(std::io::stderr)
                    .with_span_events(fmt_span)
                    .with_env_filter(&cfg.log_filter)
                    .pretty()
                    .init();
            }
            LogFormat::Json => {
                tracing_subscriber::fmt()
                    .with_writer(std::io::stderr)
                    .with_span_events(fmt_span)
                    .with_env_filter(&cfg.log_filter)
                    .json()
                    .init();
            }
        }
    } else {
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_env_filter(quiet_log_filter())
            .compact()
            .init();
    }
}
