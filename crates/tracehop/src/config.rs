use anyhow::anyhow;
use clap::ValueEnum;
use file::ConfigFile;
use serde::Deserialize;
use std::time::Duration;
use tracehop_core::{defaults, MAX_PAYLOAD_SIZE, MAX_TTL};
use tracehop_dns::ResolveMethod;

mod cmd;
mod constants;
mod file;

pub use cmd::Args;

/// How DNS queries will be resolved.
#[derive(Debug, Copy, Clone, Eq, PartialEq, ValueEnum, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DnsResolveMethodConfig {
    /// Resolve using the OS resolver.
    System,
    /// Resolve using the `/etc/resolv.conf` DNS configuration.
    Resolv,
    /// Resolve using the Google `8.8.8.8` DNS service.
    Google,
    /// Resolve using the Cloudflare `1.1.1.1` DNS service.
    Cloudflare,
}

/// How to format log data.
#[derive(Debug, Copy, Clone, Eq, PartialEq, ValueEnum, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LogFormat {
    /// Display log data in a compact format.
    Compact,
    /// Display log data in a pretty format.
    Pretty,
    /// Display log data in a json format.
    Json,
}

/// How to log event spans.
#[derive(Debug, Copy, Clone, Eq, PartialEq, ValueEnum, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LogSpanEvents {
    /// Do not display event spans.
    Off,
    /// Display enter and exit event spans.
    Active,
    /// Display all event spans.
    Full,
}

/// The action to perform.
#[derive(Debug, Eq, PartialEq)]
pub enum TracehopAction {
    /// Trace the route to a host.
    Trace(TracehopConfig),
    /// Print a template toml config file and exit.
    PrintConfigTemplate,
}

impl TracehopAction {
    pub fn from(args: Args, pid: u16) -> anyhow::Result<Self> {
        Ok(if args.print_config_template {
            Self::PrintConfigTemplate
        } else {
            Self::Trace(TracehopConfig::from(args, pid)?)
        })
    }
}

/// Fully parsed and validated configuration.
#[derive(Debug, Eq, PartialEq)]
pub struct TracehopConfig {
    pub target: String,
    pub max_ttl: u8,
    pub read_timeout: Duration,
    pub trace_identifier: u16,
    pub payload: String,
    pub reverse_dns: bool,
    pub dns_resolve_method: ResolveMethod,
    pub dns_timeout: Duration,
    pub verbose: bool,
    pub log_format: LogFormat,
    pub log_filter: String,
    pub log_span_events: LogSpanEvents,
}

impl TracehopConfig {
    pub fn from(args: Args, pid: u16) -> anyhow::Result<Self> {
        let cfg_file = if let Some(cfg) = &args.config_file {
            file::read_config_file(cfg)?
        } else {
            file::read_default_config_file()?.unwrap_or_default()
        };
        Self::build_config(args, cfg_file, pid)
    }

    fn build_config(args: Args, cfg_file: ConfigFile, pid: u16) -> anyhow::Result<Self> {
        let cfg_file_tracehop = cfg_file.tracehop.unwrap_or_default();
        let cfg_file_strategy = cfg_file.strategy.unwrap_or_default();
        let cfg_file_dns = cfg_file.dns.unwrap_or_default();
        let target = args
            .target
            .ok_or_else(|| anyhow!("a target host must be specified"))?;
        let max_ttl = cfg_layer(
            args.max_ttl,
            cfg_file_strategy.max_ttl,
            defaults::DEFAULT_STRATEGY_MAX_TTL,
        );
        let read_timeout = cfg_layer(
            args.read_timeout,
            cfg_file_strategy.read_timeout,
            defaults::DEFAULT_STRATEGY_READ_TIMEOUT,
        );
        let trace_identifier = cfg_layer(
            args.trace_identifier,
            cfg_file_strategy.trace_identifier,
            pid,
        );
        let payload = cfg_layer(
            args.payload,
            cfg_file_strategy.payload,
            default_payload(),
        );
        let reverse_dns = !args.no_dns
            && cfg_file_dns
                .reverse_dns
                .unwrap_or(defaults::DEFAULT_REVERSE_DNS);
        let dns_resolve_method_config = cfg_layer(
            args.dns_resolve_method,
            cfg_file_dns.dns_resolve_method,
            constants::DEFAULT_DNS_RESOLVE_METHOD,
        );
        let dns_timeout = cfg_layer(
            args.dns_timeout,
            cfg_file_dns.dns_timeout,
            constants::DEFAULT_DNS_TIMEOUT,
        );
        let log_format = cfg_layer(
            args.log_format,
            cfg_file_tracehop.log_format,
            constants::DEFAULT_LOG_FORMAT,
        );
        let log_filter = cfg_layer(
            args.log_filter,
            cfg_file_tracehop.log_filter,
            String::from(constants::DEFAULT_LOG_FILTER),
        );
        let log_span_events = cfg_layer(
            args.log_span_events,
            cfg_file_tracehop.log_span_events,
            constants::DEFAULT_LOG_SPAN_EVENTS,
        );
        validate_ttl(max_ttl)?;
        validate_read_timeout(read_timeout)?;
        validate_payload(&payload)?;
        Ok(Self {
            target,
            max_ttl,
            read_timeout,
            trace_identifier,
            payload,
            reverse_dns,
            dns_resolve_method: dns_resolve_method(dns_resolve_method_config),
            dns_timeout,
            verbose: args.verbose,
            log_format,
            log_filter,
            log_span_events,
        })
    }
}

impl Default for TracehopConfig {
    fn default() -> Self {
        Self {
            target: String::new(),
            max_ttl: defaults::DEFAULT_STRATEGY_MAX_TTL,
            read_timeout: defaults::DEFAULT_STRATEGY_READ_TIMEOUT,
            trace_identifier: 0,
            payload: default_payload(),
            reverse_dns: defaults::DEFAULT_REVERSE_DNS,
            dns_resolve_method: dns_resolve_method(constants::DEFAULT_DNS_RESOLVE_METHOD),
            dns_timeout: constants::DEFAULT_DNS_TIMEOUT,
            verbose: false,
            log_format: constants::DEFAULT_LOG_FORMAT,
            log_filter: String::from(constants::DEFAULT_LOG_FILTER),
            log_span_events: constants::DEFAULT_LOG_SPAN_EVENTS,
        }
    }
}

/// The log filter to use when verbose logging is disabled.
pub const fn quiet_log_filter() -> &'static str {
    constants::QUIET_LOG_FILTER
}

/// The template toml config file.
pub const fn config_template() -> &'static str {
    include_str!("../tracehop-config-sample.toml")
}

fn default_payload() -> String {
    String::from_utf8_lossy(defaults::DEFAULT_STRATEGY_PAYLOAD).into_owned()
}

const fn dns_resolve_method(dns_resolve_method: DnsResolveMethodConfig) -> ResolveMethod {
    match dns_resolve_method {
        DnsResolveMethodConfig::System => ResolveMethod::System,
        DnsResolveMethodConfig::Resolv => ResolveMethod::Resolv,
        DnsResolveMethodConfig::Google => ResolveMethod::Google,
        DnsResolveMethodConfig::Cloudflare => ResolveMethod::Cloudflare,
    }
}

fn cfg_layer<T>(fst: Option<T>, snd: Option<T>, def: T) -> T {
    match (fst, snd) {
        (Some(val), _) | (None, Some(val)) => val,
        (None, None) => def,
    }
}

/// Validate `max_ttl`.
fn validate_ttl(max_ttl: u8) -> anyhow::Result<()> {
    if (1..=MAX_TTL).contains(&max_ttl) {
        Ok(())
    } else {
        Err(anyhow!(
            "max-ttl ({max_ttl}) must be in the range 1..={MAX_TTL}"
        ))
    }
}

/// Validate `read_timeout`.
fn validate_read_timeout(read_timeout: Duration) -> anyhow::Result<()> {
    if read_timeout < constants::MIN_READ_TIMEOUT_MS
        || read_timeout > constants::MAX_READ_TIMEOUT_MS
    {
        Err(anyhow!(
            "read-timeout ({:?}) must be between {:?} and {:?} inclusive",
            read_timeout,
            constants::MIN_READ_TIMEOUT_MS,
            constants::MAX_READ_TIMEOUT_MS
        ))
    } else {
        Ok(())
    }
}

/// Validate `payload`.
fn validate_payload(payload: &str) -> anyhow::Result<()> {
    if payload.len() > MAX_PAYLOAD_SIZE {
        Err(anyhow!(
            "payload ({} bytes) must be at most {MAX_PAYLOAD_SIZE} bytes",
            payload.len()
        ))
    } else {
        Ok(())
    }
}
