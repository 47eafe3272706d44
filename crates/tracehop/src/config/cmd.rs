use crate::config::{DnsResolveMethodConfig, LogFormat, LogSpanEvents};
use clap::builder::Styles;
use clap::Parser;
use std::time::Duration;

/// Trace the route to a host by sweeping the time-to-live of ICMP echo requests
#[derive(Parser, Debug)]
#[command(name = "tracehop", author, version, about, long_about = None, arg_required_else_help(true), styles=Styles::styled())]
pub struct Args {
    /// The hostname or IPv4 address to trace
    #[arg(required_unless_present("print_config_template"))]
    pub target: Option<String>,

    /// Config file
    #[arg(short = 'c', long, value_hint = clap::ValueHint::FilePath)]
    pub config_file: Option<String>,

    /// The maximum number of TTL hops [default: 64]
    #[arg(short = 'm', long)]
    pub max_ttl: Option<u8>,

    /// The maximum time to wait for a response to each probe [default: 3s]
    #[arg(short = 'w', long, value_parser = parse_duration)]
    pub read_timeout: Option<Duration>,

    /// The ICMP echo identifier [default: process id]
    #[arg(long)]
    pub trace_identifier: Option<u16>,

    /// The ICMP echo request payload [default: HELLO-R-U-THERE]
    #[arg(long)]
    pub payload: Option<String>,

    /// Do not reverse resolve the address of responding hosts
    #[arg(short = 'n', long)]
    pub no_dns: bool,

    /// How to perform DNS queries [default: system]
    #[arg(value_enum, short = 'r', long)]
    pub dns_resolve_method: Option<DnsResolveMethodConfig>,

    /// The maximum time to wait to perform DNS queries [default: 5s]
    #[arg(long, value_parser = parse_duration)]
    pub dns_timeout: Option<Duration>,

    /// Print a template toml config file and exit
    #[arg(long)]
    pub print_config_template: bool,

    /// The debug log format [default: pretty]
    #[arg(value_enum, long)]
    pub log_format: Option<LogFormat>,

    /// The debug log filter [default: tracehop=debug,tracehop_core=debug]
    #[arg(long)]
    pub log_filter: Option<String>,

    /// The debug log span events [default: off]
    #[arg(value_enum, long)]
    pub log_span_events: Option<LogSpanEvents>,

    /// Enable verbose debug logging
    #[arg(short = 'v', long, default_value_t = false)]
    pub verbose: bool,
}

fn parse_duration(value: &str) -> anyhow::Result<Duration> {
    Ok(humantime::parse_duration(value)?)
}
