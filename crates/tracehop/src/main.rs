#![warn(clippy::all, clippy::pedantic, clippy::nursery, rust_2018_idioms)]
#![allow(
    clippy::module_name_repetitions,
    clippy::option_if_let_else,
    clippy::missing_const_for_fn,
    clippy::redundant_pub_crate
)]
#![forbid(unsafe_code)]

use crate::config::{config_template, TracehopAction};
use crate::status::Status;
use clap::Parser;
use config::Args;
use std::process::{self, ExitCode};

mod app;
mod config;
mod report;
mod status;

fn main() -> ExitCode {
    match run() {
        Ok(status) => ExitCode::from(status),
        Err(err) => {
            eprintln!("Error: {err:?}");
            ExitCode::from(Status::from(&err))
        }
    }
}

fn run() -> anyhow::Result<Status> {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(err) if err.use_stderr() => {
            err.print()?;
            return Ok(Status::Fatal);
        }
        Err(err) => err.exit(),
    };
    let pid = u16::try_from(process::id() & u32::from(u16::MAX))?;
    match TracehopAction::from(args, pid)? {
        TracehopAction::Trace(cfg) => {
            let trace = app::run_tracehop(&cfg)?;
            Ok(Status::from(&trace))
        }
        TracehopAction::PrintConfigTemplate => {
            print!("{}", config_template());
            Ok(Status::Success)
        }
    }
}
