use std::process::ExitCode;
use tracehop_core::{CompletionReason, Trace};

/// The exit status of the process.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Status {
    /// The target replied, or there was nothing to trace.
    Success,
    /// The trace could not be started or failed part way.
    Fatal,
    /// The target host has no IPv4 address.
    NoIpv4Addr,
    /// Every ttl up to the maximum was probed without reaching the target.
    MaxTtlExhausted,
}

impl Status {
    pub const fn code(self) -> u8 {
        match self {
            Self::Success => 0,
            Self::Fatal => 1,
            Self::NoIpv4Addr => 2,
            Self::MaxTtlExhausted => 3,
        }
    }
}

impl From<&Trace> for Status {
    fn from(trace: &Trace) -> Self {
        match trace.reason {
            CompletionReason::TargetFound => Self::Success,
            CompletionReason::MaxTtlExhausted => Self::MaxTtlExhausted,
        }
    }
}

impl From<&anyhow::Error> for Status {
    fn from(err: &anyhow::Error) -> Self {
        match err.downcast_ref::<tracehop_core::Error>() {
            Some(tracehop_core::Error::NoIpv4Addr(_)) => Self::NoIpv4Addr,
            _ => Self::Fatal,
        }
    }
}

impl From<Status> for ExitCode {
    fn from(status: Status) -> Self {
        Self::from(status.code())
    }
}
