use crate::ResolveMethod;
use std::time::Duration;

/// A builder for DNS `Config`.
///
/// # Example
///
/// Build a DNS `Config` which resolves via Cloudflare with a 2 second timeout.
///
/// ```no_run
/// use std::time::Duration;
/// use tracehop_dns::{Builder, ResolveMethod};
///
/// let config = Builder::new()
///     .resolve_method(ResolveMethod::Cloudflare)
///     .timeout(Duration::from_secs(2))
///     .build();
/// ```
pub struct Builder {
    resolve_method: ResolveMethod,
    timeout: Duration,
}

impl Builder {
    /// Create a new `Builder`.
    #[must_use]
    pub fn new() -> Self {
        Self {
            resolve_method: Config::default().resolve_method,
            timeout: Config::default().timeout,
        }
    }

    /// Set the method to use for DNS resolution.
    #[must_use]
    pub const fn resolve_method(self, resolve_method: ResolveMethod) -> Self {
        Self {
            resolve_method,
            ..self
        }
    }

    /// Set the timeout for DNS resolution.
    ///
    /// Not used by [`ResolveMethod::System`].
    #[must_use]
    pub const fn timeout(self, timeout: Duration) -> Self {
        Self { timeout, ..self }
    }

    /// Build the DNS `Config`.
    #[must_use]
    pub const fn build(self) -> Config {
        Config {
            resolve_method: self.resolve_method,
            timeout: self.timeout,
        }
    }
}

impl Default for Builder {
    fn default() -> Self {
        Self::new()
    }
}

/// Configuration for the `DnsResolver`.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Config {
    /// The method to use for DNS resolution.
    pub resolve_method: ResolveMethod,
    /// The timeout for DNS resolution.
    pub timeout: Duration,
}

impl Config {
    /// Create a `Config`.
    #[must_use]
    pub const fn new(resolve_method: ResolveMethod, timeout: Duration) -> Self {
        Self {
            resolve_method,
            timeout,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            resolve_method: ResolveMethod::System,
            timeout: Duration::from_millis(5000),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        assert_eq!(Config::default(), Builder::new().build());
    }

    #[test]
    fn test_builder_full() {
        let config = Builder::new()
            .resolve_method(ResolveMethod::Google)
            .timeout(Duration::from_millis(250))
            .build();
        assert_eq!(
            Config::new(ResolveMethod::Google, Duration::from_millis(250)),
            config
        );
    }
}
