//! Retry policy for reloads.

use crate::error::{ConfigError, Result};
use serde::Deserialize;
use std::time::Duration;

/// Governs how often a failed reload is retried and how long to wait in between.
///
/// The delay is fixed: no jitter, no exponential growth. A reload that never
/// succeeds makes `max_attempts` load attempts and waits `timeout` between
/// consecutive attempts.
///
/// The policy can be embedded in an application's own configuration file:
///
/// ```rust
/// use hotreload_config::core::RetryPolicy;
/// use std::time::Duration;
///
/// #[derive(serde::Deserialize)]
/// struct Settings {
///     reload: RetryPolicy,
/// }
///
/// let settings: Settings = hotreload_config::sources::Format::Yaml
///     .decode("reload:\n  max_attempts: 5\n  timeout_ms: 250\n")
///     .unwrap();
/// assert_eq!(settings.reload.max_attempts(), 5);
/// assert_eq!(settings.reload.timeout(), Duration::from_millis(250));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(try_from = "RawRetryPolicy")]
pub struct RetryPolicy {
    max_attempts: u32,
    timeout: Duration,
}

#[derive(Deserialize)]
struct RawRetryPolicy {
    max_attempts: u32,
    #[serde(default)]
    timeout_ms: u64,
}

impl TryFrom<RawRetryPolicy> for RetryPolicy {
    type Error = ConfigError;

    fn try_from(raw: RawRetryPolicy) -> Result<Self> {
        RetryPolicy::new(raw.max_attempts, Duration::from_millis(raw.timeout_ms))
    }
}

impl RetryPolicy {
    /// Create a retry policy.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidRetryPolicy`] if `max_attempts` is zero.
    pub fn new(max_attempts: u32, timeout: Duration) -> Result<Self> {
        if max_attempts == 0 {
            return Err(ConfigError::InvalidRetryPolicy(
                "max_attempts must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            max_attempts,
            timeout,
        })
    }

    /// Maximum number of load attempts per reload.
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Fixed delay between consecutive attempts.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Total time spent waiting by a reload that exhausts every attempt.
    pub fn worst_case_latency(&self) -> Duration {
        self.timeout * (self.max_attempts - 1)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            timeout: Duration::from_secs(2),
        }
    }
}
