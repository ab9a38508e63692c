//! Runtime configuration for locking and exclusivity
//!
//! `LockConfig` gathers the timing parameters that control lease lifetime, the
//! expiry sweep cadence and how long a request may wait for exclusivity.

use std::time::Duration;

use clap::ValueEnum;
use tracing::warn;

use crate::core::lock_manager::RetryPolicy;

/// Default lease lifetime
pub const DEFAULT_LEASE_DURATION: Duration = Duration::from_secs(9);

/// Default interval between expiry sweeps
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(3);

/// Default upper bound on waiting for exclusivity
pub const DEFAULT_MAX_WAIT: Duration = Duration::from_secs(10);

/// Default pause between acquisition attempts
pub const DEFAULT_RETRY_INTERVAL: Duration = Duration::from_secs(1);

/// Mechanism that binds per-account exclusivity in a deployment
///
/// Exactly one is active at a time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ExclusivityMode {
    /// Leases from the in-process lock manager
    Lease,
    /// Native row locks held by the ledger store
    RowLock,
}

/// Timing configuration for the lock manager and exclusivity providers
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LockConfig {
    /// How long a lease stays valid without being released
    pub lease_duration: Duration,
    /// How often expired leases are swept
    pub sweep_interval: Duration,
    /// Waiting budget for a single acquisition
    pub retry: RetryPolicy,
}

impl Default for LockConfig {
    fn default() -> Self {
        Self {
            lease_duration: DEFAULT_LEASE_DURATION,
            sweep_interval: DEFAULT_SWEEP_INTERVAL,
            retry: RetryPolicy::new(DEFAULT_MAX_WAIT, DEFAULT_RETRY_INTERVAL),
        }
    }
}

impl LockConfig {
    /// Create a new LockConfig with custom values
    ///
    /// Zero durations are replaced by their defaults (with a warning), except
    /// `max_wait`, where zero means "try exactly once".
    pub fn new(
        lease_duration: Duration,
        sweep_interval: Duration,
        max_wait: Duration,
        retry_interval: Duration,
    ) -> Self {
        let lease_duration = non_zero_or_default("lease_duration", lease_duration, DEFAULT_LEASE_DURATION);
        let sweep_interval = non_zero_or_default("sweep_interval", sweep_interval, DEFAULT_SWEEP_INTERVAL);
        let retry_interval = non_zero_or_default("retry_interval", retry_interval, DEFAULT_RETRY_INTERVAL);

        Self {
            lease_duration,
            sweep_interval,
            retry: RetryPolicy::new(max_wait, retry_interval),
        }
    }

    /// Longest time a crashed holder can keep an account unavailable
    pub fn worst_case_lockout(&self) -> Duration {
        self.lease_duration + self.sweep_interval
    }
}

fn non_zero_or_default(name: &str, value: Duration, default: Duration) -> Duration {
    if value.is_zero() {
        warn!(
            setting = name,
            default_ms = default.as_millis() as u64,
            "invalid zero duration, using default"
        );
        default
    } else {
        value
    }
}
