use crate::config::{ExclusivityMode, LockConfig};
use clap::{Parser, ValueEnum};
use std::time::Duration;

/// Serve account ledgers with per-account concurrency control
#[derive(Parser, Debug)]
#[command(name = "ledger-engine")]
#[command(about = "Serve account ledgers with per-account concurrency control", long_about = None)]
pub struct CliArgs {
    /// Which server to run
    #[arg(
        long = "server",
        env = "SERVER_TYPE",
        value_name = "TYPE",
        default_value = "api",
        help = "Server to run: 'api' for accounts or 'lock' for the standalone lock service"
    )]
    pub server: ServerType,

    /// Port of the account API
    #[arg(long = "api-port", env = "API_PORT", value_name = "PORT", default_value_t = 9999)]
    pub api_port: u16,

    /// Port of the lock service
    #[arg(long = "lock-port", env = "LOCK_PORT", value_name = "PORT", default_value_t = 9998)]
    pub lock_port: u16,

    /// Binding exclusivity mechanism (api server only)
    #[arg(
        long = "exclusivity",
        env = "EXCLUSIVITY",
        value_name = "MODE",
        default_value = "row-lock",
        help = "Exclusivity mechanism: 'row-lock' for store row locks or 'lease' for in-process leases"
    )]
    pub exclusivity: ExclusivityMode,

    /// Lease lifetime in milliseconds
    #[arg(long = "lease-duration-ms", env = "LEASE_DURATION_MS", value_name = "MS", default_value_t = 9000)]
    pub lease_duration_ms: u64,

    /// Interval between expiry sweeps in milliseconds
    #[arg(long = "sweep-interval-ms", env = "SWEEP_INTERVAL_MS", value_name = "MS", default_value_t = 3000)]
    pub sweep_interval_ms: u64,

    /// Maximum wait for exclusivity in milliseconds
    #[arg(long = "max-wait-ms", env = "MAX_WAIT_MS", value_name = "MS", default_value_t = 10000)]
    pub max_wait_ms: u64,

    /// Pause between lock attempts in milliseconds
    #[arg(long = "retry-interval-ms", env = "RETRY_INTERVAL_MS", value_name = "MS", default_value_t = 1000)]
    pub retry_interval_ms: u64,

    /// Worker threads for the runtime
    #[arg(
        long = "workers",
        env = "WORKERS",
        value_name = "COUNT",
        help = "Number of runtime worker threads (default: CPU cores)"
    )]
    pub workers: Option<usize>,
}

/// Available server types
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ServerType {
    Api,
    Lock,
}

impl CliArgs {
    /// Create a LockConfig from CLI arguments
    pub fn to_lock_config(&self) -> LockConfig {
        LockConfig::new(
            Duration::from_millis(self.lease_duration_ms),
            Duration::from_millis(self.sweep_interval_ms),
            Duration::from_millis(self.max_wait_ms),
            Duration::from_millis(self.retry_interval_ms),
        )
    }

    /// Runtime worker count, falling back to the number of CPU cores
    pub fn worker_threads(&self) -> usize {
        match self.workers {
            Some(count) if count > 0 => count,
            _ => num_cpus::get(),
        }
    }

    /// Port the selected server listens on
    pub fn listen_port(&self) -> u16 {
        match self.server {
            ServerType::Api => self.api_port,
            ServerType::Lock => self.lock_port,
        }
    }
}
