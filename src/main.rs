//! Rust Ledger Engine server
//!
//! Serves per-account ledgers over HTTP, or the standalone lock service.
//!
//! # Usage
//!
//! ```bash
//! cargo run -- --server api --api-port 9999
//! cargo run -- --server api --exclusivity lease --max-wait-ms 2000
//! cargo run -- --server lock --lock-port 9998
//! ```
//!
//! Every flag also reads an environment variable (`SERVER_TYPE`, `API_PORT`,
//! `LOCK_PORT`, `EXCLUSIVITY`, ...). Logs are JSON lines filtered by `RUST_LOG`.
//!
//! # Exit Codes
//!
//! - 0: Clean shutdown
//! - 1: Error (runtime could not start, port could not be bound, server failed)

use rust_ledger_engine::{cli, server, telemetry};
use std::process;

fn main() {
    // Parse command-line arguments using clap
    let args = cli::parse_args();
    telemetry::init();

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .worker_threads(args.worker_threads())
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            tracing::error!(error = %e, "failed to start runtime");
            process::exit(1);
        }
    };

    if let Err(e) = runtime.block_on(server::run(args)) {
        tracing::error!(error = %e, "server failed");
        process::exit(1);
    }
}
