//! Server wiring
//!
//! Builds the core components from configuration, injects the ledger store into
//! the processor and the statement reader, and serves the selected router.

use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::info;

use crate::cli::{CliArgs, ServerType};
use crate::config::{ExclusivityMode, LockConfig};
use crate::core::{
    create_provider, InMemoryLedgerStore, LedgerStore, LockManager, StatementReader,
    TransactionProcessor,
};
use crate::http::{api_router, lock_router, AppState};

/// Wire the account API state around `store`
///
/// In lease mode the lock manager's expiry sweep is started on the current
/// runtime; in row-lock mode the store's native locks are binding and no
/// sweep runs.
pub fn build_app_state(
    mode: ExclusivityMode,
    config: &LockConfig,
    store: Arc<dyn LedgerStore>,
) -> AppState {
    let locks = Arc::new(LockManager::new(config.lease_duration));
    if mode == ExclusivityMode::Lease {
        locks.spawn_sweeper(config.sweep_interval);
    }

    let exclusivity = create_provider(mode, Arc::clone(&store), locks, config.retry);
    let processor = TransactionProcessor::new(Arc::clone(&store), exclusivity);
    let statements = StatementReader::new(store);

    AppState::new(processor, statements)
}

/// Run the server selected by `args` until it fails
pub async fn run(args: CliArgs) -> std::io::Result<()> {
    let config = args.to_lock_config();
    let address = format!("0.0.0.0:{}", args.listen_port());

    let router = match args.server {
        ServerType::Api => {
            let store: Arc<dyn LedgerStore> = Arc::new(InMemoryLedgerStore::seeded());
            api_router(build_app_state(args.exclusivity, &config, store))
        }
        ServerType::Lock => {
            let locks = Arc::new(LockManager::new(config.lease_duration));
            locks.spawn_sweeper(config.sweep_interval);
            lock_router(locks, config.retry)
        }
    };

    let listener = TcpListener::bind(&address).await?;
    info!(
        server = ?args.server,
        exclusivity = ?args.exclusivity,
        address = %listener.local_addr()?,
        "listening"
    );

    axum::serve(listener, router).await
}
