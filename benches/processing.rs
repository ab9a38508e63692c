//! Benchmark suite for comparing exclusivity modes
//!
//! Measures a burst of debits pushed through [`TransactionProcessor`] under
//! each exclusivity mode, once against a single hot account and once spread
//! across the five seeded accounts.
//!
//! # Running Benchmarks
//!
//! ```bash
//! cargo bench
//! ```

use rust_ledger_engine::core::create_provider;
use rust_ledger_engine::{
    ExclusivityMode, InMemoryLedgerStore, LedgerStore, LockManager, RetryPolicy,
    TransactionKind, TransactionProcessor, TransactionRequest,
};
use std::sync::Arc;
use std::time::Duration;

const BURST: u32 = 200;

fn main() {
    divan::main();
}

fn processor(mode: ExclusivityMode) -> TransactionProcessor {
    let store: Arc<dyn LedgerStore> = Arc::new(InMemoryLedgerStore::seeded());
    let locks = Arc::new(LockManager::new(Duration::from_secs(9)));
    let policy = RetryPolicy::new(Duration::from_secs(10), Duration::from_millis(1));
    TransactionProcessor::new(Arc::clone(&store), create_provider(mode, store, locks, policy))
}

fn run_burst(mode: ExclusivityMode, accounts: u32) {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .expect("Runtime failed");

    runtime.block_on(async {
        let processor = processor(mode);
        let request = TransactionRequest::new(1, TransactionKind::Debit, "bench");

        let handles: Vec<_> = (0..BURST)
            .map(|i| {
                let processor = processor.clone();
                let request = request.clone();
                tokio::spawn(async move { processor.process(i % accounts + 1, &request).await })
            })
            .collect();

        for handle in handles {
            handle.await.expect("Task panicked").expect("Debit rejected");
        }
    });
}

/// Row locks, every request on one account
#[divan::bench]
fn row_lock_single_account() {
    run_burst(ExclusivityMode::RowLock, 1);
}

/// Row locks, requests spread across five accounts
#[divan::bench]
fn row_lock_distinct_accounts() {
    run_burst(ExclusivityMode::RowLock, 5);
}

/// Leases, every request on one account
#[divan::bench]
fn lease_single_account() {
    run_burst(ExclusivityMode::Lease, 1);
}

/// Leases, requests spread across five accounts
#[divan::bench]
fn lease_distinct_accounts() {
    run_burst(ExclusivityMode::Lease, 5);
}
