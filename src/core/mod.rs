//! Core business logic module
//!
//! This module contains the transaction processing and locking components:
//! - `traits` - Trait abstractions for stores and exclusivity providers
//! - `lock_manager` - Lease-based mutual exclusion with background expiry
//! - `ledger_store` - In-memory ledger with native row locks
//! - `exclusivity` - Lease and row-lock exclusivity providers
//! - `processor` - Transaction processing orchestration
//! - `statement` - Read-only statements

pub mod exclusivity;
pub mod ledger_store;
pub mod lock_manager;
pub mod processor;
pub mod statement;
pub mod traits;

pub use exclusivity::{create_provider, ExclusiveGuard, LeaseExclusivity, RowLockExclusivity};
pub use ledger_store::InMemoryLedgerStore;
pub use lock_manager::{Lease, LockManager, RetryPolicy};
pub use processor::TransactionProcessor;
pub use statement::StatementReader;
pub use traits::{ExclusivityProvider, LedgerStore, RowLock};
