//! Rust Ledger Engine Library
//! # Overview
//!
//! This library maintains per-account balances with a bounded overdraft limit
//! and an append-only transaction history, safe under many concurrent clients.
//!
//! # Architecture
//!
//! The system is organized into several key components:
//!
//! - [`types`] - Core data types (Account, Transaction, errors)
//! - [`core`] - Business logic components:
//!   - [`core::lock_manager`] - Lease-based mutual exclusion with expiry sweep
//!   - [`core::ledger_store`] - Balance + history storage with native row locks
//!   - [`core::exclusivity`] - Lease and row-lock exclusivity providers
//!   - [`core::processor`] - Transaction processing orchestration
//!   - [`core::statement`] - Read-only statements
//! - [`config`] - Lock timing and exclusivity mode
//! - [`http`] - `axum` routers for the account API and the lock service
//! - [`cli`] / [`server`] - Argument parsing and process wiring
//!
//! # Balance Invariant
//!
//! For every account, `balance >= -limit` holds after every accepted
//! transaction. Debits that would break it are rejected before commit, and
//! concurrent requests on one account are linearized by exactly one binding
//! exclusivity mechanism.
//!
//! # Transaction Kinds
//!
//! - **Credit** (`"c"`): Add funds; no upper bound
//! - **Debit** (`"d"`): Remove funds, down to `-limit`

// Module declarations
pub mod cli;
pub mod config;
pub mod core;
pub mod http;
pub mod server;
pub mod telemetry;
pub mod types;

pub use config::{ExclusivityMode, LockConfig};
pub use crate::core::{
    ExclusivityProvider, InMemoryLedgerStore, LedgerStore, LockManager, RetryPolicy,
    StatementReader, TransactionProcessor,
};
pub use types::{
    Account, AccountId, LedgerError, Rejection, Statement, Transaction, TransactionKind,
    TransactionReceipt, TransactionRequest,
};
