//! Types module
//!
//! Contains core data structures used throughout the application.
//! This module organizes types into logical submodules:
//! - `account`: Account state and identifiers
//! - `transaction`: Transaction kinds, requests, ledger entries and responses
//! - `error`: Error types for the ledger engine

pub mod account;
pub mod error;
pub mod transaction;

pub use account::{Account, AccountId};
pub use error::{LedgerError, Rejection};
pub use transaction::{
    Statement, StatementBalance, Transaction, TransactionKind, TransactionReceipt,
    TransactionRequest, ValidatedRequest, MAX_DESCRIPTION_LEN, MIN_DESCRIPTION_LEN,
    STATEMENT_DEPTH,
};
