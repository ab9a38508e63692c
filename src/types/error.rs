//! Error types for the Rust Ledger Engine
//!
//! This module defines all error types that can occur while processing a
//! transaction or reading a statement.
//!
//! # Error Categories
//!
//! - **Validation Errors**: Bad kind, bad description length, bad amount, malformed body.
//!   Raised before any exclusivity is acquired.
//! - **Not Found**: The account does not exist.
//! - **Invariant Violations**: A debit would push the balance below `-limit`.
//! - **Lock Timeouts**: Exclusivity was not obtained within the allowed wait.
//! - **Persistence Failures**: The store rejected or failed the write.
//!
//! Callers only ever see two outcomes, see [`Rejection`].

use std::time::Duration;

use thiserror::Error;

use super::account::AccountId;

/// Main error type for the ledger engine
///
/// Every variant is recovered at the transaction processor boundary and mapped
/// to a [`Rejection`]. None of them is fatal to the process.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    /// Transaction kind is neither credit nor debit
    #[error("Invalid transaction type '{kind}'")]
    InvalidKind {
        /// The kind as received
        kind: String,
    },

    /// Description length outside the accepted range
    #[error("Invalid description length {length} (expected 1 to 10 characters)")]
    InvalidDescription {
        /// Length in characters
        length: usize,
    },

    /// Amount is zero or negative
    #[error("Invalid amount {amount} (must be positive)")]
    InvalidAmount { amount: i64 },

    /// Request body is empty or not parseable
    #[error("Malformed request: {message}")]
    MalformedRequest { message: String },

    /// Account does not exist
    #[error("Account {account} not found")]
    AccountNotFound { account: AccountId },

    /// Debit would break the overdraft limit
    ///
    /// The account state remains unchanged.
    #[error(
        "Insufficient limit for account {account}: balance {balance}, limit {limit}, requested {requested}"
    )]
    InsufficientLimit {
        account: AccountId,
        balance: i64,
        limit: i64,
        requested: i64,
    },

    /// Arithmetic overflow would occur
    #[error("Arithmetic overflow in {operation} for account {account}")]
    ArithmeticOverflow {
        /// Operation that would overflow
        operation: String,
        account: AccountId,
    },

    /// Exclusivity over the account was not obtained in time
    ///
    /// Transient: the caller of the service may retry.
    #[error("Timed out after {waited:?} waiting for account {account}")]
    LockTimeout { account: AccountId, waited: Duration },

    /// The proposed balance does not follow from the stored balance
    ///
    /// Means another write reached the account between read and commit.
    #[error(
        "Write conflict on account {account}: proposed balance {proposed} does not follow from stored balance {stored}"
    )]
    Conflict {
        account: AccountId,
        stored: i64,
        proposed: i64,
    },

    /// Store unreachable or write failed
    #[error("Persistence failure: {message}")]
    Persistence { message: String },
}

/// Outcome category visible to clients
///
/// Rejections carry no detail beyond this category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// The account does not exist
    NotFound,
    /// Anything else: validation, limit, timeout, persistence
    Unprocessable,
}

impl LedgerError {
    /// Map this error to its client-visible category
    pub fn rejection(&self) -> Rejection {
        match self {
            LedgerError::AccountNotFound { .. } => Rejection::NotFound,
            _ => Rejection::Unprocessable,
        }
    }

    /// Whether a retry by the caller of the service may succeed
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            LedgerError::LockTimeout { .. } | LedgerError::Conflict { .. }
        )
    }
}

// Helper functions for creating common errors

impl LedgerError {
    /// Create an InvalidKind error
    pub fn invalid_kind(kind: &str) -> Self {
        LedgerError::InvalidKind {
            kind: kind.to_string(),
        }
    }

    /// Create an InvalidDescription error
    pub fn invalid_description(length: usize) -> Self {
        LedgerError::InvalidDescription { length }
    }

    /// Create an InvalidAmount error
    pub fn invalid_amount(amount: i64) -> Self {
        LedgerError::InvalidAmount { amount }
    }

    /// Create a MalformedRequest error
    pub fn malformed_request(message: impl Into<String>) -> Self {
        LedgerError::MalformedRequest {
            message: message.into(),
        }
    }

    /// Create an AccountNotFound error
    pub fn account_not_found(account: AccountId) -> Self {
        LedgerError::AccountNotFound { account }
    }

    /// Create an InsufficientLimit error
    pub fn insufficient_limit(account: AccountId, balance: i64, limit: i64, requested: i64) -> Self {
        LedgerError::InsufficientLimit {
            account,
            balance,
            limit,
            requested,
        }
    }

    /// Create an ArithmeticOverflow error
    pub fn arithmetic_overflow(operation: &str, account: AccountId) -> Self {
        LedgerError::ArithmeticOverflow {
            operation: operation.to_string(),
            account,
        }
    }

    /// Create a LockTimeout error
    pub fn lock_timeout(account: AccountId, waited: Duration) -> Self {
        LedgerError::LockTimeout { account, waited }
    }

    /// Create a Conflict error
    pub fn conflict(account: AccountId, stored: i64, proposed: i64) -> Self {
        LedgerError::Conflict {
            account,
            stored,
            proposed,
        }
    }

    /// Create a Persistence error
    pub fn persistence(message: impl Into<String>) -> Self {
        LedgerError::Persistence {
            message: message.into(),
        }
    }
}

// Conversion from serde_json::Error to LedgerError
impl From<serde_json::Error> for LedgerError {
    fn from(error: serde_json::Error) -> Self {
        LedgerError::malformed_request(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::invalid_kind(
        LedgerError::InvalidKind { kind: "x".to_string() },
        "Invalid transaction type 'x'"
    )]
    #[case::invalid_description(
        LedgerError::InvalidDescription { length: 11 },
        "Invalid description length 11 (expected 1 to 10 characters)"
    )]
    #[case::invalid_amount(
        LedgerError::InvalidAmount { amount: 0 },
        "Invalid amount 0 (must be positive)"
    )]
    #[case::account_not_found(
        LedgerError::AccountNotFound { account: 6 },
        "Account 6 not found"
    )]
    #[case::insufficient_limit(
        LedgerError::InsufficientLimit { account: 1, balance: -1000, limit: 1000, requested: 1 },
        "Insufficient limit for account 1: balance -1000, limit 1000, requested 1"
    )]
    #[case::lock_timeout(
        LedgerError::LockTimeout { account: 2, waited: Duration::from_millis(250) },
        "Timed out after 250ms waiting for account 2"
    )]
    #[case::conflict(
        LedgerError::Conflict { account: 3, stored: 10, proposed: 20 },
        "Write conflict on account 3: proposed balance 20 does not follow from stored balance 10"
    )]
    #[case::persistence(
        LedgerError::Persistence { message: "store unreachable".to_string() },
        "Persistence failure: store unreachable"
    )]
    fn test_error_display(#[case] error: LedgerError, #[case] expected: &str) {
        assert_eq!(error.to_string(), expected);
    }

    #[rstest]
    #[case::not_found(LedgerError::account_not_found(1), Rejection::NotFound)]
    #[case::validation(LedgerError::invalid_kind("x"), Rejection::Unprocessable)]
    #[case::limit(LedgerError::insufficient_limit(1, 0, 0, 1), Rejection::Unprocessable)]
    #[case::timeout(
        LedgerError::lock_timeout(1, Duration::from_secs(1)),
        Rejection::Unprocessable
    )]
    #[case::persistence(LedgerError::persistence("down"), Rejection::Unprocessable)]
    fn test_rejection_category(#[case] error: LedgerError, #[case] expected: Rejection) {
        assert_eq!(error.rejection(), expected);
    }

    #[test]
    fn test_only_timeouts_and_conflicts_are_transient() {
        assert!(LedgerError::lock_timeout(1, Duration::from_secs(1)).is_transient());
        assert!(LedgerError::conflict(1, 0, 5).is_transient());
        assert!(!LedgerError::insufficient_limit(1, 0, 0, 1).is_transient());
        assert!(!LedgerError::account_not_found(1).is_transient());
    }

    #[test]
    fn test_json_error_conversion() {
        let json_error = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let error: LedgerError = json_error.into();
        assert!(matches!(error, LedgerError::MalformedRequest { .. }));
    }
}
