//! Transaction-related types for the Rust Ledger Engine
//!
//! This module defines the transaction kinds, the unvalidated request shape,
//! the immutable ledger entry, and the response types returned to callers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::account::AccountId;
use super::error::LedgerError;

/// Shortest accepted description, in characters
pub const MIN_DESCRIPTION_LEN: usize = 1;

/// Longest accepted description, in characters
pub const MAX_DESCRIPTION_LEN: usize = 10;

/// Number of entries a statement carries
pub const STATEMENT_DEPTH: usize = 10;

/// Transaction kinds supported by the ledger
///
/// Serialized in the short wire form used by the HTTP surface (`"c"` / `"d"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionKind {
    /// Add funds to an account. Has no upper bound.
    #[serde(rename = "c")]
    Credit,

    /// Remove funds from an account, down to `-limit` at most.
    #[serde(rename = "d")]
    Debit,
}

impl TransactionKind {
    /// Parse the wire form of a transaction kind
    pub fn parse(kind: &str) -> Result<Self, LedgerError> {
        match kind {
            "c" => Ok(TransactionKind::Credit),
            "d" => Ok(TransactionKind::Debit),
            other => Err(LedgerError::invalid_kind(other)),
        }
    }

    /// Wire form of this kind
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Credit => "c",
            TransactionKind::Debit => "d",
        }
    }

    /// Signed effect of `amount` on a balance, or `None` on overflow
    pub fn signed(&self, amount: i64) -> Option<i64> {
        match self {
            TransactionKind::Credit => Some(amount),
            TransactionKind::Debit => amount.checked_neg(),
        }
    }
}

/// Unvalidated mutation request as received from a client
///
/// Every field is checked by [`TransactionRequest::validate`] before the
/// processor touches any shared state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRequest {
    /// Amount in minor units; must be strictly positive
    pub amount: i64,

    /// Kind in wire form (`"c"` or `"d"`)
    #[serde(rename = "type")]
    pub kind: String,

    /// Free text, 1 to 10 characters
    pub description: String,
}

/// A request that passed validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedRequest {
    pub amount: i64,
    pub kind: TransactionKind,
    pub description: String,
}

impl TransactionRequest {
    /// Build a request from typed parts
    pub fn new(amount: i64, kind: TransactionKind, description: impl Into<String>) -> Self {
        Self {
            amount,
            kind: kind.as_str().to_string(),
            description: description.into(),
        }
    }

    /// Check kind, description length and amount
    ///
    /// Description length is counted in characters, not bytes.
    pub fn validate(&self) -> Result<ValidatedRequest, LedgerError> {
        let kind = TransactionKind::parse(&self.kind)?;

        let length = self.description.chars().count();
        if !(MIN_DESCRIPTION_LEN..=MAX_DESCRIPTION_LEN).contains(&length) {
            return Err(LedgerError::invalid_description(length));
        }

        if self.amount <= 0 {
            return Err(LedgerError::invalid_amount(self.amount));
        }

        Ok(ValidatedRequest {
            amount: self.amount,
            kind,
            description: self.description.clone(),
        })
    }
}

/// Immutable ledger entry
///
/// Once appended to an account's log a transaction is never updated or removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// Owning account
    #[serde(skip)]
    pub account: AccountId,

    /// Magnitude of the transaction (always positive)
    pub amount: i64,

    /// Credit or debit
    #[serde(rename = "type")]
    pub kind: TransactionKind,

    pub description: String,

    /// Commit time; non-decreasing per account in commit order
    #[serde(rename = "date")]
    pub timestamp: DateTime<Utc>,
}

impl Transaction {
    /// Signed effect of this entry on the account balance
    pub fn signed_amount(&self) -> Option<i64> {
        self.kind.signed(self.amount)
    }
}

/// Response to an accepted mutation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionReceipt {
    pub limit: i64,
    pub balance: i64,
}

/// Balance section of a statement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatementBalance {
    /// Current balance
    pub total: i64,

    /// Time the statement was read
    pub date: DateTime<Utc>,

    pub limit: i64,
}

/// Read-only snapshot of an account and its most recent transactions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Statement {
    pub balance: StatementBalance,

    /// At most [`STATEMENT_DEPTH`] entries, most recent first
    pub transactions: Vec<Transaction>,
}
