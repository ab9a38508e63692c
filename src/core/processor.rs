//! Transaction processing orchestration
//!
//! This module provides the `TransactionProcessor` struct, which runs a single
//! account mutation from validation to commit.
//!
//! # Architecture
//!
//! ```text
//! TransactionProcessor
//!     ├── Arc<dyn LedgerStore>          (durable balance + history)
//!     └── Arc<dyn ExclusivityProvider>  (lease or row lock)
//! ```
//!
//! # Request lifecycle
//!
//! 1. Validate kind, description and amount; no shared state is touched
//! 2. Acquire exclusivity over the account
//! 3. Read balance and limit
//! 4. Compute the candidate balance
//! 5. Enforce `balance >= -limit` for debits
//! 6. Commit balance and transaction atomically
//! 7. Release exclusivity (guard drop, on every path)
//!
//! # Thread Safety
//!
//! The processor is cloneable and shares its collaborators through `Arc`.
//! Requests on different accounts run fully in parallel; requests on the same
//! account are linearized by the exclusivity provider.

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use super::traits::{ExclusivityProvider, LedgerStore};
use crate::types::{
    Account, AccountId, LedgerError, Transaction, TransactionKind, TransactionReceipt,
    TransactionRequest,
};

/// Single-account mutation orchestrator
#[derive(Clone)]
pub struct TransactionProcessor {
    store: Arc<dyn LedgerStore>,
    exclusivity: Arc<dyn ExclusivityProvider>,
}

impl TransactionProcessor {
    /// Create a new TransactionProcessor
    ///
    /// # Arguments
    ///
    /// * `store` - Ledger store that owns account state
    /// * `exclusivity` - The binding exclusivity mechanism for this deployment
    pub fn new(store: Arc<dyn LedgerStore>, exclusivity: Arc<dyn ExclusivityProvider>) -> Self {
        Self { store, exclusivity }
    }

    /// Process a credit or debit against `account`
    ///
    /// # Returns
    ///
    /// * `Ok(TransactionReceipt)` - The limit and the resulting balance
    /// * `Err(LedgerError::InvalidKind | InvalidDescription | InvalidAmount)` - Validation failed
    /// * `Err(LedgerError::LockTimeout)` - Exclusivity not obtained in time
    /// * `Err(LedgerError::AccountNotFound)` - Unknown account
    /// * `Err(LedgerError::InsufficientLimit)` - Debit would break the overdraft limit
    /// * `Err(LedgerError::Conflict | Persistence)` - The store rejected the commit
    pub async fn process(
        &self,
        account: AccountId,
        request: &TransactionRequest,
    ) -> Result<TransactionReceipt, LedgerError> {
        let result = self.run(account, request).await;

        match &result {
            Ok(receipt) => info!(
                account,
                kind = %request.kind,
                amount = request.amount,
                balance = receipt.balance,
                "transaction accepted"
            ),
            Err(error) => warn!(
                account,
                exclusivity = self.exclusivity.name(),
                transient = error.is_transient(),
                %error,
                "transaction rejected"
            ),
        }

        result
    }

    async fn run(
        &self,
        account: AccountId,
        request: &TransactionRequest,
    ) -> Result<TransactionReceipt, LedgerError> {
        let validated = request.validate()?;

        // Held until this function returns, whatever the outcome
        let _guard = self.exclusivity.acquire(account).await?;

        let current = self.store.get_account(account).await?;
        let new_balance = apply(&current, validated.kind, validated.amount)?;

        let transaction = Transaction {
            account,
            amount: validated.amount,
            kind: validated.kind,
            description: validated.description,
            timestamp: Utc::now(),
        };
        self.store
            .atomic_update(account, new_balance, transaction)
            .await?;

        Ok(TransactionReceipt {
            limit: current.limit,
            balance: new_balance,
        })
    }
}

/// Compute the balance after applying `amount` of `kind` to `account`
///
/// Debits are rejected when the account has no headroom left or when the
/// result would fall below `-limit`. Credits have no upper bound beyond `i64`.
pub fn apply(account: &Account, kind: TransactionKind, amount: i64) -> Result<i64, LedgerError> {
    match kind {
        TransactionKind::Credit => account
            .balance
            .checked_add(amount)
            .ok_or_else(|| LedgerError::arithmetic_overflow("credit", account.id)),
        TransactionKind::Debit => {
            let headroom = account
                .headroom()
                .ok_or_else(|| LedgerError::arithmetic_overflow("debit", account.id))?;
            let insufficient = || {
                LedgerError::insufficient_limit(account.id, account.balance, account.limit, amount)
            };

            if headroom <= 0 {
                return Err(insufficient());
            }

            let candidate = account
                .balance
                .checked_sub(amount)
                .ok_or_else(|| LedgerError::arithmetic_overflow("debit", account.id))?;
            if !account.within_limit(candidate) {
                return Err(insufficient());
            }
            Ok(candidate)
        }
    }
}
