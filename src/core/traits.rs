//! Core traits for ledger storage and per-account exclusivity
//!
//! This module defines the trait abstractions that let the transaction processor
//! and the statement reader work against any store and either locking backend.

use std::time::Duration;

use async_trait::async_trait;

use super::exclusivity::ExclusiveGuard;
use crate::types::{Account, AccountId, LedgerError, Transaction};

/// Handle on a native row lock
///
/// Dropping the handle releases the lock.
pub struct RowLock {
    _guard: Box<dyn Send + Sync>,
}

impl RowLock {
    /// Wrap any guard whose drop releases the row
    pub fn new<G>(guard: G) -> Self
    where
        G: Send + Sync + 'static,
    {
        Self {
            _guard: Box::new(guard),
        }
    }
}

impl std::fmt::Debug for RowLock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RowLock").finish_non_exhaustive()
    }
}

/// Trait for durable account state
///
/// Owns the Account and Transaction records. Implementations must make
/// `atomic_update` all-or-nothing: the balance change and the appended entry
/// become visible together or not at all.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Get the current state of an account
    async fn get_account(&self, id: AccountId) -> Result<Account, LedgerError>;

    /// Persist `new_balance` and append `transaction` as one unit
    ///
    /// Fails with `Conflict` if `new_balance` is not the stored balance plus the
    /// transaction's signed amount.
    async fn atomic_update(
        &self,
        id: AccountId,
        new_balance: i64,
        transaction: Transaction,
    ) -> Result<(), LedgerError>;

    /// Up to `limit` transactions, most recent first
    async fn list_recent_transactions(
        &self,
        id: AccountId,
        limit: usize,
    ) -> Result<Vec<Transaction>, LedgerError>;

    /// Take the native exclusive lock on an account row
    ///
    /// Waits at most `max_wait` before failing with `LockTimeout`.
    async fn lock_row(&self, id: AccountId, max_wait: Duration) -> Result<RowLock, LedgerError>;

    /// Account and recent transactions as one point-in-time read
    ///
    /// The default composes two reads; stores that can do better should.
    async fn snapshot(
        &self,
        id: AccountId,
        limit: usize,
    ) -> Result<(Account, Vec<Transaction>), LedgerError> {
        let account = self.get_account(id).await?;
        let transactions = self.list_recent_transactions(id, limit).await?;
        Ok((account, transactions))
    }
}

/// Trait for obtaining exclusive access to one account
///
/// The transaction processor depends only on this capability. Exactly one
/// implementation is binding for a given deployment.
#[async_trait]
pub trait ExclusivityProvider: Send + Sync {
    /// Wait for exclusivity over `account`
    ///
    /// The returned guard releases exclusivity when dropped.
    async fn acquire(&self, account: AccountId) -> Result<ExclusiveGuard, LedgerError>;

    /// Short name used in logs
    fn name(&self) -> &'static str;
}
