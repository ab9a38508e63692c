//! In-memory ledger store
//!
//! This module provides `InMemoryLedgerStore`, the shipped `LedgerStore`
//! implementation. It keeps each account's balance and append-only history in a
//! `DashMap` entry and offers a native per-account row lock.
//!
//! # Design
//!
//! ```text
//! InMemoryLedgerStore
//!     ├── DashMap<AccountId, LedgerEntry>          (balance + history)
//!     └── DashMap<AccountId, Arc<Mutex<()>>>       (row locks)
//! ```
//!
//! `atomic_update` mutates the balance and appends the entry while holding the
//! shard's write lock, so readers observe both effects or neither. The store
//! also re-checks the proposed balance against its own state and the overdraft
//! floor, acting as the last line of defence if exclusivity was bypassed.
//!
//! Row locks are `tokio` mutexes so waiting for one never blocks a worker thread.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;
use tokio::sync::Mutex;
use tracing::warn;

use super::traits::{LedgerStore, RowLock};
use crate::types::{Account, AccountId, LedgerError, Transaction};

/// Default accounts as (id, limit), all starting at a zero balance
pub const DEFAULT_ACCOUNTS: [(AccountId, i64); 5] = [
    (1, 100_000),
    (2, 80_000),
    (3, 1_000_000),
    (4, 10_000_000),
    (5, 500_000),
];

#[derive(Debug)]
struct LedgerEntry {
    account: Account,
    /// Oldest first
    history: Vec<Transaction>,
}

/// Thread-safe in-memory ledger
#[derive(Debug, Default)]
pub struct InMemoryLedgerStore {
    entries: DashMap<AccountId, LedgerEntry>,
    row_locks: DashMap<AccountId, Arc<Mutex<()>>>,
}

impl InMemoryLedgerStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding the given accounts
    pub fn with_accounts(accounts: impl IntoIterator<Item = Account>) -> Self {
        let store = Self::new();
        for account in accounts {
            store.insert_account(account);
        }
        store
    }

    /// Create a store seeded with [`DEFAULT_ACCOUNTS`]
    pub fn seeded() -> Self {
        Self::with_accounts(
            DEFAULT_ACCOUNTS
                .iter()
                .map(|&(id, limit)| Account::new(id, limit)),
        )
    }

    /// Insert or replace an account, clearing its history
    pub fn insert_account(&self, account: Account) {
        self.row_locks.entry(account.id).or_default();
        self.entries.insert(
            account.id,
            LedgerEntry {
                account,
                history: Vec::new(),
            },
        );
    }

    /// Number of accounts held
    pub fn account_count(&self) -> usize {
        self.entries.len()
    }

    /// Full history of an account, oldest first
    pub fn history(&self, id: AccountId) -> Option<Vec<Transaction>> {
        self.entries.get(&id).map(|entry| entry.history.clone())
    }
}

#[async_trait]
impl LedgerStore for InMemoryLedgerStore {
    async fn get_account(&self, id: AccountId) -> Result<Account, LedgerError> {
        self.entries
            .get(&id)
            .map(|entry| entry.account)
            .ok_or_else(|| LedgerError::account_not_found(id))
    }

    async fn atomic_update(
        &self,
        id: AccountId,
        new_balance: i64,
        mut transaction: Transaction,
    ) -> Result<(), LedgerError> {
        let mut entry = self
            .entries
            .get_mut(&id)
            .ok_or_else(|| LedgerError::account_not_found(id))?;

        let delta = transaction
            .signed_amount()
            .ok_or_else(|| LedgerError::arithmetic_overflow("commit", id))?;
        let stored = entry.account.balance;
        let expected = stored
            .checked_add(delta)
            .ok_or_else(|| LedgerError::arithmetic_overflow("commit", id))?;

        if expected != new_balance {
            warn!(account = id, stored, proposed = new_balance, "rejected stale write");
            return Err(LedgerError::conflict(id, stored, new_balance));
        }

        if !entry.account.within_limit(new_balance) {
            return Err(LedgerError::insufficient_limit(
                id,
                stored,
                entry.account.limit,
                transaction.amount,
            ));
        }

        // Keep timestamps non-decreasing in commit order
        if let Some(last) = entry.history.last() {
            if transaction.timestamp < last.timestamp {
                transaction.timestamp = last.timestamp;
            }
        }

        transaction.account = id;
        entry.account.balance = new_balance;
        entry.history.push(transaction);
        Ok(())
    }

    async fn list_recent_transactions(
        &self,
        id: AccountId,
        limit: usize,
    ) -> Result<Vec<Transaction>, LedgerError> {
        self.entries
            .get(&id)
            .map(|entry| entry.history.iter().rev().take(limit).cloned().collect())
            .ok_or_else(|| LedgerError::account_not_found(id))
    }

    async fn lock_row(&self, id: AccountId, max_wait: Duration) -> Result<RowLock, LedgerError> {
        // Clone the handle so no map guard is held across the await
        let row = self
            .row_locks
            .get(&id)
            .map(|lock| Arc::clone(lock.value()))
            .ok_or_else(|| LedgerError::account_not_found(id))?;

        match tokio::time::timeout(max_wait, row.lock_owned()).await {
            Ok(guard) => Ok(RowLock::new(guard)),
            Err(_) => Err(LedgerError::lock_timeout(id, max_wait)),
        }
    }

    async fn snapshot(
        &self,
        id: AccountId,
        limit: usize,
    ) -> Result<(Account, Vec<Transaction>), LedgerError> {
        self.entries
            .get(&id)
            .map(|entry| {
                let recent = entry.history.iter().rev().take(limit).cloned().collect();
                (entry.account, recent)
            })
            .ok_or_else(|| LedgerError::account_not_found(id))
    }
}
