//! Exclusivity providers
//!
//! The transaction processor obtains per-account exclusivity through the
//! `ExclusivityProvider` trait. Two implementations exist:
//!
//! - `LeaseExclusivity`: leases from the in-process `LockManager`
//! - `RowLockExclusivity`: native row locks from the `LedgerStore`
//!
//! Both hand back an `ExclusiveGuard`, which releases exclusivity on drop. That
//! covers every exit path of a request, early returns and errors included.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::trace;

use super::lock_manager::{Lease, LockManager, RetryPolicy};
use super::traits::{ExclusivityProvider, LedgerStore, RowLock};
use crate::config::ExclusivityMode;
use crate::types::{AccountId, LedgerError};

/// Releases its lease on drop
#[derive(Debug)]
pub struct LeaseGuard {
    manager: Arc<LockManager>,
    lease: Lease,
}

impl LeaseGuard {
    pub fn lease(&self) -> &Lease {
        &self.lease
    }
}

impl Drop for LeaseGuard {
    fn drop(&mut self) {
        self.manager.release_lease(&self.lease);
    }
}

/// Proof of exclusivity over one account
#[derive(Debug)]
pub enum ExclusiveGuard {
    Lease(LeaseGuard),
    Row(RowLock),
}

/// Exclusivity backed by the lease lock manager
#[derive(Debug, Clone)]
pub struct LeaseExclusivity {
    manager: Arc<LockManager>,
    policy: RetryPolicy,
}

impl LeaseExclusivity {
    pub fn new(manager: Arc<LockManager>, policy: RetryPolicy) -> Self {
        Self { manager, policy }
    }
}

#[async_trait]
impl ExclusivityProvider for LeaseExclusivity {
    async fn acquire(&self, account: AccountId) -> Result<ExclusiveGuard, LedgerError> {
        let lease = self.manager.acquire(account, self.policy).await?;
        trace!(account, token = lease.token, "exclusivity granted by lease");
        Ok(ExclusiveGuard::Lease(LeaseGuard {
            manager: Arc::clone(&self.manager),
            lease,
        }))
    }

    fn name(&self) -> &'static str {
        "lease"
    }
}

/// Exclusivity backed by the store's native row locks
#[derive(Clone)]
pub struct RowLockExclusivity {
    store: Arc<dyn LedgerStore>,
    policy: RetryPolicy,
}

impl RowLockExclusivity {
    pub fn new(store: Arc<dyn LedgerStore>, policy: RetryPolicy) -> Self {
        Self { store, policy }
    }
}

#[async_trait]
impl ExclusivityProvider for RowLockExclusivity {
    async fn acquire(&self, account: AccountId) -> Result<ExclusiveGuard, LedgerError> {
        let row = self.store.lock_row(account, self.policy.max_wait).await?;
        trace!(account, "exclusivity granted by row lock");
        Ok(ExclusiveGuard::Row(row))
    }

    fn name(&self) -> &'static str {
        "row-lock"
    }
}

/// Create the exclusivity provider for the selected mode
///
/// # Arguments
///
/// * `mode` - Which mechanism is binding for this deployment
/// * `store` - Ledger store, used for native row locks
/// * `locks` - Lease lock manager, used in lease mode
/// * `policy` - Waiting budget per acquisition
pub fn create_provider(
    mode: ExclusivityMode,
    store: Arc<dyn LedgerStore>,
    locks: Arc<LockManager>,
    policy: RetryPolicy,
) -> Arc<dyn ExclusivityProvider> {
    match mode {
        ExclusivityMode::Lease => Arc::new(LeaseExclusivity::new(locks, policy)),
        ExclusivityMode::RowLock => Arc::new(RowLockExclusivity::new(store, policy)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ledger_store::InMemoryLedgerStore;
    use crate::types::Account;
    use std::time::Duration;

    fn quick_policy() -> RetryPolicy {
        RetryPolicy::new(Duration::from_millis(50), Duration::from_millis(10))
    }

    #[tokio::test]
    async fn test_lease_guard_releases_on_drop() {
        let manager = Arc::new(LockManager::new(Duration::from_secs(9)));
        let provider = LeaseExclusivity::new(Arc::clone(&manager), quick_policy());

        let guard = provider.acquire(1).await.unwrap();
        assert!(manager.is_held(1));

        drop(guard);
        assert!(!manager.is_held(1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_lease_provider_times_out_while_held() {
        let manager = Arc::new(LockManager::new(Duration::from_secs(9)));
        let provider = LeaseExclusivity::new(Arc::clone(&manager), quick_policy());
        let _held = provider.acquire(1).await.unwrap();

        let result = provider.acquire(1).await;

        assert!(matches!(result, Err(LedgerError::LockTimeout { .. })));
    }

    #[tokio::test(start_paused = true)]
    async fn test_row_provider_serializes_same_account() {
        let store: Arc<dyn LedgerStore> =
            Arc::new(InMemoryLedgerStore::with_accounts([Account::new(1, 0)]));
        let provider = RowLockExclusivity::new(store, quick_policy());

        let held = provider.acquire(1).await.unwrap();
        assert!(matches!(
            provider.acquire(1).await,
            Err(LedgerError::LockTimeout { .. })
        ));

        drop(held);
        assert!(matches!(
            provider.acquire(1).await,
            Ok(ExclusiveGuard::Row(_))
        ));
    }

    #[test]
    fn test_factory_selects_mode() {
        let store: Arc<dyn LedgerStore> = Arc::new(InMemoryLedgerStore::new());
        let locks = Arc::new(LockManager::new(Duration::from_secs(9)));

        let lease = create_provider(
            ExclusivityMode::Lease,
            Arc::clone(&store),
            Arc::clone(&locks),
            quick_policy(),
        );
        let row = create_provider(ExclusivityMode::RowLock, store, locks, quick_policy());

        assert_eq!(lease.name(), "lease");
        assert_eq!(row.name(), "row-lock");
    }
}
