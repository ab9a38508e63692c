//! Lease-based mutual exclusion keyed by account
//!
//! This module provides the `LockManager` struct, an in-memory lock service that
//! hands out time-bounded leases on account identifiers.
//!
//! # Design
//!
//! Leases live in a `DashMap`, so installs, removals and sweeps only contend on
//! the shard that owns the account. Requests against different accounts never
//! serialize on a single lock. Installation goes through the map's entry API,
//! which makes "check for a live lease, then install" one atomic step: two
//! concurrent `acquire` calls for the same account cannot both succeed.
//!
//! # Expiry
//!
//! A lease older than the configured lease duration is treated as absent by
//! `acquire`, and a background sweep removes such leases on a fixed cadence.
//! A holder that crashes without releasing therefore blocks its account for at
//! most one lease duration plus one sweep interval.
//!
//! Leases are never a source of truth for balances; losing them all is safe.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, trace};

use crate::types::{AccountId, LedgerError};

/// Waiting budget for a single acquisition
///
/// Acquisition retries at a fixed, positive interval until either it succeeds,
/// the deadline `max_wait` passes, or the attempt budget derived from
/// `max_wait / retry_interval` is spent.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Upper bound on time spent waiting
    pub max_wait: Duration,
    /// Pause between attempts
    pub retry_interval: Duration,
}

impl RetryPolicy {
    /// Create a policy; a zero `retry_interval` is bumped to one millisecond
    pub fn new(max_wait: Duration, retry_interval: Duration) -> Self {
        Self {
            max_wait,
            retry_interval: retry_interval.max(Duration::from_millis(1)),
        }
    }

    /// Total number of attempts, the first one included
    pub fn max_attempts(&self) -> u32 {
        let interval = self.retry_interval.as_nanos().max(1);
        let retries = self.max_wait.as_nanos().div_ceil(interval);
        u32::try_from(retries).unwrap_or(u32::MAX - 1) + 1
    }
}

/// A granted claim on an account
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Lease {
    pub account: AccountId,
    pub acquired_at: Instant,
    /// Distinguishes this grant from later grants on the same account
    pub token: u64,
}

/// In-memory, lease-based lock service
#[derive(Debug)]
pub struct LockManager {
    leases: DashMap<AccountId, Lease>,
    lease_duration: Duration,
    next_token: AtomicU64,
}

impl LockManager {
    /// Create a lock manager whose leases last `lease_duration`
    pub fn new(lease_duration: Duration) -> Self {
        Self {
            leases: DashMap::new(),
            lease_duration,
            next_token: AtomicU64::new(1),
        }
    }

    pub fn lease_duration(&self) -> Duration {
        self.lease_duration
    }

    fn is_expired(&self, lease: &Lease, now: Instant) -> bool {
        now.saturating_duration_since(lease.acquired_at) > self.lease_duration
    }

    fn grant(&self, account: AccountId, now: Instant) -> Lease {
        Lease {
            account,
            acquired_at: now,
            token: self.next_token.fetch_add(1, Ordering::Relaxed),
        }
    }

    /// Make a single attempt to install a lease
    ///
    /// Succeeds when no lease exists for `account` or the existing one has
    /// expired. The check and the install happen under the same shard lock.
    pub fn try_acquire(&self, account: AccountId) -> Option<Lease> {
        let now = Instant::now();
        match self.leases.entry(account) {
            Entry::Occupied(mut occupied) => {
                if !self.is_expired(occupied.get(), now) {
                    return None;
                }
                let lease = self.grant(account, now);
                occupied.insert(lease);
                debug!(account, token = lease.token, "replaced expired lease");
                Some(lease)
            }
            Entry::Vacant(vacant) => {
                let lease = self.grant(account, now);
                vacant.insert(lease);
                debug!(account, token = lease.token, "lease installed");
                Some(lease)
            }
        }
    }

    /// Acquire a lease, waiting according to `policy`
    ///
    /// Returns `LedgerError::LockTimeout` once the deadline passes or the
    /// attempt budget is spent. Nothing is installed on timeout.
    pub async fn acquire(&self, account: AccountId, policy: RetryPolicy) -> Result<Lease, LedgerError> {
        let started = Instant::now();
        let deadline = started + policy.max_wait;
        let max_attempts = policy.max_attempts();

        for attempt in 1..=max_attempts {
            if let Some(lease) = self.try_acquire(account) {
                return Ok(lease);
            }

            let now = Instant::now();
            if attempt == max_attempts || now >= deadline {
                break;
            }
            trace!(account, attempt, "account leased, retrying");
            tokio::time::sleep(policy.retry_interval.min(deadline - now)).await;
        }

        debug!(account, "lease acquisition timed out");
        Err(LedgerError::lock_timeout(account, started.elapsed()))
    }

    /// Remove any lease on `account`
    ///
    /// Unconditional and idempotent. Returns whether a lease was removed.
    pub fn release(&self, account: AccountId) -> bool {
        let removed = self.leases.remove(&account).is_some();
        if removed {
            debug!(account, "lease released");
        }
        removed
    }

    /// Remove `lease` only if it is still the current grant for its account
    ///
    /// A holder whose lease expired and was re-granted to someone else must not
    /// release the new holder's lease.
    pub fn release_lease(&self, lease: &Lease) -> bool {
        let removed = self
            .leases
            .remove_if(&lease.account, |_, current| current.token == lease.token)
            .is_some();
        if removed {
            debug!(account = lease.account, token = lease.token, "lease released");
        }
        removed
    }

    /// Remove every expired lease, returning how many were removed
    pub fn sweep_expired(&self) -> usize {
        let now = Instant::now();
        let mut removed = 0;
        self.leases.retain(|_, lease| {
            if self.is_expired(lease, now) {
                removed += 1;
                false
            } else {
                true
            }
        });
        removed
    }

    /// Start the background expiry sweep on the current tokio runtime
    ///
    /// The task holds a weak reference and exits once the manager is dropped.
    pub fn spawn_sweeper(self: &Arc<Self>, every: Duration) -> JoinHandle<()> {
        let manager = Arc::downgrade(self);
        let every = every.max(Duration::from_millis(1));

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(Instant::now() + every, every);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;
                let Some(manager) = manager.upgrade() else {
                    break;
                };
                let removed = manager.sweep_expired();
                if removed > 0 {
                    debug!(removed, "swept expired leases");
                }
            }
        })
    }

    /// Whether a live (unexpired) lease exists for `account`
    pub fn is_held(&self, account: AccountId) -> bool {
        let now = Instant::now();
        self.leases
            .get(&account)
            .map(|lease| !self.is_expired(&lease, now))
            .unwrap_or(false)
    }

    /// Number of leases currently stored, expired-but-unswept ones included
    pub fn active_leases(&self) -> usize {
        self.leases.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn policy(max_wait_ms: u64, retry_ms: u64) -> RetryPolicy {
        RetryPolicy::new(
            Duration::from_millis(max_wait_ms),
            Duration::from_millis(retry_ms),
        )
    }

    #[rstest]
    #[case::no_wait(0, 100, 1)]
    #[case::exact_multiple(1000, 100, 11)]
    #[case::rounds_up(1050, 100, 12)]
    #[case::wait_shorter_than_interval(50, 100, 2)]
    fn test_max_attempts(#[case] max_wait_ms: u64, #[case] retry_ms: u64, #[case] expected: u32) {
        assert_eq!(policy(max_wait_ms, retry_ms).max_attempts(), expected);
    }

    #[test]
    fn test_zero_retry_interval_is_bumped() {
        let policy = RetryPolicy::new(Duration::from_secs(1), Duration::ZERO);
        assert_eq!(policy.retry_interval, Duration::from_millis(1));
    }

    #[tokio::test]
    async fn test_acquire_free_account() {
        let manager = LockManager::new(Duration::from_secs(9));

        let lease = manager.acquire(1, policy(0, 10)).await.unwrap();

        assert_eq!(lease.account, 1);
        assert!(manager.is_held(1));
        assert_eq!(manager.active_leases(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_acquire_times_out_on_held_account() {
        let manager = LockManager::new(Duration::from_secs(9));
        let first = manager.try_acquire(1).unwrap();

        let result = manager.acquire(1, policy(500, 100)).await;

        assert!(matches!(result, Err(LedgerError::LockTimeout { account: 1, .. })));
        // The first holder is untouched
        assert_eq!(*manager.leases.get(&1).unwrap(), first);
    }

    #[tokio::test(start_paused = true)]
    async fn test_acquire_waits_for_release() {
        let manager = Arc::new(LockManager::new(Duration::from_secs(9)));
        manager.try_acquire(1).unwrap();

        let releaser = Arc::clone(&manager);
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(250)).await;
            releaser.release(1);
        });

        let lease = manager.acquire(1, policy(1000, 100)).await.unwrap();
        assert_eq!(lease.account, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_respects_deadline() {
        let manager = LockManager::new(Duration::from_secs(9));
        manager.try_acquire(1).unwrap();

        let started = Instant::now();
        let _ = manager.acquire(1, policy(350, 100)).await;

        assert!(started.elapsed() <= Duration::from_millis(350));
    }

    #[test]
    fn test_release_is_idempotent() {
        let manager = LockManager::new(Duration::from_secs(9));
        manager.try_acquire(1).unwrap();

        assert!(manager.release(1));
        assert!(!manager.release(1));
        assert!(!manager.release(42));
        assert!(!manager.is_held(1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_holder_cannot_release_new_lease() {
        let manager = LockManager::new(Duration::from_secs(9));
        let stale = manager.try_acquire(1).unwrap();

        tokio::time::advance(Duration::from_secs(10)).await;
        let fresh = manager.try_acquire(1).unwrap();

        assert!(!manager.release_lease(&stale));
        assert!(manager.is_held(1));
        assert!(manager.release_lease(&fresh));
        assert!(!manager.is_held(1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_expired_lease_is_replaced_on_acquire() {
        let manager = LockManager::new(Duration::from_secs(9));
        let first = manager.try_acquire(1).unwrap();

        tokio::time::advance(Duration::from_secs(5)).await;
        assert!(manager.try_acquire(1).is_none());

        tokio::time::advance(Duration::from_secs(5)).await;
        let second = manager.try_acquire(1).unwrap();
        assert_ne!(first.token, second.token);
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweep_removes_only_expired_leases() {
        let manager = LockManager::new(Duration::from_secs(9));
        manager.try_acquire(1).unwrap();
        tokio::time::advance(Duration::from_secs(6)).await;
        manager.try_acquire(2).unwrap();
        tokio::time::advance(Duration::from_secs(4)).await;

        assert_eq!(manager.sweep_expired(), 1);
        assert_eq!(manager.active_leases(), 1);
        assert!(!manager.is_held(1));
        assert!(manager.is_held(2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_background_sweeper_frees_abandoned_lease() {
        let manager = Arc::new(LockManager::new(Duration::from_secs(9)));
        let sweeper = manager.spawn_sweeper(Duration::from_secs(3));
        manager.try_acquire(1).unwrap();

        // Lease duration plus one sweep interval
        tokio::time::sleep(Duration::from_secs(12) + Duration::from_millis(1)).await;

        assert_eq!(manager.active_leases(), 0);
        sweeper.abort();
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweeper_stops_when_manager_dropped() {
        let manager = Arc::new(LockManager::new(Duration::from_secs(9)));
        let sweeper = manager.spawn_sweeper(Duration::from_secs(3));

        drop(manager);
        tokio::time::sleep(Duration::from_secs(4)).await;

        assert!(sweeper.is_finished());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_acquire_same_account_single_winner() {
        let manager = Arc::new(LockManager::new(Duration::from_secs(9)));
        let mut handles = vec![];

        for _ in 0..64 {
            let manager_clone = Arc::clone(&manager);
            handles.push(tokio::spawn(async move {
                manager_clone.try_acquire(7).is_some()
            }));
        }

        let mut winners = 0;
        for handle in handles {
            if handle.await.unwrap() {
                winners += 1;
            }
        }

        assert_eq!(winners, 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_acquire_different_accounts_all_succeed() {
        let manager = Arc::new(LockManager::new(Duration::from_secs(9)));
        let mut handles = vec![];

        for account in 0..32u32 {
            let manager_clone = Arc::clone(&manager);
            handles.push(tokio::spawn(async move {
                manager_clone
                    .acquire(account, RetryPolicy::new(Duration::ZERO, Duration::from_millis(1)))
                    .await
            }));
        }

        for handle in handles {
            assert!(handle.await.unwrap().is_ok());
        }
        assert_eq!(manager.active_leases(), 32);
    }
}
