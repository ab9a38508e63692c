//! Account-related types for the Rust Ledger Engine
//!
//! This module defines the Account structure and the arithmetic that decides
//! whether a debit fits inside the account's overdraft limit.

use serde::{Deserialize, Serialize};

/// Account identifier
///
/// Supports account IDs from 0 to 4,294,967,295
pub type AccountId = u32;

/// Account state as held by the ledger
///
/// Amounts are integers in minor currency units. The balance may go negative,
/// but never below `-limit`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// The account ID
    pub id: AccountId,

    /// Overdraft limit (non-negative)
    ///
    /// The balance is allowed to drop to `-limit` and no further.
    pub limit: i64,

    /// Current balance (signed)
    pub balance: i64,
}

impl Account {
    /// Create a new account with the given limit and a zero balance
    pub fn new(id: AccountId, limit: i64) -> Self {
        Account {
            id,
            limit,
            balance: 0,
        }
    }

    /// Headroom left before the balance reaches `-limit`
    ///
    /// Returns `None` if the sum overflows `i64`.
    pub fn headroom(&self) -> Option<i64> {
        self.limit.checked_add(self.balance)
    }

    /// Whether `balance` satisfies `balance >= -limit` for this account
    pub fn within_limit(&self, balance: i64) -> bool {
        match self.limit.checked_neg() {
            Some(floor) => balance >= floor,
            None => false,
        }
    }
}
