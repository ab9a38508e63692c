//! Read-only account statements

use std::sync::Arc;

use chrono::Utc;

use super::traits::LedgerStore;
use crate::types::{AccountId, LedgerError, Statement, StatementBalance, STATEMENT_DEPTH};

/// Builds statements straight from the ledger store
///
/// Takes no exclusivity; consistency comes from the store's point-in-time
/// `snapshot` read.
#[derive(Clone)]
pub struct StatementReader {
    store: Arc<dyn LedgerStore>,
}

impl StatementReader {
    pub fn new(store: Arc<dyn LedgerStore>) -> Self {
        Self { store }
    }

    /// Current balance, limit and up to ten most recent transactions
    pub async fn get_statement(&self, account: AccountId) -> Result<Statement, LedgerError> {
        let (current, transactions) = self.store.snapshot(account, STATEMENT_DEPTH).await?;

        Ok(Statement {
            balance: StatementBalance {
                total: current.balance,
                date: Utc::now(),
                limit: current.limit,
            },
            transactions,
        })
    }
}
