//! HTTP surface
//!
//! Thin `axum` routers over the core components:
//! - `accounts` - transaction and statement routes
//! - `lock` - the lock manager exposed as a standalone service
//!
//! Rejections carry no body; clients only see the status code.

pub mod accounts;
pub mod lock;

use std::sync::Arc;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::core::{StatementReader, TransactionProcessor};
use crate::types::{LedgerError, Rejection};

pub use accounts::api_router;
pub use lock::{lock_router, LockState};

/// Shared state of the account routes
#[derive(Clone)]
pub struct AppState {
    pub processor: Arc<TransactionProcessor>,
    pub statements: Arc<StatementReader>,
}

impl AppState {
    pub fn new(processor: TransactionProcessor, statements: StatementReader) -> Self {
        Self {
            processor: Arc::new(processor),
            statements: Arc::new(statements),
        }
    }
}

impl From<Rejection> for StatusCode {
    fn from(rejection: Rejection) -> Self {
        match rejection {
            Rejection::NotFound => StatusCode::NOT_FOUND,
            Rejection::Unprocessable => StatusCode::UNPROCESSABLE_ENTITY,
        }
    }
}

impl IntoResponse for LedgerError {
    fn into_response(self) -> Response {
        StatusCode::from(self.rejection()).into_response()
    }
}
