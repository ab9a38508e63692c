//! Lock service routes
//!
//! Exposes the lease lock manager to out-of-process callers:
//! - `GET /lock/:id` answers `200` once the lease is installed, `422` on timeout
//! - `DELETE /lock/:id` always answers `200`

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::Router;

use crate::core::{LockManager, RetryPolicy};
use crate::types::AccountId;

/// Shared state of the lock routes
#[derive(Debug, Clone)]
pub struct LockState {
    pub manager: Arc<LockManager>,
    pub policy: RetryPolicy,
}

/// Build the lock service router
pub fn lock_router(manager: Arc<LockManager>, policy: RetryPolicy) -> Router {
    Router::new()
        .route("/lock/:id", get(acquire_lock).delete(release_lock))
        .with_state(LockState { manager, policy })
}

async fn acquire_lock(State(state): State<LockState>, Path(id): Path<String>) -> StatusCode {
    let Ok(account) = id.parse::<AccountId>() else {
        return StatusCode::BAD_REQUEST;
    };

    match state.manager.acquire(account, state.policy).await {
        Ok(_) => StatusCode::OK,
        Err(_) => StatusCode::UNPROCESSABLE_ENTITY,
    }
}

async fn release_lock(State(state): State<LockState>, Path(id): Path<String>) -> StatusCode {
    if let Ok(account) = id.parse::<AccountId>() {
        state.manager.release(account);
    }
    StatusCode::OK
}
