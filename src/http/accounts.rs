//! Account routes
//!
//! - `POST /accounts/:id/transactions`
//! - `GET /accounts/:id/statement`

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};

use super::AppState;
use crate::types::{AccountId, LedgerError, Statement, TransactionReceipt, TransactionRequest};

/// Build the account router
pub fn api_router(state: AppState) -> Router {
    Router::new()
        .route("/accounts/:id/transactions", post(post_transaction))
        .route("/accounts/:id/statement", get(get_statement))
        .with_state(state)
}

/// Ids that do not parse can never name an account
fn parse_account(raw: &str) -> Result<AccountId, LedgerError> {
    raw.parse()
        .map_err(|_| LedgerError::AccountNotFound { account: 0 })
}

/// Parse the raw body; every failure maps to a validation rejection
fn parse_request(body: &[u8]) -> Result<TransactionRequest, LedgerError> {
    if body.is_empty() {
        return Err(LedgerError::malformed_request("empty body"));
    }
    Ok(serde_json::from_slice(body)?)
}

async fn post_transaction(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Json<TransactionReceipt>, LedgerError> {
    let account = parse_account(&id)?;
    let request = parse_request(&body)?;
    let receipt = state.processor.process(account, &request).await?;
    Ok(Json(receipt))
}

async fn get_statement(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Statement>, LedgerError> {
    let account = parse_account(&id)?;
    let statement = state.statements.get_statement(account).await?;
    Ok(Json(statement))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::empty(b"".as_slice())]
    #[case::not_json(b"amount=1".as_slice())]
    #[case::missing_field(br#"{"amount": 1, "type": "c"}"#.as_slice())]
    #[case::string_amount(br#"{"amount": "1", "type": "c", "description": "a"}"#.as_slice())]
    fn test_unparseable_bodies_are_malformed(#[case] body: &[u8]) {
        assert!(matches!(
            parse_request(body),
            Err(LedgerError::MalformedRequest { .. })
        ));
    }

    #[test]
    fn test_non_numeric_id_is_not_found() {
        assert!(matches!(
            parse_account("abc"),
            Err(LedgerError::AccountNotFound { .. })
        ));
        assert_eq!(parse_account("3"), Ok(3));
    }
}
