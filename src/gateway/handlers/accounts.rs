//! Account query handlers

use std::sync::Arc;

use axum::extract::{Path, State};

use super::super::state::AppState;
use super::super::types::{ApiError, ApiResult, BalanceData, error_codes, ok};
use crate::account::models::{Account, AccountNo};

/// List all accounts
///
/// GET /api/v1/accounts
pub async fn list_accounts(State(state): State<Arc<AppState>>) -> ApiResult<Vec<Account>> {
    let accounts = state.accounts.list().await?;
    ok(accounts)
}

/// Get one account by account number
///
/// GET /api/v1/accounts/{account_no}
pub async fn get_account(
    State(state): State<Arc<AppState>>,
    Path(account_no): Path<String>,
) -> ApiResult<Account> {
    let account_no = parse_account_no(&account_no)?;
    match state.accounts.get(account_no).await? {
        Some(account) => ok(account),
        None => ApiError::not_found(
            error_codes::ACCOUNT_NOT_FOUND,
            format!("Account {account_no} not found"),
        )
        .into_err(),
    }
}

/// Get the current balance of one account
///
/// GET /api/v1/accounts/{account_no}/balance
pub async fn get_balance(
    State(state): State<Arc<AppState>>,
    Path(account_no): Path<String>,
) -> ApiResult<BalanceData> {
    let account_no = parse_account_no(&account_no)?;
    match state.accounts.get(account_no).await? {
        Some(account) => ok(BalanceData {
            account_no: account.account_no,
            balance: account.balance,
            currency: account.currency,
        }),
        None => ApiError::not_found(
            error_codes::ACCOUNT_NOT_FOUND,
            format!("Account {account_no} not found"),
        )
        .into_err(),
    }
}

fn parse_account_no(raw: &str) -> Result<AccountNo, ApiError> {
    raw.parse::<u64>()
        .map(AccountNo::from)
        .map_err(|_| ApiError::bad_request(format!("Invalid account number: {raw}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    use axum::http::StatusCode;
    use rust_decimal_macros::dec;

    use crate::account::models::NewAccount;
    use crate::account::store::{AccountStore, DEFAULT_LOCK_WAIT, MemoryAccountStore};
    use crate::rate::store::MemoryRateStore;
    use crate::transfer::engine::TransferEngine;
    use crate::transfer::log::MemoryTransferLog;

    async fn test_state() -> Arc<AppState> {
        let accounts = Arc::new(MemoryAccountStore::new(DEFAULT_LOCK_WAIT));
        accounts
            .insert(NewAccount {
                owner_id: 1,
                account_no: 1001.into(),
                balance: dec!(500.57),
                currency: "EUR".into(),
            })
            .await
            .unwrap();
        let rates = Arc::new(MemoryRateStore::new());
        let transfers = Arc::new(MemoryTransferLog::new());
        let engine = Arc::new(TransferEngine::new(
            accounts.clone(),
            rates.clone(),
            transfers.clone(),
        ));
        Arc::new(AppState::new(engine, accounts, rates, transfers))
    }

    #[tokio::test]
    async fn test_get_account_and_balance() {
        let state = test_state().await;

        let (status, body) = get_account(State(state.clone()), Path("1001".into()))
            .await
            .unwrap();
        assert_eq!(status, StatusCode::OK);
        let account = body.0.data.unwrap();
        assert_eq!(account.account_no, 1001.into());
        assert_eq!(account.balance, dec!(500.57));

        let (status, body) = get_balance(State(state), Path("1001".into()))
            .await
            .unwrap();
        assert_eq!(status, StatusCode::OK);
        let balance = body.0.data.unwrap();
        assert_eq!(balance.balance, dec!(500.57));
        assert_eq!(balance.currency, "EUR".into());
    }

    #[tokio::test]
    async fn test_unknown_account_is_404() {
        let state = test_state().await;
        let err = get_account(State(state), Path("9999".into()))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::NOT_FOUND);
        assert_eq!(err.code, error_codes::ACCOUNT_NOT_FOUND);
    }

    #[tokio::test]
    async fn test_garbage_account_no_is_400() {
        let state = test_state().await;
        let err = get_balance(State(state), Path("not-a-number".into()))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_list_accounts_in_creation_order() {
        let state = test_state().await;
        state
            .accounts
            .insert(NewAccount {
                owner_id: 2,
                account_no: 2002.into(),
                balance: dec!(909.40),
                currency: "USD".into(),
            })
            .await
            .unwrap();

        let (_, body) = list_accounts(State(state)).await.unwrap();
        let accounts = body.0.data.unwrap();
        assert_eq!(accounts.len(), 2);
        assert_eq!(accounts[0].account_no, 1001.into());
        assert_eq!(accounts[1].account_no, 2002.into());
    }
}
