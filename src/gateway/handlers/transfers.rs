//! Transfer submission and query handlers
//!
//! POST /transfers runs the full engine pipeline synchronously. A rejected
//! transfer is not an HTTP transport error: the response status reflects the
//! rejection reason and the body carries the finalized transfer record so the
//! caller can see exactly how far validation got.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use serde::Deserialize;

use super::super::state::AppState;
use super::super::types::{
    ApiError, ApiResponse, ApiResult, created, error_codes, ok, outcome_code, outcome_status,
};
use crate::transfer::log::TransferDirection;
use crate::transfer::models::{Transfer, TransferId, TransferOutcome, TransferRequest};

/// Submit a transfer for immediate processing
///
/// POST /api/v1/transfers
pub async fn create_transfer(
    State(state): State<Arc<AppState>>,
    Json(request): Json<TransferRequest>,
) -> ApiResult<Transfer> {
    validate_shape(&request)?;
    let row = state.engine.process_transfer(request).await?;
    transfer_reply(row)
}

/// Transport-level shape checks. A request failing these is never recorded;
/// semantic validation (unknown accounts, unknown codes, funds) belongs to
/// the engine and produces a FAILED row instead.
fn validate_shape(request: &TransferRequest) -> Result<(), ApiError> {
    if request.transfer_amount <= rust_decimal::Decimal::ZERO {
        return Err(ApiError::bad_request(format!(
            "Transfer amount must be positive, got {}",
            request.transfer_amount
        )));
    }
    if request.from_account_no.as_u64() == 0 || request.to_account_no.as_u64() == 0 {
        return Err(ApiError::bad_request("Account numbers must be positive"));
    }
    if request.transfer_currency.as_str().trim().is_empty() {
        return Err(ApiError::bad_request("Transfer currency must not be blank"));
    }
    Ok(())
}

/// Map a finalized transfer record onto an HTTP reply.
///
/// Success is 201 Created. A business rejection keeps the 4xx status implied
/// by its outcome but still returns the record in `data`.
fn transfer_reply(row: Transfer) -> ApiResult<Transfer> {
    match row.outcome {
        Some(TransferOutcome::Success) => created(row),
        Some(outcome) => {
            let msg = row
                .error
                .clone()
                .unwrap_or_else(|| outcome.message().to_string());
            Ok((
                outcome_status(outcome),
                Json(ApiResponse {
                    code: outcome_code(outcome),
                    msg,
                    data: Some(row),
                }),
            ))
        }
        // The engine always stamps an outcome before returning Ok.
        None => ApiError::internal("Transfer finalized without an outcome").into_err(),
    }
}

#[derive(Debug, Deserialize)]
pub struct TransferListQuery {
    /// Only transfers drawing from this account
    pub from: Option<u64>,
    /// Only transfers crediting this account
    pub to: Option<u64>,
}

/// List transfer records, optionally filtered by account
///
/// GET /api/v1/transfers?from=1001 or ?to=2002
pub async fn list_transfers(
    State(state): State<Arc<AppState>>,
    Query(query): Query<TransferListQuery>,
) -> ApiResult<Vec<Transfer>> {
    let rows = match (query.from, query.to) {
        (Some(_), Some(_)) => {
            return ApiError::bad_request("Filter by either from or to, not both").into_err();
        }
        (Some(account_no), None) => {
            state
                .transfers
                .list_by_account(account_no.into(), TransferDirection::From)
                .await?
        }
        (None, Some(account_no)) => {
            state
                .transfers
                .list_by_account(account_no.into(), TransferDirection::To)
                .await?
        }
        (None, None) => state.transfers.list_all().await?,
    };
    ok(rows)
}

/// Get one transfer record by id
///
/// GET /api/v1/transfers/{transfer_id}
pub async fn get_transfer(
    State(state): State<Arc<AppState>>,
    Path(transfer_id): Path<String>,
) -> ApiResult<Transfer> {
    let id = transfer_id
        .parse::<TransferId>()
        .map_err(|_| ApiError::bad_request(format!("Invalid transfer id: {transfer_id}")))?;
    match state.transfers.get(id).await? {
        Some(row) => ok(row),
        None => ApiError::not_found(
            error_codes::TRANSFER_NOT_FOUND,
            format!("Transfer {transfer_id} not found"),
        )
        .into_err(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use axum::http::StatusCode;
    use rust_decimal_macros::dec;

    use crate::account::models::NewAccount;
    use crate::account::store::{AccountStore, DEFAULT_LOCK_WAIT, MemoryAccountStore};
    use crate::rate::models::NewRate;
    use crate::rate::store::{MemoryRateStore, RateStore};
    use crate::transfer::engine::TransferEngine;
    use crate::transfer::log::MemoryTransferLog;
    use crate::transfer::models::TransferStatus;

    /// Two accounts and one rate, mirroring the worked settlement example:
    /// 1001 holds 500.57 EUR, 2002 holds 909.40 USD, EUR to USD at 1.1813.
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
        accounts
            .insert(NewAccount {
                owner_id: 2,
                account_no: 2002.into(),
                balance: dec!(909.40),
                currency: "USD".into(),
            })
            .await
            .unwrap();

        let rates = Arc::new(MemoryRateStore::new());
        rates
            .insert(NewRate {
                source_currency: "EUR".into(),
                destination_currency: "USD".into(),
                rate: dec!(1.1813),
                effective_at: chrono::Utc::now() - chrono::Duration::hours(1),
            })
            .await
            .unwrap();

        let transfers = Arc::new(MemoryTransferLog::new());
        let engine = Arc::new(TransferEngine::new(
            accounts.clone(),
            rates.clone(),
            transfers.clone(),
        ));
        Arc::new(AppState::new(engine, accounts, rates, transfers))
    }

    fn request(from: u64, to: u64, amount: rust_decimal::Decimal, ccy: &str) -> TransferRequest {
        TransferRequest {
            from_account_no: from.into(),
            to_account_no: to.into(),
            transfer_amount: amount,
            transfer_currency: ccy.into(),
        }
    }

    #[tokio::test]
    async fn test_create_transfer_success_is_201() {
        let state = test_state().await;
        let (status, body) = create_transfer(
            State(state.clone()),
            Json(request(1001, 2002, dec!(10.00), "EUR")),
        )
        .await
        .unwrap();

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body.0.code, error_codes::SUCCESS);
        let row = body.0.data.unwrap();
        assert_eq!(row.status, TransferStatus::Success);
        assert_eq!(row.debited_amount, Some(dec!(10.00)));
        assert_eq!(row.credited_amount, Some(dec!(11.81)));

        // Settled balances are visible through the account store.
        let from = state.accounts.get(1001.into()).await.unwrap().unwrap();
        assert_eq!(from.balance, dec!(490.57));
    }

    #[tokio::test]
    async fn test_unknown_source_account_is_404_with_failed_row() {
        let state = test_state().await;
        let (status, body) = create_transfer(
            State(state),
            Json(request(9999, 2002, dec!(10.00), "EUR")),
        )
        .await
        .unwrap();

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body.0.code, error_codes::ACCOUNT_NOT_FOUND);
        let row = body.0.data.unwrap();
        assert_eq!(row.status, TransferStatus::Failed);
        assert_eq!(row.outcome, Some(TransferOutcome::InvalidFromAcc));
    }

    #[tokio::test]
    async fn test_insufficient_fund_is_400() {
        let state = test_state().await;
        let (status, body) = create_transfer(
            State(state),
            Json(request(1001, 2002, dec!(100000), "EUR")),
        )
        .await
        .unwrap();

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.0.code, error_codes::TRANSFER_REJECTED);
        let row = body.0.data.unwrap();
        assert_eq!(row.outcome, Some(TransferOutcome::InsufficientFund));
        // Validation got as far as the rate before rejecting.
        assert_eq!(row.rate, Some(dec!(1.1813)));
    }

    #[tokio::test]
    async fn test_malformed_requests_are_400_and_never_recorded() {
        let state = test_state().await;
        let malformed = [
            request(1001, 2002, dec!(0), "EUR"),
            request(1001, 2002, dec!(-5), "EUR"),
            request(0, 2002, dec!(10), "EUR"),
            request(1001, 0, dec!(10), "EUR"),
            request(1001, 2002, dec!(10), "  "),
        ];
        for bad in malformed {
            let err = create_transfer(State(state.clone()), Json(bad))
                .await
                .unwrap_err();
            assert_eq!(err.status, StatusCode::BAD_REQUEST);
            assert_eq!(err.code, error_codes::INVALID_PARAMETER);
        }
        // Rejected before any record was written.
        assert!(state.transfers.list_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_transfers_filters_by_direction() {
        let state = test_state().await;
        state
            .rates
            .insert(NewRate {
                source_currency: "USD".into(),
                destination_currency: "EUR".into(),
                rate: dec!(0.8465),
                effective_at: chrono::Utc::now() - chrono::Duration::hours(1),
            })
            .await
            .unwrap();
        create_transfer(
            State(state.clone()),
            Json(request(1001, 2002, dec!(10.00), "EUR")),
        )
        .await
        .unwrap();
        create_transfer(
            State(state.clone()),
            Json(request(2002, 1001, dec!(5.00), "USD")),
        )
        .await
        .unwrap();

        let (_, body) = list_transfers(
            State(state.clone()),
            Query(TransferListQuery {
                from: Some(1001),
                to: None,
            }),
        )
        .await
        .unwrap();
        let rows = body.0.data.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].from_account_no, 1001.into());

        let (_, body) = list_transfers(
            State(state.clone()),
            Query(TransferListQuery {
                from: None,
                to: Some(1001),
            }),
        )
        .await
        .unwrap();
        let rows = body.0.data.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].to_account_no, 1001.into());

        let err = list_transfers(
            State(state),
            Query(TransferListQuery {
                from: Some(1001),
                to: Some(2002),
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_get_transfer_round_trip() {
        let state = test_state().await;
        let (_, body) = create_transfer(
            State(state.clone()),
            Json(request(1001, 2002, dec!(10.00), "EUR")),
        )
        .await
        .unwrap();
        let id = body.0.data.unwrap().id;

        let (status, body) = get_transfer(State(state.clone()), Path(id.to_string()))
            .await
            .unwrap();
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.0.data.unwrap().id, id);

        let err = get_transfer(State(state.clone()), Path(TransferId::new().to_string()))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::NOT_FOUND);
        assert_eq!(err.code, error_codes::TRANSFER_NOT_FOUND);

        let err = get_transfer(State(state), Path("not-a-ulid".into()))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
    }
}
