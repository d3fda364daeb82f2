//! API response types and error codes
//!
//! - [`ApiResponse<T>`]: unified response wrapper
//! - [`ApiError`] / [`ApiResult`]: handler return plumbing
//! - `error_codes`: standard error code constants

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::account::models::AccountNo;
use crate::currency::CurrencyCode;
use crate::store::StoreError;
use crate::transfer::error::EngineError;
use crate::transfer::models::TransferOutcome;

// ============================================================================
// Unified API Response Format
// ============================================================================

/// Unified API response wrapper
///
/// All API responses follow this structure:
/// - code: 0 = success, non-zero = error code
/// - msg: short message description
/// - data: actual data, present on success and on finalized rejections
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    /// Response code: 0 for success, non-zero for errors
    pub code: i32,
    /// Response message
    pub msg: String,
    /// Response data
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    /// Create success response
    pub fn success(data: T) -> Self {
        Self {
            code: error_codes::SUCCESS,
            msg: "ok".to_string(),
            data: Some(data),
        }
    }

    /// Create error response
    pub fn error(code: i32, msg: impl Into<String>) -> ApiResponse<()> {
        ApiResponse {
            code,
            msg: msg.into(),
            data: None,
        }
    }
}

/// Handler result: a status plus enveloped body, or an enveloped error.
pub type ApiResult<T> = Result<(StatusCode, Json<ApiResponse<T>>), ApiError>;

/// 200 OK with a success envelope.
pub fn ok<T>(data: T) -> ApiResult<T> {
    Ok((StatusCode::OK, Json(ApiResponse::success(data))))
}

/// 201 Created with a success envelope.
pub fn created<T>(data: T) -> ApiResult<T> {
    Ok((StatusCode::CREATED, Json(ApiResponse::success(data))))
}

// ============================================================================
// API Error
// ============================================================================

/// An error reply carrying the HTTP status and envelope fields.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub code: i32,
    pub msg: String,
}

impl ApiError {
    pub fn new(status: StatusCode, code: i32, msg: impl Into<String>) -> Self {
        Self {
            status,
            code,
            msg: msg.into(),
        }
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::new(
            StatusCode::BAD_REQUEST,
            error_codes::INVALID_PARAMETER,
            msg,
        )
    }

    pub fn not_found(code: i32, msg: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, code, msg)
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            error_codes::INTERNAL_ERROR,
            msg,
        )
    }

    pub fn service_unavailable(msg: impl Into<String>) -> Self {
        Self::new(
            StatusCode::SERVICE_UNAVAILABLE,
            error_codes::SERVICE_UNAVAILABLE,
            msg,
        )
    }

    /// Shorthand for the `Err` side of an [`ApiResult`].
    pub fn into_err<T>(self) -> ApiResult<T> {
        Err(self)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ApiResponse::<()>::error(self.code, self.msg));
        (self.status, body).into_response()
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match &err {
            StoreError::AccountNotFound { .. } => {
                ApiError::not_found(error_codes::ACCOUNT_NOT_FOUND, err.to_string())
            }
            StoreError::TransferNotFound { .. } => {
                ApiError::not_found(error_codes::TRANSFER_NOT_FOUND, err.to_string())
            }
            StoreError::RateNotFound { .. } => {
                ApiError::not_found(error_codes::RATE_NOT_FOUND, err.to_string())
            }
            StoreError::InvalidRate { .. } | StoreError::DuplicateAccount { .. } => {
                ApiError::bad_request(err.to_string())
            }
            StoreError::LockTimeout { .. } => ApiError::new(
                StatusCode::SERVICE_UNAVAILABLE,
                error_codes::LOCK_TIMEOUT,
                err.to_string(),
            ),
            StoreError::Unavailable(_) => ApiError::service_unavailable(err.to_string()),
            StoreError::TransferNotPending { .. } => ApiError::internal(err.to_string()),
        }
    }
}

impl From<EngineError> for ApiError {
    fn from(err: EngineError) -> Self {
        let msg = err.to_string();
        match err {
            // Store trouble keeps the store mapping no matter which seam
            // surfaced it.
            EngineError::Store(store) => store.into(),
            EngineError::InvalidAmount { .. } => ApiError::bad_request(msg),
            EngineError::Arithmetic | EngineError::Invariant(_) => ApiError::internal(msg),
        }
    }
}

// ============================================================================
// Outcome Mapping
// ============================================================================

/// HTTP status for a finalized transfer outcome.
///
/// Rejections that mean "the thing you named does not exist" report 404;
/// every other rejection is a 400. Success is a 201 because the finalized
/// record was created.
pub fn outcome_status(outcome: TransferOutcome) -> StatusCode {
    match outcome {
        TransferOutcome::Success => StatusCode::CREATED,
        TransferOutcome::InvalidFromAcc
        | TransferOutcome::InvalidToAcc
        | TransferOutcome::RateNotFound => StatusCode::NOT_FOUND,
        TransferOutcome::InvalidCurrencyTransfer
        | TransferOutcome::InvalidCurrencyFromAcc
        | TransferOutcome::InvalidCurrencyToAcc
        | TransferOutcome::TransferCurrencyMismatch
        | TransferOutcome::InsufficientFund => StatusCode::BAD_REQUEST,
    }
}

/// Envelope code for a finalized transfer outcome.
pub fn outcome_code(outcome: TransferOutcome) -> i32 {
    match outcome {
        TransferOutcome::Success => error_codes::SUCCESS,
        TransferOutcome::InvalidFromAcc | TransferOutcome::InvalidToAcc => {
            error_codes::ACCOUNT_NOT_FOUND
        }
        TransferOutcome::RateNotFound => error_codes::RATE_NOT_FOUND,
        _ => error_codes::TRANSFER_REJECTED,
    }
}

// ============================================================================
// Response DTOs
// ============================================================================

/// Balance response data
#[derive(Debug, Serialize)]
pub struct BalanceData {
    pub account_no: AccountNo,
    pub balance: Decimal,
    pub currency: CurrencyCode,
}

// ============================================================================
// Error Codes
// ============================================================================

/// Standard API error codes
pub mod error_codes {
    // Success
    pub const SUCCESS: i32 = 0;

    // Client errors (1xxx)
    pub const INVALID_PARAMETER: i32 = 1001;
    pub const TRANSFER_REJECTED: i32 = 1002;

    // Resource errors (4xxx)
    pub const ACCOUNT_NOT_FOUND: i32 = 4001;
    pub const TRANSFER_NOT_FOUND: i32 = 4002;
    pub const RATE_NOT_FOUND: i32 = 4003;

    // Server errors (5xxx)
    pub const INTERNAL_ERROR: i32 = 5000;
    pub const SERVICE_UNAVAILABLE: i32 = 5001;
    pub const LOCK_TIMEOUT: i32 = 5031;
}
