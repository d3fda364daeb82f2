//! Transfer records, statuses, and outcomes

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::account::models::AccountNo;
use crate::currency::CurrencyCode;

// ============================================================================
// TransferId
// ============================================================================

/// Transfer identifier, assigned when the PENDING row is created.
///
/// ULID-based: monotonic, sortable, no coordination needed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TransferId(ulid::Ulid);

impl TransferId {
    /// Generate a new unique TransferId
    pub fn new() -> Self {
        Self(ulid::Ulid::new())
    }

    /// Get the inner ULID value
    pub fn inner(&self) -> ulid::Ulid {
        self.0
    }
}

impl Default for TransferId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TransferId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TransferId {
    type Err = ulid::DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(ulid::Ulid::from_string(s)?))
    }
}

impl Serialize for TransferId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

// ============================================================================
// TransferStatus
// ============================================================================

/// Lifecycle status of a transfer row. PENDING transitions to exactly one of
/// SUCCESS or FAILED and is never reverted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransferStatus {
    Pending,
    Success,
    Failed,
}

impl TransferStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransferStatus::Pending => "PENDING",
            TransferStatus::Success => "SUCCESS",
            TransferStatus::Failed => "FAILED",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, TransferStatus::Pending)
    }
}

impl fmt::Display for TransferStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// TransferOutcome
// ============================================================================

/// Business result of transfer validation. Every non-success outcome is
/// terminal and never retried by the engine; the checks run in a fixed order
/// and the first failure wins (see the validator).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransferOutcome {
    Success,
    InvalidFromAcc,
    InvalidToAcc,
    InvalidCurrencyTransfer,
    InvalidCurrencyFromAcc,
    InvalidCurrencyToAcc,
    TransferCurrencyMismatch,
    RateNotFound,
    InsufficientFund,
}

impl TransferOutcome {
    /// Stable code string, as recorded on rows and surfaced over HTTP.
    pub fn as_str(&self) -> &'static str {
        match self {
            TransferOutcome::Success => "SUCCESS",
            TransferOutcome::InvalidFromAcc => "INVALID_FROM_ACC",
            TransferOutcome::InvalidToAcc => "INVALID_TO_ACC",
            TransferOutcome::InvalidCurrencyTransfer => "INVALID_CURRENCY_TRANSFER",
            TransferOutcome::InvalidCurrencyFromAcc => "INVALID_CURRENCY_FROM_ACC",
            TransferOutcome::InvalidCurrencyToAcc => "INVALID_CURRENCY_TO_ACC",
            TransferOutcome::TransferCurrencyMismatch => "TRANSFER_CURRENCY_MISMATCH",
            TransferOutcome::RateNotFound => "RATE_NOT_FOUND",
            TransferOutcome::InsufficientFund => "INSUFFICIENT_FUND",
        }
    }

    /// Human-readable explanation, recorded on FAILED rows.
    pub fn message(&self) -> &'static str {
        match self {
            TransferOutcome::Success => "Transfer processed successfully.",
            TransferOutcome::InvalidFromAcc => "Invalid source account.",
            TransferOutcome::InvalidToAcc => "Invalid destination account.",
            TransferOutcome::InvalidCurrencyTransfer => "Invalid transfer currency code.",
            TransferOutcome::InvalidCurrencyFromAcc => "Invalid source account currency code.",
            TransferOutcome::InvalidCurrencyToAcc => {
                "Invalid destination account currency code."
            }
            TransferOutcome::TransferCurrencyMismatch => {
                "Transfer currency matches neither account currency."
            }
            TransferOutcome::RateNotFound => {
                "Rate not found for the source and destination currencies."
            }
            TransferOutcome::InsufficientFund => "Insufficient funds on source account.",
        }
    }

    #[inline]
    pub fn is_success(&self) -> bool {
        matches!(self, TransferOutcome::Success)
    }
}

impl fmt::Display for TransferOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// TransferRequest
// ============================================================================

/// Transfer request as submitted by the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferRequest {
    pub from_account_no: AccountNo,
    pub to_account_no: AccountNo,
    pub transfer_amount: Decimal,
    pub transfer_currency: CurrencyCode,
}

impl TransferRequest {
    pub fn new(
        from_account_no: AccountNo,
        to_account_no: AccountNo,
        transfer_amount: Decimal,
        transfer_currency: CurrencyCode,
    ) -> Self {
        Self {
            from_account_no,
            to_account_no,
            transfer_amount,
            transfer_currency,
        }
    }
}

// ============================================================================
// Transfer
// ============================================================================

/// One transfer history row. Settlement fields stay unset until validation
/// reaches them: a currency-mismatch failure records the account currencies
/// but no rate, an insufficient-fund failure records the rate but no amounts,
/// and amounts appear only on SUCCESS.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Transfer {
    pub id: TransferId,
    pub from_account_no: AccountNo,
    pub to_account_no: AccountNo,
    pub transfer_amount: Decimal,
    pub transfer_currency: CurrencyCode,
    pub debited_amount: Option<Decimal>,
    pub source_currency: Option<CurrencyCode>,
    pub credited_amount: Option<Decimal>,
    pub destination_currency: Option<CurrencyCode>,
    pub rate: Option<Decimal>,
    pub status: TransferStatus,
    pub outcome: Option<TransferOutcome>,
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Transfer {
    /// Fresh PENDING row for a request; settlement fields come at finalize.
    pub fn pending(id: TransferId, request: &TransferRequest) -> Self {
        let now = Utc::now();
        Self {
            id,
            from_account_no: request.from_account_no,
            to_account_no: request.to_account_no,
            transfer_amount: request.transfer_amount,
            transfer_currency: request.transfer_currency.clone(),
            debited_amount: None,
            source_currency: None,
            credited_amount: None,
            destination_currency: None,
            rate: None,
            status: TransferStatus::Pending,
            outcome: None,
            error: None,
            created_at: now,
            updated_at: now,
        }
    }
}

impl fmt::Display for Transfer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Transfer[{}] {} -> {} amount={} {} status={}",
            self.id,
            self.from_account_no,
            self.to_account_no,
            self.transfer_amount,
            self.transfer_currency,
            self.status
        )
    }
}

// ============================================================================
// TransferUpdate
// ============================================================================

/// Finalize payload: the terminal status plus whatever settlement fields
/// validation produced.
#[derive(Debug, Clone)]
pub struct TransferUpdate {
    pub status: TransferStatus,
    pub outcome: Option<TransferOutcome>,
    pub error: Option<String>,
    pub source_currency: Option<CurrencyCode>,
    pub destination_currency: Option<CurrencyCode>,
    pub rate: Option<Decimal>,
    pub debited_amount: Option<Decimal>,
    pub credited_amount: Option<Decimal>,
}
