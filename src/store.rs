//! Shared store error taxonomy
//!
//! Every store seam (accounts, rates, transfer log) fails with [`StoreError`].
//! Business-rule rejections are not errors; they travel as transfer outcomes.

use rust_decimal::Decimal;

use crate::account::models::AccountNo;
use crate::transfer::models::{TransferId, TransferStatus};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StoreError {
    #[error("timed out after {waited_ms}ms waiting to lock account {account_no}")]
    LockTimeout { account_no: AccountNo, waited_ms: u64 },

    #[error("account {account_no} not found")]
    AccountNotFound { account_no: AccountNo },

    #[error("account {account_no} already exists")]
    DuplicateAccount { account_no: AccountNo },

    #[error("transfer {transfer_id} not found")]
    TransferNotFound { transfer_id: TransferId },

    #[error("transfer {transfer_id} is {status}, not PENDING")]
    TransferNotPending {
        transfer_id: TransferId,
        status: TransferStatus,
    },

    #[error("rate {id} not found")]
    RateNotFound { id: i64 },

    #[error("rate must be positive, got {rate}")]
    InvalidRate { rate: Decimal },

    #[error("store unavailable: {0}")]
    Unavailable(String),
}
