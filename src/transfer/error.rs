//! Transfer engine error types

use rust_decimal::Decimal;
use thiserror::Error;

use crate::store::StoreError;

/// Failures that are not business outcomes.
///
/// Business rejections (unknown account, bad currency, insufficient funds)
/// are recorded on the transfer row as a [`TransferOutcome`] and reported
/// with a 4xx status. `EngineError` covers everything else: input the
/// engine refuses to record, arithmetic breakdown, store trouble, and
/// broken internal invariants.
///
/// [`TransferOutcome`]: crate::transfer::models::TransferOutcome
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    #[error("Transfer amount must be positive, got {amount}")]
    InvalidAmount { amount: Decimal },

    #[error("Decimal overflow while computing settlement amounts")]
    Arithmetic,

    #[error("Transfer invariant violated: {0}")]
    Invariant(&'static str),

    #[error(transparent)]
    Store(#[from] StoreError),
}
