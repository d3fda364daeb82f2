//! Ordered transfer validation
//!
//! One pass over the request and the locked account snapshots, stopping at
//! the first rule that fails. The order is part of the API contract: a
//! request with several problems always reports the same outcome code, no
//! matter which store answered first.
//!
//! Validation is pure apart from the rate lookup. It never mutates balances
//! and never touches the rate store when both accounts share a currency.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::account::models::Account;
use crate::currency::CurrencyCode;
use crate::money;
use crate::rate::store::RateStore;
use crate::transfer::error::EngineError;
use crate::transfer::models::{TransferOutcome, TransferRequest, TransferStatus, TransferUpdate};

// ============================================================================
// Validation report
// ============================================================================

/// Where validation landed for one transfer request.
///
/// Fields are filled as far as validation got, mirroring what the finalized
/// transfer row records: a currency-mismatch report carries both account
/// currencies, an insufficient-fund report additionally carries the rate,
/// and only a successful report carries settlement amounts.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationReport {
    pub outcome: TransferOutcome,
    pub source_currency: Option<CurrencyCode>,
    pub destination_currency: Option<CurrencyCode>,
    pub rate: Option<Decimal>,
    pub debited_amount: Option<Decimal>,
    pub credited_amount: Option<Decimal>,
}

impl ValidationReport {
    /// A rejection that got no further than its outcome code.
    fn rejected(outcome: TransferOutcome) -> Self {
        Self {
            outcome,
            source_currency: None,
            destination_currency: None,
            rate: None,
            debited_amount: None,
            credited_amount: None,
        }
    }

    /// Fold the report into the update that finalizes the transfer row.
    pub fn into_update(self) -> TransferUpdate {
        let status = if self.outcome.is_success() {
            TransferStatus::Success
        } else {
            TransferStatus::Failed
        };
        let error = if self.outcome.is_success() {
            None
        } else {
            Some(self.outcome.message().to_string())
        };
        TransferUpdate {
            status,
            outcome: Some(self.outcome),
            error,
            source_currency: self.source_currency,
            destination_currency: self.destination_currency,
            rate: self.rate,
            debited_amount: self.debited_amount,
            credited_amount: self.credited_amount,
        }
    }
}

// ============================================================================
// Validation sequence
// ============================================================================

/// Run the full validation sequence for one transfer.
///
/// `from_account` and `to_account` are the snapshots taken under the account
/// locks; `None` means the account number resolved to nothing. `as_of` pins
/// rate resolution so a single transfer sees one consistent instant.
///
/// Business rejections come back as `Ok` with a non-success outcome. `Err`
/// is reserved for store failures and arithmetic overflow.
pub async fn validate(
    request: &TransferRequest,
    from_account: Option<&Account>,
    to_account: Option<&Account>,
    rates: &dyn RateStore,
    as_of: DateTime<Utc>,
) -> Result<ValidationReport, EngineError> {
    let Some(from_account) = from_account else {
        return Ok(ValidationReport::rejected(TransferOutcome::InvalidFromAcc));
    };
    let Some(to_account) = to_account else {
        return Ok(ValidationReport::rejected(TransferOutcome::InvalidToAcc));
    };

    if !request.transfer_currency.is_recognized() {
        return Ok(ValidationReport::rejected(
            TransferOutcome::InvalidCurrencyTransfer,
        ));
    }
    if !from_account.currency.is_recognized() {
        return Ok(ValidationReport::rejected(
            TransferOutcome::InvalidCurrencyFromAcc,
        ));
    }
    let source_currency = from_account.currency.clone();

    if !to_account.currency.is_recognized() {
        return Ok(ValidationReport {
            source_currency: Some(source_currency),
            ..ValidationReport::rejected(TransferOutcome::InvalidCurrencyToAcc)
        });
    }
    let destination_currency = to_account.currency.clone();

    if !request.transfer_currency.matches(&source_currency)
        && !request.transfer_currency.matches(&destination_currency)
    {
        return Ok(ValidationReport {
            source_currency: Some(source_currency),
            destination_currency: Some(destination_currency),
            ..ValidationReport::rejected(TransferOutcome::TransferCurrencyMismatch)
        });
    }

    // Same-currency transfers settle 1:1 without consulting the rate store.
    let rate = if source_currency.matches(&destination_currency) {
        money::unit_rate()
    } else {
        let found = rates
            .find_rate(&source_currency, &destination_currency, as_of)
            .await?;
        match found {
            Some(row) => row.rate,
            None => {
                return Ok(ValidationReport {
                    source_currency: Some(source_currency),
                    destination_currency: Some(destination_currency),
                    ..ValidationReport::rejected(TransferOutcome::RateNotFound)
                });
            }
        }
    };

    // The transfer amount is denominated in the transfer currency. Whichever
    // side already matches takes the rounded amount as-is; the other side
    // goes through the conversion rules in `money`.
    let debited_amount = if request.transfer_currency.matches(&source_currency) {
        money::round_half_even(request.transfer_amount)
    } else {
        money::convert_debit(request.transfer_amount, rate).ok_or(EngineError::Arithmetic)?
    };
    let credited_amount = if request.transfer_currency.matches(&destination_currency) {
        money::round_half_even(request.transfer_amount)
    } else {
        money::convert_credit(request.transfer_amount, rate).ok_or(EngineError::Arithmetic)?
    };

    // An exact drain to zero passes; only a negative remainder fails.
    let remaining = money::round_half_even(from_account.balance)
        .checked_sub(debited_amount)
        .ok_or(EngineError::Arithmetic)?;
    if remaining < Decimal::ZERO {
        return Ok(ValidationReport {
            source_currency: Some(source_currency),
            destination_currency: Some(destination_currency),
            rate: Some(rate),
            ..ValidationReport::rejected(TransferOutcome::InsufficientFund)
        });
    }

    Ok(ValidationReport {
        outcome: TransferOutcome::Success,
        source_currency: Some(source_currency),
        destination_currency: Some(destination_currency),
        rate: Some(rate),
        debited_amount: Some(debited_amount),
        credited_amount: Some(credited_amount),
    })
}
