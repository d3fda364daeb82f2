//! Transfer engine
//!
//! Orchestrates the full lifecycle of one transfer: record it as PENDING,
//! lock both accounts in a stable order, run the validation sequence, move
//! the money, and finalize the row. This is the only place balances change.
//!
//! The PENDING row goes in before any balance is touched. If the process
//! dies mid-flight, the row survives for the reconciler to pick up, and no
//! half-applied balance is ever visible because both writes happen under
//! both account locks.

use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use tracing::{error, info, warn};

use crate::account::store::{AccountLock, AccountStore};
use crate::money;
use crate::rate::store::RateStore;
use crate::transfer::error::EngineError;
use crate::transfer::log::TransferLog;
use crate::transfer::models::{Transfer, TransferId, TransferRequest};
use crate::transfer::validator;

/// The transfer orchestrator. One instance serves the whole process; every
/// request goes through [`TransferEngine::process_transfer`].
pub struct TransferEngine {
    accounts: Arc<dyn AccountStore>,
    rates: Arc<dyn RateStore>,
    log: Arc<dyn TransferLog>,
}

impl TransferEngine {
    pub fn new(
        accounts: Arc<dyn AccountStore>,
        rates: Arc<dyn RateStore>,
        log: Arc<dyn TransferLog>,
    ) -> Self {
        Self {
            accounts,
            rates,
            log,
        }
    }

    /// Run one transfer end to end.
    ///
    /// Business rejections come back as `Ok` with a FAILED row carrying the
    /// outcome code. `Err` means the transfer could not be driven to a
    /// terminal state: bad input refused before recording, a store failure,
    /// or a lock that never came. In the store-failure case the row stays
    /// PENDING and the reconciler will eventually fail it.
    pub async fn process_transfer(&self, request: TransferRequest) -> Result<Transfer, EngineError> {
        // Refuse garbage before anything is recorded.
        if request.transfer_amount <= Decimal::ZERO {
            return Err(EngineError::InvalidAmount {
                amount: request.transfer_amount,
            });
        }

        // 1. Record the attempt as PENDING before touching any balance.
        let row = self.log.insert_pending(&request).await?;
        info!(
            transfer_id = %row.id,
            from = %request.from_account_no,
            to = %request.to_account_no,
            amount = %request.transfer_amount,
            currency = %request.transfer_currency,
            "Transfer accepted"
        );

        // 2. Lock both accounts, lower account number first. The fixed order
        //    means two opposite transfers can never hold one lock each.
        let (from_lock, to_lock) = self.lock_pair(&request).await?;
        let from_snapshot = from_lock.as_ref().map(AccountLock::account);
        let to_snapshot = match &to_lock {
            Some(lock) => Some(lock.account()),
            // Self-transfer holds one lock; both sides see the same row.
            None if request.from_account_no == request.to_account_no => from_snapshot,
            None => None,
        };

        // 3. Validate under the locks, against the locked snapshots.
        let report = validator::validate(
            &request,
            from_snapshot,
            to_snapshot,
            self.rates.as_ref(),
            Utc::now(),
        )
        .await?;

        // 4. Rejections finalize the row without touching balances.
        if !report.outcome.is_success() {
            warn!(
                transfer_id = %row.id,
                outcome = %report.outcome,
                "Transfer rejected"
            );
            let finalized = self.log.finalize(row.id, report.into_update()).await?;
            return Ok(finalized);
        }

        let (Some(debited), Some(credited)) = (report.debited_amount, report.credited_amount)
        else {
            return Err(EngineError::Invariant(
                "successful validation missing settlement amounts",
            ));
        };

        // 5. Move the money while both locks are held.
        match (&from_lock, &to_lock) {
            (Some(from_lock), Some(to_lock)) => {
                self.settle(from_lock, to_lock, debited, credited).await?;
            }
            (Some(lock), None) if request.from_account_no == request.to_account_no => {
                // Self-transfer nets out in a single write.
                let balance = money::round_half_even(lock.account().balance);
                let net = balance
                    .checked_sub(debited)
                    .and_then(|b| b.checked_add(credited))
                    .ok_or(EngineError::Arithmetic)?;
                self.accounts.write_balance(lock, net).await?;
            }
            _ => {
                return Err(EngineError::Invariant(
                    "successful validation without locked accounts",
                ));
            }
        }

        // 6. Finalize the row. Locks release when the guards drop.
        info!(
            transfer_id = %row.id,
            debited = %debited,
            credited = %credited,
            rate = ?report.rate,
            "Transfer settled"
        );
        let finalized = self.log.finalize(row.id, report.into_update()).await?;
        Ok(finalized)
    }

    /// Look up a transfer row.
    pub async fn get_transfer(&self, id: TransferId) -> Result<Option<Transfer>, EngineError> {
        Ok(self.log.get(id).await?)
    }

    /// Acquire the pair of account locks in account-number order.
    ///
    /// `None` in a slot means that account number resolved to nothing; the
    /// validator turns that into the right rejection. A self-transfer takes
    /// one lock and leaves the `to` slot empty.
    async fn lock_pair(
        &self,
        request: &TransferRequest,
    ) -> Result<(Option<AccountLock>, Option<AccountLock>), EngineError> {
        let from_no = request.from_account_no;
        let to_no = request.to_account_no;

        if from_no == to_no {
            let lock = self.accounts.lock_for_update(from_no).await?;
            return Ok((lock, None));
        }

        if from_no < to_no {
            let from = self.accounts.lock_for_update(from_no).await?;
            let to = self.accounts.lock_for_update(to_no).await?;
            Ok((from, to))
        } else {
            let to = self.accounts.lock_for_update(to_no).await?;
            let from = self.accounts.lock_for_update(from_no).await?;
            Ok((from, to))
        }
    }

    /// Debit the source and credit the destination, both under lock.
    async fn settle(
        &self,
        from_lock: &AccountLock,
        to_lock: &AccountLock,
        debited: Decimal,
        credited: Decimal,
    ) -> Result<(), EngineError> {
        let source_before = money::round_half_even(from_lock.account().balance);
        let dest_before = money::round_half_even(to_lock.account().balance);
        let source_after = source_before
            .checked_sub(debited)
            .ok_or(EngineError::Arithmetic)?;
        let dest_after = dest_before
            .checked_add(credited)
            .ok_or(EngineError::Arithmetic)?;

        self.accounts.write_balance(from_lock, source_after).await?;
        if let Err(err) = self.accounts.write_balance(to_lock, dest_after).await {
            // Put the source back before giving up. Both locks are still
            // held, so nobody observed the half-applied state.
            if let Err(comp) = self.accounts.write_balance(from_lock, source_before).await {
                error!(
                    from = %from_lock.account_no(),
                    error = %comp,
                    "Compensating write failed, source balance may be short"
                );
            }
            return Err(err.into());
        }
        Ok(())
    }
}
