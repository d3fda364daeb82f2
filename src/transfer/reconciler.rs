//! Stale transfer reconciler
//!
//! Background sweeper for PENDING rows that never reached a terminal state,
//! which happens when the process dies or the account store fails between
//! recording a transfer and finalizing it. No balance was committed for such
//! rows, so failing them is safe; they carry no outcome code because no
//! validation verdict was ever reached.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{debug, error, info, warn};

use crate::store::StoreError;
use crate::transfer::log::TransferLog;
use crate::transfer::models::{TransferStatus, TransferUpdate};

/// Explanation recorded on rows the reconciler fails.
const STALE_ERROR: &str = "Transfer stalled before settlement and was failed by the reconciler.";

/// Configuration for the reconciler
#[derive(Debug, Clone)]
pub struct ReconcilerConfig {
    /// How often to sweep for stale transfers
    pub sweep_interval: Duration,
    /// How long a transfer may stay PENDING before it is considered stale
    pub stale_after: Duration,
}

impl Default for ReconcilerConfig {
    fn default() -> Self {
        Self {
            sweep_interval: Duration::from_secs(30),
            stale_after: Duration::from_secs(60),
        }
    }
}

/// Periodically fails transfers stuck in PENDING.
pub struct Reconciler {
    log: Arc<dyn TransferLog>,
    config: ReconcilerConfig,
}

impl Reconciler {
    pub fn new(log: Arc<dyn TransferLog>, config: ReconcilerConfig) -> Self {
        Self { log, config }
    }

    /// Create with default configuration
    pub fn with_defaults(log: Arc<dyn TransferLog>) -> Self {
        Self::new(log, ReconcilerConfig::default())
    }

    /// Run the sweep loop forever.
    pub async fn run(&self) -> ! {
        info!(
            sweep_interval_secs = self.config.sweep_interval.as_secs(),
            stale_after_secs = self.config.stale_after.as_secs(),
            "Starting reconciler"
        );

        loop {
            if let Err(e) = self.sweep(Utc::now()).await {
                error!(error = %e, "Reconciler sweep failed");
            }

            tokio::time::sleep(self.config.sweep_interval).await;
        }
    }

    /// Run a single sweep cycle against the clock reading `now`.
    ///
    /// Returns how many rows were failed. Rows another task finalizes while
    /// the sweep runs are skipped; the exactly-once finalize in the log
    /// arbitrates that race.
    pub async fn sweep(&self, now: DateTime<Utc>) -> Result<usize, StoreError> {
        let cutoff = now
            - chrono::Duration::from_std(self.config.stale_after)
                .unwrap_or_else(|_| chrono::Duration::seconds(60));
        let stale = self.log.list_stale_pending(cutoff).await?;

        if stale.is_empty() {
            debug!("No stale transfers found");
            return Ok(0);
        }

        info!(count = stale.len(), "Found stale transfers to reconcile");

        let mut failed = 0;
        for row in stale {
            let update = TransferUpdate {
                status: TransferStatus::Failed,
                outcome: None,
                error: Some(STALE_ERROR.to_string()),
                source_currency: None,
                destination_currency: None,
                rate: None,
                debited_amount: None,
                credited_amount: None,
            };

            match self.log.finalize(row.id, update).await {
                Ok(_) => {
                    warn!(
                        transfer_id = %row.id,
                        age_secs = (now - row.created_at).num_seconds(),
                        "Failed stale transfer"
                    );
                    failed += 1;
                }
                // Someone finalized the row between the scan and the write.
                Err(StoreError::TransferNotPending { .. }) => {
                    debug!(transfer_id = %row.id, "Transfer finalized under the sweep");
                }
                Err(e) => {
                    error!(transfer_id = %row.id, error = %e, "Could not fail stale transfer");
                }
            }
        }

        if failed > 0 {
            info!(count = failed, "Reconciled stale transfers this sweep");
        }

        Ok(failed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use rust_decimal_macros::dec;

    use crate::transfer::log::MemoryTransferLog;
    use crate::transfer::models::{TransferOutcome, TransferRequest};
    use crate::transfer::validator::ValidationReport;

    fn request(from: u64, to: u64) -> TransferRequest {
        TransferRequest::new(from.into(), to.into(), dec!(10.00), "EUR".into())
    }

    fn success_update() -> TransferUpdate {
        ValidationReport {
            outcome: TransferOutcome::Success,
            source_currency: Some("EUR".into()),
            destination_currency: Some("EUR".into()),
            rate: Some(dec!(1.00)),
            debited_amount: Some(dec!(10.00)),
            credited_amount: Some(dec!(10.00)),
        }
        .into_update()
    }

    #[test]
    fn test_reconciler_config_default() {
        let config = ReconcilerConfig::default();
        assert_eq!(config.sweep_interval, Duration::from_secs(30));
        assert_eq!(config.stale_after, Duration::from_secs(60));
    }

    #[tokio::test]
    async fn test_sweep_fails_only_stale_pending_rows() {
        let log = Arc::new(MemoryTransferLog::new());
        let stuck = log.insert_pending(&request(1, 2)).await.unwrap();
        let done = log.insert_pending(&request(3, 4)).await.unwrap();
        log.finalize(done.id, success_update()).await.unwrap();

        let reconciler = Reconciler::with_defaults(log.clone());

        // Pretend a minute and a bit has passed.
        let later = Utc::now() + chrono::Duration::seconds(61);
        assert_eq!(reconciler.sweep(later).await.unwrap(), 1);

        let swept = log.get(stuck.id).await.unwrap().unwrap();
        assert_eq!(swept.status, TransferStatus::Failed);
        assert_eq!(swept.outcome, None);
        assert_eq!(swept.error.as_deref(), Some(STALE_ERROR));

        // The finalized row kept its verdict.
        let kept = log.get(done.id).await.unwrap().unwrap();
        assert_eq!(kept.status, TransferStatus::Success);
        assert_eq!(kept.outcome, Some(TransferOutcome::Success));
    }

    #[tokio::test]
    async fn test_sweep_is_idempotent() {
        let log = Arc::new(MemoryTransferLog::new());
        log.insert_pending(&request(1, 2)).await.unwrap();

        let reconciler = Reconciler::with_defaults(log.clone());
        let later = Utc::now() + chrono::Duration::seconds(120);

        assert_eq!(reconciler.sweep(later).await.unwrap(), 1);
        assert_eq!(reconciler.sweep(later).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_fresh_pending_rows_are_left_alone() {
        let log = Arc::new(MemoryTransferLog::new());
        let fresh = log.insert_pending(&request(1, 2)).await.unwrap();

        let reconciler = Reconciler::with_defaults(log.clone());
        assert_eq!(reconciler.sweep(Utc::now()).await.unwrap(), 0);

        let row = log.get(fresh.id).await.unwrap().unwrap();
        assert_eq!(row.status, TransferStatus::Pending);
    }
}
