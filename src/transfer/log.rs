//! Transfer record store
//!
//! Append-only history with one mutation: the exactly-once finalize of a
//! PENDING row. Finalizing a row that is already terminal (or missing) is a
//! `StoreError`, which is what arbitrates the race between the engine and the
//! reconciler: whoever loses the CAS skips.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use tokio::sync::Mutex;

use super::models::{Transfer, TransferId, TransferRequest, TransferStatus, TransferUpdate};
use crate::account::models::AccountNo;
use crate::store::StoreError;

/// Query direction for per-account history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferDirection {
    /// Transfers drawing from the account
    From,
    /// Transfers crediting the account
    To,
}

impl TransferDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransferDirection::From => "FROM",
            TransferDirection::To => "TO",
        }
    }
}

// ============================================================================
// TransferLog trait
// ============================================================================

#[async_trait]
pub trait TransferLog: Send + Sync {
    /// Create the PENDING row for a request. The insert is durable on its
    /// own: it survives whatever happens to the rest of the transfer.
    async fn insert_pending(&self, request: &TransferRequest) -> Result<Transfer, StoreError>;

    async fn get(&self, id: TransferId) -> Result<Option<Transfer>, StoreError>;

    /// Exactly-once transition PENDING → SUCCESS/FAILED. Fails with
    /// `TransferNotPending` if the row is already terminal.
    async fn finalize(
        &self,
        id: TransferId,
        update: TransferUpdate,
    ) -> Result<Transfer, StoreError>;

    /// All rows in insertion order.
    async fn list_all(&self) -> Result<Vec<Transfer>, StoreError>;

    /// Rows touching an account on the given side, in insertion order.
    async fn list_by_account(
        &self,
        account_no: AccountNo,
        direction: TransferDirection,
    ) -> Result<Vec<Transfer>, StoreError>;

    /// PENDING rows created at or before `cutoff`, in insertion order.
    async fn list_stale_pending(
        &self,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<Transfer>, StoreError>;
}

// ============================================================================
// MemoryTransferLog
// ============================================================================

/// In-memory transfer history. A side vector keeps strict insertion order;
/// ULIDs alone would not, since ids minted in the same millisecond are not
/// ordered.
pub struct MemoryTransferLog {
    rows: DashMap<TransferId, Transfer>,
    order: Mutex<Vec<TransferId>>,
}

impl MemoryTransferLog {
    pub fn new() -> Self {
        Self {
            rows: DashMap::new(),
            order: Mutex::new(Vec::new()),
        }
    }

    async fn collect_ordered<F>(&self, keep: F) -> Vec<Transfer>
    where
        F: Fn(&Transfer) -> bool,
    {
        let order = self.order.lock().await.clone();
        order
            .iter()
            .filter_map(|id| self.rows.get(id).map(|row| row.clone()))
            .filter(|row| keep(row))
            .collect()
    }
}

impl Default for MemoryTransferLog {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TransferLog for MemoryTransferLog {
    async fn insert_pending(&self, request: &TransferRequest) -> Result<Transfer, StoreError> {
        let row = Transfer::pending(TransferId::new(), request);
        self.rows.insert(row.id, row.clone());
        self.order.lock().await.push(row.id);
        Ok(row)
    }

    async fn get(&self, id: TransferId) -> Result<Option<Transfer>, StoreError> {
        Ok(self.rows.get(&id).map(|row| row.clone()))
    }

    async fn finalize(
        &self,
        id: TransferId,
        update: TransferUpdate,
    ) -> Result<Transfer, StoreError> {
        let mut row = self
            .rows
            .get_mut(&id)
            .ok_or(StoreError::TransferNotFound { transfer_id: id })?;
        if row.status != TransferStatus::Pending {
            return Err(StoreError::TransferNotPending {
                transfer_id: id,
                status: row.status,
            });
        }
        row.status = update.status;
        row.outcome = update.outcome;
        row.error = update.error;
        row.source_currency = update.source_currency;
        row.destination_currency = update.destination_currency;
        row.rate = update.rate;
        row.debited_amount = update.debited_amount;
        row.credited_amount = update.credited_amount;
        row.updated_at = Utc::now();
        Ok(row.clone())
    }

    async fn list_all(&self) -> Result<Vec<Transfer>, StoreError> {
        Ok(self.collect_ordered(|_| true).await)
    }

    async fn list_by_account(
        &self,
        account_no: AccountNo,
        direction: TransferDirection,
    ) -> Result<Vec<Transfer>, StoreError> {
        Ok(self
            .collect_ordered(|row| match direction {
                TransferDirection::From => row.from_account_no == account_no,
                TransferDirection::To => row.to_account_no == account_no,
            })
            .await)
    }

    async fn list_stale_pending(
        &self,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<Transfer>, StoreError> {
        Ok(self
            .collect_ordered(|row| {
                row.status == TransferStatus::Pending && row.created_at <= cutoff
            })
            .await)
    }
}

// ============================================================================
// Tests
// ============================================================================
