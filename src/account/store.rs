//! Account store: plain reads plus lock-for-update
//!
//! `lock_for_update` hands out an [`AccountLock`] guard; the exclusive hold
//! lasts until the guard drops, so commit and rollback both release by RAII.
//! Balance writes require the guard, which turns "only write while locked"
//! from a calling convention into a signature.
//!
//! Plain reads never block, even while a row is locked for update.

use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use rust_decimal::Decimal;
use tokio::sync::{Mutex, OwnedMutexGuard};

use super::models::{Account, AccountNo, NewAccount};
use crate::money;
use crate::store::StoreError;

/// Bound on the wait for an account lock before the transfer fails.
pub const DEFAULT_LOCK_WAIT: Duration = Duration::from_secs(5);

// ============================================================================
// AccountLock
// ============================================================================

/// Exclusive, transaction-scoped hold on one account row.
///
/// Carries the row snapshot read under the lock. The hold releases when the
/// guard drops. A lock is only meaningful against the store that issued it.
pub struct AccountLock {
    account: Account,
    _guard: OwnedMutexGuard<()>,
}

impl AccountLock {
    pub fn new(account: Account, guard: OwnedMutexGuard<()>) -> Self {
        Self {
            account,
            _guard: guard,
        }
    }

    /// Row snapshot as of lock acquisition.
    pub fn account(&self) -> &Account {
        &self.account
    }

    pub fn account_no(&self) -> AccountNo {
        self.account.account_no
    }
}

impl std::fmt::Debug for AccountLock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccountLock")
            .field("account_no", &self.account.account_no)
            .finish()
    }
}

// ============================================================================
// AccountStore trait
// ============================================================================

#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Create an account. The store assigns id and timestamps and normalizes
    /// the opening balance to settlement scale.
    async fn insert(&self, new_account: NewAccount) -> Result<Account, StoreError>;

    async fn get(&self, account_no: AccountNo) -> Result<Option<Account>, StoreError>;

    async fn get_balance(&self, account_no: AccountNo) -> Result<Option<Decimal>, StoreError>;

    /// Accounts in creation order.
    async fn list(&self) -> Result<Vec<Account>, StoreError>;

    /// Acquire the exclusive hold on an account row, waiting at most the
    /// store's configured bound. `Ok(None)` if the account does not exist
    /// (no lock is taken). `StoreError::LockTimeout` if the wait expires.
    async fn lock_for_update(
        &self,
        account_no: AccountNo,
    ) -> Result<Option<AccountLock>, StoreError>;

    /// Overwrite the balance of the locked row. Returns the updated row.
    async fn write_balance(
        &self,
        lock: &AccountLock,
        new_balance: Decimal,
    ) -> Result<Account, StoreError>;
}

// ============================================================================
// MemoryAccountStore
// ============================================================================

/// In-memory account store with a per-account async mutex registry.
///
/// Rows are insert-only (no delete operation exists), so a row observed via
/// `contains_key` cannot vanish before the subsequent locked read.
pub struct MemoryAccountStore {
    rows: DashMap<AccountNo, Account>,
    locks: DashMap<AccountNo, Arc<Mutex<()>>>,
    next_id: AtomicI64,
    lock_wait: Duration,
}

impl MemoryAccountStore {
    pub fn new(lock_wait: Duration) -> Self {
        Self {
            rows: DashMap::new(),
            locks: DashMap::new(),
            next_id: AtomicI64::new(1),
            lock_wait,
        }
    }

    fn lock_handle(&self, account_no: AccountNo) -> Arc<Mutex<()>> {
        self.locks
            .entry(account_no)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .value()
            .clone()
    }
}

impl Default for MemoryAccountStore {
    fn default() -> Self {
        Self::new(DEFAULT_LOCK_WAIT)
    }
}

#[async_trait]
impl AccountStore for MemoryAccountStore {
    async fn insert(&self, new_account: NewAccount) -> Result<Account, StoreError> {
        let account_no = new_account.account_no;
        match self.rows.entry(account_no) {
            Entry::Occupied(_) => Err(StoreError::DuplicateAccount { account_no }),
            Entry::Vacant(slot) => {
                let now = Utc::now();
                let account = Account {
                    id: self.next_id.fetch_add(1, Ordering::SeqCst),
                    owner_id: new_account.owner_id,
                    account_no,
                    balance: money::round_half_even(new_account.balance),
                    currency: new_account.currency,
                    created_at: now,
                    updated_at: now,
                };
                slot.insert(account.clone());
                Ok(account)
            }
        }
    }

    async fn get(&self, account_no: AccountNo) -> Result<Option<Account>, StoreError> {
        Ok(self.rows.get(&account_no).map(|row| row.clone()))
    }

    async fn get_balance(&self, account_no: AccountNo) -> Result<Option<Decimal>, StoreError> {
        Ok(self.rows.get(&account_no).map(|row| row.balance))
    }

    async fn list(&self) -> Result<Vec<Account>, StoreError> {
        let mut accounts: Vec<Account> = self.rows.iter().map(|row| row.clone()).collect();
        accounts.sort_by_key(|a| a.id);
        Ok(accounts)
    }

    async fn lock_for_update(
        &self,
        account_no: AccountNo,
    ) -> Result<Option<AccountLock>, StoreError> {
        if !self.rows.contains_key(&account_no) {
            return Ok(None);
        }

        // The map ref from lock_handle must not be held across the await.
        let mutex = self.lock_handle(account_no);
        let guard = tokio::time::timeout(self.lock_wait, mutex.lock_owned())
            .await
            .map_err(|_| StoreError::LockTimeout {
                account_no,
                waited_ms: self.lock_wait.as_millis() as u64,
            })?;

        // Authoritative snapshot: re-read under the lock.
        let account = self
            .rows
            .get(&account_no)
            .map(|row| row.clone())
            .ok_or(StoreError::AccountNotFound { account_no })?;

        Ok(Some(AccountLock::new(account, guard)))
    }

    async fn write_balance(
        &self,
        lock: &AccountLock,
        new_balance: Decimal,
    ) -> Result<Account, StoreError> {
        let account_no = lock.account_no();
        let mut row = self
            .rows
            .get_mut(&account_no)
            .ok_or(StoreError::AccountNotFound { account_no })?;
        row.balance = new_balance;
        row.updated_at = Utc::now();
        Ok(row.clone())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::currency::CurrencyCode;
    use rust_decimal_macros::dec;

    fn new_account(no: u64, balance: Decimal, currency: &str) -> NewAccount {
        NewAccount {
            owner_id: 1,
            account_no: AccountNo::new(no),
            balance,
            currency: CurrencyCode::new(currency),
        }
    }

    #[tokio::test]
    async fn test_insert_get_and_balance() {
        let store = MemoryAccountStore::default();
        let created = store
            .insert(new_account(100, dec!(500.57), "EUR"))
            .await
            .unwrap();
        assert_eq!(created.id, 1);
        assert_eq!(created.balance, dec!(500.57));

        let fetched = store.get(AccountNo::new(100)).await.unwrap().unwrap();
        assert_eq!(fetched, created);
        assert_eq!(
            store.get_balance(AccountNo::new(100)).await.unwrap(),
            Some(dec!(500.57))
        );
        assert_eq!(store.get(AccountNo::new(999)).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_insert_normalizes_balance_scale() {
        let store = MemoryAccountStore::default();
        let created = store
            .insert(new_account(100, dec!(1000), "USD"))
            .await
            .unwrap();
        assert_eq!(created.balance.to_string(), "1000.00");
    }

    #[tokio::test]
    async fn test_duplicate_account_no_rejected() {
        let store = MemoryAccountStore::default();
        store
            .insert(new_account(100, dec!(1.00), "EUR"))
            .await
            .unwrap();
        let err = store
            .insert(new_account(100, dec!(2.00), "USD"))
            .await
            .unwrap_err();
        assert_eq!(
            err,
            StoreError::DuplicateAccount {
                account_no: AccountNo::new(100)
            }
        );
    }

    #[tokio::test]
    async fn test_list_in_creation_order() {
        let store = MemoryAccountStore::default();
        for no in [300u64, 100, 200] {
            store
                .insert(new_account(no, dec!(1.00), "EUR"))
                .await
                .unwrap();
        }
        let listed = store.list().await.unwrap();
        let nos: Vec<u64> = listed.iter().map(|a| a.account_no.as_u64()).collect();
        assert_eq!(nos, vec![300, 100, 200]);
    }

    #[tokio::test]
    async fn test_lock_for_update_missing_account() {
        let store = MemoryAccountStore::default();
        assert!(
            store
                .lock_for_update(AccountNo::new(404))
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_lock_blocks_second_locker_until_release() {
        let store = MemoryAccountStore::new(Duration::from_millis(100));
        store
            .insert(new_account(100, dec!(50.00), "EUR"))
            .await
            .unwrap();

        let held = store
            .lock_for_update(AccountNo::new(100))
            .await
            .unwrap()
            .unwrap();

        let err = store
            .lock_for_update(AccountNo::new(100))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::LockTimeout { .. }));

        drop(held);
        assert!(
            store
                .lock_for_update(AccountNo::new(100))
                .await
                .unwrap()
                .is_some()
        );
    }

    #[tokio::test]
    async fn test_plain_reads_do_not_block_while_locked() {
        let store = MemoryAccountStore::new(Duration::from_millis(100));
        store
            .insert(new_account(100, dec!(50.00), "EUR"))
            .await
            .unwrap();

        let _held = store
            .lock_for_update(AccountNo::new(100))
            .await
            .unwrap()
            .unwrap();

        assert!(store.get(AccountNo::new(100)).await.unwrap().is_some());
        assert_eq!(
            store.get_balance(AccountNo::new(100)).await.unwrap(),
            Some(dec!(50.00))
        );
    }

    #[tokio::test]
    async fn test_write_balance_requires_and_uses_lock() {
        let store = MemoryAccountStore::default();
        let created = store
            .insert(new_account(100, dec!(50.00), "EUR"))
            .await
            .unwrap();

        let lock = store
            .lock_for_update(AccountNo::new(100))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(lock.account().balance, dec!(50.00));

        let updated = store.write_balance(&lock, dec!(40.00)).await.unwrap();
        assert_eq!(updated.balance, dec!(40.00));
        assert!(updated.updated_at >= created.updated_at);
        drop(lock);

        assert_eq!(
            store.get_balance(AccountNo::new(100)).await.unwrap(),
            Some(dec!(40.00))
        );
    }
}
