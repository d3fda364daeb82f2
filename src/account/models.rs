//! Account records

use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::currency::CurrencyCode;

// ============================================================================
// AccountNo
// ============================================================================

/// External account identifier, unique across the store.
///
/// Lock ordering in the engine is by this number, so its `Ord` is load-bearing.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct AccountNo(u64);

impl AccountNo {
    pub fn new(no: u64) -> Self {
        Self(no)
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for AccountNo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for AccountNo {
    fn from(no: u64) -> Self {
        Self(no)
    }
}

// ============================================================================
// Account
// ============================================================================

/// A monetary account. The balance is carried at settlement scale and is
/// mutated only by the transfer engine while the account is locked; the store
/// itself does not enforce non-negativity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub id: i64,
    pub owner_id: i64,
    pub account_no: AccountNo,
    pub balance: Decimal,
    pub currency: CurrencyCode,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields for account creation; id and timestamps are assigned by the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewAccount {
    pub owner_id: i64,
    pub account_no: AccountNo,
    pub balance: Decimal,
    pub currency: CurrencyCode,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_account_no_display_and_order() {
        let a = AccountNo::new(123456789);
        let b = AccountNo::new(987654321);
        assert_eq!(a.to_string(), "123456789");
        assert!(a < b);
    }

    #[test]
    fn test_account_no_serde_transparent() {
        let no = AccountNo::new(555000111);
        assert_eq!(serde_json::to_string(&no).unwrap(), "555000111");
        let back: AccountNo = serde_json::from_str("555000111").unwrap();
        assert_eq!(back, no);
    }
}
