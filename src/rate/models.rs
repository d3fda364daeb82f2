//! Exchange-rate records

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::currency::CurrencyCode;

/// One directional exchange-rate row. EUR→USD and USD→EUR are distinct rows;
/// nothing ever derives one from the other.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rate {
    pub id: i64,
    pub source_currency: CurrencyCode,
    pub destination_currency: CurrencyCode,
    pub rate: Decimal,
    pub effective_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields for rate creation; id and audit timestamps come from the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewRate {
    pub source_currency: CurrencyCode,
    pub destination_currency: CurrencyCode,
    pub rate: Decimal,
    pub effective_at: DateTime<Utc>,
}
