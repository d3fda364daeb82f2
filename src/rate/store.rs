//! Rate store: directional, latest-effective-wins lookup
//!
//! `find_rate` answers "which rate applies to this ordered pair right now":
//! among rows for the exact (source, destination) pair with
//! `effective_at <= as_of`, the latest wins; ties on `effective_at` go to the
//! most recently created row. There is no inverse-pair fallback.

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use rust_decimal::Decimal;

use super::models::{NewRate, Rate};
use crate::currency::CurrencyCode;
use crate::store::StoreError;

#[async_trait]
pub trait RateStore: Send + Sync {
    /// Create a rate row. Non-positive rates are rejected.
    async fn insert(&self, new_rate: NewRate) -> Result<Rate, StoreError>;

    /// The rate effective at `as_of` for the exact ordered pair.
    async fn find_rate(
        &self,
        source: &CurrencyCode,
        destination: &CurrencyCode,
        as_of: DateTime<Utc>,
    ) -> Result<Option<Rate>, StoreError>;

    /// All rows in creation order.
    async fn list(&self) -> Result<Vec<Rate>, StoreError>;

    /// For each ordered pair, the row `find_rate` would select at `as_of`.
    async fn list_effective(&self, as_of: DateTime<Utc>) -> Result<Vec<Rate>, StoreError>;

    /// Administrative update: replace the rate value and re-stamp
    /// `effective_at` and `updated_at` to now, making the row immediately
    /// effective. Currencies are immutable.
    async fn update(&self, id: i64, new_rate: Decimal) -> Result<Rate, StoreError>;
}

// ============================================================================
// MemoryRateStore
// ============================================================================

/// In-memory rate store. The row population is administrative (seeded at
/// startup, occasionally updated), so lookups scan rather than index.
pub struct MemoryRateStore {
    rows: DashMap<i64, Rate>,
    next_id: AtomicI64,
}

impl MemoryRateStore {
    pub fn new() -> Self {
        Self {
            rows: DashMap::new(),
            next_id: AtomicI64::new(1),
        }
    }
}

impl Default for MemoryRateStore {
    fn default() -> Self {
        Self::new()
    }
}

fn pair_key(source: &CurrencyCode, destination: &CurrencyCode) -> (String, String) {
    (source.normalized(), destination.normalized())
}

/// Latest effective wins; ties on effective_at go to the higher id.
fn better_of(current: Option<Rate>, candidate: Rate) -> Rate {
    match current {
        None => candidate,
        Some(held) => {
            if (candidate.effective_at, candidate.id) > (held.effective_at, held.id) {
                candidate
            } else {
                held
            }
        }
    }
}

#[async_trait]
impl RateStore for MemoryRateStore {
    async fn insert(&self, new_rate: NewRate) -> Result<Rate, StoreError> {
        if new_rate.rate <= Decimal::ZERO {
            return Err(StoreError::InvalidRate { rate: new_rate.rate });
        }
        let now = Utc::now();
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let rate = Rate {
            id,
            source_currency: new_rate.source_currency,
            destination_currency: new_rate.destination_currency,
            rate: new_rate.rate,
            effective_at: new_rate.effective_at,
            created_at: now,
            updated_at: now,
        };
        self.rows.insert(id, rate.clone());
        Ok(rate)
    }

    async fn find_rate(
        &self,
        source: &CurrencyCode,
        destination: &CurrencyCode,
        as_of: DateTime<Utc>,
    ) -> Result<Option<Rate>, StoreError> {
        let key = pair_key(source, destination);
        let mut best: Option<Rate> = None;
        for row in self.rows.iter() {
            if pair_key(&row.source_currency, &row.destination_currency) == key
                && row.effective_at <= as_of
            {
                best = Some(better_of(best, row.clone()));
            }
        }
        Ok(best)
    }

    async fn list(&self) -> Result<Vec<Rate>, StoreError> {
        let mut rates: Vec<Rate> = self.rows.iter().map(|row| row.clone()).collect();
        rates.sort_by_key(|r| r.id);
        Ok(rates)
    }

    async fn list_effective(&self, as_of: DateTime<Utc>) -> Result<Vec<Rate>, StoreError> {
        let mut winners: HashMap<(String, String), Rate> = HashMap::new();
        for row in self.rows.iter() {
            if row.effective_at > as_of {
                continue;
            }
            let key = pair_key(&row.source_currency, &row.destination_currency);
            let held = winners.remove(&key);
            winners.insert(key, better_of(held, row.clone()));
        }
        let mut rates: Vec<Rate> = winners.into_values().collect();
        rates.sort_by(|a, b| {
            pair_key(&a.source_currency, &a.destination_currency)
                .cmp(&pair_key(&b.source_currency, &b.destination_currency))
        });
        Ok(rates)
    }

    async fn update(&self, id: i64, new_rate: Decimal) -> Result<Rate, StoreError> {
        if new_rate <= Decimal::ZERO {
            return Err(StoreError::InvalidRate { rate: new_rate });
        }
        let mut row = self
            .rows
            .get_mut(&id)
            .ok_or(StoreError::RateNotFound { id })?;
        let now = Utc::now();
        row.rate = new_rate;
        row.effective_at = now;
        row.updated_at = now;
        Ok(row.clone())
    }
}

// ============================================================================
// Tests
// ============================================================================
