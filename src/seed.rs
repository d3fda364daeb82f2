//! Startup seed data
//!
//! The in-memory stores start empty, so the binary loads its working set of
//! accounts and exchange rates from a YAML file named in the config. The file
//! is operator-authored; any bad row aborts startup rather than running with
//! half the data.

use anyhow::Context;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::info;

use crate::account::models::NewAccount;
use crate::account::store::AccountStore;
use crate::currency::CurrencyCode;
use crate::rate::models::NewRate;
use crate::rate::store::RateStore;

#[derive(Debug, Deserialize, Default)]
pub struct SeedFile {
    #[serde(default)]
    pub accounts: Vec<SeedAccount>,
    #[serde(default)]
    pub rates: Vec<SeedRate>,
}

#[derive(Debug, Deserialize)]
pub struct SeedAccount {
    pub owner_id: i64,
    pub account_no: u64,
    pub balance: Decimal,
    pub currency: String,
}

#[derive(Debug, Deserialize)]
pub struct SeedRate {
    pub source_currency: String,
    pub destination_currency: String,
    pub rate: Decimal,
    /// Omitted means effective from startup
    pub effective_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Default, PartialEq)]
pub struct SeedSummary {
    pub accounts: usize,
    pub rates: usize,
}

/// Read and apply a seed file.
pub async fn apply(
    path: &str,
    accounts: &dyn AccountStore,
    rates: &dyn RateStore,
) -> anyhow::Result<SeedSummary> {
    let content =
        std::fs::read_to_string(path).with_context(|| format!("reading seed file {}", path))?;
    let seed: SeedFile =
        serde_yaml::from_str(&content).with_context(|| format!("parsing seed file {}", path))?;
    apply_seed(seed, accounts, rates).await
}

/// Insert every seeded row, in file order.
pub async fn apply_seed(
    seed: SeedFile,
    accounts: &dyn AccountStore,
    rates: &dyn RateStore,
) -> anyhow::Result<SeedSummary> {
    let now = Utc::now();
    let mut summary = SeedSummary::default();

    for account in seed.accounts {
        let account_no = account.account_no;
        accounts
            .insert(NewAccount {
                owner_id: account.owner_id,
                account_no: account_no.into(),
                balance: account.balance,
                currency: CurrencyCode::new(account.currency),
            })
            .await
            .with_context(|| format!("seeding account {}", account_no))?;
        summary.accounts += 1;
    }

    for rate in seed.rates {
        rates
            .insert(NewRate {
                source_currency: CurrencyCode::new(rate.source_currency),
                destination_currency: CurrencyCode::new(rate.destination_currency),
                rate: rate.rate,
                effective_at: rate.effective_at.unwrap_or(now),
            })
            .await
            .context("seeding exchange rate")?;
        summary.rates += 1;
    }

    info!(
        accounts = summary.accounts,
        rates = summary.rates,
        "Seed data applied"
    );
    Ok(summary)
}
