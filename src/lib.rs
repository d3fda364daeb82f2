//! fundrail - Multi-Currency Fund Transfer Engine
//!
//! Moves money between accounts that may be denominated in different
//! currencies, with per-account locking, a fixed validation order, and an
//! append-style transfer log that records every attempt.
//!
//! # Modules
//!
//! - [`currency`] - Currency codes and ISO-4217 validation
//! - [`money`] - Decimal rounding and cross-currency conversion
//! - [`account`] - Account records and the locked account store
//! - [`rate`] - Effective-dated directional exchange rates
//! - [`transfer`] - Validation, settlement, transfer records, reconciler
//! - [`gateway`] - HTTP API over the engine and stores
//! - [`store`] - Error taxonomy shared by all store seams
//! - [`config`] - YAML-per-environment configuration
//! - [`logging`] - tracing subscriber setup
//! - [`seed`] - Startup account and rate data

pub mod account;
pub mod config;
pub mod currency;
pub mod gateway;
pub mod logging;
pub mod money;
pub mod rate;
pub mod seed;
pub mod store;
pub mod transfer;

// Convenient re-exports at crate root
pub use account::{Account, AccountNo, AccountStore, MemoryAccountStore, NewAccount};
pub use currency::CurrencyCode;
pub use rate::{MemoryRateStore, NewRate, Rate, RateStore};
pub use store::StoreError;
pub use transfer::{
    EngineError, MemoryTransferLog, Transfer, TransferEngine, TransferId, TransferLog,
    TransferOutcome, TransferRequest, TransferStatus,
};
