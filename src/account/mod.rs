//! Account records and the locked account store

pub mod models;
pub mod store;

pub use models::{Account, AccountNo, NewAccount};
pub use store::{AccountLock, AccountStore, DEFAULT_LOCK_WAIT, MemoryAccountStore};
