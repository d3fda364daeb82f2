//! Directional exchange rates

pub mod models;
pub mod store;

pub use models::{NewRate, Rate};
pub use store::{MemoryRateStore, RateStore};
