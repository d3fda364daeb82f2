//! HTTP handlers
//!
//! One file per resource. Handlers stay thin: extract, delegate to the
//! engine or a store, map the result into the response envelope.

pub mod accounts;
pub mod health;
pub mod rates;
pub mod transfers;
