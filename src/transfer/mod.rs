//! Fund transfer processing
//!
//! Implements the locked, validated, atomically settled transfer flow.
//!
//! # Architecture
//!
//! Every transfer runs through one path: record a PENDING row, lock both
//! accounts in account-number order, validate the request against the locked
//! snapshots, move the money, finalize the row.
//!
//! # Record lifecycle
//!
//! ```text
//! PENDING → SUCCESS
//!     ↓
//!  FAILED   (validation rejection, or reconciler sweep of a stalled row)
//! ```
//!
//! # Safety invariants
//!
//! 1. **Record-Before-Lock**: the PENDING row is durable before any balance
//!    is read or written, so a crash always leaves a visible trace
//! 2. **Ordered Locking**: locks are taken lower account number first, which
//!    rules out deadlock between opposite transfers
//! 3. **Both-Or-Neither**: balance writes happen under both locks, with the
//!    source write compensated if the destination write fails
//! 4. **Exactly-Once Finalize**: a row leaves PENDING exactly once; the
//!    engine and the reconciler race through the same CAS

pub mod engine;
pub mod error;
pub mod log;
pub mod models;
pub mod reconciler;
pub mod validator;

// Re-exports for convenience
pub use engine::TransferEngine;
pub use error::EngineError;
pub use log::{MemoryTransferLog, TransferDirection, TransferLog};
pub use models::{
    Transfer, TransferId, TransferOutcome, TransferRequest, TransferStatus, TransferUpdate,
};
pub use reconciler::{Reconciler, ReconcilerConfig};
pub use validator::{ValidationReport, validate};
