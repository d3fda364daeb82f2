use std::sync::Arc;

use crate::account::store::AccountStore;
use crate::rate::store::RateStore;
use crate::transfer::engine::TransferEngine;
use crate::transfer::log::TransferLog;

/// Shared gateway state
///
/// The engine owns the write path; the store handles are for plain reads,
/// which never take account locks.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<TransferEngine>,
    pub accounts: Arc<dyn AccountStore>,
    pub rates: Arc<dyn RateStore>,
    pub transfers: Arc<dyn TransferLog>,
}

impl AppState {
    pub fn new(
        engine: Arc<TransferEngine>,
        accounts: Arc<dyn AccountStore>,
        rates: Arc<dyn RateStore>,
        transfers: Arc<dyn TransferLog>,
    ) -> Self {
        Self {
            engine,
            accounts,
            rates,
            transfers,
        }
    }
}
