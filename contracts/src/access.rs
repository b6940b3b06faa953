//! Pause flag and deny-list.
//!
//! Both gates are checked before any balance-mutating call does work. Pause
//! is checked first, so a paused ledger reports `Paused` even for calls whose
//! participants are also deny-listed.

use levy_protocol::Address;
use tracing::warn;

use crate::error::LedgerError;
use crate::events::LedgerEvent;
use crate::storage::Batch;

pub struct AccessGate<'b, 's> {
    batch: &'b mut Batch<'s>,
}

impl<'b, 's> AccessGate<'b, 's> {
    pub fn new(batch: &'b mut Batch<'s>) -> Self {
        Self { batch }
    }

    /// Rejects the call if the ledger is paused or any participant is listed.
    pub fn ensure_open(&self, participants: &[Address]) -> Result<(), LedgerError> {
        if self.batch.is_paused() {
            return Err(LedgerError::Paused);
        }
        if let Some(account) = participants.iter().find(|a| self.batch.is_denied(a)) {
            warn!(account = %account, "deny-listed participant");
            return Err(LedgerError::Denied { account: *account });
        }
        Ok(())
    }

    pub fn set_paused(&mut self, paused: bool) {
        self.batch.set_paused(paused);
        self.batch.emit(LedgerEvent::PausedChanged { paused });
    }

    pub fn set_denied(&mut self, account: Address, denied: bool) {
        self.batch.set_denied(account, denied);
        self.batch
            .emit(LedgerEvent::DeniedChanged { account, denied });
    }
}
