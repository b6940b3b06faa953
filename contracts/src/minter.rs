//! # Minter Registry
//!
//! Per-minter quotas. A quota is a ceiling on how much a minter may still
//! create since its last adjustment; it is unrelated to the minter's own
//! balance. An absent entry means "not configured", which the adjusting
//! operations reject, while a configured quota of zero merely stops minting.

use levy_protocol::{Address, Amount};

use crate::error::LedgerError;
use crate::events::LedgerEvent;
use crate::ledger::AccountLedger;
use crate::storage::Batch;

pub struct MinterRegistry<'b, 's> {
    batch: &'b mut Batch<'s>,
}

impl<'b, 's> MinterRegistry<'b, 's> {
    pub fn new(batch: &'b mut Batch<'s>) -> Self {
        Self { batch }
    }

    /// Sets the quota, creating the entry if needed.
    pub fn configure(&mut self, minter: Address, quota: Amount) {
        self.batch.set_minter_quota(minter, Some(quota));
        self.batch
            .emit(LedgerEvent::MinterConfigured { minter, quota });
    }

    fn configured(&self, minter: Address) -> Result<Amount, LedgerError> {
        self.batch
            .minter_quota(&minter)
            .ok_or(LedgerError::MinterNotConfigured { minter })
    }

    pub fn increase(&mut self, minter: Address, delta: Amount) -> Result<Amount, LedgerError> {
        let quota = self
            .configured(minter)?
            .checked_add(delta)
            .ok_or(LedgerError::Overflow)?;
        self.configure(minter, quota);
        Ok(quota)
    }

    pub fn decrease(&mut self, minter: Address, delta: Amount) -> Result<Amount, LedgerError> {
        let allowance = self.configured(minter)?;
        let quota = allowance
            .checked_sub(delta)
            .ok_or(LedgerError::MinterAllowanceUnderflow {
                minter,
                allowance,
                decrease: delta,
            })?;
        self.configure(minter, quota);
        Ok(quota)
    }

    /// Returns the minter to the "not configured" state.
    pub fn remove(&mut self, minter: Address) -> Result<(), LedgerError> {
        self.configured(minter)?;
        self.batch.set_minter_quota(minter, None);
        self.batch.emit(LedgerEvent::MinterRemoved { minter });
        Ok(())
    }

    /// Consumes `amount` of the quota and credits `to`, untaxed.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::MinterNotConfigured`] for an unknown minter.
    /// - [`LedgerError::MintExceedsAllowance`] if `amount` is above the quota.
    pub fn mint(&mut self, minter: Address, to: Address, amount: Amount) -> Result<(), LedgerError> {
        let allowance = self.configured(minter)?;
        let remaining = allowance
            .checked_sub(amount)
            .ok_or(LedgerError::MintExceedsAllowance {
                minter,
                allowance,
                requested: amount,
            })?;
        self.batch.set_minter_quota(minter, Some(remaining));
        mint_unchecked(self.batch, minter, to, amount)
    }
}

/// Creates `amount` out of nothing, bypassing quotas. Used by the quota path
/// above and by the one-time initial supply.
pub(crate) fn mint_unchecked(
    batch: &mut Batch<'_>,
    minter: Address,
    to: Address,
    amount: Amount,
) -> Result<(), LedgerError> {
    let minted = batch
        .total_minted()
        .checked_add(amount)
        .ok_or(LedgerError::Overflow)?;
    AccountLedger::new(batch).credit(to, amount)?;
    batch.set_total_minted(minted);
    batch.emit(LedgerEvent::Mint { minter, to, amount });
    Ok(())
}
