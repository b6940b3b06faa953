//! # Account Ledger
//!
//! Balance and allowance primitives. Every method works against a
//! [`Batch`], so a failure halfway through a multi-leg operation (a taxed
//! transfer touches four balances) discards the earlier legs with the batch.
//!
//! The ledger does not consult the access gate or check callers; the
//! [`Token`](crate::token::Token) entry points do that before reaching here.

use levy_protocol::{Address, Amount};

use crate::error::LedgerError;
use crate::events::LedgerEvent;
use crate::storage::Batch;
use crate::tax::{TaxPolicy, TaxSplit};

pub struct AccountLedger<'b, 's> {
    batch: &'b mut Batch<'s>,
    policy: TaxPolicy,
}

impl<'b, 's> AccountLedger<'b, 's> {
    pub fn new(batch: &'b mut Batch<'s>) -> Self {
        let base = batch.base();
        let policy = TaxPolicy::new(base.sink, base.treasury);
        Self { batch, policy }
    }

    /// Adds `amount` to `to`. Emits nothing; callers emit the event that
    /// describes why value arrived.
    pub fn credit(&mut self, to: Address, amount: Amount) -> Result<(), LedgerError> {
        let balance = self
            .batch
            .balance(&to)
            .checked_add(amount)
            .ok_or(LedgerError::Overflow)?;
        self.batch.set_balance(to, balance);
        Ok(())
    }

    /// Removes `amount` from `from`.
    ///
    /// # Errors
    ///
    /// [`LedgerError::InsufficientBalance`] if `from` holds less than `amount`.
    pub fn debit(&mut self, from: Address, amount: Amount) -> Result<(), LedgerError> {
        let balance = self.batch.balance(&from);
        let remaining = balance
            .checked_sub(amount)
            .ok_or(LedgerError::InsufficientBalance {
                account: from,
                balance,
                requested: amount,
            })?;
        self.batch.set_balance(from, remaining);
        Ok(())
    }

    /// Moves `amount` without tax and emits one transfer event.
    pub fn move_untaxed(
        &mut self,
        from: Address,
        to: Address,
        amount: Amount,
    ) -> Result<(), LedgerError> {
        self.debit(from, amount)?;
        self.credit(to, amount)?;
        self.batch.emit(LedgerEvent::Transfer { from, to, amount });
        Ok(())
    }

    /// Taxed transfer of a gross `amount`.
    ///
    /// `from` is debited the full amount; `to` receives the net, the sink and
    /// treasury receive the two tax shares. One transfer event per non-empty
    /// leg, recipient first.
    pub fn transfer(
        &mut self,
        from: Address,
        to: Address,
        amount: Amount,
    ) -> Result<TaxSplit, LedgerError> {
        let split = self.policy.apply_tax(amount)?;
        self.debit(from, amount)?;

        let legs = [
            (to, split.net),
            (self.policy.sink, split.sink_share),
            (self.policy.treasury, split.treasury_share),
        ];
        for (index, (dest, share)) in legs.into_iter().enumerate() {
            // The recipient leg is always reported, even for a zero transfer.
            if index > 0 && share.is_zero() {
                continue;
            }
            self.credit(dest, share)?;
            self.batch.emit(LedgerEvent::Transfer {
                from,
                to: dest,
                amount: share,
            });
        }
        Ok(split)
    }

    /// Sets the allowance absolutely.
    pub fn approve(&mut self, owner: Address, spender: Address, amount: Amount) {
        self.batch.set_allowance(owner, spender, amount);
        self.batch.emit(LedgerEvent::Approval {
            owner,
            spender,
            amount,
        });
    }

    /// Consumes exactly `amount` of the allowance. There is no unlimited
    /// sentinel.
    pub fn spend_allowance(
        &mut self,
        owner: Address,
        spender: Address,
        amount: Amount,
    ) -> Result<(), LedgerError> {
        let allowance = self.batch.allowance(&owner, &spender);
        let remaining = allowance
            .checked_sub(amount)
            .ok_or(LedgerError::InsufficientAllowance {
                owner,
                spender,
                allowance,
                requested: amount,
            })?;
        self.batch.set_allowance(owner, spender, remaining);
        Ok(())
    }

    /// Untaxed, permanent removal from `from`.
    pub fn burn(&mut self, from: Address, amount: Amount) -> Result<(), LedgerError> {
        self.debit(from, amount)?;
        let burned = self
            .batch
            .total_burned()
            .checked_add(amount)
            .ok_or(LedgerError::Overflow)?;
        self.batch.set_total_burned(burned);
        self.batch.emit(LedgerEvent::Burn { from, amount });
        Ok(())
    }

    /// Burns from `owner`'s balance, paid for out of `spender`'s allowance.
    pub fn burn_from(
        &mut self,
        spender: Address,
        owner: Address,
        amount: Amount,
    ) -> Result<(), LedgerError> {
        self.spend_allowance(owner, spender, amount)?;
        self.burn(owner, amount)
    }
}
