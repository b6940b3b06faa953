//! # Token
//!
//! The public face of the ledger. Every entry point takes an explicit
//! `caller`, checks authority, consults the [`AccessGate`], and then runs
//! the component logic inside one [`Batch`]. The batch is committed only if
//! the whole call succeeds, so a rejected call leaves storage exactly as it
//! was.
//!
//! Calls can also be expressed as [`LedgerCall`] values. The forwarder
//! delivers them bincode-encoded through [`ForwardTarget`], with the signer
//! as `caller`.
//!
//! ## Gating
//!
//! | Entry point                         | Authority      | Gate participants                  |
//! |-------------------------------------|----------------|------------------------------------|
//! | transfer / bulk_transfer            | anyone         | caller, recipients, sink, treasury |
//! | transfer_from                       | allowance      | caller, owner, recipient, sink, treasury |
//! | meta_transfer (v2)                  | anyone         | as transfer, plus fee recipient    |
//! | burn / burn_from                    | balance / allowance | caller (and owner)            |
//! | mint                                | configured minter | minter, recipient               |
//! | approve                             | anyone         | not gated                          |
//! | minter, pause, deny, admin, upgrade | administrator  | not gated                          |

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use levy_protocol::config::DECIMALS;
use levy_protocol::{Address, Amount};

use crate::access::AccessGate;
use crate::config::LedgerConfig;
use crate::error::LedgerError;
use crate::events::LedgerEvent;
use crate::forwarder::ForwardTarget;
use crate::ledger::AccountLedger;
use crate::minter::MinterRegistry;
use crate::storage::{Batch, LedgerStorage};
use crate::upgrade::{self, Activation, BehaviorVersion};

// ---------------------------------------------------------------------------
// Calls
// ---------------------------------------------------------------------------

/// One state-changing entry point with its arguments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LedgerCall {
    Transfer { to: Address, amount: Amount },
    BulkTransfer { transfers: Vec<(Address, Amount)> },
    Approve { spender: Address, amount: Amount },
    TransferFrom { from: Address, to: Address, amount: Amount },
    Burn { amount: Amount },
    BurnFrom { owner: Address, amount: Amount },
    Mint { to: Address, amount: Amount },
    ConfigureMinter { minter: Address, quota: Amount },
    IncreaseMinterAllowance { minter: Address, delta: Amount },
    DecreaseMinterAllowance { minter: Address, delta: Amount },
    RemoveMinter { minter: Address },
    SetPaused { paused: bool },
    SetDenied { account: Address, denied: bool },
    TransferAdmin { new_admin: Address },
    MetaTransfer { to: Address, value: Amount, fee: Amount },
    Upgrade { activation: Activation },
}

impl LedgerCall {
    /// Payload form carried in a forward request's `data`.
    pub fn encode(&self) -> Result<Vec<u8>, LedgerError> {
        bincode::serialize(self).map_err(|e| LedgerError::MalformedCall(e.to_string()))
    }

    pub fn decode(data: &[u8]) -> Result<Self, LedgerError> {
        bincode::deserialize(data).map_err(|e| LedgerError::MalformedCall(e.to_string()))
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Transfer { .. } => "transfer",
            Self::BulkTransfer { .. } => "bulkTransfer",
            Self::Approve { .. } => "approve",
            Self::TransferFrom { .. } => "transferFrom",
            Self::Burn { .. } => "burn",
            Self::BurnFrom { .. } => "burnFrom",
            Self::Mint { .. } => "mint",
            Self::ConfigureMinter { .. } => "configureMinter",
            Self::IncreaseMinterAllowance { .. } => "increaseMinterAllowance",
            Self::DecreaseMinterAllowance { .. } => "decreaseMinterAllowance",
            Self::RemoveMinter { .. } => "removeMinter",
            Self::SetPaused { .. } => "setPaused",
            Self::SetDenied { .. } => "setDenied",
            Self::TransferAdmin { .. } => "transferAdmin",
            Self::MetaTransfer { .. } => "metaTransfer",
            Self::Upgrade { .. } => "upgrade",
        }
    }
}

// ---------------------------------------------------------------------------
// Token
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    address: Address,
    storage: LedgerStorage,
    /// In-memory log for observers; not persisted.
    #[serde(skip)]
    events: Vec<LedgerEvent>,
}

fn require_admin(batch: &Batch<'_>, caller: Address) -> Result<(), LedgerError> {
    if caller != batch.admin() {
        warn!(caller = %caller, "administrator-gated call rejected");
        return Err(LedgerError::Unauthorized { caller });
    }
    Ok(())
}

/// Recipients of a taxed transfer as seen by the gate.
fn taxed_participants(batch: &Batch<'_>, parties: &[Address]) -> Vec<Address> {
    let base = batch.base();
    let mut all = parties.to_vec();
    all.push(base.sink);
    all.push(base.treasury);
    all
}

impl Token {
    /// Creates the ledger at `address` and runs the version-1 setup.
    pub fn deploy(
        address: Address,
        config: &LedgerConfig,
        trusted_forwarder: Address,
    ) -> Result<Self, LedgerError> {
        let mut token = Self {
            address,
            storage: LedgerStorage::new(config, trusted_forwarder),
            events: Vec::new(),
        };
        let activation = Activation::V1 {
            initial_supply: config.initial_supply,
        };
        token.commit(|batch| upgrade::activate(batch, &activation))?;
        Ok(token)
    }

    /// Runs `f` against a fresh batch and commits it only on success.
    fn commit<F>(&mut self, f: F) -> Result<(), LedgerError>
    where
        F: for<'s> FnOnce(&mut Batch<'s>) -> Result<(), LedgerError>,
    {
        let changes = {
            let mut batch = Batch::new(&self.storage);
            f(&mut batch)?;
            batch.into_changes()
        };
        let events = self.storage.apply(changes);
        for event in &events {
            debug!(token = %self.address.short(), kind = event.name(), %event, "committed");
        }
        self.events.extend(events);
        Ok(())
    }

    // -- dispatch ----------------------------------------------------------

    /// Applies `call` as if `caller` had invoked the matching entry point.
    pub fn call(&mut self, caller: Address, call: LedgerCall) -> Result<(), LedgerError> {
        let name = call.name();
        let result = match call {
            LedgerCall::Transfer { to, amount } => self.transfer(caller, to, amount),
            LedgerCall::BulkTransfer { transfers } => self.bulk_transfer(caller, &transfers),
            LedgerCall::Approve { spender, amount } => self.approve(caller, spender, amount),
            LedgerCall::TransferFrom { from, to, amount } => {
                self.transfer_from(caller, from, to, amount)
            }
            LedgerCall::Burn { amount } => self.burn(caller, amount),
            LedgerCall::BurnFrom { owner, amount } => self.burn_from(caller, owner, amount),
            LedgerCall::Mint { to, amount } => self.mint(caller, to, amount),
            LedgerCall::ConfigureMinter { minter, quota } => {
                self.configure_minter(caller, minter, quota)
            }
            LedgerCall::IncreaseMinterAllowance { minter, delta } => {
                self.increase_minter_allowance(caller, minter, delta)
            }
            LedgerCall::DecreaseMinterAllowance { minter, delta } => {
                self.decrease_minter_allowance(caller, minter, delta)
            }
            LedgerCall::RemoveMinter { minter } => self.remove_minter(caller, minter),
            LedgerCall::SetPaused { paused } => self.set_paused(caller, paused),
            LedgerCall::SetDenied { account, denied } => self.set_denied(caller, account, denied),
            LedgerCall::TransferAdmin { new_admin } => self.transfer_admin(caller, new_admin),
            LedgerCall::MetaTransfer { to, value, fee } => {
                self.meta_transfer(caller, to, value, fee)
            }
            LedgerCall::Upgrade { activation } => self.upgrade(caller, activation),
        };
        if let Err(e) = &result {
            debug!(
                call = name,
                caller = %caller.short(),
                kind = e.kind(),
                error = %e,
                "call rejected"
            );
        }
        result
    }

    // -- transfers ---------------------------------------------------------

    pub fn transfer(&mut self, caller: Address, to: Address, amount: Amount) -> Result<(), LedgerError> {
        self.commit(|batch| {
            let participants = taxed_participants(batch, &[caller, to]);
            AccessGate::new(batch).ensure_open(&participants)?;
            AccountLedger::new(batch).transfer(caller, to, amount)?;
            Ok(())
        })
    }

    /// Taxed transfers in order. One failing pair fails them all.
    pub fn bulk_transfer(
        &mut self,
        caller: Address,
        transfers: &[(Address, Amount)],
    ) -> Result<(), LedgerError> {
        self.commit(|batch| {
            let mut parties = vec![caller];
            parties.extend(transfers.iter().map(|(to, _)| *to));
            let participants = taxed_participants(batch, &parties);
            AccessGate::new(batch).ensure_open(&participants)?;

            let mut ledger = AccountLedger::new(batch);
            for (to, amount) in transfers {
                ledger.transfer(caller, *to, *amount)?;
            }
            Ok(())
        })
    }

    pub fn approve(&mut self, caller: Address, spender: Address, amount: Amount) -> Result<(), LedgerError> {
        self.commit(|batch| {
            AccountLedger::new(batch).approve(caller, spender, amount);
            Ok(())
        })
    }

    /// Taxed transfer out of `from`, consuming the caller's allowance by the
    /// gross amount.
    pub fn transfer_from(
        &mut self,
        caller: Address,
        from: Address,
        to: Address,
        amount: Amount,
    ) -> Result<(), LedgerError> {
        self.commit(|batch| {
            let participants = taxed_participants(batch, &[caller, from, to]);
            AccessGate::new(batch).ensure_open(&participants)?;
            let mut ledger = AccountLedger::new(batch);
            ledger.spend_allowance(from, caller, amount)?;
            ledger.transfer(from, to, amount)?;
            Ok(())
        })
    }

    /// Pays `fee` untaxed to the fee recipient, then transfers `value` to
    /// `to` with tax. Available from version 2.
    pub fn meta_transfer(
        &mut self,
        caller: Address,
        to: Address,
        value: Amount,
        fee: Amount,
    ) -> Result<(), LedgerError> {
        self.commit(|batch| {
            let version = batch.behavior_version();
            let fee_recipient = match (upgrade::active_version(batch), batch.fee_recipient()) {
                (Some(v), Some(recipient)) if v.supports_meta_transfer() => recipient,
                _ => {
                    return Err(LedgerError::UnsupportedOperation {
                        operation: "metaTransfer",
                        version,
                    })
                }
            };
            let participants = taxed_participants(batch, &[caller, to, fee_recipient]);
            AccessGate::new(batch).ensure_open(&participants)?;

            let mut ledger = AccountLedger::new(batch);
            if !fee.is_zero() {
                ledger.move_untaxed(caller, fee_recipient, fee)?;
            }
            ledger.transfer(caller, to, value)?;
            Ok(())
        })
    }

    // -- burning -----------------------------------------------------------

    pub fn burn(&mut self, caller: Address, amount: Amount) -> Result<(), LedgerError> {
        self.commit(|batch| {
            AccessGate::new(batch).ensure_open(&[caller])?;
            AccountLedger::new(batch).burn(caller, amount)
        })
    }

    pub fn burn_from(&mut self, caller: Address, owner: Address, amount: Amount) -> Result<(), LedgerError> {
        self.commit(|batch| {
            AccessGate::new(batch).ensure_open(&[caller, owner])?;
            AccountLedger::new(batch).burn_from(caller, owner, amount)
        })
    }

    // -- minting -----------------------------------------------------------

    /// Mints as `caller`, which must be a configured minter.
    pub fn mint(&mut self, caller: Address, to: Address, amount: Amount) -> Result<(), LedgerError> {
        self.commit(|batch| {
            AccessGate::new(batch).ensure_open(&[caller, to])?;
            MinterRegistry::new(batch).mint(caller, to, amount)
        })
    }

    pub fn configure_minter(
        &mut self,
        caller: Address,
        minter: Address,
        quota: Amount,
    ) -> Result<(), LedgerError> {
        self.commit(|batch| {
            require_admin(batch, caller)?;
            MinterRegistry::new(batch).configure(minter, quota);
            Ok(())
        })
    }

    pub fn increase_minter_allowance(
        &mut self,
        caller: Address,
        minter: Address,
        delta: Amount,
    ) -> Result<(), LedgerError> {
        self.commit(|batch| {
            require_admin(batch, caller)?;
            MinterRegistry::new(batch).increase(minter, delta)?;
            Ok(())
        })
    }

    pub fn decrease_minter_allowance(
        &mut self,
        caller: Address,
        minter: Address,
        delta: Amount,
    ) -> Result<(), LedgerError> {
        self.commit(|batch| {
            require_admin(batch, caller)?;
            MinterRegistry::new(batch).decrease(minter, delta)?;
            Ok(())
        })
    }

    pub fn remove_minter(&mut self, caller: Address, minter: Address) -> Result<(), LedgerError> {
        self.commit(|batch| {
            require_admin(batch, caller)?;
            MinterRegistry::new(batch).remove(minter)
        })
    }

    // -- administration ----------------------------------------------------

    pub fn set_paused(&mut self, caller: Address, paused: bool) -> Result<(), LedgerError> {
        self.commit(|batch| {
            require_admin(batch, caller)?;
            AccessGate::new(batch).set_paused(paused);
            Ok(())
        })?;
        info!(paused, "pause flag changed");
        Ok(())
    }

    pub fn set_denied(&mut self, caller: Address, account: Address, denied: bool) -> Result<(), LedgerError> {
        self.commit(|batch| {
            require_admin(batch, caller)?;
            AccessGate::new(batch).set_denied(account, denied);
            Ok(())
        })?;
        info!(account = %account, denied, "deny-list changed");
        Ok(())
    }

    pub fn transfer_admin(&mut self, caller: Address, new_admin: Address) -> Result<(), LedgerError> {
        self.commit(|batch| {
            require_admin(batch, caller)?;
            batch.set_admin(new_admin);
            batch.emit(LedgerEvent::AdminChanged {
                previous: caller,
                new: new_admin,
            });
            Ok(())
        })?;
        info!(new_admin = %new_admin, "administration transferred");
        Ok(())
    }

    /// Activates a newer behavior version. Existing tables are untouched.
    pub fn upgrade(&mut self, caller: Address, activation: Activation) -> Result<(), LedgerError> {
        self.commit(|batch| {
            require_admin(batch, caller)?;
            upgrade::activate(batch, &activation)
        })
    }

    // -- views -------------------------------------------------------------

    /// Where the ledger is deployed. Forward requests name this as `to`.
    pub fn address(&self) -> Address {
        self.address
    }

    pub fn name(&self) -> &str {
        &self.storage.name
    }

    pub fn symbol(&self) -> &str {
        &self.storage.symbol
    }

    /// Always 18.
    pub fn decimals(&self) -> u8 {
        DECIMALS
    }

    pub fn admin(&self) -> Address {
        self.storage.admin
    }

    /// The only forwarder whose relayed calls are accepted.
    pub fn trusted_forwarder(&self) -> Address {
        self.storage.trusted_forwarder
    }

    pub fn is_trusted_forwarder(&self, forwarder: &Address) -> bool {
        self.storage.trusted_forwarder == *forwarder
    }

    /// Receiver of forwarded-transfer fees; `None` until version 2 runs.
    pub fn fee_recipient(&self) -> Option<Address> {
        self.storage.fee_recipient
    }

    pub fn balance_of(&self, account: &Address) -> Amount {
        self.storage.balance_of(account)
    }

    pub fn allowance(&self, owner: &Address, spender: &Address) -> Amount {
        self.storage.allowance(owner, spender)
    }

    /// Remaining quota; zero for a minter that is not configured.
    pub fn minter_allowance(&self, minter: &Address) -> Amount {
        self.storage.minter_quota(minter).unwrap_or_default()
    }

    /// True for configured minters, even with a zero quota.
    pub fn is_minter(&self, account: &Address) -> bool {
        self.storage.minter_quota(account).is_some()
    }

    pub fn is_denied(&self, account: &Address) -> bool {
        self.storage.is_denied(account)
    }

    pub fn is_paused(&self) -> bool {
        self.storage.is_paused()
    }

    /// Minted minus burned. `None` only if the burn counter has overtaken
    /// the mint counter, which no sequence of calls can produce.
    pub fn total_supply(&self) -> Option<Amount> {
        self.storage
            .total_minted()
            .checked_sub(self.storage.total_burned())
    }

    pub fn total_minted(&self) -> Amount {
        self.storage.total_minted()
    }

    pub fn total_burned(&self) -> Amount {
        self.storage.total_burned()
    }

    /// Active behavior version; `None` only for storage never deployed.
    pub fn version(&self) -> Option<BehaviorVersion> {
        BehaviorVersion::from_number(self.storage.behavior_version)
    }

    pub fn storage(&self) -> &LedgerStorage {
        &self.storage
    }

    /// Events committed since the last drain, oldest first.
    pub fn events(&self) -> &[LedgerEvent] {
        &self.events
    }

    pub fn drain_events(&mut self) -> Vec<LedgerEvent> {
        std::mem::take(&mut self.events)
    }
}

impl ForwardTarget for Token {
    type Error = LedgerError;

    fn address(&self) -> Address {
        self.address
    }

    fn forwarded_call(
        &mut self,
        forwarder: Address,
        sender: Address,
        data: &[u8],
    ) -> Result<Vec<u8>, LedgerError> {
        if !self.is_trusted_forwarder(&forwarder) {
            warn!(forwarder = %forwarder, "call from untrusted forwarder");
            return Err(LedgerError::UntrustedForwarder { forwarder });
        }
        let call = LedgerCall::decode(data)?;
        self.call(sender, call)?;
        Ok(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn amt(s: &str) -> Amount {
        Amount::parse_decimal(s).unwrap()
    }

    const ADMIN: Address = Address::repeat_byte(0xad);
    const FORWARDER: Address = Address::repeat_byte(0xf0);

    fn token() -> Token {
        let config = LedgerConfig::with_admin(ADMIN).without_initial_supply();
        Token::deploy(Address::repeat_byte(0x70), &config, FORWARDER).unwrap()
    }

    #[test]
    fn deploy_runs_version_one() {
        let config = LedgerConfig::with_admin(ADMIN);
        let t = Token::deploy(Address::repeat_byte(0x70), &config, FORWARDER).unwrap();
        assert_eq!(t.version(), Some(BehaviorVersion::V1));
        assert_eq!(t.balance_of(&ADMIN), config.initial_supply);
        assert_eq!(t.total_supply(), Some(config.initial_supply));
        assert_eq!(t.decimals(), 18);
        assert_eq!(t.name(), "ONEamericas");
        assert_eq!(t.symbol(), "ONEAM");
    }

    #[test]
    fn admin_calls_reject_others() {
        let mut t = token();
        let outsider = Address::repeat_byte(1);
        assert_eq!(
            t.set_paused(outsider, true),
            Err(LedgerError::Unauthorized { caller: outsider })
        );
        assert_eq!(
            t.configure_minter(outsider, outsider, amt("1")),
            Err(LedgerError::Unauthorized { caller: outsider })
        );
        assert!(!t.is_paused());
    }

    #[test]
    fn paused_ledger_still_accepts_unpause_and_approve() {
        let mut t = token();
        let a = Address::repeat_byte(1);
        t.set_paused(ADMIN, true).unwrap();
        assert_eq!(t.transfer(a, ADMIN, Amount::ZERO), Err(LedgerError::Paused));
        t.approve(a, ADMIN, amt("3")).unwrap();
        t.set_paused(ADMIN, false).unwrap();
        assert_eq!(t.allowance(&a, &ADMIN), amt("3"));
    }

    #[test]
    fn transfer_admin_moves_authority() {
        let mut t = token();
        let next = Address::repeat_byte(2);
        t.transfer_admin(ADMIN, next).unwrap();
        assert_eq!(t.admin(), next);
        assert!(t.set_paused(ADMIN, true).is_err());
        assert!(t.set_paused(next, true).is_ok());
    }

    #[test]
    fn remove_minter_unconfigures() {
        let mut t = token();
        let m = Address::repeat_byte(3);
        t.configure_minter(ADMIN, m, amt("5")).unwrap();
        assert!(t.is_minter(&m));
        t.remove_minter(ADMIN, m).unwrap();
        assert!(!t.is_minter(&m));
        assert_eq!(
            t.mint(m, m, amt("1")),
            Err(LedgerError::MinterNotConfigured { minter: m })
        );
    }

    #[test]
    fn transfer_from_spends_gross_allowance() {
        let mut t = token();
        let m = Address::repeat_byte(3);
        let owner = Address::repeat_byte(4);
        let spender = Address::repeat_byte(5);
        let to = Address::repeat_byte(6);
        t.configure_minter(ADMIN, m, amt("100")).unwrap();
        t.mint(m, owner, amt("10")).unwrap();
        t.approve(owner, spender, amt("10")).unwrap();

        t.transfer_from(spender, owner, to, amt("10")).unwrap();
        assert_eq!(t.allowance(&owner, &spender), Amount::ZERO);
        assert_eq!(t.balance_of(&to), amt("9.9"));
        assert!(matches!(
            t.transfer_from(spender, owner, to, amt("1")),
            Err(LedgerError::InsufficientAllowance { .. })
        ));
    }

    #[test]
    fn meta_transfer_needs_version_two() {
        let mut t = token();
        assert_eq!(
            t.meta_transfer(ADMIN, ADMIN, Amount::ZERO, Amount::ZERO),
            Err(LedgerError::UnsupportedOperation {
                operation: "metaTransfer",
                version: 1
            })
        );
    }

    #[test]
    fn call_enum_dispatches_and_round_trips_bincode() {
        let mut t = token();
        let call = LedgerCall::SetDenied {
            account: Address::repeat_byte(9),
            denied: true,
        };
        let decoded = LedgerCall::decode(&call.encode().unwrap()).unwrap();
        assert_eq!(decoded, call);
        t.call(ADMIN, decoded).unwrap();
        assert!(t.is_denied(&Address::repeat_byte(9)));
        assert!(matches!(
            LedgerCall::decode(&[0xff, 0xff, 0xff, 0xff]),
            Err(LedgerError::MalformedCall(_))
        ));
    }

    #[test]
    fn untrusted_forwarder_is_refused() {
        let mut t = token();
        let data = LedgerCall::SetPaused { paused: true }.encode().unwrap();
        let rogue = Address::repeat_byte(0xee);
        assert_eq!(
            t.forwarded_call(rogue, ADMIN, &data),
            Err(LedgerError::UntrustedForwarder { forwarder: rogue })
        );
        assert!(t.forwarded_call(FORWARDER, ADMIN, &data).is_ok());
        assert!(t.is_paused());
    }

    #[test]
    fn events_are_logged_and_drained() {
        let mut t = token();
        t.set_paused(ADMIN, true).unwrap();
        assert_eq!(
            t.events().last(),
            Some(&LedgerEvent::PausedChanged { paused: true })
        );
        let drained = t.drain_events();
        assert!(!drained.is_empty());
        assert!(t.events().is_empty());
    }
}
