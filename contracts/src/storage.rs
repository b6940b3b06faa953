//! # Ledger Storage
//!
//! [`LedgerStorage`] is the single region that holds every table of the
//! ledger. It survives behavior upgrades untouched; a newer version may only
//! append fields (marked `#[serde(default)]` so older snapshots still load).
//!
//! Calls never write to it directly. They run against a [`Batch`], an
//! overlay that reads through to the committed tables and buffers every
//! write, plus the events the call emits. On success the buffered
//! [`Changeset`] is applied in one step; on failure the batch is dropped and
//! nothing happened.
//!
//! Absent keys read as zero, except minter quotas: a minter with no entry is
//! "not configured", which is not the same as "configured with zero".

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use levy_protocol::crypto::blake3_hash;
use levy_protocol::{Address, Amount};

use crate::config::LedgerConfig;
use crate::events::LedgerEvent;

// ---------------------------------------------------------------------------
// LedgerStorage
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerStorage {
    // -- version 1 layout --
    pub(crate) name: String,
    pub(crate) symbol: String,
    pub(crate) admin: Address,
    pub(crate) sink: Address,
    pub(crate) treasury: Address,
    pub(crate) trusted_forwarder: Address,
    pub(crate) balances: BTreeMap<Address, Amount>,
    pub(crate) allowances: BTreeMap<Address, BTreeMap<Address, Amount>>,
    pub(crate) minter_quotas: BTreeMap<Address, Amount>,
    pub(crate) denied: BTreeSet<Address>,
    pub(crate) paused: bool,
    pub(crate) total_minted: Amount,
    pub(crate) total_burned: Amount,
    /// Active behavior version. Versions only move forward, so this is also
    /// the highest version whose setup has run. Zero before deployment.
    pub(crate) behavior_version: u32,

    // -- appended by version 2 --
    #[serde(default)]
    pub(crate) fee_recipient: Option<Address>,
}

impl LedgerStorage {
    /// Fresh, uninitialized storage. No behavior version is active until the
    /// first activation runs.
    pub fn new(config: &LedgerConfig, trusted_forwarder: Address) -> Self {
        Self {
            name: config.name.clone(),
            symbol: config.symbol.clone(),
            admin: config.admin,
            sink: config.sink,
            treasury: config.treasury,
            trusted_forwarder,
            balances: BTreeMap::new(),
            allowances: BTreeMap::new(),
            minter_quotas: BTreeMap::new(),
            denied: BTreeSet::new(),
            paused: false,
            total_minted: Amount::ZERO,
            total_burned: Amount::ZERO,
            behavior_version: 0,
            fee_recipient: None,
        }
    }

    /// Zero for accounts that never held anything.
    pub fn balance_of(&self, account: &Address) -> Amount {
        self.balances.get(account).copied().unwrap_or_default()
    }

    /// What `spender` may still move out of `owner`'s balance.
    pub fn allowance(&self, owner: &Address, spender: &Address) -> Amount {
        self.allowances
            .get(owner)
            .and_then(|row| row.get(spender))
            .copied()
            .unwrap_or_default()
    }

    /// `None` means the minter was never configured (or was removed).
    pub fn minter_quota(&self, minter: &Address) -> Option<Amount> {
        self.minter_quotas.get(minter).copied()
    }

    pub fn is_denied(&self, account: &Address) -> bool {
        self.denied.contains(account)
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Cumulative amount ever minted, including the initial supply.
    pub fn total_minted(&self) -> Amount {
        self.total_minted
    }

    /// Cumulative amount destroyed by `burn` and `burn_from`. Tax sent to
    /// the sink is not counted here; it stays in the sink's balance.
    pub fn total_burned(&self) -> Amount {
        self.total_burned
    }

    /// Sum of every balance, or `None` if it does not fit in an `Amount`.
    pub fn sum_of_balances(&self) -> Option<Amount> {
        self.balances
            .values()
            .try_fold(Amount::ZERO, |acc, b| acc.checked_add(*b))
    }

    /// BLAKE3 digest of the canonical JSON encoding. Two storages with equal
    /// fingerprints hold identical tables.
    pub fn fingerprint(&self) -> Result<[u8; 32], serde_json::Error> {
        Ok(blake3_hash(&serde_json::to_vec(self)?))
    }

    /// Applies a committed changeset and hands back its events.
    pub(crate) fn apply(&mut self, changes: Changeset) -> Vec<LedgerEvent> {
        for (account, amount) in changes.balances {
            self.balances.insert(account, amount);
        }
        for ((owner, spender), amount) in changes.allowances {
            self.allowances
                .entry(owner)
                .or_default()
                .insert(spender, amount);
        }
        for (minter, quota) in changes.quotas {
            match quota {
                Some(q) => {
                    self.minter_quotas.insert(minter, q);
                }
                None => {
                    self.minter_quotas.remove(&minter);
                }
            }
        }
        for (account, denied) in changes.denied {
            if denied {
                self.denied.insert(account);
            } else {
                self.denied.remove(&account);
            }
        }
        if let Some(paused) = changes.paused {
            self.paused = paused;
        }
        if let Some(minted) = changes.total_minted {
            self.total_minted = minted;
        }
        if let Some(burned) = changes.total_burned {
            self.total_burned = burned;
        }
        if let Some(admin) = changes.admin {
            self.admin = admin;
        }
        if let Some(recipient) = changes.fee_recipient {
            self.fee_recipient = Some(recipient);
        }
        if let Some(version) = changes.behavior_version {
            self.behavior_version = version;
        }
        changes.events
    }
}

// ---------------------------------------------------------------------------
// Changeset
// ---------------------------------------------------------------------------

/// Buffered writes of one call.
#[derive(Debug, Default)]
pub struct Changeset {
    balances: BTreeMap<Address, Amount>,
    allowances: BTreeMap<(Address, Address), Amount>,
    quotas: BTreeMap<Address, Option<Amount>>,
    denied: BTreeMap<Address, bool>,
    paused: Option<bool>,
    total_minted: Option<Amount>,
    total_burned: Option<Amount>,
    admin: Option<Address>,
    fee_recipient: Option<Address>,
    behavior_version: Option<u32>,
    events: Vec<LedgerEvent>,
}

#[cfg(test)]
impl Changeset {
    pub(crate) fn events(&self) -> &[LedgerEvent] {
        &self.events
    }
}

// ---------------------------------------------------------------------------
// Batch
// ---------------------------------------------------------------------------

/// Read-through overlay over committed storage.
pub struct Batch<'s> {
    base: &'s LedgerStorage,
    changes: Changeset,
}

impl<'s> Batch<'s> {
    pub fn new(base: &'s LedgerStorage) -> Self {
        Self {
            base,
            changes: Changeset::default(),
        }
    }

    /// The committed storage underneath this batch.
    pub fn base(&self) -> &'s LedgerStorage {
        self.base
    }

    pub fn into_changes(self) -> Changeset {
        self.changes
    }

    pub fn balance(&self, account: &Address) -> Amount {
        self.changes
            .balances
            .get(account)
            .copied()
            .unwrap_or_else(|| self.base.balance_of(account))
    }

    pub fn set_balance(&mut self, account: Address, amount: Amount) {
        self.changes.balances.insert(account, amount);
    }

    pub fn allowance(&self, owner: &Address, spender: &Address) -> Amount {
        self.changes
            .allowances
            .get(&(*owner, *spender))
            .copied()
            .unwrap_or_else(|| self.base.allowance(owner, spender))
    }

    pub fn set_allowance(&mut self, owner: Address, spender: Address, amount: Amount) {
        self.changes.allowances.insert((owner, spender), amount);
    }

    pub fn minter_quota(&self, minter: &Address) -> Option<Amount> {
        match self.changes.quotas.get(minter) {
            Some(pending) => *pending,
            None => self.base.minter_quota(minter),
        }
    }

    pub fn set_minter_quota(&mut self, minter: Address, quota: Option<Amount>) {
        self.changes.quotas.insert(minter, quota);
    }

    pub fn is_denied(&self, account: &Address) -> bool {
        self.changes
            .denied
            .get(account)
            .copied()
            .unwrap_or_else(|| self.base.is_denied(account))
    }

    pub fn set_denied(&mut self, account: Address, denied: bool) {
        self.changes.denied.insert(account, denied);
    }

    pub fn is_paused(&self) -> bool {
        self.changes.paused.unwrap_or(self.base.paused)
    }

    pub fn set_paused(&mut self, paused: bool) {
        self.changes.paused = Some(paused);
    }

    pub fn total_minted(&self) -> Amount {
        self.changes.total_minted.unwrap_or(self.base.total_minted)
    }

    pub fn set_total_minted(&mut self, amount: Amount) {
        self.changes.total_minted = Some(amount);
    }

    pub fn total_burned(&self) -> Amount {
        self.changes.total_burned.unwrap_or(self.base.total_burned)
    }

    pub fn set_total_burned(&mut self, amount: Amount) {
        self.changes.total_burned = Some(amount);
    }

    pub fn admin(&self) -> Address {
        self.changes.admin.unwrap_or(self.base.admin)
    }

    pub fn set_admin(&mut self, admin: Address) {
        self.changes.admin = Some(admin);
    }

    pub fn fee_recipient(&self) -> Option<Address> {
        self.changes.fee_recipient.or(self.base.fee_recipient)
    }

    pub fn set_fee_recipient(&mut self, recipient: Address) {
        self.changes.fee_recipient = Some(recipient);
    }

    pub fn behavior_version(&self) -> u32 {
        self.changes
            .behavior_version
            .unwrap_or(self.base.behavior_version)
    }

    pub fn set_behavior_version(&mut self, version: u32) {
        self.changes.behavior_version = Some(version);
    }

    pub fn emit(&mut self, event: LedgerEvent) {
        self.changes.events.push(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn storage() -> LedgerStorage {
        LedgerStorage::new(&LedgerConfig::default(), Address::repeat_byte(0xf0))
    }

    #[test]
    fn absent_entries_read_as_zero() {
        let s = storage();
        let a = Address::repeat_byte(1);
        assert_eq!(s.balance_of(&a), Amount::ZERO);
        assert_eq!(s.allowance(&a, &a), Amount::ZERO);
        assert_eq!(s.minter_quota(&a), None);
        assert!(!s.is_denied(&a));
    }

    #[test]
    fn batch_reads_through_and_buffers() {
        let mut s = storage();
        let a = Address::repeat_byte(1);
        s.balances.insert(a, Amount::from_base_units(5));

        let changes = {
            let mut batch = Batch::new(&s);
            assert_eq!(batch.balance(&a), Amount::from_base_units(5));
            batch.set_balance(a, Amount::from_base_units(9));
            assert_eq!(batch.balance(&a), Amount::from_base_units(9));
            assert_eq!(batch.base().balance_of(&a), Amount::from_base_units(5));
            batch.into_changes()
        };
        assert_eq!(s.balance_of(&a), Amount::from_base_units(5));
        s.apply(changes);
        assert_eq!(s.balance_of(&a), Amount::from_base_units(9));
    }

    #[test]
    fn dropped_batch_changes_nothing() {
        let s = storage();
        let before = s.fingerprint().unwrap();
        {
            let mut batch = Batch::new(&s);
            batch.set_paused(true);
            batch.set_denied(Address::repeat_byte(3), true);
            batch.set_minter_quota(Address::repeat_byte(4), Some(Amount::from_base_units(1)));
        }
        assert_eq!(s.fingerprint().unwrap(), before);
    }

    #[test]
    fn removing_a_quota_deletes_the_entry() {
        let mut s = storage();
        let m = Address::repeat_byte(7);
        s.minter_quotas.insert(m, Amount::ZERO);

        let mut batch = Batch::new(&s);
        assert_eq!(batch.minter_quota(&m), Some(Amount::ZERO));
        batch.set_minter_quota(m, None);
        assert_eq!(batch.minter_quota(&m), None);
        let changes = batch.into_changes();
        s.apply(changes);
        assert_eq!(s.minter_quota(&m), None);
    }

    #[test]
    fn snapshot_without_appended_fields_loads() {
        let s = storage();
        let mut value = serde_json::to_value(&s).unwrap();
        value.as_object_mut().unwrap().remove("fee_recipient");
        let back: LedgerStorage = serde_json::from_value(value).unwrap();
        assert_eq!(back, s);
    }
}
