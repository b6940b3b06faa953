//! # Upgrade Coordinator
//!
//! The ledger keeps one storage region for its whole life and a tag naming
//! the behavior version that runs against it. Upgrading swaps the tag and
//! runs the new version's one-time setup; it never reinitializes existing
//! tables.
//!
//! The tag doubles as the latch guarding each setup routine: an activation
//! must name a version strictly above the active one, so no setup runs twice
//! and versions never move backwards.
//!
//! | Version | Setup                                  | Adds                 |
//! |---------|----------------------------------------|----------------------|
//! | 1       | mint the initial supply to the admin   | base ledger          |
//! | 2       | record the forwarded-transfer fee sink | `metaTransfer` call  |

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::info;

use levy_protocol::config::LATEST_BEHAVIOR_VERSION;
use levy_protocol::{Address, Amount};

use crate::error::LedgerError;
use crate::events::LedgerEvent;
use crate::minter::mint_unchecked;
use crate::storage::Batch;

/// A behavior version this build can run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum BehaviorVersion {
    V1 = 1,
    V2 = 2,
}

impl BehaviorVersion {
    pub const LATEST: BehaviorVersion = BehaviorVersion::V2;

    pub fn number(self) -> u32 {
        self as u32
    }

    pub fn from_number(number: u32) -> Option<Self> {
        match number {
            1 => Some(Self::V1),
            2 => Some(Self::V2),
            _ => None,
        }
    }

    pub fn supports_meta_transfer(self) -> bool {
        self >= Self::V2
    }
}

impl fmt::Display for BehaviorVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.number())
    }
}

/// A version together with the parameters of its setup routine.
///
/// Externally tagged so it also travels inside bincode-encoded calls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Activation {
    V1 { initial_supply: Amount },
    V2 { fee_recipient: Address },
}

impl Activation {
    pub fn version(&self) -> BehaviorVersion {
        match self {
            Self::V1 { .. } => BehaviorVersion::V1,
            Self::V2 { .. } => BehaviorVersion::V2,
        }
    }
}

/// Runs `activation` against `batch` and makes its version the active one.
pub(crate) fn activate(batch: &mut Batch<'_>, activation: &Activation) -> Result<(), LedgerError> {
    let requested = activation.version().number();
    let initialized = batch.behavior_version();
    if requested <= initialized || requested > LATEST_BEHAVIOR_VERSION {
        return Err(LedgerError::InvalidUpgrade {
            initialized,
            requested,
        });
    }

    match activation {
        Activation::V1 { initial_supply } => {
            let admin = batch.admin();
            if !initial_supply.is_zero() {
                mint_unchecked(batch, admin, admin, *initial_supply)?;
            }
        }
        Activation::V2 { fee_recipient } => {
            batch.set_fee_recipient(*fee_recipient);
        }
    }

    batch.set_behavior_version(requested);
    batch.emit(LedgerEvent::Upgraded { version: requested });
    info!(
        from = batch.base().behavior_version,
        to = requested,
        "behavior version activated"
    );
    Ok(())
}

/// The active version, or `None` before the first activation.
pub(crate) fn active_version(batch: &Batch<'_>) -> Option<BehaviorVersion> {
    BehaviorVersion::from_number(batch.behavior_version())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LedgerConfig;
    use crate::storage::LedgerStorage;

    #[test]
    fn latch_only_moves_forward() {
        let admin = Address::repeat_byte(1);
        let mut s = LedgerStorage::new(&LedgerConfig::with_admin(admin), Address::ZERO);
        let supply = Amount::parse_decimal("100").unwrap();

        let changes = {
            let mut batch = Batch::new(&s);
            activate(&mut batch, &Activation::V1 { initial_supply: supply }).unwrap();
            assert_eq!(
                activate(&mut batch, &Activation::V1 { initial_supply: supply }),
                Err(LedgerError::InvalidUpgrade {
                    initialized: 1,
                    requested: 1
                })
            );
            batch.into_changes()
        };
        s.apply(changes);
        assert_eq!(s.balance_of(&admin), supply);
        assert_eq!(s.total_minted(), supply);

        let changes = {
            let mut batch = Batch::new(&s);
            activate(
                &mut batch,
                &Activation::V2 {
                    fee_recipient: Address::TREASURY,
                },
            )
            .unwrap();
            assert_eq!(active_version(&batch), Some(BehaviorVersion::V2));
            batch.into_changes()
        };
        s.apply(changes);
        assert_eq!(s.fee_recipient, Some(Address::TREASURY));
        assert_eq!(s.behavior_version, 2);
        // Supply untouched by the second setup.
        assert_eq!(s.balance_of(&admin), supply);
    }

    #[test]
    fn activation_json_names_the_version() {
        let json = serde_json::to_string(&Activation::V2 {
            fee_recipient: Address::TREASURY,
        })
        .unwrap();
        assert!(json.starts_with(r#"{"v2":{"fee_recipient":"0x2222"#));
        assert!(BehaviorVersion::V2.supports_meta_transfer());
        assert!(!BehaviorVersion::V1.supports_meta_transfer());
        assert_eq!(BehaviorVersion::from_number(3), None);
    }
}
