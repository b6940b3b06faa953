//! Observable ledger events.
//!
//! Each committed call appends its events, in emission order, to the token's
//! log. Observers read or drain the log; the ledger never consumes it.

use levy_protocol::{Address, Amount};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum LedgerEvent {
    Transfer {
        from: Address,
        to: Address,
        amount: Amount,
    },
    Mint {
        minter: Address,
        to: Address,
        amount: Amount,
    },
    Burn {
        from: Address,
        amount: Amount,
    },
    Approval {
        owner: Address,
        spender: Address,
        amount: Amount,
    },
    DeniedChanged {
        account: Address,
        denied: bool,
    },
    PausedChanged {
        paused: bool,
    },
    MinterConfigured {
        minter: Address,
        quota: Amount,
    },
    MinterRemoved {
        minter: Address,
    },
    AdminChanged {
        previous: Address,
        new: Address,
    },
    Upgraded {
        version: u32,
    },
}

impl LedgerEvent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Transfer { .. } => "transfer",
            Self::Mint { .. } => "mint",
            Self::Burn { .. } => "burn",
            Self::Approval { .. } => "approval",
            Self::DeniedChanged { .. } => "deniedChanged",
            Self::PausedChanged { .. } => "pausedChanged",
            Self::MinterConfigured { .. } => "minterConfigured",
            Self::MinterRemoved { .. } => "minterRemoved",
            Self::AdminChanged { .. } => "adminChanged",
            Self::Upgraded { .. } => "upgraded",
        }
    }
}

impl fmt::Display for LedgerEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transfer { from, to, amount } => {
                write!(f, "transfer({}, {}, {})", from.short(), to.short(), amount)
            }
            Self::Mint { minter, to, amount } => {
                write!(f, "mint({} -> {}, {})", minter.short(), to.short(), amount)
            }
            Self::Burn { from, amount } => write!(f, "burn({}, {})", from.short(), amount),
            Self::Approval {
                owner,
                spender,
                amount,
            } => write!(
                f,
                "approval({}, {}, {})",
                owner.short(),
                spender.short(),
                amount
            ),
            Self::DeniedChanged { account, denied } => {
                write!(f, "deniedChanged({}, {})", account.short(), denied)
            }
            Self::PausedChanged { paused } => write!(f, "pausedChanged({})", paused),
            Self::MinterConfigured { minter, quota } => {
                write!(f, "minterConfigured({}, {})", minter.short(), quota)
            }
            Self::MinterRemoved { minter } => write!(f, "minterRemoved({})", minter.short()),
            Self::AdminChanged { previous, new } => {
                write!(f, "adminChanged({}, {})", previous.short(), new.short())
            }
            Self::Upgraded { version } => write!(f, "upgraded({})", version),
        }
    }
}
