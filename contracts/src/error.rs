//! Ledger error taxonomy.
//!
//! Every variant aborts the call that produced it with no state change. The
//! fields name the accounts and values that violated the rule so callers can
//! correct the input and retry.

use levy_protocol::{Address, Amount};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    /// A debit asked for more than the account holds.
    #[error("insufficient balance: {account} holds {balance}, requested {requested}")]
    InsufficientBalance {
        /// The account being debited.
        account: Address,
        /// Its balance at the time of the call.
        balance: Amount,
        /// The amount the call tried to take.
        requested: Amount,
    },

    /// A delegated debit asked for more than the spender was approved for.
    #[error(
        "insufficient allowance: {spender} may spend {allowance} of {owner}, requested {requested}"
    )]
    InsufficientAllowance {
        /// The account whose balance would be spent.
        owner: Address,
        /// The account spending it.
        spender: Address,
        /// What `spender` may still move out of `owner`.
        allowance: Amount,
        /// The amount the call tried to spend.
        requested: Amount,
    },

    /// The account has no minter entry. A minter configured with a zero
    /// quota does not raise this.
    #[error("minter not configured: {minter}")]
    MinterNotConfigured { minter: Address },

    /// A quota decrease larger than the remaining quota.
    #[error("minter allowance underflow: {minter} has {allowance}, decrease of {decrease}")]
    MinterAllowanceUnderflow {
        minter: Address,
        /// Remaining quota before the decrease.
        allowance: Amount,
        decrease: Amount,
    },

    /// A mint larger than the minter's remaining quota.
    #[error("mint exceeds allowance: {minter} may mint {allowance}, requested {requested}")]
    MintExceedsAllowance {
        minter: Address,
        /// Remaining quota at the time of the call.
        allowance: Amount,
        requested: Amount,
    },

    /// Balance-mutating calls are rejected while the pause flag is set.
    #[error("ledger is paused")]
    Paused,

    /// One of the call's participants is on the deny-list.
    #[error("account is deny-listed: {account}")]
    Denied {
        /// The first listed participant found.
        account: Address,
    },

    /// A balance or supply counter would exceed `Amount::MAX`.
    #[error("arithmetic overflow")]
    Overflow,

    /// An administrator-gated entry point was called by someone else.
    #[error("unauthorized: {caller} is not the administrator")]
    Unauthorized { caller: Address },

    /// The operation exists but the active behavior version does not offer it.
    #[error("{operation} is not available in behavior version {version}")]
    UnsupportedOperation {
        operation: &'static str,
        version: u32,
    },

    /// A relayed call arrived from a forwarder the ledger does not trust.
    #[error("untrusted forwarder: {forwarder}")]
    UntrustedForwarder { forwarder: Address },

    /// A relayed payload could not be decoded into a ledger call.
    #[error("malformed call data: {0}")]
    MalformedCall(String),

    /// Upgrades only move forward and each version initializes once.
    #[error("invalid upgrade: initialized up to version {initialized}, requested {requested}")]
    InvalidUpgrade { initialized: u32, requested: u32 },
}

impl LedgerError {
    /// Short machine-readable name of the error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InsufficientBalance { .. } => "InsufficientBalance",
            Self::InsufficientAllowance { .. } => "InsufficientAllowance",
            Self::MinterNotConfigured { .. } => "MinterNotConfigured",
            Self::MinterAllowanceUnderflow { .. } => "MinterAllowanceUnderflow",
            Self::MintExceedsAllowance { .. } => "MintExceedsAllowance",
            Self::Paused => "Paused",
            Self::Denied { .. } => "Denied",
            Self::Overflow => "Overflow",
            Self::Unauthorized { .. } => "Unauthorized",
            Self::UnsupportedOperation { .. } => "UnsupportedOperation",
            Self::UntrustedForwarder { .. } => "UntrustedForwarder",
            Self::MalformedCall(_) => "MalformedCall",
            Self::InvalidUpgrade { .. } => "InvalidUpgrade",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_carry_parameters() {
        let err = LedgerError::InsufficientBalance {
            account: Address::repeat_byte(1),
            balance: Amount::parse_decimal("1.5").unwrap(),
            requested: Amount::parse_decimal("2").unwrap(),
        };
        let msg = err.to_string();
        assert!(msg.contains("holds 1.5"));
        assert!(msg.contains("requested 2"));
        assert_eq!(err.kind(), "InsufficientBalance");
    }
}
