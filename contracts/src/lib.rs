//! # Levy Ledger Contracts
//!
//! The ledger state machine. A [`token::Token`] owns every table (balances,
//! allowances, minter quotas, deny-list, pause flag) and exposes the entry
//! points; a [`forwarder::Forwarder`] verifies signed requests and calls the
//! token on the signer's behalf.
//!
//! - **ledger**: balance and allowance primitives (`AccountLedger`).
//! - **tax**: the 1% transfer tax split between sink and treasury.
//! - **minter**: per-minter quotas and quota-consuming mints.
//! - **access**: pause flag and deny-list gate.
//! - **forwarder**: signed, replay-protected call relay.
//! - **upgrade**: behavior versions and their one-time setup routines.
//! - **deployment**: a forwarder plus the token that trusts it.
//!
//! ## Design Principles
//!
//! 1. Every call runs against a [`storage::Batch`] and commits only on
//!    success. A rejected call leaves storage untouched.
//! 2. Money arithmetic is checked everywhere; overflow is an error.
//! 3. Errors carry the values that violated the rule.
//! 4. Storage fields are append-only across behavior versions.

pub mod access;
pub mod config;
pub mod deployment;
pub mod error;
pub mod events;
pub mod forwarder;
pub mod ledger;
pub mod minter;
pub mod storage;
pub mod tax;
pub mod token;
pub mod upgrade;

pub use config::LedgerConfig;
pub use deployment::Deployment;
pub use error::LedgerError;
pub use events::LedgerEvent;
pub use forwarder::{ForwardRequest, Forwarder, ForwarderError, SignedForwardRequest};
pub use token::{LedgerCall, Token};
pub use upgrade::{Activation, BehaviorVersion};
