// Copyright (c) 2026 Levy Ledger Contributors. MIT License.
// See LICENSE for details.

//! # Levy Protocol: Core Primitives
//!
//! The shared vocabulary of the Levy ledger. Nothing in here knows about
//! balances or minters; it only knows how to count money exactly, how to
//! name an account, and how to prove that an account said something.
//!
//! ## Modules
//!
//! - **config**: Every constant the ledger depends on: decimals, tax rate,
//!   the fixed tax destinations, default metadata, forwarder domain strings.
//! - **amount**: `Amount`, an 18-decimal fixed-point integer. No floats.
//! - **address**: `Address`, the 32-byte opaque account identifier.
//! - **crypto**: Ed25519 keys and signatures, BLAKE3 hashing.
//!
//! ## Ground rules
//!
//! 1. Arithmetic on money is checked. Overflow is an error, never a wrap.
//! 2. Anything that crosses a process boundary is serde-serializable.
//! 3. Signed payloads are hashed with an explicit domain tag.

pub mod address;
pub mod amount;
pub mod config;
pub mod crypto;

pub use address::Address;
pub use amount::{Amount, AmountError};
