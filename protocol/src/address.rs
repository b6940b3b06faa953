//! # Account Identifiers
//!
//! An [`Address`] is 32 opaque bytes. The ledger only ever compares them for
//! equality and orders them for deterministic storage. When an account is
//! controlled by a key, its address is the raw Ed25519 verifying key, which
//! lets the forwarder check a signature against `request.from` directly.

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::config::{SINK_ACCOUNT_BYTES, TREASURY_ACCOUNT_BYTES};
use crate::crypto::keys::LevyPublicKey;

/// Errors produced when parsing an [`Address`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressError {
    #[error("invalid address hex: {0}")]
    InvalidHex(String),

    #[error("invalid address length: expected 32 bytes, got {0}")]
    InvalidLength(usize),
}

/// A 32-byte account identifier.
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Address([u8; 32]);

impl Address {
    /// The all-zero identifier.
    pub const ZERO: Address = Address([0u8; 32]);

    /// The permanent-removal sink that receives half of every tax.
    pub const SINK: Address = Address(SINK_ACCOUNT_BYTES);

    /// The treasury that receives the other half of every tax.
    pub const TREASURY: Address = Address(TREASURY_ACCOUNT_BYTES);

    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// An address filled with a single repeated byte. Handy for fixtures and
    /// well-known accounts such as the treasury.
    pub const fn repeat_byte(byte: u8) -> Self {
        Self([byte; 32])
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Parses 64 hex characters, with or without a `0x` prefix.
    pub fn from_hex(input: &str) -> Result<Self, AddressError> {
        let stripped = input.strip_prefix("0x").unwrap_or(input);
        let bytes = hex::decode(stripped).map_err(|e| AddressError::InvalidHex(e.to_string()))?;
        if bytes.len() != 32 {
            return Err(AddressError::InvalidLength(bytes.len()));
        }
        let mut arr = [0u8; 32];
        arr.copy_from_slice(&bytes);
        Ok(Self(arr))
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// First eight hex characters, for log lines.
    pub fn short(&self) -> String {
        hex::encode(&self.0[..4])
    }
}

impl From<&LevyPublicKey> for Address {
    fn from(key: &LevyPublicKey) -> Self {
        Self(*key.as_bytes())
    }
}

impl From<LevyPublicKey> for Address {
    fn from(key: LevyPublicKey) -> Self {
        Self::from(&key)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", self.to_hex())
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address(0x{})", self.to_hex())
    }
}

impl FromStr for Address {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if serializer.is_human_readable() {
            serializer.serialize_str(&self.to_string())
        } else {
            serializer.serialize_bytes(&self.0)
        }
    }
}

struct AddressVisitor;

impl<'de> Visitor<'de> for AddressVisitor {
    type Value = Address;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a 32-byte address as hex or raw bytes")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Address, E> {
        Address::from_hex(v).map_err(E::custom)
    }

    fn visit_bytes<E: de::Error>(self, v: &[u8]) -> Result<Address, E> {
        if v.len() != 32 {
            return Err(E::custom(AddressError::InvalidLength(v.len())));
        }
        let mut arr = [0u8; 32];
        arr.copy_from_slice(v);
        Ok(Address(arr))
    }

    fn visit_byte_buf<E: de::Error>(self, v: Vec<u8>) -> Result<Address, E> {
        self.visit_bytes(&v)
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        if deserializer.is_human_readable() {
            deserializer.deserialize_str(AddressVisitor)
        } else {
            deserializer.deserialize_bytes(AddressVisitor)
        }
    }
}
