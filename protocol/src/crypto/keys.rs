//! # Key Management
//!
//! Ed25519 keypairs for accounts that sign forward requests.
//!
//! An account controlled by a key is identified by the key's 32-byte
//! verifying key, so [`LevyPublicKey`] converts losslessly into an
//! [`Address`](crate::Address). Secret key bytes never appear in `Debug`
//! output or logs.

use ed25519_dalek::{
    Signature as DalekSignature, Signer, SigningKey, VerifyingKey, SECRET_KEY_LENGTH,
};
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Errors that can occur during key operations.
#[derive(Debug, Error)]
pub enum KeyError {
    #[error("invalid secret key bytes: expected 32 bytes of hex")]
    InvalidSecretKey,

    #[error("invalid public key bytes: not a valid Ed25519 point")]
    InvalidPublicKey,

    #[error("invalid signature bytes: expected 64 bytes")]
    InvalidSignature,
}

/// A signing identity.
///
/// Deliberately not `Serialize`: exporting a secret key is an explicit call
/// to [`secret_key_bytes`](Self::secret_key_bytes) or
/// [`secret_key_hex`](Self::secret_key_hex).
pub struct LevyKeypair {
    signing_key: SigningKey,
}

/// The public half of a [`LevyKeypair`].
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LevyPublicKey {
    #[serde(with = "hex::serde")]
    bytes: [u8; 32],
}

/// A 64-byte Ed25519 signature.
///
/// Held as a `Vec<u8>` so malformed input from the wire can be represented
/// and rejected at verification time instead of at parse time.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevySignature {
    #[serde(with = "hex::serde")]
    bytes: Vec<u8>,
}

// ---------------------------------------------------------------------------
// LevyKeypair
// ---------------------------------------------------------------------------

impl LevyKeypair {
    /// Generates a fresh keypair from the OS RNG.
    pub fn generate() -> Self {
        Self {
            signing_key: SigningKey::generate(&mut OsRng),
        }
    }

    /// Builds a keypair deterministically from a 32-byte seed.
    pub fn from_seed(seed: &[u8; SECRET_KEY_LENGTH]) -> Self {
        Self {
            signing_key: SigningKey::from_bytes(seed),
        }
    }

    /// Loads a keypair from a hex-encoded 32-byte secret.
    pub fn from_hex(hex_str: &str) -> Result<Self, KeyError> {
        let bytes = hex::decode(hex_str.trim()).map_err(|_| KeyError::InvalidSecretKey)?;
        let seed: [u8; SECRET_KEY_LENGTH] = bytes
            .as_slice()
            .try_into()
            .map_err(|_| KeyError::InvalidSecretKey)?;
        Ok(Self::from_seed(&seed))
    }

    pub fn public_key(&self) -> LevyPublicKey {
        LevyPublicKey {
            bytes: self.signing_key.verifying_key().to_bytes(),
        }
    }

    pub fn public_key_bytes(&self) -> [u8; 32] {
        self.signing_key.verifying_key().to_bytes()
    }

    /// Signs `message`. Ed25519 is deterministic: the same key and message
    /// always yield the same signature.
    pub fn sign(&self, message: &[u8]) -> LevySignature {
        LevySignature {
            bytes: self.signing_key.sign(message).to_bytes().to_vec(),
        }
    }

    pub fn verify(&self, message: &[u8], signature: &LevySignature) -> bool {
        self.public_key().verify(message, signature)
    }

    /// Exports the raw secret. Handle with care.
    pub fn secret_key_bytes(&self) -> [u8; 32] {
        self.signing_key.to_bytes()
    }

    pub fn secret_key_hex(&self) -> String {
        hex::encode(self.secret_key_bytes())
    }
}

impl Clone for LevyKeypair {
    fn clone(&self) -> Self {
        Self::from_seed(&self.signing_key.to_bytes())
    }
}

impl fmt::Debug for LevyKeypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LevyKeypair(pub={})", self.public_key().to_hex())
    }
}

// ---------------------------------------------------------------------------
// LevyPublicKey
// ---------------------------------------------------------------------------

impl LevyPublicKey {
    /// Wraps raw bytes, rejecting anything that is not a valid Ed25519 point.
    pub fn try_from_bytes(bytes: [u8; 32]) -> Result<Self, KeyError> {
        VerifyingKey::from_bytes(&bytes).map_err(|_| KeyError::InvalidPublicKey)?;
        Ok(Self { bytes })
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.bytes
    }

    /// Strict Ed25519 verification. Any failure, including an invalid key
    /// or a signature of the wrong length, is just `false`.
    pub fn verify(&self, message: &[u8], signature: &LevySignature) -> bool {
        let Ok(verifying_key) = VerifyingKey::from_bytes(&self.bytes) else {
            return false;
        };
        let Some(dalek_sig) = signature.to_dalek_signature() else {
            return false;
        };
        verifying_key.verify_strict(message, &dalek_sig).is_ok()
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.bytes)
    }
}

impl fmt::Display for LevyPublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl fmt::Debug for LevyPublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LevyPublicKey({})", &self.to_hex()[..16])
    }
}

// ---------------------------------------------------------------------------
// LevySignature
// ---------------------------------------------------------------------------

impl LevySignature {
    pub fn from_bytes(bytes: [u8; 64]) -> Self {
        Self {
            bytes: bytes.to_vec(),
        }
    }

    /// Accepts any byte string. Wrong lengths fail verification.
    pub fn from_slice(bytes: &[u8]) -> Self {
        Self {
            bytes: bytes.to_vec(),
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn to_dalek_signature(&self) -> Option<DalekSignature> {
        let arr: [u8; 64] = self.bytes.as_slice().try_into().ok()?;
        Some(DalekSignature::from_bytes(&arr))
    }

    pub fn to_hex(&self) -> String {
        hex::encode(&self.bytes)
    }

    pub fn from_hex(s: &str) -> Result<Self, KeyError> {
        let bytes = hex::decode(s.trim()).map_err(|_| KeyError::InvalidSignature)?;
        if bytes.len() != 64 {
            return Err(KeyError::InvalidSignature);
        }
        Ok(Self { bytes })
    }
}

impl fmt::Debug for LevySignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hex_str = self.to_hex();
        if hex_str.len() >= 128 {
            write!(f, "LevySignature({}...{})", &hex_str[..8], &hex_str[120..])
        } else {
            write!(f, "LevySignature({})", hex_str)
        }
    }
}
