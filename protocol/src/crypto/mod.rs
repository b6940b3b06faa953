//! # Cryptographic Primitives
//!
//! Thin, typed wrappers around audited crates:
//!
//! - **Ed25519** (`ed25519-dalek`) for signing forward requests.
//! - **BLAKE3** for request digests and domain separation.

pub mod hash;
pub mod keys;

pub use hash::{blake3_hash, domain_separated_hash, domain_separated_hash_parts};
pub use keys::{KeyError, LevyKeypair, LevyPublicKey, LevySignature};
