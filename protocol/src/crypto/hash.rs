//! # Hashing Utilities
//!
//! BLAKE3 is the only hash the ledger uses. Signed forward requests are
//! digested in `derive_key` mode with a context string from
//! [`config`](crate::config), so a digest computed for one purpose can never
//! be replayed as a digest for another.

/// Plain BLAKE3 digest.
pub fn blake3_hash(data: &[u8]) -> [u8; 32] {
    *blake3::hash(data).as_bytes()
}

/// Domain-separated digest using BLAKE3's `derive_key` mode.
///
/// The context string selects a distinct IV, so equal `data` under two
/// different contexts yields unrelated digests.
pub fn domain_separated_hash(context: &str, data: &[u8]) -> [u8; 32] {
    let mut hasher = blake3::Hasher::new_derive_key(context);
    hasher.update(data);
    *hasher.finalize().as_bytes()
}

/// [`domain_separated_hash`] over several slices as if they were
/// concatenated, without allocating the concatenation.
pub fn domain_separated_hash_parts(context: &str, parts: &[&[u8]]) -> [u8; 32] {
    let mut hasher = blake3::Hasher::new_derive_key(context);
    for part in parts {
        hasher.update(part);
    }
    *hasher.finalize().as_bytes()
}
