//! # Hashing Utilities
//!
//! Two hash functions, no more:
//!
//! - **BLAKE3** — the default for everything BARTER-internal: addresses,
//!   asset identifiers, record digests. Fast on every platform and immune
//!   to length-extension games.
//! - **SHA-256** — for digests that leave the system (run-report
//!   fingerprints, references external tooling may want to recompute).
//!   There is no security reason to prefer it, only compatibility.
//!
//! ## Domain separation
//!
//! All derivation goes through BLAKE3's `derive_key` mode with a context
//! string. Don't prepend tags to the input by hand — `derive_key` mixes
//! the context into the hash IV, so cross-context collisions are
//! impossible by construction rather than by convention.
//!
//! ## Component framing
//!
//! [`domain_separated_hash_multi`] length-prefixes each component before
//! absorbing it. Without framing, `("ab", "c")` and `("a", "bc")` would
//! hash identically — a classic boundary-ambiguity bug that turns into an
//! address collision here. Components may contain any bytes, including
//! zeros, so a separator byte is not an option.

use sha2::{Digest, Sha256};

/// Compute the BLAKE3 hash of the input data.
///
/// Returns a 32-byte digest. The workhorse for single-buffer hashing —
/// identity addresses are `blake3_hash(public_key)`.
pub fn blake3_hash(data: &[u8]) -> [u8; 32] {
    *blake3::hash(data).as_bytes()
}

/// Compute a domain-separated BLAKE3 hash of a single buffer.
///
/// `domain_separated_hash("tag-a", data)` and
/// `domain_separated_hash("tag-b", data)` never collide, even for equal
/// `data`.
pub fn domain_separated_hash(context: &str, data: &[u8]) -> [u8; 32] {
    let mut hasher = blake3::Hasher::new_derive_key(context);
    hasher.update(data);
    *hasher.finalize().as_bytes()
}

/// Compute a domain-separated BLAKE3 hash over a sequence of components.
///
/// Each component is absorbed as `len_le_u64 || bytes`, so shifting a
/// byte across a component boundary always changes the digest. This is
/// the primitive underneath every address derivation in the protocol.
pub fn domain_separated_hash_multi(context: &str, parts: &[&[u8]]) -> [u8; 32] {
    let mut hasher = blake3::Hasher::new_derive_key(context);
    for part in parts {
        hasher.update(&(part.len() as u64).to_le_bytes());
        hasher.update(part);
    }
    *hasher.finalize().as_bytes()
}

/// Compute the SHA-256 hash of the input data.
///
/// Returns a 32-byte digest. For BARTER-internal structures, prefer
/// [`blake3_hash`]; use this only where an external system expects
/// SHA-256.
pub fn sha256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    let digest = hasher.finalize();
    let mut output = [0u8; 32];
    output.copy_from_slice(&digest);
    output
}
