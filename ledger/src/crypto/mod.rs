//! # Cryptographic Primitives
//!
//! Hashing lives in [`hash`]; signing keys live in
//! [`crate::identity`]. Nothing in here holds state.

pub mod hash;

pub use hash::{blake3_hash, domain_separated_hash, domain_separated_hash_multi, sha256};
