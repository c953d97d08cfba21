//! # Addresses & Deterministic Derivation
//!
//! Every account in the store is keyed by a 32-byte [`Address`]. Addresses
//! come from exactly two places:
//!
//! 1. **Identities** — `BLAKE3(public_key)` of a participant's Ed25519
//!    verifying key (see [`crate::identity`]).
//! 2. **Derivation** — [`derive_address`] hashes a namespace tag plus an
//!    ordered sequence of seed components. Anyone who knows the tag and
//!    the components can recompute the address; nobody registered
//!    anything anywhere.
//!
//! ```text
//! derive_address("barter/escrow-state", [maker, seed_le])
//!     -> BLAKE3_derive_key(tag)( len(maker) || maker || len(seed) || seed )
//!     -> 32-byte address -> barter1qw508d6qe...
//! ```
//!
//! Derivation is pure and total: well-formed inputs cannot fail, identical
//! inputs always agree, and distinct inputs disagree except with
//! negligible probability. The component framing (see
//! [`crate::crypto::hash::domain_separated_hash_multi`]) makes boundary
//! shifts between components visible to the hash.
//!
//! The human-facing encoding is Bech32 with the `barter` HRP, which gives
//! copy-paste error detection for free.

use bech32::{Bech32, Hrp};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::config::{ADDRESS_HRP, ADDRESS_LENGTH};
use crate::crypto::hash::domain_separated_hash_multi;
use crate::identity::PublicKey;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors that can occur while parsing an address.
#[derive(Debug, Error)]
pub enum AddressError {
    /// The Bech32 string could not be decoded (bad charset, bad checksum).
    #[error("bech32 decode error: {0}")]
    Bech32Decode(String),

    /// The decoded address carries an unexpected human-readable prefix.
    #[error("invalid HRP: expected '{expected}', got '{got}'")]
    InvalidHrp {
        /// The expected HRP.
        expected: String,
        /// The HRP that was actually found.
        got: String,
    },

    /// The decoded payload has an unexpected length.
    #[error("invalid address data length: expected {expected} bytes, got {got}")]
    InvalidDataLength {
        /// Expected number of bytes.
        expected: usize,
        /// Actual number of bytes.
        got: usize,
    },
}

// ---------------------------------------------------------------------------
// Address
// ---------------------------------------------------------------------------

/// A 32-byte account address.
///
/// `Copy` on purpose — addresses flow through every signature in the
/// protocol layer and should never force a clone or a lifetime.
///
/// # Examples
///
/// ```
/// use barter_ledger::address::{derive_address, Address};
///
/// let addr = derive_address("barter/example", &[b"component"]);
/// let encoded = addr.to_bech32();
/// assert!(encoded.starts_with("barter1"));
/// assert_eq!(Address::from_bech32(&encoded).unwrap(), addr);
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address([u8; ADDRESS_LENGTH]);

impl Address {
    /// Wrap raw 32-byte address material.
    pub fn from_bytes(bytes: [u8; ADDRESS_LENGTH]) -> Self {
        Self(bytes)
    }

    /// Borrow the raw 32 bytes.
    pub fn as_bytes(&self) -> &[u8; ADDRESS_LENGTH] {
        &self.0
    }

    /// Construct from a byte slice, validating the length.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, AddressError> {
        if bytes.len() != ADDRESS_LENGTH {
            return Err(AddressError::InvalidDataLength {
                expected: ADDRESS_LENGTH,
                got: bytes.len(),
            });
        }
        let mut arr = [0u8; ADDRESS_LENGTH];
        arr.copy_from_slice(bytes);
        Ok(Self(arr))
    }

    /// The identity address of an Ed25519 public key: `BLAKE3(key_bytes)`.
    ///
    /// Hashing (rather than using the key bytes directly) keeps addresses
    /// a uniform 32 bytes no matter what key scheme the future brings.
    pub fn from_public_key(pk: &PublicKey) -> Self {
        Self(crate::crypto::hash::blake3_hash(pk.as_bytes()))
    }

    /// Encode as a Bech32 string with the `barter` HRP.
    pub fn to_bech32(&self) -> String {
        let hrp = Hrp::parse(ADDRESS_HRP).expect("static HRP is valid");
        bech32::encode::<Bech32>(hrp, &self.0)
            .expect("encoding a 32-byte payload should never fail")
    }

    /// Parse a Bech32-encoded address, validating HRP, checksum, and
    /// payload length.
    pub fn from_bech32(s: &str) -> Result<Self, AddressError> {
        let (hrp, data) =
            bech32::decode(s).map_err(|e| AddressError::Bech32Decode(e.to_string()))?;

        let expected_hrp = Hrp::parse(ADDRESS_HRP).expect("static HRP is valid");
        if hrp != expected_hrp {
            return Err(AddressError::InvalidHrp {
                expected: ADDRESS_HRP.to_string(),
                got: hrp.to_string(),
            });
        }

        Self::from_slice(&data)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_bech32())
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self.to_bech32())
    }
}

impl Serialize for Address {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if serializer.is_human_readable() {
            serializer.serialize_str(&self.to_bech32())
        } else {
            serializer.serialize_bytes(&self.0)
        }
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        if deserializer.is_human_readable() {
            let s = String::deserialize(deserializer)?;
            Address::from_bech32(&s).map_err(serde::de::Error::custom)
        } else {
            let bytes = <Vec<u8>>::deserialize(deserializer)?;
            Address::from_slice(&bytes).map_err(serde::de::Error::custom)
        }
    }
}

// ---------------------------------------------------------------------------
// Derivation
// ---------------------------------------------------------------------------

/// Derive an address from a namespace tag and ordered seed components.
///
/// Deterministic, pure, no side effects: the same `(tag, components)`
/// always yields the same address, and differing inputs yield different
/// addresses with overwhelming probability. There is no failure mode —
/// derivation is total over well-formed inputs.
///
/// The tag goes through BLAKE3 `derive_key`, so addresses from different
/// namespaces (escrow records, holdings, registry entries) occupy
/// non-intersecting regions of the address space by construction.
pub fn derive_address(tag: &str, components: &[&[u8]]) -> Address {
    Address(domain_separated_hash_multi(tag, components))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
