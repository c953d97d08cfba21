//! # Fungible Assets
//!
//! Every asset tradable on the ledger is identified by an [`AssetId`]: a
//! deterministic BLAKE3 digest of the asset's canonical properties (name,
//! symbol, decimals, issuer). The same properties always produce the same
//! ID, anywhere, with no registry coordination — the registry account
//! merely pins the metadata and tracks supply.
//!
//! [`AssetInfo`] is the registry record, persisted in the account store at
//! an address derived from the asset ID. Only the issuer named in the
//! record may create new supply (see [`crate::custody::issue`]).

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::address::{derive_address, Address};
use crate::config::{ASSET_ID_CONTEXT, ASSET_INFO_TAG, DISCRIMINATOR_LENGTH};
use crate::crypto::hash::domain_separated_hash_multi;

/// Framing discriminator for asset registry records.
///
/// Part of the on-disk format. The trailing byte is the layout version;
/// bump it when the record body changes shape.
pub const ASSET_DISCRIMINATOR: [u8; DISCRIMINATOR_LENGTH] = *b"BARTAST\x01";

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors that can occur while decoding asset records or identifiers.
#[derive(Debug, Error)]
pub enum AssetError {
    /// A hex-encoded asset ID failed to parse.
    #[error("invalid asset id hex: {0}")]
    InvalidHex(String),

    /// An asset ID had the wrong byte length.
    #[error("invalid asset id length: expected 32 bytes, got {0}")]
    InvalidLength(usize),

    /// A registry record did not carry the asset discriminator.
    #[error("record is not an asset registry entry")]
    BadDiscriminator,

    /// The registry record body failed to deserialize.
    #[error("malformed asset registry record: {0}")]
    MalformedRecord(String),
}

// ---------------------------------------------------------------------------
// AssetId
// ---------------------------------------------------------------------------

/// A unique, content-addressed identifier for a fungible asset.
///
/// Computed from the asset's canonical properties, so identical assets
/// deduplicate to one ID by construction. Displayed as hex.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AssetId([u8; 32]);

impl AssetId {
    /// Wrap a raw 32-byte identifier.
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Borrow the raw 32 bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Hex-encode the identifier.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse a hex-encoded identifier.
    pub fn from_hex(s: &str) -> Result<Self, AssetError> {
        let bytes = hex::decode(s).map_err(|e| AssetError::InvalidHex(e.to_string()))?;
        if bytes.len() != 32 {
            return Err(AssetError::InvalidLength(bytes.len()));
        }
        let mut arr = [0u8; 32];
        arr.copy_from_slice(&bytes);
        Ok(Self(arr))
    }

    /// Derive an asset ID from the canonical properties.
    ///
    /// Components are length-framed, so no combination of name/symbol
    /// suffixes and prefixes can alias another asset.
    pub fn derive(name: &str, symbol: &str, decimals: u8, issuer: &Address) -> Self {
        Self(domain_separated_hash_multi(
            ASSET_ID_CONTEXT,
            &[
                name.as_bytes(),
                symbol.as_bytes(),
                &[decimals],
                issuer.as_bytes(),
            ],
        ))
    }

    /// The address of this asset's registry account in the store.
    pub fn registry_address(&self) -> Address {
        derive_address(ASSET_INFO_TAG, &[&self.0])
    }
}

impl fmt::Debug for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AssetId({}…)", &self.to_hex()[..12])
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl std::str::FromStr for AssetId {
    type Err = AssetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

// ---------------------------------------------------------------------------
// AssetInfo
// ---------------------------------------------------------------------------

/// Registry metadata for one asset.
///
/// Persisted in the account store (discriminator + bincode body). The
/// `total_supply` field is bumped by issuance and is the only mutable
/// part of the record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetInfo {
    /// Content-addressed identifier derived from the fields below.
    pub id: AssetId,

    /// Human-readable asset name (e.g., "Barter Gold").
    pub name: String,

    /// Ticker symbol (e.g., "bGLD").
    pub symbol: String,

    /// Decimal places for display. The ledger itself never divides —
    /// amounts are always smallest units.
    pub decimals: u8,

    /// Identity authorized to issue new supply.
    pub issuer: Address,

    /// Current total supply in smallest units.
    pub total_supply: u64,
}

impl AssetInfo {
    /// Create a new asset description with a derived ID and zero supply.
    pub fn new(name: &str, symbol: &str, decimals: u8, issuer: Address) -> Self {
        Self {
            id: AssetId::derive(name, symbol, decimals, &issuer),
            name: name.to_string(),
            symbol: symbol.to_string(),
            decimals,
            issuer,
            total_supply: 0,
        }
    }

    /// Serialize to a registry record: discriminator followed by the
    /// bincode-encoded body.
    pub fn to_record_bytes(&self) -> Vec<u8> {
        let body = bincode::serialize(self).expect("AssetInfo always serializes");
        let mut record = Vec::with_capacity(DISCRIMINATOR_LENGTH + body.len());
        record.extend_from_slice(&ASSET_DISCRIMINATOR);
        record.extend_from_slice(&body);
        record
    }

    /// Deserialize from a registry record, validating the discriminator.
    pub fn from_record_bytes(bytes: &[u8]) -> Result<Self, AssetError> {
        if bytes.len() < DISCRIMINATOR_LENGTH
            || bytes[..DISCRIMINATOR_LENGTH] != ASSET_DISCRIMINATOR
        {
            return Err(AssetError::BadDiscriminator);
        }
        bincode::deserialize(&bytes[DISCRIMINATOR_LENGTH..])
            .map_err(|e| AssetError::MalformedRecord(e.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
