//! # Account Records — Fixed Binary Layouts
//!
//! Accounts in the store are raw byte records. The first 8 bytes of every
//! record are a framing discriminator that names the record kind and its
//! layout version; the rest is a fixed-offset binary body.
//!
//! Fixed offsets are a feature, not laziness: discovery works by equality-
//! matching byte ranges directly against stored records, so every field
//! position is part of the public contract. Layout changes bump the
//! version byte in the discriminator — old and new layouts never alias
//! because scans match the full 8 bytes.
//!
//! This module defines the [`Holding`] record (a custody balance for one
//! asset under one authority). The escrow record layout lives with the
//! protocol logic that owns it.

use std::fmt;
use thiserror::Error;

use crate::address::Address;
use crate::asset::AssetId;
use crate::config::DISCRIMINATOR_LENGTH;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors produced while decoding fixed-layout records.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LayoutError {
    /// The record has the wrong total length for its claimed layout.
    #[error("bad record length: expected {expected} bytes, got {got}")]
    BadLength {
        /// Expected record length.
        expected: usize,
        /// Actual record length.
        got: usize,
    },

    /// The record's discriminator does not match the expected kind.
    #[error("bad record discriminator: expected {expected:?}")]
    BadDiscriminator {
        /// The discriminator that was expected.
        expected: [u8; DISCRIMINATOR_LENGTH],
    },
}

// ---------------------------------------------------------------------------
// Holding
// ---------------------------------------------------------------------------

/// A custody account: the balance of one asset controlled by one authority.
///
/// Binary layout, all offsets fixed, amount little-endian:
///
/// ```text
/// offset  0   8        40          72       80
///         [disc][asset   ][authority ][amount]
/// ```
///
/// The authority is the only identity that can debit the holding. For a
/// wallet's own funds the authority is the wallet address; for an escrow
/// vault it is the escrow record's address — which no wallet controls, so
/// only the protocol logic (acting as the record) can move vault funds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Holding {
    /// The asset this balance is denominated in.
    pub asset: AssetId,
    /// The address authorized to debit this holding.
    pub authority: Address,
    /// Balance in smallest units.
    pub amount: u64,
}

impl Holding {
    /// Framing discriminator; trailing byte is the layout version.
    pub const DISCRIMINATOR: [u8; DISCRIMINATOR_LENGTH] = *b"BARTHLD\x01";

    /// Total serialized length.
    pub const LEN: usize = DISCRIMINATOR_LENGTH + 32 + 32 + 8;

    /// Byte offset of the asset field.
    pub const ASSET_OFFSET: usize = DISCRIMINATOR_LENGTH;
    /// Byte offset of the authority field.
    pub const AUTHORITY_OFFSET: usize = Self::ASSET_OFFSET + 32;
    /// Byte offset of the amount field.
    pub const AMOUNT_OFFSET: usize = Self::AUTHORITY_OFFSET + 32;

    /// Serialize into the fixed layout.
    pub fn to_bytes(&self) -> [u8; Self::LEN] {
        let mut out = [0u8; Self::LEN];
        out[..DISCRIMINATOR_LENGTH].copy_from_slice(&Self::DISCRIMINATOR);
        out[Self::ASSET_OFFSET..Self::AUTHORITY_OFFSET].copy_from_slice(self.asset.as_bytes());
        out[Self::AUTHORITY_OFFSET..Self::AMOUNT_OFFSET]
            .copy_from_slice(self.authority.as_bytes());
        out[Self::AMOUNT_OFFSET..].copy_from_slice(&self.amount.to_le_bytes());
        out
    }

    /// Deserialize from the fixed layout, validating length and
    /// discriminator.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, LayoutError> {
        if bytes.len() != Self::LEN {
            return Err(LayoutError::BadLength {
                expected: Self::LEN,
                got: bytes.len(),
            });
        }
        if bytes[..DISCRIMINATOR_LENGTH] != Self::DISCRIMINATOR {
            return Err(LayoutError::BadDiscriminator {
                expected: Self::DISCRIMINATOR,
            });
        }

        let mut asset = [0u8; 32];
        asset.copy_from_slice(&bytes[Self::ASSET_OFFSET..Self::AUTHORITY_OFFSET]);
        let mut authority = [0u8; 32];
        authority.copy_from_slice(&bytes[Self::AUTHORITY_OFFSET..Self::AMOUNT_OFFSET]);
        let mut amount = [0u8; 8];
        amount.copy_from_slice(&bytes[Self::AMOUNT_OFFSET..]);

        Ok(Self {
            asset: AssetId::from_bytes(asset),
            authority: Address::from_bytes(authority),
            amount: u64::from_le_bytes(amount),
        })
    }
}

impl fmt::Display for Holding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} units of {} held for {}",
            self.amount, self.asset, self.authority
        )
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
