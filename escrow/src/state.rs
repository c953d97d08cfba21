//! # Escrow Record — Layout & Addressing
//!
//! One [`EscrowRecord`] per open trade offer, stored at an address every
//! party can recompute. The serialized layout is wire format with fixed
//! offsets, little-endian numerics:
//!
//! ```text
//! offset  0    8      16       48        80        112            120
//!         [disc][seed  ][maker   ][mint_a   ][mint_b   ][receive_amount]
//! ```
//!
//! The `(mint_a, mint_b)` pair sits at offset 48 and spans 64 bytes —
//! that window *is* the discovery index: the indexer equality-matches it
//! directly against stored bytes, so these offsets must never drift
//! silently. Layout changes bump the discriminator's version byte.
//!
//! The deposited amount is deliberately not stored here; it is the
//! vault's balance, and duplicating it would invite the two copies to
//! disagree.

use serde::{Deserialize, Serialize};

use barter_ledger::account::LayoutError;
use barter_ledger::address::{derive_address, Address};
use barter_ledger::asset::AssetId;
use barter_ledger::config::{DISCRIMINATOR_LENGTH, ESCROW_STATE_TAG};
use barter_ledger::custody;

// ---------------------------------------------------------------------------
// Addressing
// ---------------------------------------------------------------------------

/// The escrow record address for `(maker, seed)`.
///
/// A pure function of its inputs: the maker picks a fresh 8-byte seed per
/// offer, and anyone who knows `(maker, seed)` can reproduce the address.
/// Reusing a seed collides with the maker's own earlier offer and Make
/// rejects it.
pub fn escrow_address(maker: &Address, seed: u64) -> Address {
    derive_address(ESCROW_STATE_TAG, &[maker.as_bytes(), &seed.to_le_bytes()])
}

/// The vault address for an escrow: the holding of `mint_a` whose
/// authority is the escrow record itself. Derived, never stored.
pub fn vault_address(mint_a: &AssetId, escrow: &Address) -> Address {
    custody::holding_address(mint_a, escrow)
}

// ---------------------------------------------------------------------------
// EscrowRecord
// ---------------------------------------------------------------------------

/// The persisted state of one trade offer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EscrowRecord {
    /// Maker-chosen nonce; with `maker`, fixes the record's address.
    pub seed: u64,
    /// The offer's creator; holds the right to refund.
    pub maker: Address,
    /// The asset the maker deposited (held in the vault).
    pub mint_a: AssetId,
    /// The asset the maker wants in return.
    pub mint_b: AssetId,
    /// Quantity of `mint_b` required to release the vault.
    pub receive_amount: u64,
}

impl EscrowRecord {
    /// Framing discriminator; trailing byte is the layout version.
    pub const DISCRIMINATOR: [u8; DISCRIMINATOR_LENGTH] = *b"BARTESC\x01";

    /// Total serialized length.
    pub const LEN: usize = DISCRIMINATOR_LENGTH + 8 + 32 + 32 + 32 + 8;

    /// Byte offset of the seed field.
    pub const SEED_OFFSET: usize = DISCRIMINATOR_LENGTH;
    /// Byte offset of the maker field.
    pub const MAKER_OFFSET: usize = Self::SEED_OFFSET + 8;
    /// Byte offset of the mint pair — the discovery filter window.
    pub const MINT_PAIR_OFFSET: usize = Self::MAKER_OFFSET + 32;
    /// Length of the mint pair window (two 32-byte asset IDs).
    pub const MINT_PAIR_LENGTH: usize = 64;
    /// Byte offset of the receive amount field.
    pub const RECEIVE_OFFSET: usize = Self::MINT_PAIR_OFFSET + Self::MINT_PAIR_LENGTH;

    /// The address this record must live at, recomputed from its content.
    pub fn address(&self) -> Address {
        escrow_address(&self.maker, self.seed)
    }

    /// The vault address for this record.
    pub fn vault_address(&self) -> Address {
        vault_address(&self.mint_a, &self.address())
    }

    /// Serialize into the fixed layout.
    pub fn to_bytes(&self) -> [u8; Self::LEN] {
        let mut out = [0u8; Self::LEN];
        out[..DISCRIMINATOR_LENGTH].copy_from_slice(&Self::DISCRIMINATOR);
        out[Self::SEED_OFFSET..Self::MAKER_OFFSET].copy_from_slice(&self.seed.to_le_bytes());
        out[Self::MAKER_OFFSET..Self::MINT_PAIR_OFFSET].copy_from_slice(self.maker.as_bytes());
        out[Self::MINT_PAIR_OFFSET..Self::MINT_PAIR_OFFSET + 32]
            .copy_from_slice(self.mint_a.as_bytes());
        out[Self::MINT_PAIR_OFFSET + 32..Self::RECEIVE_OFFSET]
            .copy_from_slice(self.mint_b.as_bytes());
        out[Self::RECEIVE_OFFSET..].copy_from_slice(&self.receive_amount.to_le_bytes());
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

        let mut seed = [0u8; 8];
        seed.copy_from_slice(&bytes[Self::SEED_OFFSET..Self::MAKER_OFFSET]);
        let mut maker = [0u8; 32];
        maker.copy_from_slice(&bytes[Self::MAKER_OFFSET..Self::MINT_PAIR_OFFSET]);
        let mut mint_a = [0u8; 32];
        mint_a.copy_from_slice(&bytes[Self::MINT_PAIR_OFFSET..Self::MINT_PAIR_OFFSET + 32]);
        let mut mint_b = [0u8; 32];
        mint_b.copy_from_slice(&bytes[Self::MINT_PAIR_OFFSET + 32..Self::RECEIVE_OFFSET]);
        let mut receive_amount = [0u8; 8];
        receive_amount.copy_from_slice(&bytes[Self::RECEIVE_OFFSET..]);

        Ok(Self {
            seed: u64::from_le_bytes(seed),
            maker: Address::from_bytes(maker),
            mint_a: AssetId::from_bytes(mint_a),
            mint_b: AssetId::from_bytes(mint_b),
            receive_amount: u64::from_le_bytes(receive_amount),
        })
    }

    /// The 64-byte filter window for a queried asset pair, as it would
    /// appear at [`MINT_PAIR_OFFSET`](Self::MINT_PAIR_OFFSET) in a
    /// matching record.
    pub fn mint_pair_window(mint_a: &AssetId, mint_b: &AssetId) -> [u8; Self::MINT_PAIR_LENGTH] {
        let mut window = [0u8; Self::MINT_PAIR_LENGTH];
        window[..32].copy_from_slice(mint_a.as_bytes());
        window[32..].copy_from_slice(mint_b.as_bytes());
        window
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
