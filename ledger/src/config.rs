//! # Ledger Constants
//!
//! Every magic value the substrate depends on lives here. Derivation tags
//! and record discriminators are wire format: once records exist on disk,
//! changing any of these strands them. Treat edits as schema migrations,
//! not refactors.

// ---------------------------------------------------------------------------
// Addressing
// ---------------------------------------------------------------------------

/// Human-readable prefix for Bech32-encoded addresses.
/// Short enough to type, distinctive enough to never be mistaken for
/// another network's addresses.
pub const ADDRESS_HRP: &str = "barter";

/// Raw address length in bytes. Every account key in the store is exactly
/// this long.
pub const ADDRESS_LENGTH: usize = 32;

// ---------------------------------------------------------------------------
// Derivation Tags
// ---------------------------------------------------------------------------
//
// Each tag is a BLAKE3 `derive_key` context string. Two derivations with
// different tags can never collide, no matter what the seed components
// are — the domain separation is baked into the hash IV.

/// Tag for escrow record addresses, derived from `(maker, seed)`.
pub const ESCROW_STATE_TAG: &str = "barter/escrow-state";

/// Tag for holding (custody) account addresses, derived from
/// `(asset_id, authority)`. A vault is a holding whose authority is an
/// escrow record address — same tag, same formula.
pub const ASSET_CUSTODY_TAG: &str = "barter/asset-custody";

/// Tag for asset registry account addresses, derived from `(asset_id)`.
pub const ASSET_INFO_TAG: &str = "barter/asset-info";

/// Context string for content-addressing an asset from its canonical
/// properties `(name, symbol, decimals, issuer)`.
pub const ASSET_ID_CONTEXT: &str = "barter/asset-id";

// ---------------------------------------------------------------------------
// Record Framing
// ---------------------------------------------------------------------------

/// Length of the framing discriminator at the head of every record.
pub const DISCRIMINATOR_LENGTH: usize = 8;
