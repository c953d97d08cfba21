// Copyright (c) 2026 Barter Labs. MIT License.
// See LICENSE for details.

//! # BARTER Ledger — Account Substrate
//!
//! The ledger substrate underneath the BARTER swap protocol: an
//! account-based store in which every piece of state is an independently
//! addressable record with an authority and raw storage, and every write
//! lands through an atomic batch.
//!
//! This crate knows nothing about escrows. It provides the primitives the
//! protocol layer builds on:
//!
//! - **crypto** — BLAKE3/SHA-256 hashing and domain-separated derivation.
//! - **address** — 32-byte addresses, Bech32 encoding, deterministic
//!   derivation from a namespace tag and seed components.
//! - **identity** — Ed25519 keypairs for participants. Keys sign intents;
//!   addresses are BLAKE3 hashes of verifying keys.
//! - **asset** — content-addressed fungible asset identifiers and metadata.
//! - **account** — fixed-offset binary record layouts. Layouts are wire
//!   format: byte positions are load-bearing and versioned.
//! - **store** — the sled-backed account store. One tree, 32-byte keys,
//!   raw record values, atomic batches.
//! - **ledger** — the commit discipline: conflicting writes are serialized,
//!   each transition validates first and applies as one batch.
//! - **custody** — holding accounts (per asset, per authority balances),
//!   asset registration, and issuer-gated issuance.
//!
//! ## Design Philosophy
//!
//! 1. Every monetary operation is overflow-checked. Wrapping arithmetic
//!    and money do not mix.
//! 2. Record layouts are explicit byte schemas, not derive output — the
//!    discovery path filters on raw offsets and must never drift.
//! 3. A transition either fully applies or leaves no trace. There is no
//!    partially-applied state to observe, ever.

pub mod account;
pub mod address;
pub mod asset;
pub mod config;
pub mod crypto;
pub mod custody;
pub mod identity;
pub mod ledger;
pub mod store;

pub use address::Address;
pub use asset::{AssetId, AssetInfo};
pub use ledger::Ledger;
pub use store::{LedgerStore, StoreError, WriteBatch};
