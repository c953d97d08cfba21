// Copyright (c) 2026 Barter Labs. MIT License.
// See LICENSE for details.

//! # BARTER Escrow — Trustless Bilateral Swaps
//!
//! The protocol logic of BARTER: two counterparties swap ownership of two
//! fungible assets with no intermediary and no trust. A maker locks an
//! offer of asset A into a protocol-controlled vault; any taker who pays
//! the asked amount of asset B receives the vault contents in the same
//! atomic transition; the maker can withdraw the offer at any time before
//! that.
//!
//! One escrow is exactly one bilateral, all-or-nothing trade offer. There
//! is no order book, no matching, no partial fill — those live in whatever
//! sits on top.
//!
//! - [`state`] — the escrow record: a fixed-offset binary layout whose
//!   byte positions double as the discovery index.
//! - [`engine`] — the [`SwapEngine`](engine::SwapEngine) state machine:
//!   Make, Take, Refund, each one atomic transition on the ledger.
//! - [`indexer`] — discovery: scan the account space for open offers
//!   matching an asset pair, no prior knowledge of addresses required.
//! - [`error`] — the protocol error taxonomy.
//!
//! Wallets, signature collection, confirmation, and retries are client
//! concerns; the engine receives authenticated caller addresses and full
//! account sets, and revalidates every derived address it is handed.

pub mod engine;
pub mod error;
pub mod indexer;
pub mod state;

pub use engine::{MakeAccounts, RefundAccounts, SwapEngine, TakeAccounts, TakeReceipt};
pub use error::EscrowError;
pub use indexer::EscrowIndexer;
pub use state::EscrowRecord;
