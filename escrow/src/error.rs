//! # Protocol Error Taxonomy
//!
//! Four classes, matching how callers should react:
//!
//! - **Precondition violations** ([`RecordExists`](EscrowError::RecordExists),
//!   [`RecordNotFound`](EscrowError::RecordNotFound)) — the transition's
//!   entry state does not hold. Not retriable without changing inputs;
//!   a closed record and a never-created one are indistinguishable because
//!   closing deletes the record outright.
//! - **Authorization failures** ([`UnauthorizedCaller`](EscrowError::UnauthorizedCaller)
//!   and insufficient-balance custody errors) — the caller lacks the role
//!   or the funds. Not retriable.
//! - **Address mismatches** ([`AddressMismatch`](EscrowError::AddressMismatch),
//!   [`AssetMismatch`](EscrowError::AssetMismatch),
//!   [`MalformedRecord`](EscrowError::MalformedRecord)) — a supplied
//!   account disagrees with the canonical derivation or shape. A buggy or
//!   malicious caller; fatal to the invocation, no partial effect.
//! - **Transport failures** ([`Store`](EscrowError::Store)) — the
//!   underlying read/write path failed. Scans are side-effect free, so
//!   callers may simply retry them.
//!
//! Every state-mutating path validates before staging a single write, so
//! any of these errors means the ledger is exactly as it was.

use thiserror::Error;

use barter_ledger::account::LayoutError;
use barter_ledger::address::Address;
use barter_ledger::asset::AssetId;
use barter_ledger::custody::CustodyError;
use barter_ledger::store::StoreError;

/// Errors produced by the swap engine and the indexer.
#[derive(Debug, Error)]
pub enum EscrowError {
    /// Make found an existing record at the derived address — the maker
    /// reused a seed.
    #[error("escrow record already exists at {0}")]
    RecordExists(Address),

    /// Take/Refund found no open record at the supplied address. Either
    /// it never existed or it was already closed; no tombstone remains
    /// to tell the difference.
    #[error("no open escrow record at {0}")]
    RecordNotFound(Address),

    /// The account at the supplied address is not shaped like an escrow
    /// record.
    #[error("account at {address} is not an escrow record: {source}")]
    MalformedRecord {
        /// The offending account address.
        address: Address,
        /// The layout error encountered.
        source: LayoutError,
    },

    /// The caller does not hold the role this transition requires.
    #[error("caller {caller} is not the {role} ({expected}) of this escrow")]
    UnauthorizedCaller {
        /// The role the transition requires.
        role: &'static str,
        /// The identity holding that role.
        expected: Address,
        /// The rejected caller.
        caller: Address,
    },

    /// A supplied account address does not match its canonical
    /// derivation.
    #[error("supplied {what} address {got} does not match derived {expected}")]
    AddressMismatch {
        /// Which account disagreed.
        what: &'static str,
        /// The address recomputed from the derivation formula.
        expected: Address,
        /// The address the caller supplied.
        got: Address,
    },

    /// A supplied asset identifier does not match the escrow's terms.
    #[error("supplied {what} {got} does not match escrow terms ({expected})")]
    AssetMismatch {
        /// Which asset disagreed.
        what: &'static str,
        /// The asset recorded in the escrow.
        expected: AssetId,
        /// The asset the caller supplied.
        got: AssetId,
    },

    /// A zero amount where the protocol requires a positive one.
    #[error("{what} must be nonzero")]
    InvalidAmount {
        /// Which amount was zero.
        what: &'static str,
    },

    /// An offer must trade two distinct assets.
    #[error("an escrow must trade two distinct assets, got {0} on both sides")]
    IdenticalAssets(AssetId),

    /// A custody operation failed (insufficient balance, overflow,
    /// missing holding).
    #[error(transparent)]
    Custody(#[from] CustodyError),

    /// The store's read/write path failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}
