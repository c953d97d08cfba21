//! # Account Store
//!
//! The persistence layer of the ledger, built on sled's embedded
//! key-value store. One tree — `accounts` — keyed by raw 32-byte
//! addresses, with fixed-layout record bytes as values.
//!
//! ## Atomicity
//!
//! Mutations are staged into a [`WriteBatch`] and applied through
//! [`LedgerStore::apply`] as a single sled batch: either every put and
//! delete lands or none do. This is the ledger's atomic-transaction
//! guarantee — the protocol layer stages a whole state transition into
//! one batch and never mutates piecemeal.
//!
//! ## Scanning
//!
//! [`LedgerStore::iter_accounts`] walks the full account space lazily.
//! sled iterators read a consistent view and may be restarted at will;
//! I/O errors surface per-item so a caller can distinguish "no more
//! accounts" from "the read path failed".

use sled::Batch;
use std::path::Path;

use crate::address::Address;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors that can occur during store operations.
///
/// `Backend` is the transport-failure class: the underlying read/write
/// path failed, the operation did not logically complete, and callers may
/// retry wholesale.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The underlying sled engine reported an error.
    #[error("store backend error: {0}")]
    Backend(#[from] sled::Error),

    /// A stored key was not a valid 32-byte address. Indicates on-disk
    /// corruption or a foreign database.
    #[error("corrupt account key: {0} bytes, expected 32")]
    CorruptKey(usize),
}

/// Convenience alias for store results.
pub type StoreResult<T> = Result<T, StoreError>;

// ---------------------------------------------------------------------------
// WriteBatch
// ---------------------------------------------------------------------------

/// A staged set of account puts and deletes, applied atomically.
///
/// Staged writes are not visible to reads until applied — a transition
/// must do all of its reading and validation first, then stage, then
/// apply. Staging two writes to the same address leaves only the later
/// one; transitions are built so that never happens.
#[derive(Default)]
pub struct WriteBatch {
    inner: Batch,
    ops: usize,
}

impl WriteBatch {
    /// Create an empty batch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stage a put of `record` at `address`.
    pub fn put(&mut self, address: &Address, record: impl Into<Vec<u8>>) {
        self.inner.insert(address.as_bytes().as_slice(), record.into());
        self.ops += 1;
    }

    /// Stage a delete of the account at `address`.
    pub fn delete(&mut self, address: &Address) {
        self.inner.remove(address.as_bytes().as_slice());
        self.ops += 1;
    }

    /// Number of staged operations.
    pub fn len(&self) -> usize {
        self.ops
    }

    /// `true` if nothing has been staged.
    pub fn is_empty(&self) -> bool {
        self.ops == 0
    }
}

// ---------------------------------------------------------------------------
// LedgerStore
// ---------------------------------------------------------------------------

/// The sled-backed account store.
///
/// Cloneable and thread-safe: sled trees support concurrent reads and
/// serialized writes internally, so a `LedgerStore` can be shared freely.
/// Write *ordering* across whole transitions is the business of
/// [`crate::ledger::Ledger`], not this type.
#[derive(Debug, Clone)]
pub struct LedgerStore {
    /// The underlying sled database handle.
    db: sled::Db,
    /// All account records, keyed by raw address bytes.
    accounts: sled::Tree,
}

impl LedgerStore {
    /// Open or create a store at the given filesystem path.
    pub fn open<P: AsRef<Path>>(path: P) -> StoreResult<Self> {
        let db = sled::open(path)?;
        Self::from_db(db)
    }

    /// Create a temporary store that is cleaned up on drop.
    ///
    /// Ideal for tests and throwaway demo runs — no filesystem residue.
    pub fn open_temporary() -> StoreResult<Self> {
        let db = sled::Config::new().temporary(true).open()?;
        Self::from_db(db)
    }

    fn from_db(db: sled::Db) -> StoreResult<Self> {
        let accounts = db.open_tree("accounts")?;
        Ok(Self { db, accounts })
    }

    /// Fetch the raw record at `address`, or `None` if no account exists.
    pub fn get(&self, address: &Address) -> StoreResult<Option<Vec<u8>>> {
        Ok(self
            .accounts
            .get(address.as_bytes())?
            .map(|ivec| ivec.to_vec()))
    }

    /// `true` if an account exists at `address`.
    pub fn contains(&self, address: &Address) -> StoreResult<bool> {
        Ok(self.accounts.contains_key(address.as_bytes())?)
    }

    /// Apply a staged batch atomically.
    pub fn apply(&self, batch: WriteBatch) -> StoreResult<()> {
        self.accounts.apply_batch(batch.inner)?;
        Ok(())
    }

    /// Walk every account lazily in key order.
    ///
    /// The iterator is cheap to create and restartable — call again for a
    /// fresh scan. Backend errors surface per item.
    pub fn iter_accounts(
        &self,
    ) -> impl Iterator<Item = StoreResult<(Address, Vec<u8>)>> + 'static {
        self.accounts.iter().map(|item| {
            let (key, value) = item?;
            let address = Address::from_slice(&key)
                .map_err(|_| StoreError::CorruptKey(key.len()))?;
            Ok((address, value.to_vec()))
        })
    }

    /// Number of accounts currently in the store.
    pub fn account_count(&self) -> usize {
        self.accounts.len()
    }

    /// Flush buffered writes to durable storage.
    pub fn flush(&self) -> StoreResult<()> {
        self.db.flush()?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
