//! # Ledger — Commit Discipline
//!
//! [`Ledger`] wraps the account store with the one concurrency rule the
//! protocol relies on: **conflicting writes are serialized**. Every state
//! transition runs as a validate-then-apply section under a single commit
//! lock, so two transitions racing for the same records are ordered, and
//! the loser sees the winner's effects during its own validation.
//!
//! Reads and scans never take the lock — they observe whatever consistent
//! view the store's read path provides, concurrent with any number of
//! transitions.
//!
//! ## Transition shape
//!
//! ```text
//! ledger.transact(|store| {
//!     // 1. read everything, check every precondition  (can fail, no effects)
//!     // 2. stage all puts/deletes into a WriteBatch   (pure)
//!     Ok((batch, output))
//! })                                                   // 3. applied atomically
//! ```
//!
//! A transition that returns `Err` from step 1 leaves the ledger
//! untouched; a batch that reaches step 3 applies in full or not at all.
//! Between the two there is no observable intermediate state.

use parking_lot::Mutex;
use std::path::Path;

use crate::store::{LedgerStore, StoreError, StoreResult, WriteBatch};

/// The ledger: an account store plus the global write order.
pub struct Ledger {
    store: LedgerStore,
    /// Serializes transitions. Held across validate + apply so a loser
    /// in a race revalidates against the winner's committed state.
    commit_lock: Mutex<()>,
}

impl Ledger {
    /// Wrap an existing store.
    pub fn new(store: LedgerStore) -> Self {
        Self {
            store,
            commit_lock: Mutex::new(()),
        }
    }

    /// Open or create a ledger at the given path.
    pub fn open<P: AsRef<Path>>(path: P) -> StoreResult<Self> {
        Ok(Self::new(LedgerStore::open(path)?))
    }

    /// Open a temporary ledger for tests and demo runs.
    pub fn open_temporary() -> StoreResult<Self> {
        Ok(Self::new(LedgerStore::open_temporary()?))
    }

    /// Direct read access to the store. Lock-free; use for queries and
    /// scans, never for multi-step mutation.
    pub fn store(&self) -> &LedgerStore {
        &self.store
    }

    /// Run one atomic transition.
    ///
    /// `f` reads and validates against the store, then returns the staged
    /// batch plus its output. The batch is applied while the commit lock
    /// is still held. If `f` fails, nothing is written.
    pub fn transact<T, E>(
        &self,
        f: impl FnOnce(&LedgerStore) -> Result<(WriteBatch, T), E>,
    ) -> Result<T, E>
    where
        E: From<StoreError>,
    {
        let _guard = self.commit_lock.lock();
        let (batch, output) = f(&self.store)?;
        self.store.apply(batch).map_err(E::from)?;
        Ok(output)
    }
}
