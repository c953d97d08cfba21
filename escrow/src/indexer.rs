//! # Escrow Discovery
//!
//! A taker wants "any open offer of asset A priced in asset B" without
//! knowing a single record address in advance. There is no secondary
//! index to consult — the fixed record layout *is* the index: every
//! escrow record carries its `(mint_a, mint_b)` pair at byte offset 48,
//! so discovery is a scan of the account space with a 64-byte equality
//! match at that offset.
//!
//! The scan is read-only, lock-free, lazy, and restartable. Ordering is
//! whatever the store's key order happens to be — callers who care about
//! price use [`EscrowIndexer::best_quote`], which ranks client-side.
//! Backend read errors surface per item and the whole scan can simply be
//! rerun; it has no side effects to double-apply.

use serde::{Deserialize, Serialize};

use barter_ledger::address::Address;
use barter_ledger::asset::AssetId;
use barter_ledger::custody;
use barter_ledger::store::LedgerStore;

use crate::error::EscrowError;
use crate::state::EscrowRecord;

/// An open offer found by discovery, priced for comparison.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct Quote {
    /// Where the record lives.
    pub address: Address,
    /// The record itself.
    pub record: EscrowRecord,
    /// Current vault balance — what the taker would receive.
    pub deposit_amount: u64,
}

impl Quote {
    /// `true` if this quote asks less `mint_b` per unit of `mint_a` than
    /// `other` — a strictly better deal for the taker.
    ///
    /// Cross-multiplied in u128 so no ratio ever touches floating point.
    pub fn is_better_than(&self, other: &Quote) -> bool {
        let lhs = self.record.receive_amount as u128 * other.deposit_amount as u128;
        let rhs = other.record.receive_amount as u128 * self.deposit_amount as u128;
        lhs < rhs
    }
}

/// Read-only discovery over the ledger's account space.
pub struct EscrowIndexer<'a> {
    store: &'a LedgerStore,
}

impl<'a> EscrowIndexer<'a> {
    /// Create an indexer over a store.
    pub fn new(store: &'a LedgerStore) -> Self {
        Self { store }
    }

    /// Find every open escrow offering `mint_a` for `mint_b`.
    ///
    /// Lazy and restartable: records stream out as the scan visits them,
    /// in unspecified (store key) order. Accounts that are not shaped
    /// like escrow records — holdings, registry entries, anything with a
    /// different length or discriminator — are skipped, not errors.
    /// Backend failures surface as `Err` items.
    pub fn find_by_asset_pair(
        &self,
        mint_a: &AssetId,
        mint_b: &AssetId,
    ) -> impl Iterator<Item = Result<(Address, EscrowRecord), EscrowError>> + 'static {
        let window = EscrowRecord::mint_pair_window(mint_a, mint_b);

        self.store.iter_accounts().filter_map(move |item| {
            let (address, bytes) = match item {
                Ok(entry) => entry,
                Err(e) => return Some(Err(EscrowError::from(e))),
            };

            // Shape filter: exact length and discriminator.
            if bytes.len() != EscrowRecord::LEN
                || bytes[..EscrowRecord::DISCRIMINATOR.len()] != EscrowRecord::DISCRIMINATOR
            {
                return None;
            }

            // The filter proper: 64-byte equality at the pair offset.
            if bytes[EscrowRecord::MINT_PAIR_OFFSET
                ..EscrowRecord::MINT_PAIR_OFFSET + EscrowRecord::MINT_PAIR_LENGTH]
                != window
            {
                return None;
            }

            match EscrowRecord::from_bytes(&bytes) {
                Ok(record) => Some(Ok((address, record))),
                Err(source) => Some(Err(EscrowError::MalformedRecord { address, source })),
            }
        })
    }

    /// Collect all open offers for a pair together with their vault
    /// balances.
    pub fn quotes(
        &self,
        mint_a: &AssetId,
        mint_b: &AssetId,
    ) -> Result<Vec<Quote>, EscrowError> {
        let mut quotes = Vec::new();
        for item in self.find_by_asset_pair(mint_a, mint_b) {
            let (address, record) = item?;
            let vault = record.vault_address();
            let deposit_amount =
                custody::get_holding(self.store, &vault)?.map_or(0, |h| h.amount);
            quotes.push(Quote {
                address,
                record,
                deposit_amount,
            });
        }
        Ok(quotes)
    }

    /// The best open offer for a pair: the one asking the least `mint_b`
    /// per unit of `mint_a`. `None` if no offer is open.
    pub fn best_quote(
        &self,
        mint_a: &AssetId,
        mint_b: &AssetId,
    ) -> Result<Option<Quote>, EscrowError> {
        let mut best: Option<Quote> = None;
        for quote in self.quotes(mint_a, mint_b)? {
            match &best {
                Some(current) if !quote.is_better_than(current) => {}
                _ => best = Some(quote),
            }
        }
        Ok(best)
    }
}
