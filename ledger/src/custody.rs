//! # Custody — Holding Accounts & Asset Issuance
//!
//! A *holding* is the custody account for one `(asset, authority)` pair,
//! living at the derived address
//! `derive_address("barter/asset-custody", [asset_id, authority])`.
//! Whoever can act as `authority` can debit the holding; crediting is
//! permissionless and creates the holding on first use.
//!
//! The staging functions here (`stage_*`) do not write — they validate
//! against the store and push puts/deletes into a caller-owned
//! [`WriteBatch`]. The protocol layer composes several of them into one
//! atomic transition. Each staging call touches a distinct account;
//! composing two calls against the same holding in one batch is a caller
//! bug (the later write would silently win).
//!
//! Asset registration and issuance are complete transitions of their own
//! and run through [`Ledger::transact`] directly — they exist so a
//! funding bootstrap has somewhere to get funds from, and issuance is
//! gated to the registered issuer.

use thiserror::Error;
use tracing::debug;

use crate::account::{Holding, LayoutError};
use crate::address::{derive_address, Address};
use crate::asset::{AssetError, AssetId, AssetInfo};
use crate::config::ASSET_CUSTODY_TAG;
use crate::ledger::Ledger;
use crate::store::{LedgerStore, StoreError, WriteBatch};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors that can occur during custody operations.
#[derive(Debug, Error)]
pub enum CustodyError {
    /// Attempted to debit more than the holding contains.
    #[error("insufficient balance in holding {holding}: available {available}, requested {requested}")]
    InsufficientBalance {
        /// The holding being debited.
        holding: Address,
        /// Current balance.
        available: u64,
        /// Amount requested.
        requested: u64,
    },

    /// The holding to debit does not exist.
    #[error("holding {0} does not exist")]
    HoldingNotFound(Address),

    /// A credit would overflow the holding's balance.
    #[error("balance overflow in holding {holding}: current {current}, credit {credit}")]
    Overflow {
        /// The holding being credited.
        holding: Address,
        /// Balance before the failed credit.
        current: u64,
        /// Amount that caused the overflow.
        credit: u64,
    },

    /// The account at a holding address is not a holding record.
    #[error("account {address} is not a holding record: {source}")]
    MalformedHolding {
        /// The offending account address.
        address: Address,
        /// The layout error encountered.
        source: LayoutError,
    },

    /// The referenced asset has no registry entry.
    #[error("asset {0} is not registered")]
    AssetNotFound(AssetId),

    /// An asset with this identity is already registered.
    #[error("asset {0} is already registered")]
    AssetExists(AssetId),

    /// The registry record's ID does not match its content derivation.
    #[error("asset id {claimed} does not match its canonical derivation")]
    AssetIdMismatch {
        /// The ID claimed by the record.
        claimed: AssetId,
    },

    /// Someone other than the issuer attempted to issue supply.
    #[error("only the issuer may issue {asset}: issuer is {issuer}, caller was {caller}")]
    NotIssuer {
        /// The asset in question.
        asset: AssetId,
        /// The registered issuer.
        issuer: Address,
        /// The caller that was rejected.
        caller: Address,
    },

    /// Issuance would overflow the asset's total supply.
    #[error("supply overflow for asset {asset}: current {current}, issue {issue}")]
    SupplyOverflow {
        /// The asset in question.
        asset: AssetId,
        /// Supply before the failed issuance.
        current: u64,
        /// Amount that caused the overflow.
        issue: u64,
    },

    /// A registry record failed to decode.
    #[error("malformed asset registry record: {0}")]
    MalformedAsset(#[from] AssetError),

    /// The store's read/write path failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

// ---------------------------------------------------------------------------
// Holding addresses & reads
// ---------------------------------------------------------------------------

/// The derived address of the holding for `(asset, authority)`.
///
/// Reproducible by anyone who knows both inputs — this is how a taker
/// computes the maker's receiving holding, and how the vault address
/// falls out of `(mint_a, escrow_address)` with no extra formula.
pub fn holding_address(asset: &AssetId, authority: &Address) -> Address {
    derive_address(
        ASSET_CUSTODY_TAG,
        &[asset.as_bytes(), authority.as_bytes()],
    )
}

/// Load the holding at `address`, if any.
///
/// A present-but-malformed record is an error, not `None` — that address
/// is supposed to be ours.
pub fn get_holding(
    store: &LedgerStore,
    address: &Address,
) -> Result<Option<Holding>, CustodyError> {
    match store.get(address)? {
        None => Ok(None),
        Some(bytes) => Holding::from_bytes(&bytes)
            .map(Some)
            .map_err(|source| CustodyError::MalformedHolding {
                address: *address,
                source,
            }),
    }
}

/// The balance of `authority`'s holding for `asset`; zero if the holding
/// has never been created.
pub fn balance(
    store: &LedgerStore,
    asset: &AssetId,
    authority: &Address,
) -> Result<u64, CustodyError> {
    let address = holding_address(asset, authority);
    Ok(get_holding(store, &address)?.map_or(0, |h| h.amount))
}

// ---------------------------------------------------------------------------
// Staged mutations
// ---------------------------------------------------------------------------

/// Stage a credit of `amount` to `to`'s holding for `asset`, creating the
/// holding if it does not exist yet. Returns the post-credit balance.
pub fn stage_deposit(
    store: &LedgerStore,
    batch: &mut WriteBatch,
    asset: &AssetId,
    to: &Address,
    amount: u64,
) -> Result<u64, CustodyError> {
    let address = holding_address(asset, to);
    let current = get_holding(store, &address)?.map_or(0, |h| h.amount);

    let new_amount = current
        .checked_add(amount)
        .ok_or(CustodyError::Overflow {
            holding: address,
            current,
            credit: amount,
        })?;

    let holding = Holding {
        asset: *asset,
        authority: *to,
        amount: new_amount,
    };
    batch.put(&address, holding.to_bytes().to_vec());
    Ok(new_amount)
}

/// Stage a debit of `amount` from `authority`'s holding for `asset`.
/// Returns the post-debit balance. The holding stays open at zero.
pub fn stage_withdraw(
    store: &LedgerStore,
    batch: &mut WriteBatch,
    asset: &AssetId,
    authority: &Address,
    amount: u64,
) -> Result<u64, CustodyError> {
    let address = holding_address(asset, authority);
    let holding =
        get_holding(store, &address)?.ok_or(CustodyError::HoldingNotFound(address))?;

    if holding.amount < amount {
        return Err(CustodyError::InsufficientBalance {
            holding: address,
            available: holding.amount,
            requested: amount,
        });
    }

    let remaining = holding.amount - amount;
    let updated = Holding {
        amount: remaining,
        ..holding
    };
    batch.put(&address, updated.to_bytes().to_vec());
    Ok(remaining)
}

/// Stage a full drain of `authority`'s holding into `to`'s holding and
/// close the drained account. Returns the swept amount.
///
/// This is the vault teardown path: Take sweeps the vault to the taker,
/// Refund sweeps it back to the maker, and in both cases the vault
/// account ceases to exist in the same batch as the record it belongs to.
pub fn stage_sweep_and_close(
    store: &LedgerStore,
    batch: &mut WriteBatch,
    asset: &AssetId,
    authority: &Address,
    to: &Address,
) -> Result<u64, CustodyError> {
    let address = holding_address(asset, authority);
    let holding =
        get_holding(store, &address)?.ok_or(CustodyError::HoldingNotFound(address))?;

    stage_deposit(store, batch, asset, to, holding.amount)?;
    batch.delete(&address);
    Ok(holding.amount)
}

// ---------------------------------------------------------------------------
// Asset registry
// ---------------------------------------------------------------------------

/// Load the registry entry for `asset`.
pub fn get_asset(store: &LedgerStore, asset: &AssetId) -> Result<AssetInfo, CustodyError> {
    let address = asset.registry_address();
    match store.get(&address)? {
        None => Err(CustodyError::AssetNotFound(*asset)),
        Some(bytes) => Ok(AssetInfo::from_record_bytes(&bytes)?),
    }
}

/// Register a new asset.
///
/// The record's ID must match its content derivation — a registry entry
/// whose properties disagree with its identity would poison every
/// downstream holding address.
pub fn register_asset(ledger: &Ledger, info: &AssetInfo) -> Result<(), CustodyError> {
    let expected = AssetId::derive(&info.name, &info.symbol, info.decimals, &info.issuer);
    if info.id != expected {
        return Err(CustodyError::AssetIdMismatch { claimed: info.id });
    }

    ledger.transact(|store| {
        let address = info.id.registry_address();
        if store.contains(&address)? {
            return Err(CustodyError::AssetExists(info.id));
        }
        let mut batch = WriteBatch::new();
        batch.put(&address, info.to_record_bytes());
        Ok((batch, ()))
    })?;

    debug!(asset = %info.id, symbol = %info.symbol, "asset registered");
    Ok(())
}

/// Issue `amount` new units of `asset` to `to`'s holding.
///
/// Issuer-gated: `caller` must be the registered issuer. Supply and the
/// destination balance are both overflow-checked; the registry update and
/// the credit land in one batch.
pub fn issue(
    ledger: &Ledger,
    asset: &AssetId,
    caller: &Address,
    to: &Address,
    amount: u64,
) -> Result<u64, CustodyError> {
    let new_supply = ledger.transact(|store| {
        let mut info = get_asset(store, asset)?;

        if info.issuer != *caller {
            return Err(CustodyError::NotIssuer {
                asset: *asset,
                issuer: info.issuer,
                caller: *caller,
            });
        }

        let new_supply =
            info.total_supply
                .checked_add(amount)
                .ok_or(CustodyError::SupplyOverflow {
                    asset: *asset,
                    current: info.total_supply,
                    issue: amount,
                })?;
        info.total_supply = new_supply;

        let mut batch = WriteBatch::new();
        batch.put(&asset.registry_address(), info.to_record_bytes());
        stage_deposit(store, &mut batch, asset, to, amount)?;
        Ok((batch, new_supply))
    })?;

    debug!(asset = %asset, to = %to, amount, new_supply, "supply issued");
    Ok(new_supply)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
