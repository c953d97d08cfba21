//! # Swap Engine — Make, Take, Refund
//!
//! The only component that mutates escrow records or authorizes vault
//! debits. Each transition is one atomic ledger transaction:
//!
//! ```text
//! NonExistent --Make--> Open --Take----> closed (record & vault deleted)
//!                         \----Refund--> closed (record & vault deleted)
//! ```
//!
//! Closed is not a state you can observe — both exits delete the record
//! and the vault in the same batch that moves the funds, so a record
//! either exists and is open, or does not exist.
//!
//! ## Capability checks
//!
//! Every transition declares the role authorized to invoke it and checks
//! it before touching state: Make and Refund require the maker, Take
//! accepts any caller who can pay. How the caller was authenticated
//! (signatures, session, test harness fiat) is the client layer's
//! business — the engine receives an already-authenticated address.
//!
//! ## Supplied accounts are never trusted
//!
//! Callers pass the full set of involved addresses, mirroring how the
//! transitions execute on the host ledger. The engine recomputes every
//! derived address (record, vault, each holding) from the canonical
//! formulas and rejects the invocation on any mismatch — a wrong vault
//! address is a bug or an attack, not a request to use a different vault.
//!
//! ## Atomicity & races
//!
//! Validation and application run under the ledger's commit lock. Two
//! Takes racing for one record serialize; the loser revalidates against
//! the winner's committed state, finds the record gone, and fails with
//! [`EscrowError::RecordNotFound`] having moved nothing. Refund racing
//! Take behaves identically. There is no other locking anywhere.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

use barter_ledger::address::Address;
use barter_ledger::asset::AssetId;
use barter_ledger::custody::{self, CustodyError};
use barter_ledger::ledger::Ledger;
use barter_ledger::store::{LedgerStore, WriteBatch};

use crate::error::EscrowError;
use crate::state::EscrowRecord;

// ---------------------------------------------------------------------------
// Account sets
// ---------------------------------------------------------------------------

/// Accounts involved in a Make transition.
#[derive(Clone, Copy, Debug)]
pub struct MakeAccounts {
    /// The maker opening the offer.
    pub maker: Address,
    /// Asset the maker deposits.
    pub mint_a: AssetId,
    /// Asset the maker wants in return.
    pub mint_b: AssetId,
    /// The maker's holding of `mint_a` (source of the deposit).
    pub maker_holding_a: Address,
    /// The escrow record address, derived from `(maker, seed)`.
    pub escrow: Address,
    /// The vault address, derived from `(mint_a, escrow)`.
    pub vault: Address,
}

/// Accounts involved in a Take transition.
///
/// Everything here beyond the taker's own identity is recoverable from an
/// indexer result: the record carries `maker` and both mints, and the
/// vault and holding addresses derive from those.
#[derive(Clone, Copy, Debug)]
pub struct TakeAccounts {
    /// The taker accepting the offer.
    pub taker: Address,
    /// The maker, as recorded in the escrow.
    pub maker: Address,
    /// Asset held in the vault.
    pub mint_a: AssetId,
    /// Asset the taker pays with.
    pub mint_b: AssetId,
    /// The taker's holding of `mint_a` (receives the vault contents).
    pub taker_holding_a: Address,
    /// The taker's holding of `mint_b` (source of the payment).
    pub taker_holding_b: Address,
    /// The maker's holding of `mint_b` (receives the payment).
    pub maker_holding_b: Address,
    /// The escrow record address.
    pub escrow: Address,
    /// The vault address.
    pub vault: Address,
}

/// Accounts involved in a Refund transition.
#[derive(Clone, Copy, Debug)]
pub struct RefundAccounts {
    /// The maker reclaiming the offer.
    pub maker: Address,
    /// Asset held in the vault.
    pub mint_a: AssetId,
    /// The maker's holding of `mint_a` (receives the refund).
    pub maker_holding_a: Address,
    /// The escrow record address.
    pub escrow: Address,
    /// The vault address.
    pub vault: Address,
}

/// Outcome of a successful Take.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct TakeReceipt {
    /// The record that was closed.
    pub escrow: Address,
    /// The maker who was paid.
    pub maker: Address,
    /// The taker who received the vault contents.
    pub taker: Address,
    /// Full vault balance transferred to the taker.
    pub deposit_claimed: u64,
    /// Amount of `mint_b` transferred to the maker.
    pub payment: u64,
}

// ---------------------------------------------------------------------------
// SwapEngine
// ---------------------------------------------------------------------------

/// The protocol state machine over a shared ledger.
pub struct SwapEngine {
    ledger: Arc<Ledger>,
}

impl SwapEngine {
    /// Create an engine over a ledger.
    pub fn new(ledger: Arc<Ledger>) -> Self {
        Self { ledger }
    }

    /// The underlying ledger, for queries and discovery.
    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    /// **Make** — open a trade offer.
    ///
    /// Creates the escrow record, creates the vault, and moves
    /// `deposit_amount` of `mint_a` from the maker's holding into it, all
    /// in one batch. Fails without effect if a record already exists at
    /// the derived address (seed reuse) or the maker cannot fund the
    /// deposit.
    pub fn make(
        &self,
        caller: &Address,
        accounts: &MakeAccounts,
        seed: u64,
        deposit_amount: u64,
        receive_amount: u64,
    ) -> Result<EscrowRecord, EscrowError> {
        if *caller != accounts.maker {
            return Err(EscrowError::UnauthorizedCaller {
                role: "maker",
                expected: accounts.maker,
                caller: *caller,
            });
        }
        if deposit_amount == 0 {
            return Err(EscrowError::InvalidAmount {
                what: "deposit amount",
            });
        }
        if receive_amount == 0 {
            return Err(EscrowError::InvalidAmount {
                what: "receive amount",
            });
        }
        if accounts.mint_a == accounts.mint_b {
            return Err(EscrowError::IdenticalAssets(accounts.mint_a));
        }

        let record = EscrowRecord {
            seed,
            maker: accounts.maker,
            mint_a: accounts.mint_a,
            mint_b: accounts.mint_b,
            receive_amount,
        };
        let escrow = record.address();
        check_address("escrow record", escrow, accounts.escrow)?;
        check_address("vault", record.vault_address(), accounts.vault)?;
        check_address(
            "maker mint A holding",
            custody::holding_address(&accounts.mint_a, &accounts.maker),
            accounts.maker_holding_a,
        )?;

        self.ledger.transact(|store| {
            if store.contains(&escrow)? {
                return Err(EscrowError::RecordExists(escrow));
            }

            let mut batch = WriteBatch::new();
            custody::stage_withdraw(
                store,
                &mut batch,
                &accounts.mint_a,
                &accounts.maker,
                deposit_amount,
            )?;
            // The vault is born here: a holding whose authority is the
            // record address, so no wallet can ever debit it.
            custody::stage_deposit(store, &mut batch, &accounts.mint_a, &escrow, deposit_amount)?;
            batch.put(&escrow, record.to_bytes().to_vec());
            Ok((batch, ()))
        })?;

        info!(
            escrow = %escrow,
            maker = %accounts.maker,
            mint_a = %accounts.mint_a,
            mint_b = %accounts.mint_b,
            deposit_amount,
            receive_amount,
            "escrow opened"
        );
        Ok(record)
    }

    /// **Take** — accept an open offer.
    ///
    /// Atomically: pays `receive_amount` of `mint_b` from the taker to
    /// the maker, sweeps the full vault balance of `mint_a` to the taker,
    /// and deletes the vault and the record. Any failure leaves the offer
    /// open and every balance untouched.
    pub fn take(
        &self,
        caller: &Address,
        accounts: &TakeAccounts,
    ) -> Result<TakeReceipt, EscrowError> {
        if *caller != accounts.taker {
            return Err(EscrowError::UnauthorizedCaller {
                role: "taker",
                expected: accounts.taker,
                caller: *caller,
            });
        }

        let receipt = self.ledger.transact(|store| {
            let record = load_open_record(store, &accounts.escrow)?;

            check_address("maker", record.maker, accounts.maker)?;
            check_asset("offered asset", record.mint_a, accounts.mint_a)?;
            check_asset("payment asset", record.mint_b, accounts.mint_b)?;
            check_address("vault", record.vault_address(), accounts.vault)?;
            check_address(
                "taker mint A holding",
                custody::holding_address(&record.mint_a, &accounts.taker),
                accounts.taker_holding_a,
            )?;
            check_address(
                "taker mint B holding",
                custody::holding_address(&record.mint_b, &accounts.taker),
                accounts.taker_holding_b,
            )?;
            check_address(
                "maker mint B holding",
                custody::holding_address(&record.mint_b, &record.maker),
                accounts.maker_holding_b,
            )?;

            let mut batch = WriteBatch::new();
            if accounts.taker == record.maker {
                // A maker taking their own offer nets the payment leg to
                // zero. Staging a withdraw and a deposit against the same
                // holding in one batch would lose the first write, so the
                // leg is skipped — but the funds-on-hand rule still
                // applies, exactly as for a transfer to self.
                let available = custody::balance(store, &record.mint_b, &accounts.taker)?;
                if available < record.receive_amount {
                    return Err(EscrowError::from(CustodyError::InsufficientBalance {
                        holding: accounts.taker_holding_b,
                        available,
                        requested: record.receive_amount,
                    }));
                }
            } else {
                custody::stage_withdraw(
                    store,
                    &mut batch,
                    &record.mint_b,
                    &accounts.taker,
                    record.receive_amount,
                )?;
                custody::stage_deposit(
                    store,
                    &mut batch,
                    &record.mint_b,
                    &record.maker,
                    record.receive_amount,
                )?;
            }
            let deposit_claimed = custody::stage_sweep_and_close(
                store,
                &mut batch,
                &record.mint_a,
                &accounts.escrow,
                &accounts.taker,
            )?;
            batch.delete(&accounts.escrow);

            Ok((
                batch,
                TakeReceipt {
                    escrow: accounts.escrow,
                    maker: record.maker,
                    taker: accounts.taker,
                    deposit_claimed,
                    payment: record.receive_amount,
                },
            ))
        })?;

        info!(
            escrow = %receipt.escrow,
            taker = %receipt.taker,
            maker = %receipt.maker,
            deposit_claimed = receipt.deposit_claimed,
            payment = receipt.payment,
            "escrow taken"
        );
        Ok(receipt)
    }

    /// **Refund** — the maker withdraws an open offer.
    ///
    /// Atomically sweeps the full vault balance back to the maker and
    /// deletes the vault and the record. Maker-only; returns the refunded
    /// amount.
    pub fn refund(
        &self,
        caller: &Address,
        accounts: &RefundAccounts,
    ) -> Result<u64, EscrowError> {
        if *caller != accounts.maker {
            return Err(EscrowError::UnauthorizedCaller {
                role: "maker",
                expected: accounts.maker,
                caller: *caller,
            });
        }

        let refunded = self.ledger.transact(|store| {
            let record = load_open_record(store, &accounts.escrow)?;

            if record.maker != accounts.maker {
                return Err(EscrowError::UnauthorizedCaller {
                    role: "maker",
                    expected: record.maker,
                    caller: accounts.maker,
                });
            }
            check_asset("offered asset", record.mint_a, accounts.mint_a)?;
            check_address("vault", record.vault_address(), accounts.vault)?;
            check_address(
                "maker mint A holding",
                custody::holding_address(&record.mint_a, &record.maker),
                accounts.maker_holding_a,
            )?;

            let mut batch = WriteBatch::new();
            let refunded = custody::stage_sweep_and_close(
                store,
                &mut batch,
                &record.mint_a,
                &accounts.escrow,
                &record.maker,
            )?;
            batch.delete(&accounts.escrow);
            Ok((batch, refunded))
        })?;

        info!(
            escrow = %accounts.escrow,
            maker = %accounts.maker,
            refunded,
            "escrow refunded"
        );
        Ok(refunded)
    }
}

// ---------------------------------------------------------------------------
// Shared validation helpers
// ---------------------------------------------------------------------------

/// Load the record at `address`, requiring it to exist, be shaped like an
/// escrow record, and live at the address its own content derives.
fn load_open_record(
    store: &LedgerStore,
    address: &Address,
) -> Result<EscrowRecord, EscrowError> {
    let bytes = store
        .get(address)?
        .ok_or(EscrowError::RecordNotFound(*address))?;
    let record =
        EscrowRecord::from_bytes(&bytes).map_err(|source| EscrowError::MalformedRecord {
            address: *address,
            source,
        })?;

    // A record whose content rederives to a different address has been
    // planted or corrupted; nothing it says can be trusted.
    let canonical = record.address();
    if canonical != *address {
        return Err(EscrowError::AddressMismatch {
            what: "escrow record",
            expected: canonical,
            got: *address,
        });
    }
    Ok(record)
}

fn check_address(
    what: &'static str,
    expected: Address,
    got: Address,
) -> Result<(), EscrowError> {
    if expected != got {
        return Err(EscrowError::AddressMismatch {
            what,
            expected,
            got,
        });
    }
    Ok(())
}

fn check_asset(what: &'static str, expected: AssetId, got: AssetId) -> Result<(), EscrowError> {
    if expected != got {
        return Err(EscrowError::AssetMismatch {
            what,
            expected,
            got,
        });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{escrow_address, vault_address};
    use barter_ledger::asset::AssetInfo;
    use barter_ledger::identity::Keypair;

    struct Fixture {
        engine: SwapEngine,
        maker: Address,
        mint_a: AssetId,
        mint_b: AssetId,
    }

    fn setup() -> Fixture {
        let ledger = Arc::new(Ledger::open_temporary().unwrap());
        let issuer = Keypair::from_seed(&[40u8; 32]).address();
        let maker = Keypair::from_seed(&[41u8; 32]).address();

        let info_a = AssetInfo::new("Asset A", "AAA", 6, issuer);
        let info_b = AssetInfo::new("Asset B", "BBB", 6, issuer);
        custody::register_asset(&ledger, &info_a).unwrap();
        custody::register_asset(&ledger, &info_b).unwrap();
        custody::issue(&ledger, &info_a.id, &issuer, &maker, 10_000_000).unwrap();

        Fixture {
            engine: SwapEngine::new(ledger),
            maker,
            mint_a: info_a.id,
            mint_b: info_b.id,
        }
    }

    fn make_accounts(fx: &Fixture, seed: u64) -> MakeAccounts {
        let escrow = escrow_address(&fx.maker, seed);
        MakeAccounts {
            maker: fx.maker,
            mint_a: fx.mint_a,
            mint_b: fx.mint_b,
            maker_holding_a: custody::holding_address(&fx.mint_a, &fx.maker),
            escrow,
            vault: vault_address(&fx.mint_a, &escrow),
        }
    }

    #[test]
    fn make_rejects_wrong_caller() {
        let fx = setup();
        let accounts = make_accounts(&fx, 1);
        let stranger = Keypair::from_seed(&[42u8; 32]).address();
        let result = fx.engine.make(&stranger, &accounts, 1, 100, 100);
        assert!(matches!(
            result,
            Err(EscrowError::UnauthorizedCaller { role: "maker", .. })
        ));
    }

    #[test]
    fn make_rejects_zero_amounts() {
        let fx = setup();
        let accounts = make_accounts(&fx, 2);
        assert!(matches!(
            fx.engine.make(&fx.maker, &accounts, 2, 0, 100),
            Err(EscrowError::InvalidAmount { .. })
        ));
        assert!(matches!(
            fx.engine.make(&fx.maker, &accounts, 2, 100, 0),
            Err(EscrowError::InvalidAmount { .. })
        ));
    }

    #[test]
    fn make_rejects_identical_assets() {
        let fx = setup();
        let mut accounts = make_accounts(&fx, 9);
        accounts.mint_b = fx.mint_a;
        assert!(matches!(
            fx.engine.make(&fx.maker, &accounts, 9, 100, 100),
            Err(EscrowError::IdenticalAssets(_))
        ));
    }

    #[test]
    fn make_rejects_wrong_escrow_address() {
        let fx = setup();
        let mut accounts = make_accounts(&fx, 3);
        accounts.escrow = escrow_address(&fx.maker, 999); // wrong seed's address
        let result = fx.engine.make(&fx.maker, &accounts, 3, 100, 100);
        assert!(matches!(
            result,
            Err(EscrowError::AddressMismatch {
                what: "escrow record",
                ..
            })
        ));
    }

    #[test]
    fn make_rejects_wrong_vault_address() {
        let fx = setup();
        let mut accounts = make_accounts(&fx, 4);
        accounts.vault = custody::holding_address(&fx.mint_b, &accounts.escrow);
        let result = fx.engine.make(&fx.maker, &accounts, 4, 100, 100);
        assert!(matches!(
            result,
            Err(EscrowError::AddressMismatch { what: "vault", .. })
        ));
    }

    #[test]
    fn make_rejects_seed_reuse() {
        let fx = setup();
        let accounts = make_accounts(&fx, 5);
        fx.engine.make(&fx.maker, &accounts, 5, 100, 100).unwrap();
        assert!(matches!(
            fx.engine.make(&fx.maker, &accounts, 5, 100, 100),
            Err(EscrowError::RecordExists(_))
        ));
    }

    #[test]
    fn make_rejects_underfunded_maker() {
        let fx = setup();
        let accounts = make_accounts(&fx, 6);
        let result = fx
            .engine
            .make(&fx.maker, &accounts, 6, u64::MAX / 2, 100);
        assert!(matches!(result, Err(EscrowError::Custody(_))));
        // No record, no vault.
        let store = fx.engine.ledger().store();
        assert!(!store.contains(&accounts.escrow).unwrap());
        assert!(!store.contains(&accounts.vault).unwrap());
    }

    #[test]
    fn make_creates_record_and_vault() {
        let fx = setup();
        let accounts = make_accounts(&fx, 7);
        let record = fx
            .engine
            .make(&fx.maker, &accounts, 7, 1_000_000, 2_000_000)
            .unwrap();

        assert_eq!(record.address(), accounts.escrow);
        let store = fx.engine.ledger().store();
        assert!(store.contains(&accounts.escrow).unwrap());
        let vault = custody::get_holding(store, &accounts.vault).unwrap().unwrap();
        assert_eq!(vault.amount, 1_000_000);
        assert_eq!(vault.authority, accounts.escrow);
        assert_eq!(
            custody::balance(store, &fx.mint_a, &fx.maker).unwrap(),
            9_000_000
        );
    }

    #[test]
    fn refund_by_stranger_rejected() {
        let fx = setup();
        let accounts = make_accounts(&fx, 8);
        fx.engine
            .make(&fx.maker, &accounts, 8, 1_000, 1_000)
            .unwrap();

        let mallory = Keypair::from_seed(&[43u8; 32]).address();
        let refund_accounts = RefundAccounts {
            maker: mallory,
            mint_a: fx.mint_a,
            maker_holding_a: custody::holding_address(&fx.mint_a, &mallory),
            escrow: accounts.escrow,
            vault: accounts.vault,
        };
        // Mallory authenticates as themselves but is not the record's maker.
        let result = fx.engine.refund(&mallory, &refund_accounts);
        assert!(matches!(
            result,
            Err(EscrowError::UnauthorizedCaller { role: "maker", .. })
        ));
        // Vault untouched.
        let store = fx.engine.ledger().store();
        let vault = custody::get_holding(store, &accounts.vault).unwrap().unwrap();
        assert_eq!(vault.amount, 1_000);
    }
}
