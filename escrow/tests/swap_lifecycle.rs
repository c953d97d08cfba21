//! End-to-end tests for the BARTER swap protocol.
//!
//! These exercise the full path through every layer: asset registration
//! and issuance, escrow creation, discovery by asset pair, the atomic
//! swap, refunds, and the race behavior between competing transitions.
//!
//! Each test stands alone with its own temporary ledger. No shared state,
//! no ordering dependencies.

use std::sync::Arc;

use barter_escrow::engine::{MakeAccounts, RefundAccounts, SwapEngine, TakeAccounts};
use barter_escrow::error::EscrowError;
use barter_escrow::indexer::EscrowIndexer;
use barter_escrow::state::{escrow_address, vault_address, EscrowRecord};
use barter_ledger::address::Address;
use barter_ledger::asset::{AssetId, AssetInfo};
use barter_ledger::custody;
use barter_ledger::identity::Keypair;
use barter_ledger::ledger::Ledger;

// ---------------------------------------------------------------------------
// Test Helpers
// ---------------------------------------------------------------------------

/// Initial funding for each party, matching a generous faucet drop.
const FUNDING: u64 = 1_000_000_000;

struct World {
    engine: SwapEngine,
    ledger: Arc<Ledger>,
    maker: Address,
    taker: Address,
    mint_a: AssetId,
    mint_b: AssetId,
}

/// Spins up a ledger with two registered assets and two funded parties:
/// the maker holds asset A, the taker holds asset B.
fn setup() -> World {
    let ledger = Arc::new(Ledger::open_temporary().expect("temp ledger"));
    let issuer = Keypair::from_seed(&[90u8; 32]).address();
    let maker = Keypair::from_seed(&[91u8; 32]).address();
    let taker = Keypair::from_seed(&[92u8; 32]).address();

    let info_a = AssetInfo::new("Asset Alpha", "ALF", 6, issuer);
    let info_b = AssetInfo::new("Asset Beta", "BET", 6, issuer);
    custody::register_asset(&ledger, &info_a).unwrap();
    custody::register_asset(&ledger, &info_b).unwrap();
    custody::issue(&ledger, &info_a.id, &issuer, &maker, FUNDING).unwrap();
    custody::issue(&ledger, &info_b.id, &issuer, &taker, FUNDING).unwrap();

    World {
        engine: SwapEngine::new(Arc::clone(&ledger)),
        ledger,
        maker,
        taker,
        mint_a: info_a.id,
        mint_b: info_b.id,
    }
}

fn make_accounts(world: &World, seed: u64) -> MakeAccounts {
    let escrow = escrow_address(&world.maker, seed);
    MakeAccounts {
        maker: world.maker,
        mint_a: world.mint_a,
        mint_b: world.mint_b,
        maker_holding_a: custody::holding_address(&world.mint_a, &world.maker),
        escrow,
        vault: vault_address(&world.mint_a, &escrow),
    }
}

/// Build the Take account set purely from a discovered record — exactly
/// the information a real taker has after an indexer scan.
fn take_accounts_from_record(
    taker: Address,
    address: Address,
    record: &EscrowRecord,
) -> TakeAccounts {
    TakeAccounts {
        taker,
        maker: record.maker,
        mint_a: record.mint_a,
        mint_b: record.mint_b,
        taker_holding_a: custody::holding_address(&record.mint_a, &taker),
        taker_holding_b: custody::holding_address(&record.mint_b, &taker),
        maker_holding_b: custody::holding_address(&record.mint_b, &record.maker),
        escrow: address,
        vault: record.vault_address(),
    }
}

fn refund_accounts(world: &World, seed: u64) -> RefundAccounts {
    let escrow = escrow_address(&world.maker, seed);
    RefundAccounts {
        maker: world.maker,
        mint_a: world.mint_a,
        maker_holding_a: custody::holding_address(&world.mint_a, &world.maker),
        escrow,
        vault: vault_address(&world.mint_a, &escrow),
    }
}

fn balances(world: &World, who: &Address) -> (u64, u64) {
    let store = world.ledger.store();
    (
        custody::balance(store, &world.mint_a, who).unwrap(),
        custody::balance(store, &world.mint_b, who).unwrap(),
    )
}

// ---------------------------------------------------------------------------
// 1. Full Swap Lifecycle — the million-for-a-million trade
// ---------------------------------------------------------------------------

#[test]
fn full_swap_lifecycle() {
    let world = setup();
    let seed = 7;
    let deposit = 1_000_000;
    let receive = 1_000_000;

    let accounts = make_accounts(&world, seed);
    let record = world
        .engine
        .make(&world.maker, &accounts, seed, deposit, receive)
        .unwrap();

    // Open state: record and vault both exist, vault holds the deposit.
    let store = world.ledger.store();
    assert!(store.contains(&accounts.escrow).unwrap());
    let vault = custody::get_holding(store, &accounts.vault).unwrap().unwrap();
    assert_eq!(vault.amount, deposit);

    // Take with the matching counter-asset payment.
    let take = take_accounts_from_record(world.taker, accounts.escrow, &record);
    let receipt = world.engine.take(&world.taker, &take).unwrap();
    assert_eq!(receipt.deposit_claimed, deposit);
    assert_eq!(receipt.payment, receive);

    // Conservation: every unit of A and B accounted for across parties.
    let (maker_a, maker_b) = balances(&world, &world.maker);
    let (taker_a, taker_b) = balances(&world, &world.taker);
    assert_eq!(maker_a, FUNDING - deposit);
    assert_eq!(maker_b, receive);
    assert_eq!(taker_a, deposit);
    assert_eq!(taker_b, FUNDING - receive);
    assert_eq!(maker_a + taker_a, FUNDING);
    assert_eq!(maker_b + taker_b, FUNDING);

    // Record and vault no longer exist — no tombstone, nothing.
    assert!(!store.contains(&accounts.escrow).unwrap());
    assert!(!store.contains(&accounts.vault).unwrap());

    // A second Take on the same address fails the existence precondition.
    let again = world.engine.take(&world.taker, &take);
    assert!(matches!(again, Err(EscrowError::RecordNotFound(_))));

    // So does a late Refund.
    let refund = world.engine.refund(&world.maker, &refund_accounts(&world, seed));
    assert!(matches!(refund, Err(EscrowError::RecordNotFound(_))));
}

// ---------------------------------------------------------------------------
// 2. Make Then Refund Restores the Maker Exactly
// ---------------------------------------------------------------------------

#[test]
fn refund_restores_maker_exactly() {
    let world = setup();
    let seed = 11;

    let accounts = make_accounts(&world, seed);
    world
        .engine
        .make(&world.maker, &accounts, seed, 250_000, 500_000)
        .unwrap();
    assert_eq!(balances(&world, &world.maker).0, FUNDING - 250_000);

    let refunded = world
        .engine
        .refund(&world.maker, &refund_accounts(&world, seed))
        .unwrap();
    assert_eq!(refunded, 250_000);

    // Balance restored to the pre-Make value, vault and record gone.
    assert_eq!(balances(&world, &world.maker).0, FUNDING);
    let store = world.ledger.store();
    assert!(!store.contains(&accounts.escrow).unwrap());
    assert!(!store.contains(&accounts.vault).unwrap());
}

// ---------------------------------------------------------------------------
// 3. Take on a Nonexistent Record Moves Nothing
// ---------------------------------------------------------------------------

#[test]
fn take_nonexistent_record_fails_cleanly() {
    let world = setup();

    // A perfectly well-formed account set for an escrow nobody made.
    let phantom = EscrowRecord {
        seed: 404,
        maker: world.maker,
        mint_a: world.mint_a,
        mint_b: world.mint_b,
        receive_amount: 1,
    };
    let take = take_accounts_from_record(world.taker, phantom.address(), &phantom);

    let before_taker = balances(&world, &world.taker);
    let result = world.engine.take(&world.taker, &take);
    assert!(matches!(result, Err(EscrowError::RecordNotFound(_))));
    assert_eq!(balances(&world, &world.taker), before_taker);
}

// ---------------------------------------------------------------------------
// 4. Underfunded Taker Leaves the Offer Open
// ---------------------------------------------------------------------------

#[test]
fn underfunded_taker_leaves_offer_open() {
    let world = setup();
    let seed = 13;

    let accounts = make_accounts(&world, seed);
    let record = world
        .engine
        .make(&world.maker, &accounts, seed, 1_000, FUNDING + 1)
        .unwrap();

    let take = take_accounts_from_record(world.taker, accounts.escrow, &record);
    let result = world.engine.take(&world.taker, &take);
    assert!(matches!(result, Err(EscrowError::Custody(_))));

    // The offer is still open and fully funded; nothing moved anywhere.
    let store = world.ledger.store();
    assert!(store.contains(&accounts.escrow).unwrap());
    let vault = custody::get_holding(store, &accounts.vault).unwrap().unwrap();
    assert_eq!(vault.amount, 1_000);
    assert_eq!(balances(&world, &world.taker).1, FUNDING);
    assert_eq!(balances(&world, &world.maker).1, 0);
}

// ---------------------------------------------------------------------------
// 5. Discovery Returns Exactly the Open Matching Records
// ---------------------------------------------------------------------------

#[test]
fn indexer_filters_by_pair_and_openness() {
    let world = setup();

    // Three offers on the queried pair...
    for seed in [1u64, 2, 3] {
        let accounts = make_accounts(&world, seed);
        world
            .engine
            .make(&world.maker, &accounts, seed, 10_000 * seed, 20_000 * seed)
            .unwrap();
    }

    // ...and one on the reversed pair. The maker needs some B to offer,
    // so top them up first.
    let issuer = Keypair::from_seed(&[90u8; 32]).address();
    custody::issue(&world.ledger, &world.mint_b, &issuer, &world.maker, 50_000).unwrap();
    let reversed_seed = 4u64;
    let reversed_escrow = escrow_address(&world.maker, reversed_seed);
    let reversed = MakeAccounts {
        maker: world.maker,
        mint_a: world.mint_b, // offering B
        mint_b: world.mint_a, // asking A
        maker_holding_a: custody::holding_address(&world.mint_b, &world.maker),
        escrow: reversed_escrow,
        vault: vault_address(&world.mint_b, &reversed_escrow),
    };
    world
        .engine
        .make(&world.maker, &reversed, reversed_seed, 5_000, 5_000)
        .unwrap();

    // Close offer 2 by refund; it must drop out of discovery.
    world
        .engine
        .refund(&world.maker, &refund_accounts(&world, 2))
        .unwrap();

    let indexer = EscrowIndexer::new(world.ledger.store());
    let mut found: Vec<u64> = indexer
        .find_by_asset_pair(&world.mint_a, &world.mint_b)
        .collect::<Result<Vec<_>, _>>()
        .unwrap()
        .into_iter()
        .map(|(_, record)| record.seed)
        .collect();
    found.sort_unstable();

    // Exactly the open A-for-B offers: seeds 1 and 3. The reversed offer
    // and the refunded one are excluded, as are all the holdings and
    // registry accounts sharing the account space.
    assert_eq!(found, vec![1, 3]);

    // The reversed query finds exactly the reversed offer.
    let reversed_found: Vec<_> = indexer
        .find_by_asset_pair(&world.mint_b, &world.mint_a)
        .collect::<Result<Vec<_>, _>>()
        .unwrap();
    assert_eq!(reversed_found.len(), 1);
    assert_eq!(reversed_found[0].1.seed, reversed_seed);
}

// ---------------------------------------------------------------------------
// 6. A Taker Can Trade From Discovery Alone
// ---------------------------------------------------------------------------

#[test]
fn take_driven_entirely_by_discovery() {
    let world = setup();
    let seed = 21;

    let accounts = make_accounts(&world, seed);
    world
        .engine
        .make(&world.maker, &accounts, seed, 750_000, 1_500_000)
        .unwrap();

    // The taker knows only the asset pair. Everything else — record
    // address, maker, vault, the maker's receiving holding — comes out
    // of the scan result and the public derivation formulas.
    let indexer = EscrowIndexer::new(world.ledger.store());
    let results: Vec<_> = indexer
        .find_by_asset_pair(&world.mint_a, &world.mint_b)
        .collect::<Result<Vec<_>, _>>()
        .unwrap();
    assert_eq!(results.len(), 1);
    let (address, record) = results[0];

    let take = take_accounts_from_record(world.taker, address, &record);
    let receipt = world.engine.take(&world.taker, &take).unwrap();
    assert_eq!(receipt.deposit_claimed, 750_000);
    assert_eq!(balances(&world, &world.taker).0, 750_000);
    assert_eq!(balances(&world, &world.maker).1, 1_500_000);
}

// ---------------------------------------------------------------------------
// 7. Best-Quote Ranking
// ---------------------------------------------------------------------------

#[test]
fn best_quote_prefers_cheapest_ask() {
    let world = setup();

    // Same deposit, different asks: seed 31 wants 2 B per A, seed 32
    // wants 1 B per A, seed 33 wants 3 B per A.
    for (seed, receive) in [(31u64, 200_000u64), (32, 100_000), (33, 300_000)] {
        let accounts = make_accounts(&world, seed);
        world
            .engine
            .make(&world.maker, &accounts, seed, 100_000, receive)
            .unwrap();
    }

    let indexer = EscrowIndexer::new(world.ledger.store());
    let best = indexer
        .best_quote(&world.mint_a, &world.mint_b)
        .unwrap()
        .expect("three open offers");
    assert_eq!(best.record.seed, 32);
    assert_eq!(best.deposit_amount, 100_000);
    assert_eq!(best.record.receive_amount, 100_000);
}

// ---------------------------------------------------------------------------
// 8. Racing Takes — Exactly One Winner
// ---------------------------------------------------------------------------

#[test]
fn racing_takes_exactly_one_succeeds() {
    use std::thread;

    let world = setup();
    let seed = 41;

    // Fund a second taker with asset B.
    let issuer = Keypair::from_seed(&[90u8; 32]).address();
    let rival = Keypair::from_seed(&[93u8; 32]).address();
    custody::issue(&world.ledger, &world.mint_b, &issuer, &rival, FUNDING).unwrap();

    let accounts = make_accounts(&world, seed);
    let record = world
        .engine
        .make(&world.maker, &accounts, seed, 500_000, 500_000)
        .unwrap();

    let engine = Arc::new(world.engine);
    let mut handles = Vec::new();
    for taker in [world.taker, rival] {
        let engine = Arc::clone(&engine);
        let take = take_accounts_from_record(taker, accounts.escrow, &record);
        handles.push(thread::spawn(move || engine.take(&taker, &take)));
    }

    let outcomes: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    let wins = outcomes.iter().filter(|r| r.is_ok()).count();
    let losses = outcomes
        .iter()
        .filter(|r| matches!(r, Err(EscrowError::RecordNotFound(_))))
        .count();
    assert_eq!(wins, 1, "exactly one take must win the race");
    assert_eq!(losses, 1, "the loser must fail the openness precondition");

    // The vault was paid out exactly once.
    let store = engine.ledger().store();
    let taker_a = custody::balance(store, &world.mint_a, &world.taker).unwrap();
    let rival_a = custody::balance(store, &world.mint_a, &rival).unwrap();
    assert_eq!(taker_a + rival_a, 500_000);
    // And the maker was paid exactly once.
    assert_eq!(
        custody::balance(store, &world.mint_b, &world.maker).unwrap(),
        500_000
    );
}

// ---------------------------------------------------------------------------
// 9. Refund Racing Take — One Winner, Clean Loser
// ---------------------------------------------------------------------------

#[test]
fn refund_racing_take_has_one_winner() {
    use std::thread;

    let world = setup();
    let seed = 43;

    let accounts = make_accounts(&world, seed);
    let record = world
        .engine
        .make(&world.maker, &accounts, seed, 300_000, 300_000)
        .unwrap();

    let take = take_accounts_from_record(world.taker, accounts.escrow, &record);
    let refund = refund_accounts(&world, seed);
    let engine = Arc::new(world.engine);

    let take_handle = {
        let engine = Arc::clone(&engine);
        let taker = world.taker;
        thread::spawn(move || engine.take(&taker, &take).map(|_| ()))
    };
    let refund_handle = {
        let engine = Arc::clone(&engine);
        let maker = world.maker;
        thread::spawn(move || engine.refund(&maker, &refund).map(|_| ()))
    };

    let results = [
        take_handle.join().unwrap(),
        refund_handle.join().unwrap(),
    ];
    let wins = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(wins, 1, "take and refund cannot both apply");

    // Whoever won, the vault's 300k of A ended up in exactly one place
    // and the record is gone.
    let store = engine.ledger().store();
    let maker_a = custody::balance(store, &world.mint_a, &world.maker).unwrap();
    let taker_a = custody::balance(store, &world.mint_a, &world.taker).unwrap();
    assert_eq!(maker_a + taker_a, FUNDING);
    assert!(!store.contains(&accounts.escrow).unwrap());
    assert!(!store.contains(&accounts.vault).unwrap());
}

// ---------------------------------------------------------------------------
// 10. Self-Take Nets the Payment Leg to Zero
// ---------------------------------------------------------------------------

#[test]
fn maker_taking_own_offer_recovers_deposit() {
    let world = setup();
    let seed = 51;

    // Fund the maker with enough B to satisfy their own ask.
    let issuer = Keypair::from_seed(&[90u8; 32]).address();
    custody::issue(&world.ledger, &world.mint_b, &issuer, &world.maker, 200_000).unwrap();

    let accounts = make_accounts(&world, seed);
    let record = world
        .engine
        .make(&world.maker, &accounts, seed, 400_000, 200_000)
        .unwrap();

    // The maker takes their own offer: the payment leg cancels out, the
    // vault comes home, and nothing is created or destroyed.
    let take = take_accounts_from_record(world.maker, accounts.escrow, &record);
    let receipt = world.engine.take(&world.maker, &take).unwrap();
    assert_eq!(receipt.deposit_claimed, 400_000);

    let (maker_a, maker_b) = balances(&world, &world.maker);
    assert_eq!(maker_a, FUNDING);
    assert_eq!(maker_b, 200_000);
    assert!(!world.ledger.store().contains(&accounts.escrow).unwrap());
}

// ---------------------------------------------------------------------------
// 11. Multiple Concurrent Offers From One Maker
// ---------------------------------------------------------------------------

#[test]
fn one_maker_many_offers() {
    let world = setup();

    for seed in 100u64..110 {
        let accounts = make_accounts(&world, seed);
        world
            .engine
            .make(&world.maker, &accounts, seed, 1_000, 1_000)
            .unwrap();
    }
    assert_eq!(balances(&world, &world.maker).0, FUNDING - 10_000);

    let indexer = EscrowIndexer::new(world.ledger.store());
    let open = indexer
        .find_by_asset_pair(&world.mint_a, &world.mint_b)
        .collect::<Result<Vec<_>, _>>()
        .unwrap();
    assert_eq!(open.len(), 10);

    // Refund them all; the maker is made whole.
    for seed in 100u64..110 {
        world
            .engine
            .refund(&world.maker, &refund_accounts(&world, seed))
            .unwrap();
    }
    assert_eq!(balances(&world, &world.maker).0, FUNDING);
    assert_eq!(
        indexer
            .find_by_asset_pair(&world.mint_a, &world.mint_b)
            .count(),
        0
    );
}
