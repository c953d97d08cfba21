//! # Scenario Driver
//!
//! The client-side orchestration around the swap protocol: everything the
//! engine treats as an external collaborator lives here. A scenario run
//!
//! 1. opens a ledger (temporary unless a data dir is given),
//! 2. generates wallets for an issuer, a maker, and a taker,
//! 3. registers two assets and funds the parties (the airdrop bootstrap),
//! 4. has the maker open an offer,
//! 5. has the taker *discover* the offer by asset pair — never by knowing
//!    its address — and complete the trade from the scan result alone,
//! 6. checks conservation and emits a JSON report.
//!
//! Every engine invocation is authenticated the way a deployment would:
//! the acting wallet signs an intent payload, the harness verifies the
//! signature, and only the authenticated address reaches the engine.

use anyhow::{bail, ensure, Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use barter_escrow::engine::{MakeAccounts, RefundAccounts, SwapEngine, TakeAccounts, TakeReceipt};
use barter_escrow::indexer::EscrowIndexer;
use barter_escrow::state::{escrow_address, vault_address};
use barter_ledger::address::Address;
use barter_ledger::asset::{AssetId, AssetInfo};
use barter_ledger::custody;
use barter_ledger::ledger::Ledger;

use crate::cli::ScenarioArgs;
use crate::wallet::Wallet;

/// Faucet drop per party. Comfortably above any scenario's trade size.
const FUNDING: u64 = 1_000_000_000;

// ---------------------------------------------------------------------------
// Reports
// ---------------------------------------------------------------------------

/// Final balances of one party.
#[derive(Debug, Serialize)]
pub struct PartyBalances {
    /// Wallet label ("maker", "taker").
    pub label: String,
    /// The party's ledger address.
    pub address: Address,
    /// Balance of asset A in smallest units.
    pub asset_a: u64,
    /// Balance of asset B in smallest units.
    pub asset_b: u64,
}

/// Outcome of the full swap scenario.
#[derive(Debug, Serialize)]
pub struct SwapReport {
    /// Unique id of this run.
    pub run_id: Uuid,
    /// When the run started.
    pub started_at: DateTime<Utc>,
    /// When the run finished.
    pub finished_at: DateTime<Utc>,
    /// The maker's offer nonce.
    pub seed: u64,
    /// Address the escrow record lived at while open.
    pub escrow: Address,
    /// Address the vault lived at while open.
    pub vault: Address,
    /// Asset A identifier.
    pub mint_a: AssetId,
    /// Asset B identifier.
    pub mint_b: AssetId,
    /// The take receipt.
    pub receipt: TakeReceipt,
    /// Maker balances after settlement.
    pub maker: PartyBalances,
    /// Taker balances after settlement.
    pub taker: PartyBalances,
}

/// Outcome of the cancellation scenario.
#[derive(Debug, Serialize)]
pub struct RefundReport {
    /// Unique id of this run.
    pub run_id: Uuid,
    /// When the run started.
    pub started_at: DateTime<Utc>,
    /// When the run finished.
    pub finished_at: DateTime<Utc>,
    /// The maker's offer nonce.
    pub seed: u64,
    /// Address the escrow record lived at while open.
    pub escrow: Address,
    /// Amount of asset A returned to the maker.
    pub refunded: u64,
    /// Maker balances after the refund.
    pub maker: PartyBalances,
}

// ---------------------------------------------------------------------------
// World setup
// ---------------------------------------------------------------------------

struct World {
    engine: SwapEngine,
    ledger: Arc<Ledger>,
    maker: Wallet,
    taker: Wallet,
    mint_a: AssetId,
    mint_b: AssetId,
}

/// Open the ledger, generate wallets, register assets, run the airdrop.
fn bootstrap(args: &ScenarioArgs) -> Result<World> {
    let ledger = match &args.data_dir {
        Some(dir) => Ledger::open(dir)
            .with_context(|| format!("opening ledger at {}", dir.display()))?,
        None => Ledger::open_temporary().context("opening temporary ledger")?,
    };
    let ledger = Arc::new(ledger);

    let issuer = Wallet::generate("issuer");
    let maker = Wallet::generate("maker");
    let taker = Wallet::generate("taker");

    let info_a = AssetInfo::new("Barter Alpha", "bALF", 6, issuer.address());
    let info_b = AssetInfo::new("Barter Beta", "bBET", 6, issuer.address());
    custody::register_asset(&ledger, &info_a)?;
    custody::register_asset(&ledger, &info_b)?;
    info!(mint_a = %info_a.id, mint_b = %info_b.id, "assets registered");

    // The airdrop: maker starts with A, taker with B.
    custody::issue(&ledger, &info_a.id, &issuer.address(), &maker.address(), FUNDING)?;
    custody::issue(&ledger, &info_b.id, &issuer.address(), &taker.address(), FUNDING)?;
    info!(funding = FUNDING, "parties funded");

    Ok(World {
        engine: SwapEngine::new(Arc::clone(&ledger)),
        ledger,
        maker,
        taker,
        mint_a: info_a.id,
        mint_b: info_b.id,
    })
}

/// Sign an intent with the acting wallet and verify it, yielding the
/// authenticated caller address the engine is allowed to trust.
fn authenticate(wallet: &Wallet, intent: &str) -> Result<Address> {
    let signed = wallet.sign_intent(intent.as_bytes().to_vec());
    match signed.authenticate() {
        Some(address) => Ok(address),
        None => bail!("signature verification failed for {}", wallet.label()),
    }
}

fn party_balances(world: &World, wallet: &Wallet) -> Result<PartyBalances> {
    let store = world.ledger.store();
    Ok(PartyBalances {
        label: wallet.label().to_string(),
        address: wallet.address(),
        asset_a: custody::balance(store, &world.mint_a, &wallet.address())?,
        asset_b: custody::balance(store, &world.mint_b, &wallet.address())?,
    })
}

// ---------------------------------------------------------------------------
// Scenarios
// ---------------------------------------------------------------------------

/// The full three-party trade: make, discover, take, settle.
pub fn run_swap(args: &ScenarioArgs) -> Result<SwapReport> {
    let started_at = Utc::now();
    let run_id = Uuid::new_v4();
    info!(%run_id, deposit = args.deposit, receive = args.receive, "swap scenario starting");

    let world = bootstrap(args)?;

    // -- Make ---------------------------------------------------------------
    let seed: u64 = rand::random();
    let escrow = escrow_address(&world.maker.address(), seed);
    let vault = vault_address(&world.mint_a, &escrow);
    let make_accounts = MakeAccounts {
        maker: world.maker.address(),
        mint_a: world.mint_a,
        mint_b: world.mint_b,
        maker_holding_a: custody::holding_address(&world.mint_a, &world.maker.address()),
        escrow,
        vault,
    };
    let caller = authenticate(
        &world.maker,
        &format!("make seed={seed} deposit={} receive={}", args.deposit, args.receive),
    )?;
    world
        .engine
        .make(&caller, &make_accounts, seed, args.deposit, args.receive)?;

    // -- Discover -----------------------------------------------------------
    // The taker knows only the asset pair it wants. The record address,
    // the maker, the vault, and the maker's receiving holding all come
    // out of the scan result and the public derivation formulas.
    let indexer = EscrowIndexer::new(world.ledger.store());
    let quote = indexer
        .best_quote(&world.mint_a, &world.mint_b)?
        .context("discovery found no open offer for the pair")?;
    info!(
        escrow = %quote.address,
        deposit_amount = quote.deposit_amount,
        receive_amount = quote.record.receive_amount,
        "offer discovered"
    );

    // -- Take ---------------------------------------------------------------
    let record = quote.record;
    let take_accounts = TakeAccounts {
        taker: world.taker.address(),
        maker: record.maker,
        mint_a: record.mint_a,
        mint_b: record.mint_b,
        taker_holding_a: custody::holding_address(&record.mint_a, &world.taker.address()),
        taker_holding_b: custody::holding_address(&record.mint_b, &world.taker.address()),
        maker_holding_b: custody::holding_address(&record.mint_b, &record.maker),
        escrow: quote.address,
        vault: record.vault_address(),
    };
    let caller = authenticate(&world.taker, &format!("take escrow={}", quote.address))?;
    let receipt = world.engine.take(&caller, &take_accounts)?;

    // -- Settle & verify ----------------------------------------------------
    let maker = party_balances(&world, &world.maker)?;
    let taker = party_balances(&world, &world.taker)?;

    ensure!(
        maker.asset_a + taker.asset_a == FUNDING,
        "asset A not conserved: {} + {}",
        maker.asset_a,
        taker.asset_a
    );
    ensure!(
        maker.asset_b + taker.asset_b == FUNDING,
        "asset B not conserved: {} + {}",
        maker.asset_b,
        taker.asset_b
    );
    ensure!(
        !world.ledger.store().contains(&escrow)?,
        "escrow record must be gone after take"
    );
    ensure!(
        !world.ledger.store().contains(&vault)?,
        "vault must be gone after take"
    );

    let report = SwapReport {
        run_id,
        started_at,
        finished_at: Utc::now(),
        seed,
        escrow,
        vault,
        mint_a: world.mint_a,
        mint_b: world.mint_b,
        receipt,
        maker,
        taker,
    };
    info!(%run_id, "swap scenario complete");
    Ok(report)
}

/// The cancellation path: make, then refund, maker made exactly whole.
pub fn run_refund(args: &ScenarioArgs) -> Result<RefundReport> {
    let started_at = Utc::now();
    let run_id = Uuid::new_v4();
    info!(%run_id, deposit = args.deposit, "refund scenario starting");

    let world = bootstrap(args)?;

    let seed: u64 = rand::random();
    let escrow = escrow_address(&world.maker.address(), seed);
    let vault = vault_address(&world.mint_a, &escrow);
    let make_accounts = MakeAccounts {
        maker: world.maker.address(),
        mint_a: world.mint_a,
        mint_b: world.mint_b,
        maker_holding_a: custody::holding_address(&world.mint_a, &world.maker.address()),
        escrow,
        vault,
    };
    let caller = authenticate(
        &world.maker,
        &format!("make seed={seed} deposit={} receive={}", args.deposit, args.receive),
    )?;
    world
        .engine
        .make(&caller, &make_accounts, seed, args.deposit, args.receive)?;

    let refund_accounts = RefundAccounts {
        maker: world.maker.address(),
        mint_a: world.mint_a,
        maker_holding_a: make_accounts.maker_holding_a,
        escrow,
        vault,
    };
    let caller = authenticate(&world.maker, &format!("refund escrow={escrow}"))?;
    let refunded = world.engine.refund(&caller, &refund_accounts)?;

    let maker = party_balances(&world, &world.maker)?;
    ensure!(
        maker.asset_a == FUNDING,
        "maker must be made exactly whole, has {}",
        maker.asset_a
    );
    ensure!(
        !world.ledger.store().contains(&vault)?,
        "vault must be gone after refund"
    );

    let report = RefundReport {
        run_id,
        started_at,
        finished_at: Utc::now(),
        seed,
        escrow,
        refunded,
        maker,
    };
    info!(%run_id, refunded, "refund scenario complete");
    Ok(report)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
