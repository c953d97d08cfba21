//! # Wallets — Client-Side Key Management
//!
//! The protocol engine receives authenticated caller addresses; proving
//! who the caller is happens out here, in the client layer. A [`Wallet`]
//! owns a keypair and signs intents; the harness verifies each
//! [`SignedIntent`] before handing its address to the engine, the same
//! gate a transaction-signature check would be on a real deployment.

use tracing::debug;

use barter_ledger::address::Address;
use barter_ledger::identity::{Keypair, PublicKey, Signature};

/// A participant wallet: a label for the logs and a keypair for everything
/// else.
pub struct Wallet {
    label: &'static str,
    keypair: Keypair,
}

impl Wallet {
    /// Generate a fresh wallet.
    pub fn generate(label: &'static str) -> Self {
        let wallet = Self {
            label,
            keypair: Keypair::generate(),
        };
        debug!(label, address = %wallet.address(), "wallet generated");
        wallet
    }

    /// The wallet's ledger address.
    pub fn address(&self) -> Address {
        self.keypair.address()
    }

    /// The wallet's label, for logs and reports.
    pub fn label(&self) -> &'static str {
        self.label
    }

    /// Sign an intent payload.
    pub fn sign_intent(&self, payload: impl Into<Vec<u8>>) -> SignedIntent {
        let payload = payload.into();
        SignedIntent {
            public_key: self.keypair.public_key(),
            signature: self.keypair.sign(&payload),
            payload,
        }
    }
}

/// An intent payload with the signature that authenticates its author.
pub struct SignedIntent {
    /// The signer's public key.
    pub public_key: PublicKey,
    /// Signature over `payload`.
    pub signature: Signature,
    /// The signed bytes.
    pub payload: Vec<u8>,
}

impl SignedIntent {
    /// Verify the signature and return the authenticated address.
    ///
    /// `None` means the signature does not check out and the intent must
    /// be discarded — there is no partially-authenticated state.
    pub fn authenticate(&self) -> Option<Address> {
        if self.public_key.verify(&self.payload, &self.signature) {
            Some(self.public_key.address())
        } else {
            None
        }
    }
}
