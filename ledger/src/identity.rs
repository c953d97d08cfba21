//! # Participant Identities
//!
//! Ed25519 keypairs for everyone who touches the ledger: makers, takers,
//! asset issuers. A participant's address is `BLAKE3(verifying_key)`,
//! Bech32-encoded for humans (see [`crate::address`]).
//!
//! Key management proper — storage, rotation, mnemonics — is a wallet
//! concern and lives with the client. This module provides only the
//! primitives: generate, sign, verify.
//!
//! ## Why Ed25519?
//!
//! - Deterministic signatures, no nonce management to get wrong.
//! - 32+32 byte keys, 64-byte signatures. Compact and sufficient.
//! - Well-audited constant-time implementations (`ed25519-dalek`).
//!
//! Private keys are zeroized on drop and never logged. Keep it that way.

use ed25519_dalek::{
    Signature as DalekSignature, Signer, SigningKey, Verifier, VerifyingKey, SECRET_KEY_LENGTH,
};
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::address::Address;

// ---------------------------------------------------------------------------
// Keypair
// ---------------------------------------------------------------------------

/// An Ed25519 keypair backing one participant identity.
///
/// Deliberately does **not** implement `Serialize`/`Deserialize` —
/// serializing private keys should be a conscious act, not a side effect
/// of dumping a struct to JSON. Use [`to_secret_bytes`](Self::to_secret_bytes)
/// explicitly if you must persist one.
///
/// # Examples
///
/// ```
/// use barter_ledger::identity::Keypair;
///
/// let kp = Keypair::generate();
/// let sig = kp.sign(b"make escrow, seed 42");
/// assert!(kp.public_key().verify(b"make escrow, seed 42", &sig));
/// ```
pub struct Keypair {
    signing_key: SigningKey,
}

impl Keypair {
    /// Generate a fresh keypair from the OS cryptographic RNG.
    pub fn generate() -> Self {
        Self {
            signing_key: SigningKey::generate(&mut OsRng),
        }
    }

    /// Construct a keypair deterministically from a 32-byte seed.
    ///
    /// A weak seed makes a weak key — feed this from a CSPRNG or a
    /// proper KDF, nothing else.
    pub fn from_seed(seed: &[u8; SECRET_KEY_LENGTH]) -> Self {
        Self {
            signing_key: SigningKey::from_bytes(seed),
        }
    }

    /// The public half of this identity.
    pub fn public_key(&self) -> PublicKey {
        PublicKey {
            bytes: self.signing_key.verifying_key().to_bytes(),
        }
    }

    /// The ledger address of this identity: `BLAKE3(public_key)`.
    pub fn address(&self) -> Address {
        Address::from_public_key(&self.public_key())
    }

    /// Sign a message.
    pub fn sign(&self, message: &[u8]) -> Signature {
        Signature {
            bytes: self.signing_key.sign(message).to_bytes().to_vec(),
        }
    }

    /// Export the raw 32-byte secret. Handle with care.
    pub fn to_secret_bytes(&self) -> [u8; SECRET_KEY_LENGTH] {
        self.signing_key.to_bytes()
    }
}

impl fmt::Debug for Keypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Never print key material, not even in debug output.
        write!(f, "Keypair({})", self.address())
    }
}

// ---------------------------------------------------------------------------
// PublicKey
// ---------------------------------------------------------------------------

/// The public half of an identity, safe to share with the world.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicKey {
    bytes: [u8; 32],
}

impl PublicKey {
    /// Raw 32-byte key material.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.bytes
    }

    /// Reconstruct from raw bytes. The point validity check happens at
    /// verification time, so this never fails.
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self { bytes }
    }

    /// The ledger address of this key.
    pub fn address(&self) -> Address {
        Address::from_public_key(self)
    }

    /// Verify a signature over a message.
    ///
    /// Returns `false` for malformed keys, malformed signatures, or
    /// honest mismatches alike — callers get a boolean, not a forensic
    /// report, and that is intentional.
    pub fn verify(&self, message: &[u8], signature: &Signature) -> bool {
        let Ok(verifying_key) = VerifyingKey::from_bytes(&self.bytes) else {
            return false;
        };
        let Ok(sig_bytes) = <[u8; 64]>::try_from(signature.bytes.as_slice()) else {
            return false;
        };
        let sig = DalekSignature::from_bytes(&sig_bytes);
        verifying_key.verify(message, &sig).is_ok()
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({}…)", &hex::encode(self.bytes)[..12])
    }
}

/// An Ed25519 signature over a message. Always 64 bytes; anything else
/// simply fails verification.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signature {
    bytes: Vec<u8>,
}

impl Signature {
    /// Raw signature bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Signature({}…)", hex::encode(&self.bytes[..8.min(self.bytes.len())]))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sign_verify_roundtrip() {
        let kp = Keypair::generate();
        let msg = b"deposit 1000000 of asset A";
        let sig = kp.sign(msg);
        assert!(kp.public_key().verify(msg, &sig));
    }

    #[test]
    fn tampered_message_rejected() {
        let kp = Keypair::generate();
        let sig = kp.sign(b"original");
        assert!(!kp.public_key().verify(b"tampered", &sig));
    }

    #[test]
    fn wrong_key_rejected() {
        let kp1 = Keypair::generate();
        let kp2 = Keypair::generate();
        let sig = kp1.sign(b"message");
        assert!(!kp2.public_key().verify(b"message", &sig));
    }

    #[test]
    fn from_seed_is_deterministic() {
        let seed = [9u8; 32];
        let kp1 = Keypair::from_seed(&seed);
        let kp2 = Keypair::from_seed(&seed);
        assert_eq!(kp1.address(), kp2.address());
    }

    #[test]
    fn distinct_keys_distinct_addresses() {
        let a = Keypair::generate().address();
        let b = Keypair::generate().address();
        assert_ne!(a, b);
    }

    #[test]
    fn truncated_signature_fails_closed() {
        let kp = Keypair::generate();
        let mut sig = kp.sign(b"message");
        sig.bytes.truncate(10);
        assert!(!kp.public_key().verify(b"message", &sig));
    }
}
