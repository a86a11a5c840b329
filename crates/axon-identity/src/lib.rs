//! # Axon Identity
//!
//! Ed25519 key generation, signing, verification, and nonce generation.
//!
//! ## Encodings
//!
//! | Item | Raw | Text |
//! |------|-----|------|
//! | public key | 32 bytes | 43 base64url chars |
//! | private key (seed) | 32 bytes | 43 base64url chars |
//! | signature | 64 bytes | 86 base64url chars |
//! | nonce | 16 bytes (default) | 22 base64url chars |
//!
//! All text is unpadded base64url.
//!
//! ## Security Properties
//!
//! - Ed25519 signs the exact payload bytes with no pre-hash.
//! - [`verify`] returns `false` for malformed keys, malformed signatures, and
//!   bad signatures alike. Callers cannot tell which one happened.

#![warn(clippy::all)]

pub mod encoding;
pub mod errors;
pub mod signatures;

pub use encoding::{decode_b64url, encode_b64url};
pub use errors::IdentityError;
pub use signatures::{Ed25519KeyPair, Ed25519PublicKey, Ed25519Signature};

use rand::RngCore;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Default nonce size in bytes.
pub const DEFAULT_NONCE_BYTES: usize = 16;

/// A keypair in its text form.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct EncodedKeyPair {
    /// base64url raw public key.
    pub public_key: String,
    /// base64url raw private key seed.
    pub private_key: String,
}

impl std::fmt::Debug for EncodedKeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EncodedKeyPair")
            .field("public_key", &self.public_key)
            .field("private_key", &"<redacted>")
            .finish()
    }
}

/// Generate a fresh Ed25519 keypair.
pub fn generate_keypair() -> EncodedKeyPair {
    let keypair = Ed25519KeyPair::generate();
    EncodedKeyPair {
        public_key: keypair.public_key().to_b64url(),
        private_key: keypair.seed_b64url(),
    }
}

/// Sign `payload` and return the base64url signature.
///
/// Both key halves are required; the public half must be the one derived
/// from the private seed.
pub fn sign(payload: &[u8], private_key: &str, public_key: &str) -> Result<String, IdentityError> {
    let keypair = Ed25519KeyPair::from_encoded(private_key, public_key)?;
    Ok(keypair.sign(payload).to_b64url())
}

/// Verify a base64url signature over `payload`.
pub fn verify(payload: &[u8], signature: &str, public_key: &str) -> bool {
    let Ok(public_key) = Ed25519PublicKey::from_b64url(public_key) else {
        return false;
    };
    let Ok(signature) = Ed25519Signature::from_b64url(signature) else {
        return false;
    };
    public_key.verify(payload, &signature).is_ok()
}

/// Generate a base64url nonce from `n_bytes` of OS randomness.
pub fn generate_nonce(n_bytes: usize) -> String {
    let mut bytes = vec![0u8; n_bytes];
    rand::rngs::OsRng.fill_bytes(&mut bytes);
    encode_b64url(&bytes)
}
