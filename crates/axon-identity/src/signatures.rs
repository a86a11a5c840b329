//! # Ed25519 Keys and Signatures
//!
//! Raw-byte wrappers with base64url text forms. Private keys are the 32-byte
//! seed; the matching public key is derived from it.

use crate::encoding::{decode_fixed, encode_b64url};
use crate::IdentityError;
use ed25519_dalek::{Signer, SigningKey, Verifier, VerifyingKey};
use zeroize::Zeroizing;

/// Ed25519 public key (32 bytes).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Ed25519PublicKey([u8; 32]);

impl Ed25519PublicKey {
    /// Create from bytes, rejecting anything that is not a curve point.
    pub fn from_bytes(bytes: [u8; 32]) -> Result<Self, IdentityError> {
        VerifyingKey::from_bytes(&bytes).map_err(|_| IdentityError::InvalidPublicKey)?;
        Ok(Self(bytes))
    }

    /// Parse from base64url text.
    pub fn from_b64url(text: &str) -> Result<Self, IdentityError> {
        Self::from_bytes(decode_fixed::<32>(text)?)
    }

    /// Get raw bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// base64url text form.
    pub fn to_b64url(&self) -> String {
        encode_b64url(&self.0)
    }

    /// Verify a signature over `message`.
    pub fn verify(&self, message: &[u8], signature: &Ed25519Signature) -> Result<(), IdentityError> {
        let verifying_key =
            VerifyingKey::from_bytes(&self.0).map_err(|_| IdentityError::InvalidPublicKey)?;

        let sig = ed25519_dalek::Signature::from_bytes(&signature.0);

        verifying_key
            .verify(message, &sig)
            .map_err(|_| IdentityError::SignatureVerificationFailed)
    }
}

/// Ed25519 signature (64 bytes).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Ed25519Signature([u8; 64]);

impl Ed25519Signature {
    /// Create from bytes.
    pub fn from_bytes(bytes: [u8; 64]) -> Self {
        Self(bytes)
    }

    /// Parse from base64url text.
    pub fn from_b64url(text: &str) -> Result<Self, IdentityError> {
        Ok(Self(decode_fixed::<64>(text)?))
    }

    /// Get raw bytes.
    pub fn as_bytes(&self) -> &[u8; 64] {
        &self.0
    }

    /// base64url text form.
    pub fn to_b64url(&self) -> String {
        encode_b64url(&self.0)
    }
}

/// Ed25519 keypair. The signing key zeroizes itself on drop.
pub struct Ed25519KeyPair {
    signing_key: SigningKey,
}

impl Ed25519KeyPair {
    /// Generate a random keypair from OS randomness.
    pub fn generate() -> Self {
        let signing_key = SigningKey::generate(&mut rand::rngs::OsRng);
        Self { signing_key }
    }

    /// Create from secret seed (32 bytes).
    pub fn from_seed(seed: [u8; 32]) -> Self {
        let signing_key = SigningKey::from_bytes(&seed);
        Self { signing_key }
    }

    /// Rebuild from the text forms of both halves.
    pub fn from_encoded(private_key: &str, public_key: &str) -> Result<Self, IdentityError> {
        let seed = Zeroizing::new(decode_fixed::<32>(private_key)?);
        let expected = Ed25519PublicKey::from_b64url(public_key)?;
        let keypair = Self::from_seed(*seed);
        if keypair.public_key() != expected {
            return Err(IdentityError::KeyMismatch);
        }
        Ok(keypair)
    }

    /// Get public key.
    pub fn public_key(&self) -> Ed25519PublicKey {
        Ed25519PublicKey(self.signing_key.verifying_key().to_bytes())
    }

    /// Sign a message. Deterministic for a given key and message.
    pub fn sign(&self, message: &[u8]) -> Ed25519Signature {
        Ed25519Signature(self.signing_key.sign(message).to_bytes())
    }

    /// Secret seed as base64url text.
    pub fn seed_b64url(&self) -> String {
        let seed = Zeroizing::new(self.signing_key.to_bytes());
        encode_b64url(seed.as_ref())
    }
}
