//! Identity error types.

use thiserror::Error;

/// Errors from parsing key material or signing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentityError {
    /// Text is not valid base64url
    #[error("Invalid base64url encoding")]
    InvalidEncoding,

    /// Decoded key or signature has the wrong size
    #[error("Invalid length: expected {expected} bytes, got {actual}")]
    InvalidLength {
        /// Expected length in bytes
        expected: usize,
        /// Actual length in bytes
        actual: usize,
    },

    /// Bytes do not encode a valid curve point
    #[error("Invalid public key")]
    InvalidPublicKey,

    /// Supplied public key is not the one derived from the private seed
    #[error("Public key does not match private key")]
    KeyMismatch,

    /// Signature verification failed
    #[error("Signature verification failed")]
    SignatureVerificationFailed,
}
