//! # Signed Envelope
//!
//! Builds and opens `SignedMessage`s carrying a connect request.
//!
//! Opening runs four stages in order: decode the payload, verify the
//! signature over the decoded bytes, parse JSON, check the request shape.
//! The broker maps every stage failure to the same denial code; the stage is
//! kept here only for logging.

use axon_identity::{decode_b64url, encode_b64url, sign, verify, IdentityError};
use axon_types::{ConnectRequest, SignedMessage};
use std::fmt;

/// Stage at which an envelope was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvelopeRejection {
    /// Payload is not base64url.
    Decode,
    /// Signature missing, malformed, or not valid for the key.
    Signature,
    /// Decoded payload is not JSON.
    Json,
    /// JSON is not a well-formed connect request.
    Schema,
}

impl fmt::Display for EnvelopeRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Decode => "payload decode",
            Self::Signature => "signature",
            Self::Json => "payload json",
            Self::Schema => "request schema",
        })
    }
}

/// Sign raw payload bytes and wrap them.
pub fn seal(
    payload: &[u8],
    private_key: &str,
    public_key: &str,
) -> Result<SignedMessage, IdentityError> {
    Ok(SignedMessage {
        payload: encode_b64url(payload),
        signature: sign(payload, private_key, public_key)?,
    })
}

/// Serialize `request` to JSON, then [`seal`] it.
pub fn seal_request(
    request: &ConnectRequest,
    private_key: &str,
    public_key: &str,
) -> Result<SignedMessage, IdentityError> {
    // Serializing a struct of plain strings cannot fail.
    let payload = serde_json::to_vec(request).map_err(|_| IdentityError::InvalidEncoding)?;
    seal(&payload, private_key, public_key)
}

/// Verify `message` against `public_key` and parse the request inside.
pub fn open_request(
    message: &SignedMessage,
    public_key: &str,
) -> Result<ConnectRequest, EnvelopeRejection> {
    let payload = decode_b64url(&message.payload).map_err(|_| EnvelopeRejection::Decode)?;
    if !verify(&payload, &message.signature, public_key) {
        return Err(EnvelopeRejection::Signature);
    }
    let value: serde_json::Value =
        serde_json::from_slice(&payload).map_err(|_| EnvelopeRejection::Json)?;
    let request: ConnectRequest =
        serde_json::from_value(value).map_err(|_| EnvelopeRejection::Schema)?;
    if !request.is_well_formed() {
        return Err(EnvelopeRejection::Schema);
    }
    Ok(request)
}
