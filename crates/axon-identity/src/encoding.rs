//! # base64url Text Encoding
//!
//! Encoding is always unpadded. Decoding accepts input with or without
//! trailing `=` padding.

use crate::IdentityError;
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine;

const B64URL: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new()
        .with_encode_padding(false)
        .with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Encode bytes as unpadded base64url.
pub fn encode_b64url(bytes: &[u8]) -> String {
    B64URL.encode(bytes)
}

/// Decode base64url text.
pub fn decode_b64url(text: &str) -> Result<Vec<u8>, IdentityError> {
    B64URL.decode(text).map_err(|_| IdentityError::InvalidEncoding)
}

/// Decode base64url text into exactly `N` bytes.
pub(crate) fn decode_fixed<const N: usize>(text: &str) -> Result<[u8; N], IdentityError> {
    let bytes = decode_b64url(text)?;
    let actual = bytes.len();
    bytes.try_into().map_err(|_| IdentityError::InvalidLength {
        expected: N,
        actual,
    })
}
