//! # Connect Protocol
//!
//! Messages exchanged between a patient agent and the broker.
//!
//! A request travels as a `SignedMessage`: the `payload` is the base64url
//! encoding of the request JSON and the `signature` is an Ed25519 signature
//! over exactly those JSON bytes.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Protocol version every connect request must carry.
pub const PROTOCOL_VERSION: &str = "1.0.0";

/// Type tag of a connect request.
pub const CONNECT_REQUEST_TYPE: &str = "connect_request";

/// Returns true if `value` is non-empty and uses only the base64url alphabet
/// (`A-Z a-z 0-9 - _`, no padding).
pub fn is_base64url(value: &str) -> bool {
    !value.is_empty()
        && value
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
}

// =============================================================================
// REQUEST
// =============================================================================

/// Signed wrapper around a base64url-encoded payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedMessage {
    /// base64url of the exact payload bytes that were signed.
    pub payload: String,
    /// base64url Ed25519 signature over the decoded payload bytes.
    pub signature: String,
}

/// Connect request sent by a patient agent.
///
/// Unknown extra fields are tolerated on the wire; the required fields are
/// checked by [`ConnectRequest::is_well_formed`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectRequest {
    /// Pinned to [`PROTOCOL_VERSION`].
    pub version: String,
    /// Pinned to [`CONNECT_REQUEST_TYPE`].
    #[serde(rename = "type")]
    pub message_type: String,
    /// RFC 3339 timestamp of the request.
    pub timestamp: String,
    /// Single-use nonce, base64url.
    pub nonce: String,
    pub patient_agent_id: String,
    pub provider_npi: String,
    /// base64url of the raw 32-byte Ed25519 public key.
    pub patient_public_key: String,
}

impl ConnectRequest {
    /// Build a request with the pinned version and type tag.
    pub fn new(
        timestamp: impl Into<String>,
        nonce: impl Into<String>,
        patient_agent_id: impl Into<String>,
        provider_npi: impl Into<String>,
        patient_public_key: impl Into<String>,
    ) -> Self {
        Self {
            version: PROTOCOL_VERSION.to_string(),
            message_type: CONNECT_REQUEST_TYPE.to_string(),
            timestamp: timestamp.into(),
            nonce: nonce.into(),
            patient_agent_id: patient_agent_id.into(),
            provider_npi: provider_npi.into(),
            patient_public_key: patient_public_key.into(),
        }
    }

    /// Shape check: pinned literals match and the key material uses the
    /// base64url alphabet.
    pub fn is_well_formed(&self) -> bool {
        self.version == PROTOCOL_VERSION
            && self.message_type == CONNECT_REQUEST_TYPE
            && is_base64url(&self.nonce)
            && is_base64url(&self.patient_public_key)
    }
}

// =============================================================================
// OUTCOMES
// =============================================================================

/// Categorical denial reasons, in pipeline discovery order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DenialCode {
    SignatureInvalid,
    NonceReplayed,
    TimestampExpired,
    ProviderNotFound,
    CredentialsInvalid,
    EndpointUnavailable,
}

impl DenialCode {
    /// All codes in discovery order.
    pub const ALL: [DenialCode; 6] = [
        DenialCode::SignatureInvalid,
        DenialCode::NonceReplayed,
        DenialCode::TimestampExpired,
        DenialCode::ProviderNotFound,
        DenialCode::CredentialsInvalid,
        DenialCode::EndpointUnavailable,
    ];

    /// Wire spelling of the code.
    pub fn as_str(&self) -> &'static str {
        match self {
            DenialCode::SignatureInvalid => "SIGNATURE_INVALID",
            DenialCode::NonceReplayed => "NONCE_REPLAYED",
            DenialCode::TimestampExpired => "TIMESTAMP_EXPIRED",
            DenialCode::ProviderNotFound => "PROVIDER_NOT_FOUND",
            DenialCode::CredentialsInvalid => "CREDENTIALS_INVALID",
            DenialCode::EndpointUnavailable => "ENDPOINT_UNAVAILABLE",
        }
    }

    /// Fixed human-readable message. Never entity-specific.
    pub fn message(&self) -> &'static str {
        match self {
            DenialCode::SignatureInvalid => "Request signature verification failed",
            DenialCode::NonceReplayed => "Request nonce has already been used",
            DenialCode::TimestampExpired => {
                "Request timestamp is outside the acceptable window"
            }
            DenialCode::ProviderNotFound => "Provider NPI not found in registry",
            DenialCode::CredentialsInvalid => "Provider credentials are not in active status",
            DenialCode::EndpointUnavailable => "Provider endpoint is not available",
        }
    }

    /// True when the request itself was malformed or stale (a transport maps
    /// these to 400); false when the target was the problem (403).
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            DenialCode::SignatureInvalid | DenialCode::NonceReplayed | DenialCode::TimestampExpired
        )
    }
}

impl fmt::Display for DenialCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Approved connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectGrant {
    pub connection_id: String,
    pub provider_npi: String,
    /// URL of the resolved neuron endpoint.
    pub neuron_endpoint: String,
    pub protocol_version: String,
}

/// Denied connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectDenial {
    pub connection_id: String,
    pub code: DenialCode,
    pub message: String,
}

impl ConnectDenial {
    /// Build a denial whose message is the fixed text for `code`.
    pub fn new(connection_id: impl Into<String>, code: DenialCode) -> Self {
        Self {
            connection_id: connection_id.into(),
            code,
            message: code.message().to_string(),
        }
    }
}

/// Result of one broker invocation, tagged on the wire by `type`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ConnectOutcome {
    #[serde(rename = "connect_grant")]
    Grant(ConnectGrant),
    #[serde(rename = "connect_denial")]
    Denial(ConnectDenial),
}

impl ConnectOutcome {
    pub fn is_grant(&self) -> bool {
        matches!(self, ConnectOutcome::Grant(_))
    }

    pub fn connection_id(&self) -> &str {
        match self {
            ConnectOutcome::Grant(grant) => &grant.connection_id,
            ConnectOutcome::Denial(denial) => &denial.connection_id,
        }
    }

    /// The denial code, if this outcome is a denial.
    pub fn denial_code(&self) -> Option<DenialCode> {
        match self {
            ConnectOutcome::Grant(_) => None,
            ConnectOutcome::Denial(denial) => Some(denial.code),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base64url_alphabet() {
        assert!(is_base64url("abcXYZ019-_"));
        assert!(!is_base64url(""));
        assert!(!is_base64url("abc+def"));
        assert!(!is_base64url("abc/def"));
        assert!(!is_base64url("abcd=="));
        assert!(!is_base64url("ab cd"));
    }

    #[test]
    fn test_new_request_is_well_formed() {
        let req = ConnectRequest::new(
            "2026-01-01T00:00:00.000Z",
            "bm9uY2Utbm9uY2Utbm9uY2U",
            "agent-1",
            "1679576722",
            "a2V5LWtleS1rZXk",
        );
        assert!(req.is_well_formed());
    }

    #[test]
    fn test_wrong_version_is_not_well_formed() {
        let mut req = ConnectRequest::new("t", "nonce", "agent", "npi", "key");
        req.version = "2.0.0".to_string();
        assert!(!req.is_well_formed());
    }

    #[test]
    fn test_padded_nonce_is_not_well_formed() {
        let req = ConnectRequest::new("t", "bm9uY2U=", "agent", "npi", "key");
        assert!(!req.is_well_formed());
    }

    #[test]
    fn test_request_type_field_uses_wire_name() {
        let req = ConnectRequest::new("t", "n", "a", "p", "k");
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["type"], "connect_request");
        assert!(json.get("message_type").is_none());
    }

    #[test]
    fn test_request_tolerates_extra_fields() {
        let json = r#"{"version":"1.0.0","type":"connect_request","timestamp":"t",
            "nonce":"n","patient_agent_id":"a","provider_npi":"p",
            "patient_public_key":"k","extra":true}"#;
        let req: ConnectRequest = serde_json::from_str(json).unwrap();
        assert!(req.is_well_formed());
    }

    #[test]
    fn test_denial_code_wire_spelling() {
        for code in DenialCode::ALL {
            let json = serde_json::to_string(&code).unwrap();
            assert_eq!(json, format!("\"{}\"", code.as_str()));
        }
    }

    #[test]
    fn test_denial_messages_are_distinct() {
        let mut messages: Vec<_> = DenialCode::ALL.iter().map(|c| c.message()).collect();
        messages.sort_unstable();
        messages.dedup();
        assert_eq!(messages.len(), DenialCode::ALL.len());
    }

    #[test]
    fn test_client_error_split() {
        assert!(DenialCode::SignatureInvalid.is_client_error());
        assert!(DenialCode::TimestampExpired.is_client_error());
        assert!(!DenialCode::ProviderNotFound.is_client_error());
        assert!(!DenialCode::EndpointUnavailable.is_client_error());
    }

    #[test]
    fn test_outcome_tagging() {
        let outcome = ConnectOutcome::Denial(ConnectDenial::new("c-1", DenialCode::NonceReplayed));
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["type"], "connect_denial");
        assert_eq!(json["code"], "NONCE_REPLAYED");
        assert_eq!(json["message"], "Request nonce has already been used");

        let grant = ConnectOutcome::Grant(ConnectGrant {
            connection_id: "c-2".into(),
            provider_npi: "1245319599".into(),
            neuron_endpoint: "https://neuron.example".into(),
            protocol_version: "1.0.0".into(),
        });
        let json = serde_json::to_value(&grant).unwrap();
        assert_eq!(json["type"], "connect_grant");
        assert_eq!(json["neuron_endpoint"], "https://neuron.example");
        assert_eq!(grant.connection_id(), "c-2");
        assert!(grant.denial_code().is_none());
    }
}
