//! Canonical payload encoding
//!
//! `CanonicalPayload` holds the exact string that is signed. It can only be
//! produced by [`CanonicalPayload::encode`] on the issuing side or wrapped
//! verbatim from the wire with [`CanonicalPayload::from_transmitted`] on the
//! verifying side, so signing and verification never operate on an
//! accidental re-serialization.
//!
//! ## Encoding rules
//!
//! - Fields in fixed order: `id`, `name`, `role`, `issuedAt`, `expiresAt`, `publicKey`.
//! - Compact separators, no whitespace.
//! - Integers without decimal point or exponent.
//! - Strings UTF-8 with minimal escaping (`"`, `\` and control characters only).
//!
//! Decoding accepts any syntactically valid JSON object of the same shape,
//! in any key order, and is only used to read fields out of a payload.

use crate::credential::CredentialPayload;
use crate::error::CodecError;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CanonicalPayload(String);

impl CanonicalPayload {
    pub fn encode(payload: &CredentialPayload) -> Result<Self, CodecError> {
        serde_json::to_string(payload)
            .map(Self)
            .map_err(|e| CodecError::InvalidPayload(e.to_string()))
    }

    /// Wrap a payload string exactly as received
    pub fn from_transmitted(payload: impl Into<String>) -> Self {
        Self(payload.into())
    }

    pub fn decode(&self) -> Result<CredentialPayload, CodecError> {
        decode(&self.0)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The signed bytes
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl std::fmt::Display for CanonicalPayload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

pub fn encode(payload: &CredentialPayload) -> Result<CanonicalPayload, CodecError> {
    CanonicalPayload::encode(payload)
}

pub fn decode(payload: &str) -> Result<CredentialPayload, CodecError> {
    serde_json::from_str(payload).map_err(|e| CodecError::InvalidPayload(e.to_string()))
}
