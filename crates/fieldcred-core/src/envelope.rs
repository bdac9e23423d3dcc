//! Signed envelope and blob transport encoding
//!
//! The blob is standard, padded base64 of the compact JSON envelope
//! `{"payload":"<canonical payload>","signature":"<base64 signature>"}`.

use base64::{engine::general_purpose::STANDARD, Engine};
use serde::{Deserialize, Serialize};

use crate::canonical::CanonicalPayload;
use crate::error::CodecError;

/// Canonical payload string plus the issuer signature over its bytes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedEnvelope {
    pub payload: String,
    pub signature: String,
}

impl SignedEnvelope {
    pub fn new(payload: &CanonicalPayload, signature: impl Into<String>) -> Self {
        Self {
            payload: payload.as_str().to_string(),
            signature: signature.into(),
        }
    }

    /// The payload exactly as carried by the envelope
    pub fn canonical_payload(&self) -> CanonicalPayload {
        CanonicalPayload::from_transmitted(self.payload.clone())
    }

    pub fn to_blob(&self) -> Result<String, CodecError> {
        let json =
            serde_json::to_vec(self).map_err(|e| CodecError::InvalidEnvelope(e.to_string()))?;
        Ok(encode_blob(&json))
    }

    pub fn from_blob(blob: &str) -> Result<Self, CodecError> {
        let json = decode_blob(blob)?;
        serde_json::from_slice(&json).map_err(|e| CodecError::InvalidEnvelope(e.to_string()))
    }
}

pub fn encode_blob(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

/// Decode a blob, ignoring surrounding whitespace left by scanners
pub fn decode_blob(blob: &str) -> Result<Vec<u8>, CodecError> {
    STANDARD
        .decode(blob.trim())
        .map_err(|e| CodecError::InvalidBlob(e.to_string()))
}
