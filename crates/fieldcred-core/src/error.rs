//! Error types for fieldcred
//!
//! Issuance and verification fail with separate enums so callers can match
//! exhaustively on the outcomes each side can actually produce. Every variant
//! carries a stable machine-readable kind for wire responses.

use thiserror::Error;

/// A role identifier that is not part of the registry
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Role not found: {0}")]
pub struct RoleNotFound(pub String);

/// Failures while encoding or decoding the transport layers
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    #[error("Blob is not valid base64: {0}")]
    InvalidBlob(String),

    #[error("Envelope is not valid: {0}")]
    InvalidEnvelope(String),

    #[error("Payload is not valid: {0}")]
    InvalidPayload(String),
}

/// Errors raised while issuing a credential
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IssueError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Role not found: {0}")]
    RoleNotFound(String),

    /// The issuer key is unusable. Operational, not a per-request fault.
    #[error("Signing error: {0}")]
    Signing(String),

    /// Payload or envelope could not be encoded; the key is not involved
    #[error("Encoding error: {0}")]
    Encoding(String),
}

impl IssueError {
    pub fn kind(&self) -> &'static str {
        match self {
            IssueError::Validation(_) => "validation_error",
            IssueError::RoleNotFound(_) => "role_not_found",
            IssueError::Signing(_) => "signing_error",
            IssueError::Encoding(_) => "encoding_error",
        }
    }

    /// Whether the issuing process as a whole is unable to operate
    pub fn is_fatal(&self) -> bool {
        matches!(self, IssueError::Signing(_))
    }
}

impl From<RoleNotFound> for IssueError {
    fn from(err: RoleNotFound) -> Self {
        IssueError::RoleNotFound(err.0)
    }
}

impl From<CodecError> for IssueError {
    fn from(err: CodecError) -> Self {
        IssueError::Encoding(err.to_string())
    }
}

/// Errors raised while verifying a credential blob
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VerifyError {
    #[error("Malformed credential: {0}")]
    Malformed(String),

    #[error("Invalid signature")]
    InvalidSignature,

    #[error("Credential expired at {expired_at} (current time {current_time})")]
    Expired { expired_at: i64, current_time: i64 },
}

impl VerifyError {
    pub fn kind(&self) -> &'static str {
        match self {
            VerifyError::Malformed(_) => "malformed_credential",
            VerifyError::InvalidSignature => "invalid_signature",
            VerifyError::Expired { .. } => "expired",
        }
    }
}

impl From<CodecError> for VerifyError {
    fn from(err: CodecError) -> Self {
        VerifyError::Malformed(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds_are_stable() {
        assert_eq!(IssueError::Validation("x".into()).kind(), "validation_error");
        assert_eq!(IssueError::RoleNotFound("x".into()).kind(), "role_not_found");
        assert_eq!(IssueError::Signing("x".into()).kind(), "signing_error");
        assert_eq!(IssueError::Encoding("x".into()).kind(), "encoding_error");
        assert_eq!(VerifyError::Malformed("x".into()).kind(), "malformed_credential");
        assert_eq!(VerifyError::InvalidSignature.kind(), "invalid_signature");
        assert_eq!(
            VerifyError::Expired {
                expired_at: 1,
                current_time: 2
            }
            .kind(),
            "expired"
        );
    }

    #[test]
    fn test_only_signing_is_fatal() {
        assert!(IssueError::Signing("key missing".into()).is_fatal());
        assert!(!IssueError::Validation("empty id".into()).is_fatal());
        assert!(!IssueError::from(RoleNotFound("dragon_rider".into())).is_fatal());
    }

    #[test]
    fn test_codec_failures_are_not_signer_failures() {
        let err = IssueError::from(CodecError::InvalidEnvelope("bad".into()));
        assert_eq!(err.kind(), "encoding_error");
        assert!(!err.is_fatal());
    }
}
