//! Credential payload
//!
//! The logical content of a field credential. It is signed only in its
//! canonical form, see [`crate::canonical`].

use serde::{Deserialize, Serialize};

use crate::role::Role;

pub const MILLIS_PER_HOUR: i64 = 3_600_000;

/// Validity window used when a request does not specify one
pub const DEFAULT_EXPIRES_IN_HOURS: i64 = 24;

/// Signed content of a field credential
///
/// Field declaration order is the canonical wire order; do not reorder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialPayload {
    pub id: String,

    pub name: String,

    pub role: Role,

    /// Milliseconds since the Unix epoch
    pub issued_at: i64,

    /// Milliseconds since the Unix epoch
    pub expires_at: i64,

    /// Base64 Ed25519 public key of the single-use holder keypair.
    /// Identifies the credential; no verification step relies on it.
    pub public_key: String,
}

impl CredentialPayload {
    /// A credential is expired from `expires_at` onwards
    pub fn is_expired_at(&self, now_ms: i64) -> bool {
        now_ms >= self.expires_at
    }

    pub fn time_until_expiry_ms(&self, now_ms: i64) -> i64 {
        self.expires_at - now_ms
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(expires_at: i64) -> CredentialPayload {
        CredentialPayload {
            id: "VOL001".into(),
            name: "Test User".into(),
            role: Role::Medic,
            issued_at: 0,
            expires_at,
            public_key: "AAAA".into(),
        }
    }

    #[test]
    fn test_expiry_boundary_is_inclusive() {
        let p = payload(1_000);
        assert!(!p.is_expired_at(999));
        assert!(p.is_expired_at(1_000));
        assert!(p.is_expired_at(1_001));
    }

    #[test]
    fn test_time_until_expiry() {
        let p = payload(MILLIS_PER_HOUR);
        assert_eq!(p.time_until_expiry_ms(0), MILLIS_PER_HOUR);
    }
}
