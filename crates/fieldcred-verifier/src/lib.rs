//! fieldcred Verifier
//!
//! Offline verification of credential blobs against a pre-distributed
//! issuer public key. No network, no state: a verdict is a pure function of
//! the blob, the issuer key and the current time.
//!
//! Pipeline:
//! 1. base64-decode the blob
//! 2. parse the `{payload, signature}` envelope
//! 3. decode the signature
//! 4. read `expiresAt` from the payload and reject if `now >= expiresAt`
//! 5. verify the signature over the payload string exactly as transmitted
//!
//! Expiry is evaluated before the signature, so an unauthenticated caller
//! can tell "expired" apart from other failures. A payload that cannot be
//! decoded at step 4 falls through to the signature check and is reported
//! as an invalid signature unless the issuer really signed it.
//!
//! Blobs are bearer credentials: there is no revocation or replay
//! protection, and a blob verifies as often as it is presented until it
//! expires.

use std::sync::Arc;

use fieldcred_core::{Clock, Role, SignedEnvelope, SystemClock, VerifyError};
use fieldcred_crypto::{CryptoError, PublicKey, Signature};
use serde::{Deserialize, Serialize};

/// Fields of a credential that passed every check
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifiedCredential {
    pub id: String,
    pub name: String,
    pub role: Role,
    pub issued_at: i64,
    pub expires_at: i64,
    /// Informational only; carries no trust
    pub holder_public_key: String,
    pub time_until_expiry_ms: i64,
}

impl VerifiedCredential {
    pub fn permissions(&self) -> &'static [&'static str] {
        self.role.permissions()
    }
}

/// Credential verifier bound to one issuer key
pub struct CredentialVerifier {
    issuer_key: PublicKey,
    clock: Arc<dyn Clock>,
}

impl CredentialVerifier {
    pub fn new(issuer_key: PublicKey) -> Self {
        Self::with_clock(issuer_key, Arc::new(SystemClock))
    }

    pub fn with_clock(issuer_key: PublicKey, clock: Arc<dyn Clock>) -> Self {
        Self { issuer_key, clock }
    }

    /// Build from a base64 issuer key as distributed to field devices
    pub fn from_base64(issuer_key: &str) -> Result<Self, CryptoError> {
        Ok(Self::new(PublicKey::from_base64(issuer_key)?))
    }

    pub fn issuer_key(&self) -> &PublicKey {
        &self.issuer_key
    }

    pub fn verify(&self, blob: &str) -> Result<VerifiedCredential, VerifyError> {
        self.verify_at(blob, self.clock.now_millis())
    }

    pub fn verify_at(&self, blob: &str, now: i64) -> Result<VerifiedCredential, VerifyError> {
        let result = verify_blob(blob, &self.issuer_key, now);
        if let Err(err) = &result {
            tracing::debug!(kind = err.kind(), "Rejected field credential");
        }
        result
    }
}

/// Verify `blob` against `issuer_key` at time `now` (ms since epoch)
pub fn verify_blob(
    blob: &str,
    issuer_key: &PublicKey,
    now: i64,
) -> Result<VerifiedCredential, VerifyError> {
    let envelope = SignedEnvelope::from_blob(blob)?;

    let signature = Signature::from_base64(&envelope.signature)
        .map_err(|_| VerifyError::Malformed("signature is not a valid encoding".into()))?;

    let canonical = envelope.canonical_payload();
    let decoded = canonical.decode();

    if let Ok(payload) = &decoded {
        if payload.is_expired_at(now) {
            return Err(VerifyError::Expired {
                expired_at: payload.expires_at,
                current_time: now,
            });
        }
    }

    issuer_key
        .verify(&canonical, &signature)
        .map_err(|_| VerifyError::InvalidSignature)?;

    let payload = decoded?;
    Ok(VerifiedCredential {
        time_until_expiry_ms: payload.time_until_expiry_ms(now),
        id: payload.id,
        name: payload.name,
        role: payload.role,
        issued_at: payload.issued_at,
        expires_at: payload.expires_at,
        holder_public_key: payload.public_key,
    })
}

/// Volunteer details as reported in a verdict
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VolunteerInfo {
    pub id: String,
    pub name: String,
    pub role: Role,
    pub issued_at: i64,
    pub expires_at: i64,
    pub public_key: String,
}

/// Wire form of a verification outcome
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verdict {
    pub valid: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volunteer: Option<VolunteerInfo>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_until_expiry_ms: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expired_at: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_time: Option<i64>,
}

impl Verdict {
    fn rejected(error: &VerifyError) -> Self {
        let (expired_at, current_time) = match error {
            VerifyError::Expired {
                expired_at,
                current_time,
            } => (Some(*expired_at), Some(*current_time)),
            _ => (None, None),
        };
        Self {
            valid: false,
            volunteer: None,
            time_until_expiry_ms: None,
            error: Some(error.kind().to_string()),
            expired_at,
            current_time,
        }
    }
}

impl From<VerifiedCredential> for Verdict {
    fn from(credential: VerifiedCredential) -> Self {
        Self {
            valid: true,
            time_until_expiry_ms: Some(credential.time_until_expiry_ms),
            volunteer: Some(VolunteerInfo {
                id: credential.id,
                name: credential.name,
                role: credential.role,
                issued_at: credential.issued_at,
                expires_at: credential.expires_at,
                public_key: credential.holder_public_key,
            }),
            error: None,
            expired_at: None,
            current_time: None,
        }
    }
}

impl From<Result<VerifiedCredential, VerifyError>> for Verdict {
    fn from(result: Result<VerifiedCredential, VerifyError>) -> Self {
        match result {
            Ok(credential) => credential.into(),
            Err(err) => Verdict::rejected(&err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::{engine::general_purpose::STANDARD, Engine};
    use fieldcred_core::{CanonicalPayload, CredentialPayload, ManualClock, MILLIS_PER_HOUR};
    use fieldcred_crypto::{HolderKeyPair, IssuerKeyPair};
    use fieldcred_issuer::{CredentialIssuer, IssueRequest};

    const NOW: i64 = 1_760_000_000_000;

    struct Fixture {
        key: Arc<IssuerKeyPair>,
        clock: Arc<ManualClock>,
        issuer: CredentialIssuer,
        verifier: CredentialVerifier,
    }

    fn fixture() -> Fixture {
        let key = Arc::new(IssuerKeyPair::generate());
        let clock = Arc::new(ManualClock::new(NOW));
        let issuer = CredentialIssuer::with_clock(key.clone(), clock.clone());
        let verifier = CredentialVerifier::with_clock(key.public_key(), clock.clone());
        Fixture {
            key,
            clock,
            issuer,
            verifier,
        }
    }

    /// Sign an arbitrary payload directly, bypassing issuer validation
    fn sign_payload(key: &IssuerKeyPair, payload: &CredentialPayload) -> String {
        let canonical = CanonicalPayload::encode(payload).unwrap();
        let signature = key.sign(&canonical).unwrap();
        SignedEnvelope::new(&canonical, signature.to_base64())
            .to_blob()
            .unwrap()
    }

    fn payload_expiring_at(expires_at: i64) -> CredentialPayload {
        CredentialPayload {
            id: "VOL009".into(),
            name: "Edge Case".into(),
            role: fieldcred_core::Role::Coordinator,
            issued_at: NOW - MILLIS_PER_HOUR,
            expires_at,
            public_key: HolderKeyPair::generate().public_key().to_base64(),
        }
    }

    fn reencode_with_payload(blob: &str, payload: String) -> String {
        let mut envelope = SignedEnvelope::from_blob(blob).unwrap();
        envelope.payload = payload;
        envelope.to_blob().unwrap()
    }

    #[test]
    fn test_issue_then_verify() {
        let f = fixture();
        for role in Role::ALL {
            let request =
                IssueRequest::new("VOL001", "Test User", role.as_str()).with_expires_in_hours(3);
            let issued = f.issuer.issue(&request).unwrap();
            let verified = f.verifier.verify(&issued.blob).unwrap();

            assert_eq!(verified.id, "VOL001");
            assert_eq!(verified.name, "Test User");
            assert_eq!(verified.role, role);
            assert_eq!(verified.expires_at, verified.issued_at + 3 * MILLIS_PER_HOUR);
            assert_eq!(verified.holder_public_key, issued.holder_public_key);
            assert_eq!(verified.time_until_expiry_ms, 3 * MILLIS_PER_HOUR);
        }
    }

    #[test]
    fn test_expiry_scenario() {
        let f = fixture();
        let issued = f
            .issuer
            .issue(&IssueRequest::new("VOL001", "Test User", "medic").with_expires_in_hours(1))
            .unwrap();

        let verdict = Verdict::from(f.verifier.verify(&issued.blob));
        assert!(verdict.valid);
        assert_eq!(verdict.volunteer.as_ref().unwrap().role, Role::Medic);
        assert_eq!(verdict.time_until_expiry_ms, Some(MILLIS_PER_HOUR));

        f.clock.advance(2 * MILLIS_PER_HOUR);
        let verdict = Verdict::from(f.verifier.verify(&issued.blob));
        assert!(!verdict.valid);
        assert_eq!(verdict.error.as_deref(), Some("expired"));
        assert_eq!(verdict.expired_at, Some(NOW + MILLIS_PER_HOUR));
        assert_eq!(verdict.current_time, Some(NOW + 2 * MILLIS_PER_HOUR));
    }

    #[test]
    fn test_expiry_boundary() {
        let f = fixture();

        let past = sign_payload(&f.key, &payload_expiring_at(NOW - 1));
        assert_eq!(
            f.verifier.verify(&past),
            Err(VerifyError::Expired {
                expired_at: NOW - 1,
                current_time: NOW
            })
        );

        let exact = sign_payload(&f.key, &payload_expiring_at(NOW));
        assert_eq!(f.verifier.verify(&exact).unwrap_err().kind(), "expired");

        let future = sign_payload(&f.key, &payload_expiring_at(NOW + 1));
        let verified = f.verifier.verify(&future).unwrap();
        assert_eq!(verified.time_until_expiry_ms, 1);
    }

    #[test]
    fn test_expiry_checked_before_signature() {
        let f = fixture();
        let foreign = IssuerKeyPair::generate();
        let blob = sign_payload(&foreign, &payload_expiring_at(NOW - 1));
        assert_eq!(f.verifier.verify(&blob).unwrap_err().kind(), "expired");
    }

    #[test]
    fn test_wrong_issuer_key() {
        let f = fixture();
        let issued = f
            .issuer
            .issue(&IssueRequest::new("VOL001", "Test User", "medic"))
            .unwrap();

        let other = CredentialVerifier::with_clock(
            IssuerKeyPair::generate().public_key(),
            f.clock.clone(),
        );
        assert_eq!(
            other.verify(&issued.blob),
            Err(VerifyError::InvalidSignature)
        );
    }

    #[test]
    fn test_single_byte_flips_are_rejected() {
        let f = fixture();
        let issued = f
            .issuer
            .issue(&IssueRequest::new("VOL001", "Test User", "medic").with_expires_in_hours(1))
            .unwrap();
        let original = SignedEnvelope::from_blob(&issued.blob).unwrap().payload;

        let expires_digits = original.find("\"expiresAt\":").unwrap() + "\"expiresAt\":".len();
        let expires_range = expires_digits..expires_digits + 13;

        for i in 0..original.len() {
            let mut bytes = original.clone().into_bytes();
            bytes[i] ^= 0x01;
            let tampered = String::from_utf8(bytes).unwrap();
            let blob = reencode_with_payload(&issued.blob, tampered);

            let err = f.verifier.verify(&blob).unwrap_err();
            if expires_range.contains(&i) {
                assert!(
                    matches!(
                        err,
                        VerifyError::InvalidSignature | VerifyError::Expired { .. }
                    ),
                    "byte {}: {:?}",
                    i,
                    err
                );
            } else {
                assert_eq!(err, VerifyError::InvalidSignature, "byte {}", i);
            }
        }
    }

    #[test]
    fn test_reencoded_payload_fails_signature() {
        let f = fixture();
        let issued = f
            .issuer
            .issue(&IssueRequest::new("VOL001", "Test User", "medic"))
            .unwrap();
        let original = SignedEnvelope::from_blob(&issued.blob).unwrap().payload;

        // Same logical payload, different bytes
        let spaced = original.replacen(",", ", ", 1);
        let blob = reencode_with_payload(&issued.blob, spaced);
        assert_eq!(f.verifier.verify(&blob), Err(VerifyError::InvalidSignature));
    }

    #[test]
    fn test_malformed_inputs() {
        let f = fixture();
        let issued = f
            .issuer
            .issue(&IssueRequest::new("VOL001", "Test User", "medic"))
            .unwrap();
        let envelope = SignedEnvelope::from_blob(&issued.blob).unwrap();

        let cases = vec![
            "%%% not base64 %%%".to_string(),
            STANDARD.encode("not json"),
            STANDARD.encode(r#"{"payload":"p"}"#),
            STANDARD.encode(r#"{"payload":1,"signature":"s"}"#),
            STANDARD.encode(format!(
                r#"{{"payload":{},"signature":"***"}}"#,
                serde_json::to_string(&envelope.payload).unwrap()
            )),
            STANDARD.encode(format!(
                r#"{{"payload":{},"signature":"c2hvcnQ="}}"#,
                serde_json::to_string(&envelope.payload).unwrap()
            )),
        ];
        for blob in cases {
            let err = f.verifier.verify(&blob).unwrap_err();
            assert_eq!(err.kind(), "malformed_credential", "blob {}: {:?}", blob, err);
        }
    }

    #[test]
    fn test_signed_but_undecodable_payload_is_malformed() {
        let f = fixture();
        let canonical = CanonicalPayload::from_transmitted(r#"{"id":"VOL001"}"#);
        let signature = f.key.sign(&canonical).unwrap();
        let blob = SignedEnvelope::new(&canonical, signature.to_base64())
            .to_blob()
            .unwrap();
        assert_eq!(
            f.verifier.verify(&blob).unwrap_err().kind(),
            "malformed_credential"
        );
    }

    #[test]
    fn test_blob_verifies_repeatedly() {
        let f = fixture();
        let issued = f
            .issuer
            .issue(&IssueRequest::new("VOL001", "Test User", "medic"))
            .unwrap();
        let second = CredentialVerifier::with_clock(f.key.public_key(), f.clock.clone());
        for _ in 0..3 {
            assert!(f.verifier.verify(&issued.blob).is_ok());
            assert!(second.verify(&issued.blob).is_ok());
        }
    }

    #[test]
    fn test_verdict_wire_shape() {
        let f = fixture();
        let issued = f
            .issuer
            .issue(&IssueRequest::new("VOL001", "Test User", "medic").with_expires_in_hours(1))
            .unwrap();

        let ok = serde_json::to_value(Verdict::from(f.verifier.verify(&issued.blob))).unwrap();
        assert_eq!(ok["valid"], true);
        assert_eq!(ok["volunteer"]["id"], "VOL001");
        assert_eq!(ok["volunteer"]["role"], "medic");
        assert_eq!(ok["volunteer"]["public_key"], issued.holder_public_key.as_str());
        assert_eq!(ok["time_until_expiry_ms"], MILLIS_PER_HOUR);
        assert!(ok.get("error").is_none());

        let bad = serde_json::to_value(Verdict::from(f.verifier.verify("@@@"))).unwrap();
        assert_eq!(
            bad,
            serde_json::json!({"valid": false, "error": "malformed_credential"})
        );
    }

    #[test]
    fn test_from_base64_key() {
        let key = IssuerKeyPair::generate();
        let verifier = CredentialVerifier::from_base64(&key.public_key().to_base64()).unwrap();
        assert_eq!(verifier.issuer_key(), &key.public_key());
        assert!(CredentialVerifier::from_base64("AAAA").is_err());
    }
}
