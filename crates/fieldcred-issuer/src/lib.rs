//! fieldcred Issuer
//!
//! Credential issuance service. Builds a payload for the volunteer, signs
//! its canonical encoding with the injected issuer key and wraps the result
//! into a QR-transportable blob. Nothing is retained between calls.

use std::sync::Arc;

use fieldcred_core::{
    CanonicalPayload, Clock, CredentialPayload, IssueError, RoleRegistry, SignedEnvelope,
    SystemClock, DEFAULT_EXPIRES_IN_HOURS, MILLIS_PER_HOUR,
};
use fieldcred_crypto::{CredentialSigner, HolderKeyPair, PublicKey};
use serde::{Deserialize, Serialize};

pub const MAX_ID_CHARS: usize = 128;
pub const MAX_NAME_CHARS: usize = 256;

/// Thirty days
pub const DEFAULT_MAX_EXPIRES_IN_HOURS: i64 = 720;

/// Issuance request as submitted by an operator
///
/// Missing fields deserialize as empty and are rejected by validation, so an
/// incomplete request reports which field is wrong.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssueRequest {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub expires_in_hours: Option<i64>,
}

impl IssueRequest {
    pub fn new(id: impl Into<String>, name: impl Into<String>, role: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            role: role.into(),
            expires_in_hours: None,
        }
    }

    pub fn with_expires_in_hours(mut self, hours: i64) -> Self {
        self.expires_in_hours = Some(hours);
        self
    }
}

/// A freshly issued credential
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssuedCredential {
    /// Transport blob to render as a QR symbol
    pub blob: String,

    /// Base64 public half of the single-use holder keypair
    pub holder_public_key: String,

    pub issued_at: i64,

    pub expires_at: i64,

    pub expires_in_hours: i64,
}

#[derive(Debug, Clone)]
pub struct IssuerConfig {
    /// Upper bound on the requested validity window
    pub max_expires_in_hours: i64,
}

impl Default for IssuerConfig {
    fn default() -> Self {
        Self {
            max_expires_in_hours: DEFAULT_MAX_EXPIRES_IN_HOURS,
        }
    }
}

/// Credential issuer service
///
/// Safe to share across threads: the key is read-only after construction and
/// every call draws its holder keypair from the OS CSPRNG.
pub struct CredentialIssuer {
    signer: Arc<dyn CredentialSigner>,
    clock: Arc<dyn Clock>,
    config: IssuerConfig,
}

impl CredentialIssuer {
    pub fn new(signer: Arc<dyn CredentialSigner>) -> Self {
        Self::with_clock(signer, Arc::new(SystemClock))
    }

    pub fn with_clock(signer: Arc<dyn CredentialSigner>, clock: Arc<dyn Clock>) -> Self {
        Self {
            signer,
            clock,
            config: IssuerConfig::default(),
        }
    }

    pub fn with_config(mut self, config: IssuerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &IssuerConfig {
        &self.config
    }

    /// Key every verifier must hold to accept this issuer's credentials
    pub fn public_key(&self) -> PublicKey {
        self.signer.public_key()
    }

    /// Issue a signed credential for a volunteer
    pub fn issue(&self, request: &IssueRequest) -> Result<IssuedCredential, IssueError> {
        let hours = self.validate(request)?;
        let role = RoleRegistry::get(&request.role)?;

        // The holder's secret half is dropped (and zeroized) at the end of scope
        let holder = HolderKeyPair::generate();
        let holder_public_key = holder.public_key().to_base64();

        let issued_at = self.clock.now_millis();
        let expires_at = hours
            .checked_mul(MILLIS_PER_HOUR)
            .and_then(|ttl| issued_at.checked_add(ttl))
            .ok_or_else(|| IssueError::Validation("expires_in_hours is out of range".into()))?;

        let payload = CredentialPayload {
            id: request.id.clone(),
            name: request.name.clone(),
            role,
            issued_at,
            expires_at,
            public_key: holder_public_key.clone(),
        };
        let canonical = CanonicalPayload::encode(&payload)?;

        let signature = self.signer.sign(&canonical).map_err(|e| {
            tracing::error!(error = %e, "Issuer key failed to sign credential payload");
            IssueError::Signing("issuer key unavailable".into())
        })?;

        let blob = SignedEnvelope::new(&canonical, signature.to_base64()).to_blob()?;

        tracing::info!(
            credential_id = %payload.id,
            role = %role,
            expires_at,
            "Issued field credential"
        );

        Ok(IssuedCredential {
            blob,
            holder_public_key,
            issued_at,
            expires_at,
            expires_in_hours: hours,
        })
    }

    fn validate(&self, request: &IssueRequest) -> Result<i64, IssueError> {
        if request.id.trim().is_empty() {
            return Err(IssueError::Validation("id is required".into()));
        }
        if request.id.chars().count() > MAX_ID_CHARS {
            return Err(IssueError::Validation(format!(
                "id must be at most {} characters",
                MAX_ID_CHARS
            )));
        }
        if request.name.trim().is_empty() {
            return Err(IssueError::Validation("name is required".into()));
        }
        if request.name.chars().count() > MAX_NAME_CHARS {
            return Err(IssueError::Validation(format!(
                "name must be at most {} characters",
                MAX_NAME_CHARS
            )));
        }
        if request.role.is_empty() {
            return Err(IssueError::Validation("role is required".into()));
        }
        if !RoleRegistry::is_valid(&request.role) {
            return Err(IssueError::RoleNotFound(request.role.clone()));
        }

        let hours = request.expires_in_hours.unwrap_or(DEFAULT_EXPIRES_IN_HOURS);
        if hours <= 0 {
            return Err(IssueError::Validation(
                "expires_in_hours must be greater than zero".into(),
            ));
        }
        if hours > self.config.max_expires_in_hours {
            return Err(IssueError::Validation(format!(
                "expires_in_hours must be at most {}",
                self.config.max_expires_in_hours
            )));
        }

        Ok(hours)
    }
}
