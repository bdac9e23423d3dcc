//! Application state

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use fieldcred_core::{Clock, IssueError, SystemClock};
use fieldcred_crypto::{CredentialSigner, CryptoError, IssuerKeyPair, KeyStore, KeyStoreError};
use fieldcred_issuer::{CredentialIssuer, IssueRequest, IssuedCredential, IssuerConfig};
use fieldcred_verifier::CredentialVerifier;
use thiserror::Error;

use crate::config::ServerConfig;

#[derive(Error, Debug)]
pub enum BootstrapError {
    #[error("Key store error: {0}")]
    KeyStore(#[from] KeyStoreError),

    #[error("Invalid FIELDCRED_ISSUER_SEED: {0}")]
    Seed(CryptoError),
}

/// Liveness of the issuer signing key
///
/// A signing failure means the process cannot issue at all, so it flips the
/// health endpoint instead of only failing the request.
#[derive(Debug)]
pub struct SignerHealth {
    healthy: AtomicBool,
    failures: AtomicU64,
}

impl SignerHealth {
    fn new() -> Self {
        Self {
            healthy: AtomicBool::new(true),
            failures: AtomicU64::new(0),
        }
    }

    pub fn is_healthy(&self) -> bool {
        self.healthy.load(Ordering::SeqCst)
    }

    pub fn failures(&self) -> u64 {
        self.failures.load(Ordering::SeqCst)
    }

    pub fn record_failure(&self) {
        self.failures.fetch_add(1, Ordering::SeqCst);
        if self.healthy.swap(false, Ordering::SeqCst) {
            tracing::error!("Issuer signer marked unhealthy");
        }
    }
}

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub issuer: Arc<CredentialIssuer>,

    pub verifier: Arc<CredentialVerifier>,

    pub signer: Arc<SignerHealth>,

    pub started_at: Instant,
}

impl AppState {
    pub fn new(keypair: IssuerKeyPair, config: &ServerConfig) -> Self {
        Self::with_clock(keypair, Arc::new(SystemClock), config)
    }

    pub fn with_clock(keypair: IssuerKeyPair, clock: Arc<dyn Clock>, config: &ServerConfig) -> Self {
        Self::with_signer(Arc::new(keypair), clock, config)
    }

    /// Build around any signer, e.g. a remote or hardware-backed key
    pub fn with_signer(
        signer: Arc<dyn CredentialSigner>,
        clock: Arc<dyn Clock>,
        config: &ServerConfig,
    ) -> Self {
        let verifier = CredentialVerifier::with_clock(signer.public_key(), clock.clone());
        let issuer = CredentialIssuer::with_clock(signer, clock).with_config(IssuerConfig {
            max_expires_in_hours: config.max_expires_in_hours,
        });

        Self {
            issuer: Arc::new(issuer),
            verifier: Arc::new(verifier),
            signer: Arc::new(SignerHealth::new()),
            started_at: Instant::now(),
        }
    }

    /// Load the issuer key as configured and build the state around it
    pub fn bootstrap(config: &ServerConfig) -> Result<Self, BootstrapError> {
        let keypair = load_issuer_key(config)?;
        tracing::info!(
            fingerprint = %keypair.public_key().fingerprint(),
            "Loaded issuer key"
        );
        Ok(Self::new(keypair, config))
    }

    pub fn issue(&self, request: &IssueRequest) -> Result<IssuedCredential, IssueError> {
        let result = self.issuer.issue(request);
        if let Err(err) = &result {
            if err.is_fatal() {
                self.signer.record_failure();
            }
        }
        result
    }
}

fn load_issuer_key(config: &ServerConfig) -> Result<IssuerKeyPair, BootstrapError> {
    if let Some(seed) = config.issuer_seed.as_deref() {
        return IssuerKeyPair::from_seed_base64(seed).map_err(BootstrapError::Seed);
    }

    if config.key_passphrase.is_empty() {
        tracing::warn!("FIELDCRED_KEY_PASSPHRASE is empty; issuer key is weakly protected at rest");
    }

    let store = KeyStore::new(&config.key_dir)?;
    Ok(store.load_or_generate(&config.key_passphrase)?)
}
