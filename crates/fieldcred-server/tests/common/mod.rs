//! Test utilities for integration tests

#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use fieldcred_core::{CanonicalPayload, ManualClock};
use fieldcred_crypto::{CredentialSigner, CryptoError, IssuerKeyPair, PublicKey, Signature};
use fieldcred_server::{config::ServerConfig, state::AppState};
use serde_json::Value;
use tower::ServiceExt;

pub const START_MS: i64 = 1_760_000_000_000;

/// Test application wrapper
pub struct TestApp {
    router: Router,
    pub state: AppState,
    pub clock: Arc<ManualClock>,
}

impl TestApp {
    /// Fresh issuer key and a manual clock pinned at `START_MS`
    pub fn new() -> Self {
        Self::with_signer(Arc::new(IssuerKeyPair::generate()))
    }

    /// Issuer whose key can no longer sign
    pub fn with_unavailable_signer() -> Self {
        Self::with_signer(Arc::new(UnavailableSigner(
            IssuerKeyPair::generate().public_key(),
        )))
    }

    fn with_signer(signer: Arc<dyn CredentialSigner>) -> Self {
        let config = ServerConfig::default();
        let clock = Arc::new(ManualClock::new(START_MS));
        let state = AppState::with_signer(signer, clock.clone(), &config);
        let router = fieldcred_server::create_router(state.clone(), &config);

        Self {
            router,
            state,
            clock,
        }
    }

    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        let response = self
            .router()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        read_json(response).await
    }

    pub async fn post_json(&self, uri: &str, body: &str) -> (StatusCode, Value) {
        let response = self
            .router()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(uri)
                    .header("Content-Type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        read_json(response).await
    }
}

/// Signer whose backing key has become unusable
pub struct UnavailableSigner(PublicKey);

impl CredentialSigner for UnavailableSigner {
    fn public_key(&self) -> PublicKey {
        self.0
    }

    fn sign(&self, _payload: &CanonicalPayload) -> Result<Signature, CryptoError> {
        Err(CryptoError::SigningFailed)
    }
}

async fn read_json(response: axum::response::Response) -> (StatusCode, Value) {
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = serde_json::from_slice(&body).unwrap_or(Value::Null);
    (status, json)
}
