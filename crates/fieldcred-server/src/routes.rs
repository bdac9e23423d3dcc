//! HTTP route handlers

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::Json,
};
use fieldcred_core::{RoleInfo, RoleRegistry};
use fieldcred_issuer::IssueRequest;
use fieldcred_verifier::Verdict;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::state::AppState;

/// Issuance response
#[derive(Debug, Serialize, Deserialize)]
pub struct IssueResponse {
    pub qr_data: String,
    pub volunteer_public_key: String,
    pub expires_at: i64,
    pub expires_in_hours: i64,
}

/// `POST /credentials/issue`
pub async fn issue_credential(
    State(state): State<AppState>,
    payload: Result<Json<IssueRequest>, JsonRejection>,
) -> Result<Json<IssueResponse>, ApiError> {
    let Json(request) = payload.map_err(ApiError::invalid_issue_request)?;
    let issued = state.issue(&request)?;

    Ok(Json(IssueResponse {
        qr_data: issued.blob,
        volunteer_public_key: issued.holder_public_key,
        expires_at: issued.expires_at,
        expires_in_hours: issued.expires_in_hours,
    }))
}

/// Verification request
#[derive(Debug, Deserialize)]
pub struct VerifyRequest {
    pub qr_data: String,
}

/// `POST /credentials/verify`
///
/// Verification outcomes are data: rejected credentials still answer 200
/// with `valid: false`.
pub async fn verify_credential(
    State(state): State<AppState>,
    payload: Result<Json<VerifyRequest>, JsonRejection>,
) -> Result<Json<Verdict>, ApiError> {
    let Json(request) = payload.map_err(ApiError::invalid_verify_request)?;
    Ok(Json(state.verifier.verify(&request.qr_data).into()))
}

/// `GET /roles`
pub async fn list_roles() -> Json<Vec<RoleInfo>> {
    Json(RoleRegistry::catalog())
}

/// `GET /roles/:id`
pub async fn get_role(Path(id): Path<String>) -> Result<Json<RoleInfo>, ApiError> {
    RoleRegistry::info(&id)
        .map(Json)
        .map_err(|e| ApiError::UnknownRole(e.0))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct IssuerKeyResponse {
    pub algorithm: String,
    pub public_key: String,
    pub fingerprint: String,
}

/// `GET /issuer/public-key`, for provisioning verifier devices
pub async fn issuer_public_key(State(state): State<AppState>) -> Json<IssuerKeyResponse> {
    let key = state.issuer.public_key();
    Json(IssuerKeyResponse {
        algorithm: "ed25519".to_string(),
        public_key: key.to_base64(),
        fingerprint: key.fingerprint(),
    })
}

/// Health check
pub async fn health(State(state): State<AppState>) -> (StatusCode, &'static str) {
    if state.signer.is_healthy() {
        (StatusCode::OK, "OK")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "SIGNER UNAVAILABLE")
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SignerStatus {
    pub healthy: bool,
    pub failures: u64,
    pub fingerprint: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DetailedHealth {
    pub status: String,
    pub signer: SignerStatus,
    pub uptime_seconds: u64,
}

/// `GET /health/detailed`
pub async fn detailed_health(
    State(state): State<AppState>,
) -> (StatusCode, Json<DetailedHealth>) {
    let healthy = state.signer.is_healthy();
    let status = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        Json(DetailedHealth {
            status: if healthy { "healthy" } else { "unhealthy" }.into(),
            signer: SignerStatus {
                healthy,
                failures: state.signer.failures(),
                fingerprint: state.issuer.public_key().fingerprint(),
            },
            uptime_seconds: state.started_at.elapsed().as_secs(),
        }),
    )
}
