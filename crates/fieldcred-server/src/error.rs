//! API error responses
//!
//! Every failure is rendered as `{"error": <kind>, "message": <text>}` with a
//! status derived from the kind. Signing failures never leak primitive
//! details; the body only says the signer is unavailable.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use fieldcred_core::IssueError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),

    /// Unknown role in an issuance request
    #[error("role not found: {0}")]
    RoleNotFound(String),

    /// Unknown role in a catalog lookup
    #[error("role not found: {0}")]
    UnknownRole(String),

    #[error("issuer signing key is unavailable")]
    SignerUnavailable,

    #[error("credential could not be encoded")]
    Encoding,

    /// Verification body without a usable `qr_data`
    #[error("request must be a JSON object with a string qr_data")]
    MissingCredential,
}

impl ApiError {
    pub fn kind(&self) -> &'static str {
        match self {
            ApiError::Validation(_) => "validation_error",
            ApiError::RoleNotFound(_) | ApiError::UnknownRole(_) => "role_not_found",
            ApiError::SignerUnavailable => "signing_error",
            ApiError::Encoding => "encoding_error",
            ApiError::MissingCredential => "malformed_credential",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::MissingCredential => StatusCode::BAD_REQUEST,
            ApiError::RoleNotFound(_) => StatusCode::BAD_REQUEST,
            ApiError::UnknownRole(_) => StatusCode::NOT_FOUND,
            ApiError::SignerUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Encoding => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// An issuance body that is not a JSON object of the expected shape
    pub fn invalid_issue_request(rejection: JsonRejection) -> Self {
        tracing::debug!(error = %rejection.body_text(), "Rejected issuance body");
        ApiError::Validation(
            "request must be a JSON object with string id, name and role \
             and an optional integer expires_in_hours"
                .into(),
        )
    }

    pub fn invalid_verify_request(rejection: JsonRejection) -> Self {
        tracing::debug!(error = %rejection.body_text(), "Rejected verification body");
        ApiError::MissingCredential
    }
}

impl From<IssueError> for ApiError {
    fn from(err: IssueError) -> Self {
        match err {
            IssueError::Validation(msg) => ApiError::Validation(msg),
            IssueError::RoleNotFound(role) => ApiError::RoleNotFound(role),
            IssueError::Signing(_) => ApiError::SignerUnavailable,
            IssueError::Encoding(msg) => {
                tracing::error!(error = %msg, "Failed to encode credential");
                ApiError::Encoding
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({
            "error": self.kind(),
            "message": self.to_string(),
        });
        (self.status(), Json(body)).into_response()
    }
}
