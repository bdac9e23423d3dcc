//! fieldcred Core
//!
//! Core domain types for offline-verifiable volunteer field credentials.
//! This crate defines the payload, its canonical encoding, the signed
//! envelope and blob format, the role registry and the error taxonomy
//! shared by the issuer, the verifier and every surface built on them.

pub mod canonical;
pub mod clock;
pub mod credential;
pub mod envelope;
pub mod error;
pub mod role;

pub use canonical::CanonicalPayload;
pub use clock::{Clock, ManualClock, SystemClock};
pub use credential::{CredentialPayload, DEFAULT_EXPIRES_IN_HOURS, MILLIS_PER_HOUR};
pub use envelope::SignedEnvelope;
pub use error::{CodecError, IssueError, RoleNotFound, VerifyError};
pub use role::{Role, RoleInfo, RoleRegistry};
