//! fieldcred Crypto
//!
//! Ed25519 signing primitives for field credentials and the file-backed
//! store the issuing authority loads its long-term key from.

pub mod ed25519;
pub mod keystore;

pub use ed25519::{
    CredentialSigner, CryptoError, HolderKeyPair, IssuerKeyPair, PublicKey, Signature,
};
pub use keystore::{KeyStore, KeyStoreError};
