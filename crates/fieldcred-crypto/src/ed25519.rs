//! Ed25519 signatures
//!
//! Signing and verification accept only [`CanonicalPayload`], so a
//! signature is always computed over the exact string that travels in the
//! envelope. Keys and signatures cross the wire as standard base64.

use base64::{engine::general_purpose::STANDARD, Engine};
use ed25519_dalek::Signer;
use fieldcred_core::CanonicalPayload;
use sha2::{Digest, Sha256};
use thiserror::Error;
use zeroize::Zeroizing;

pub const PUBLIC_KEY_LENGTH: usize = ed25519_dalek::PUBLIC_KEY_LENGTH;
pub const SIGNATURE_LENGTH: usize = ed25519_dalek::SIGNATURE_LENGTH;
pub const SEED_LENGTH: usize = ed25519_dalek::SECRET_KEY_LENGTH;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CryptoError {
    #[error("Invalid signature encoding")]
    InvalidSignature,

    #[error("Invalid public key")]
    InvalidPublicKey,

    #[error("Invalid secret key")]
    InvalidSecretKey,

    #[error("Signature verification failed")]
    VerificationFailed,

    #[error("Signing failed")]
    SigningFailed,
}

/// Ed25519 verification key
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct PublicKey(ed25519_dalek::VerifyingKey);

impl PublicKey {
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        let bytes: [u8; PUBLIC_KEY_LENGTH] =
            bytes.try_into().map_err(|_| CryptoError::InvalidPublicKey)?;
        ed25519_dalek::VerifyingKey::from_bytes(&bytes)
            .map(Self)
            .map_err(|_| CryptoError::InvalidPublicKey)
    }

    pub fn from_base64(encoded: &str) -> Result<Self, CryptoError> {
        let bytes = STANDARD
            .decode(encoded.trim())
            .map_err(|_| CryptoError::InvalidPublicKey)?;
        Self::from_bytes(&bytes)
    }

    pub fn as_bytes(&self) -> &[u8; PUBLIC_KEY_LENGTH] {
        self.0.as_bytes()
    }

    pub fn to_base64(&self) -> String {
        STANDARD.encode(self.0.as_bytes())
    }

    /// Short SHA-256 fingerprint for out-of-band key comparison
    pub fn fingerprint(&self) -> String {
        let digest = Sha256::digest(self.0.as_bytes());
        hex::encode(&digest[..16])
    }

    pub fn verify(
        &self,
        payload: &CanonicalPayload,
        signature: &Signature,
    ) -> Result<(), CryptoError> {
        self.0
            .verify_strict(payload.as_bytes(), &signature.0)
            .map_err(|_| CryptoError::VerificationFailed)
    }
}

impl std::fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PublicKey({})", self.fingerprint())
    }
}

impl std::fmt::Display for PublicKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_base64())
    }
}

/// Ed25519 signature
#[derive(Clone, PartialEq, Eq)]
pub struct Signature(ed25519_dalek::Signature);

impl Signature {
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        ed25519_dalek::Signature::from_slice(bytes)
            .map(Self)
            .map_err(|_| CryptoError::InvalidSignature)
    }

    pub fn from_base64(encoded: &str) -> Result<Self, CryptoError> {
        let bytes = STANDARD
            .decode(encoded.trim())
            .map_err(|_| CryptoError::InvalidSignature)?;
        Self::from_bytes(&bytes)
    }

    pub fn to_bytes(&self) -> [u8; SIGNATURE_LENGTH] {
        self.0.to_bytes()
    }

    pub fn to_base64(&self) -> String {
        STANDARD.encode(self.0.to_bytes())
    }
}

impl std::fmt::Debug for Signature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Signature({} bytes)", SIGNATURE_LENGTH)
    }
}

/// Long-term signing key of the issuing authority
///
/// Not `Clone` and not serializable; the seed is only reachable through
/// [`IssuerKeyPair::seed`] for the key store.
pub struct IssuerKeyPair {
    signing_key: ed25519_dalek::SigningKey,
}

impl IssuerKeyPair {
    pub fn generate() -> Self {
        let mut csprng = rand::rngs::OsRng;
        Self {
            signing_key: ed25519_dalek::SigningKey::generate(&mut csprng),
        }
    }

    pub fn from_seed(seed: &[u8; SEED_LENGTH]) -> Self {
        Self {
            signing_key: ed25519_dalek::SigningKey::from_bytes(seed),
        }
    }

    pub fn from_seed_bytes(seed: &[u8]) -> Result<Self, CryptoError> {
        let seed: Zeroizing<[u8; SEED_LENGTH]> = Zeroizing::new(
            seed.try_into()
                .map_err(|_| CryptoError::InvalidSecretKey)?,
        );
        Ok(Self::from_seed(&seed))
    }

    /// Load from a base64 seed, e.g. injected by a secret manager
    pub fn from_seed_base64(encoded: &str) -> Result<Self, CryptoError> {
        let bytes = Zeroizing::new(
            STANDARD
                .decode(encoded.trim())
                .map_err(|_| CryptoError::InvalidSecretKey)?,
        );
        Self::from_seed_bytes(&bytes)
    }

    /// Raw seed bytes (use carefully!)
    pub fn seed(&self) -> Zeroizing<[u8; SEED_LENGTH]> {
        Zeroizing::new(self.signing_key.to_bytes())
    }

    pub fn public_key(&self) -> PublicKey {
        PublicKey(self.signing_key.verifying_key())
    }

    pub fn sign(&self, payload: &CanonicalPayload) -> Result<Signature, CryptoError> {
        self.signing_key
            .try_sign(payload.as_bytes())
            .map(Signature)
            .map_err(|_| CryptoError::SigningFailed)
    }
}

impl std::fmt::Debug for IssuerKeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IssuerKeyPair")
            .field("public_key", &self.public_key())
            .field("signing_key", &"[REDACTED]")
            .finish()
    }
}

/// Anything able to sign canonical payloads on behalf of the issuer
pub trait CredentialSigner: Send + Sync {
    fn public_key(&self) -> PublicKey;

    fn sign(&self, payload: &CanonicalPayload) -> Result<Signature, CryptoError>;
}

impl CredentialSigner for IssuerKeyPair {
    fn public_key(&self) -> PublicKey {
        IssuerKeyPair::public_key(self)
    }

    fn sign(&self, payload: &CanonicalPayload) -> Result<Signature, CryptoError> {
        IssuerKeyPair::sign(self, payload)
    }
}

/// Single-use keypair minted for each credential holder
///
/// The secret half is never exposed and is zeroized when the value drops.
pub struct HolderKeyPair {
    signing_key: ed25519_dalek::SigningKey,
}

impl HolderKeyPair {
    /// Draw a fresh keypair from the operating system CSPRNG
    pub fn generate() -> Self {
        let mut csprng = rand::rngs::OsRng;
        Self {
            signing_key: ed25519_dalek::SigningKey::generate(&mut csprng),
        }
    }

    pub fn public_key(&self) -> PublicKey {
        PublicKey(self.signing_key.verifying_key())
    }
}

impl std::fmt::Debug for HolderKeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "HolderKeyPair({})", self.public_key().fingerprint())
    }
}
