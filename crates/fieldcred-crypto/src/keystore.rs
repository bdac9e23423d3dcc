//! Persistent issuer key storage
//!
//! Loads or creates the issuing authority's Ed25519 keypair on disk. The
//! 32-byte seed is encrypted at rest under a key derived from a passphrase
//! with SHA3-256 (swap in Argon2 or an HSM-backed store for production).
//!
//! Directory layout:
//! ```text
//! <key_dir>/
//!   issuer.pub    raw 32-byte Ed25519 public key
//!   issuer.key    nonce(12) || tag(32) || encrypted seed(32)
//! ```
//!
//! Verifiers only ever need `issuer.pub`.

use std::path::{Path, PathBuf};
use thiserror::Error;
use zeroize::Zeroizing;

use crate::ed25519::{IssuerKeyPair, PublicKey};

const NONCE_LEN: usize = 12;
const TAG_LEN: usize = 32;

#[derive(Error, Debug)]
pub enum KeyStoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid key data: {0}")]
    InvalidKey(String),

    #[error("Encryption error: {0}")]
    Encryption(String),
}

pub type Result<T> = std::result::Result<T, KeyStoreError>;

/// Filesystem-backed key store
pub struct KeyStore {
    dir: PathBuf,
}

impl KeyStore {
    /// Open a key store rooted at `dir`, creating the directory if absent
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    /// Open an existing key store for reading; nothing is created
    pub fn open(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn pub_path(&self) -> PathBuf {
        self.dir.join("issuer.pub")
    }

    fn key_path(&self) -> PathBuf {
        self.dir.join("issuer.key")
    }

    pub fn has_keys(&self) -> bool {
        self.pub_path().exists() && self.key_path().exists()
    }

    /// Load the stored keypair, or generate and persist a new one
    pub fn load_or_generate(&self, passphrase: &str) -> Result<IssuerKeyPair> {
        if self.has_keys() {
            self.load(passphrase)
        } else {
            let keypair = IssuerKeyPair::generate();
            self.save(&keypair, passphrase)?;
            tracing::info!(
                dir = %self.dir.display(),
                fingerprint = %keypair.public_key().fingerprint(),
                "Generated new issuer keypair"
            );
            Ok(keypair)
        }
    }

    pub fn save(&self, keypair: &IssuerKeyPair, passphrase: &str) -> Result<()> {
        std::fs::write(self.pub_path(), keypair.public_key().as_bytes())?;

        let enc_key = derive_key(passphrase);
        let encrypted = encrypt_seed(keypair.seed().as_slice(), &enc_key);
        write_secret(&self.key_path(), &encrypted)
    }

    pub fn load(&self, passphrase: &str) -> Result<IssuerKeyPair> {
        let public_key = self.load_public_key()?;
        let enc_bytes = std::fs::read(self.key_path())?;

        let enc_key = derive_key(passphrase);
        let seed = decrypt_seed(&enc_bytes, &enc_key)?;

        let keypair = IssuerKeyPair::from_seed_bytes(&seed)
            .map_err(|e| KeyStoreError::InvalidKey(format!("secret key: {}", e)))?;

        if keypair.public_key() != public_key {
            return Err(KeyStoreError::InvalidKey(
                "secret key does not match issuer.pub".into(),
            ));
        }

        Ok(keypair)
    }

    /// Public key only; no passphrase needed
    pub fn load_public_key(&self) -> Result<PublicKey> {
        let pub_bytes = std::fs::read(self.pub_path())?;
        PublicKey::from_bytes(&pub_bytes)
            .map_err(|e| KeyStoreError::InvalidKey(format!("public key: {}", e)))
    }
}

// ── Helpers ─────────────────────────────────────────────────────

/// Write owner-only from the first byte. `mode` applies only when the file
/// is created, so an existing file is narrowed before it is rewritten.
fn write_secret(path: &Path, bytes: &[u8]) -> Result<()> {
    use std::io::Write;

    let mut options = std::fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let mut file = options.open(path)?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        file.set_permissions(std::fs::Permissions::from_mode(0o600))?;
    }
    file.write_all(bytes)?;
    file.sync_all()?;
    Ok(())
}

fn derive_key(passphrase: &str) -> Zeroizing<[u8; 32]> {
    use sha3::{Digest, Sha3_256};
    let mut hasher = Sha3_256::new();
    hasher.update(b"fieldcred-keystore-v1:");
    hasher.update(passphrase.as_bytes());
    Zeroizing::new(hasher.finalize().into())
}

fn auth_tag(key: &[u8; 32], nonce: &[u8], ciphertext: &[u8]) -> [u8; TAG_LEN] {
    use sha3::{Digest, Sha3_256};
    let mut hasher = Sha3_256::new();
    hasher.update(key);
    hasher.update(nonce);
    hasher.update(ciphertext);
    hasher.finalize().into()
}

/// Output layout: `nonce(12) || tag(32) || ciphertext`
fn encrypt_seed(plaintext: &[u8], key: &[u8; 32]) -> Vec<u8> {
    use rand::RngCore;

    let mut nonce = [0u8; NONCE_LEN];
    rand::rngs::OsRng.fill_bytes(&mut nonce);

    let ciphertext = keystream_xor(plaintext, key, &nonce);
    let tag = auth_tag(key, &nonce, &ciphertext);

    let mut out = Vec::with_capacity(NONCE_LEN + TAG_LEN + ciphertext.len());
    out.extend_from_slice(&nonce);
    out.extend_from_slice(&tag);
    out.extend_from_slice(&ciphertext);
    out
}

fn decrypt_seed(data: &[u8], key: &[u8; 32]) -> Result<Zeroizing<Vec<u8>>> {
    if data.len() < NONCE_LEN + TAG_LEN {
        return Err(KeyStoreError::Encryption("data too short".into()));
    }

    let (nonce, rest) = data.split_at(NONCE_LEN);
    let (tag, ciphertext) = rest.split_at(TAG_LEN);

    if tag != auth_tag(key, nonce, ciphertext).as_slice() {
        return Err(KeyStoreError::Encryption(
            "authentication failed, wrong passphrase or corrupted key file".into(),
        ));
    }

    Ok(Zeroizing::new(keystream_xor(ciphertext, key, nonce)))
}

/// SHA3 counter-mode keystream; applying it twice restores the input
fn keystream_xor(data: &[u8], key: &[u8; 32], nonce: &[u8]) -> Vec<u8> {
    use sha3::{Digest, Sha3_256};

    let mut out = Vec::with_capacity(data.len());
    for (counter, chunk) in data.chunks(32).enumerate() {
        let mut hasher = Sha3_256::new();
        hasher.update(key);
        hasher.update(nonce);
        hasher.update((counter as u64).to_le_bytes());
        let block: [u8; 32] = hasher.finalize().into();

        out.extend(chunk.iter().zip(block.iter()).map(|(d, k)| d ^ k));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use fieldcred_core::CanonicalPayload;

    #[test]
    fn test_key_store_generate_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = KeyStore::new(dir.path()).unwrap();
        let passphrase = "test-passphrase";

        assert!(!store.has_keys());

        let kp1 = store.load_or_generate(passphrase).unwrap();
        assert!(store.has_keys());

        let kp2 = store.load(passphrase).unwrap();
        assert_eq!(kp1.public_key(), kp2.public_key());

        // Sign with the loaded key, verify with the original
        let msg = CanonicalPayload::from_transmitted("hello world");
        let sig = kp2.sign(&msg).unwrap();
        assert!(kp1.public_key().verify(&msg, &sig).is_ok());
    }

    #[test]
    fn test_key_store_wrong_passphrase() {
        let dir = tempfile::tempdir().unwrap();
        let store = KeyStore::new(dir.path()).unwrap();

        store.load_or_generate("correct").unwrap();

        assert!(matches!(
            store.load("wrong"),
            Err(KeyStoreError::Encryption(_))
        ));
    }

    #[test]
    fn test_load_public_key_without_passphrase() {
        let dir = tempfile::tempdir().unwrap();
        let store = KeyStore::new(dir.path()).unwrap();

        let kp = store.load_or_generate("pass").unwrap();
        assert_eq!(store.load_public_key().unwrap(), kp.public_key());
    }

    #[cfg(unix)]
    #[test]
    fn test_secret_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let store = KeyStore::new(dir.path()).unwrap();
        store.load_or_generate("pass").unwrap();

        let mode = std::fs::metadata(dir.path().join("issuer.key"))
            .unwrap()
            .permissions()
            .mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[cfg(unix)]
    #[test]
    fn test_existing_secret_file_is_narrowed_on_save() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let key_path = dir.path().join("issuer.key");
        std::fs::write(&key_path, b"stale").unwrap();
        std::fs::set_permissions(&key_path, std::fs::Permissions::from_mode(0o644)).unwrap();

        let store = KeyStore::new(dir.path()).unwrap();
        let keypair = IssuerKeyPair::generate();
        store.save(&keypair, "pass").unwrap();

        let mode = std::fs::metadata(&key_path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
        assert_eq!(store.load("pass").unwrap().public_key(), keypair.public_key());
    }

    #[test]
    fn test_open_does_not_create_directory() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent");

        let store = KeyStore::open(&missing);
        assert!(!store.has_keys());
        assert!(matches!(store.load_public_key(), Err(KeyStoreError::Io(_))));
        assert!(!missing.exists());
    }

    #[test]
    fn test_mismatched_public_key_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = KeyStore::new(dir.path()).unwrap();
        store.load_or_generate("pass").unwrap();

        let other = IssuerKeyPair::generate();
        std::fs::write(dir.path().join("issuer.pub"), other.public_key().as_bytes()).unwrap();

        assert!(matches!(
            store.load("pass"),
            Err(KeyStoreError::InvalidKey(_))
        ));
    }

    #[test]
    fn test_encrypt_decrypt_roundtrip() {
        let key = derive_key("my-secret");
        let plaintext = b"The quick brown fox jumps over the lazy dog";

        let encrypted = encrypt_seed(plaintext, &key);
        let decrypted = decrypt_seed(&encrypted, &key).unwrap();

        assert_eq!(plaintext.as_slice(), decrypted.as_slice());
    }

    #[test]
    fn test_truncated_key_file_rejected() {
        let key = derive_key("k");
        assert!(decrypt_seed(&[0u8; 10], &key).is_err());
    }
}
