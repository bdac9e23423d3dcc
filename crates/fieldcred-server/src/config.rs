//! Server configuration
//!
//! Read from `FIELDCRED_*` environment variables (a `.env` file is honored),
//! e.g. `FIELDCRED_BIND`, `FIELDCRED_KEY_DIR`, `FIELDCRED_ISSUER_SEED`.

use serde::Deserialize;
use std::path::PathBuf;

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Socket address to listen on
    #[serde(default = "default_bind")]
    pub bind: String,

    /// Directory holding `issuer.pub` / `issuer.key`
    #[serde(default = "default_key_dir")]
    pub key_dir: PathBuf,

    /// Passphrase protecting `issuer.key`
    #[serde(default)]
    pub key_passphrase: String,

    /// Base64 issuer seed; takes precedence over the key directory
    #[serde(default)]
    pub issuer_seed: Option<String>,

    #[serde(default = "default_max_expires_in_hours")]
    pub max_expires_in_hours: i64,

    /// Comma-separated allowed origins, or `*`
    #[serde(default = "default_cors_origins")]
    pub cors_origins: String,
}

fn default_bind() -> String {
    "0.0.0.0:3000".to_string()
}

fn default_key_dir() -> PathBuf {
    PathBuf::from("./keys")
}

fn default_max_expires_in_hours() -> i64 {
    fieldcred_issuer::DEFAULT_MAX_EXPIRES_IN_HOURS
}

fn default_cors_origins() -> String {
    "*".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            key_dir: default_key_dir(),
            key_passphrase: String::new(),
            issuer_seed: None,
            max_expires_in_hours: default_max_expires_in_hours(),
            cors_origins: default_cors_origins(),
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, config::ConfigError> {
        let _ = dotenvy::dotenv();
        Self::from_source(environment())
    }

    fn from_source(source: config::Environment) -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(source)
            .build()?
            .try_deserialize()
    }
}

/// Values stay strings so secrets such as `0123` reach the key store verbatim;
/// numeric fields are converted during deserialization.
fn environment() -> config::Environment {
    config::Environment::with_prefix("FIELDCRED")
}
