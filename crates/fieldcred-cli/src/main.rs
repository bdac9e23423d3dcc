//! fieldcred CLI
//!
//! Command-line interface for issuing and verifying volunteer field credentials.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "fieldcred")]
#[command(author, version, about = "fieldcred: signed role credentials for field volunteers", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Issuer key store location
#[derive(Args, Clone)]
pub struct KeyArgs {
    /// Directory holding issuer.pub / issuer.key
    #[arg(long, default_value = "./keys", env = "FIELDCRED_KEY_DIR")]
    pub key_dir: PathBuf,

    /// Passphrase protecting issuer.key
    #[arg(long, default_value = "", env = "FIELDCRED_KEY_PASSPHRASE", hide_env_values = true)]
    pub passphrase: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the issuer key pair
    Keygen {
        #[command(flatten)]
        keys: KeyArgs,

        /// Replace an existing key pair
        #[arg(long)]
        force: bool,
    },

    /// Print the issuer public key for provisioning verifiers
    PublicKey {
        #[command(flatten)]
        keys: KeyArgs,
    },

    /// Issue a credential and print its QR data
    Issue {
        /// Volunteer identifier
        #[arg(long)]
        id: String,

        /// Volunteer display name
        #[arg(long)]
        name: String,

        /// Role identifier (see `fieldcred roles`)
        #[arg(short, long)]
        role: String,

        /// Validity window in hours
        #[arg(long, default_value_t = fieldcred_core::DEFAULT_EXPIRES_IN_HOURS)]
        hours: i64,

        /// Longest validity window this issuer accepts, as enforced by the server
        #[arg(
            long,
            default_value_t = fieldcred_issuer::DEFAULT_MAX_EXPIRES_IN_HOURS,
            env = "FIELDCRED_MAX_EXPIRES_IN_HOURS"
        )]
        max_hours: i64,

        #[command(flatten)]
        keys: KeyArgs,

        /// Base64 issuer seed; overrides the key store
        #[arg(long, env = "FIELDCRED_ISSUER_SEED", hide_env_values = true)]
        seed: Option<String>,

        /// Print the full issuance result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Verify QR data offline
    Verify {
        /// Credential blob as scanned
        qr_data: String,

        /// Base64 issuer public key; defaults to the key store's issuer.pub
        #[arg(long)]
        public_key: Option<String>,

        #[command(flatten)]
        keys: KeyArgs,

        /// Print the verdict as JSON
        #[arg(long)]
        json: bool,
    },

    /// List roles and their permissions
    Roles,

    /// Run the HTTP server
    Serve {
        /// Address to bind to
        #[arg(short, long, env = "FIELDCRED_BIND")]
        bind: Option<String>,
    },

    /// Show configuration and status
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| format!("fieldcred={},tower_http={}", log_level, log_level)),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    match cli.command {
        Commands::Keygen { keys, force } => {
            commands::keys::keygen(&keys, force)?;
        }
        Commands::PublicKey { keys } => {
            commands::keys::public_key(&keys)?;
        }
        Commands::Issue {
            id,
            name,
            role,
            hours,
            max_hours,
            keys,
            seed,
            json,
        } => {
            let request =
                fieldcred_issuer::IssueRequest::new(id, name, role).with_expires_in_hours(hours);
            commands::credential::issue(&request, &keys, seed.as_deref(), max_hours, json)?;
        }
        Commands::Verify {
            qr_data,
            public_key,
            keys,
            json,
        } => {
            commands::credential::verify(&qr_data, public_key.as_deref(), &keys, json)?;
        }
        Commands::Roles => {
            commands::roles::list();
        }
        Commands::Serve { bind } => {
            commands::serve::run(bind).await?;
        }
        Commands::Status => {
            commands::status::show();
        }
    }

    Ok(())
}
