//! Credential issuance and verification commands

use std::sync::Arc;

use anyhow::{bail, Context, Result};
use console::style;
use fieldcred_core::VerifyError;
use fieldcred_crypto::{IssuerKeyPair, KeyStore};
use fieldcred_issuer::{CredentialIssuer, IssueRequest, IssuerConfig};
use fieldcred_verifier::{CredentialVerifier, Verdict};

use super::format_millis;
use crate::KeyArgs;

fn load_signing_key(keys: &KeyArgs, seed: Option<&str>) -> Result<IssuerKeyPair> {
    if let Some(seed) = seed {
        return IssuerKeyPair::from_seed_base64(seed).context("Invalid FIELDCRED_ISSUER_SEED");
    }

    let store = KeyStore::open(&keys.key_dir);
    if !store.has_keys() {
        bail!(
            "No issuer key in {}. Run `fieldcred keygen` first",
            store.dir().display()
        );
    }
    Ok(store.load(&keys.passphrase)?)
}

fn local_issuer(keys: &KeyArgs, seed: Option<&str>, max_hours: i64) -> Result<CredentialIssuer> {
    let keypair = load_signing_key(keys, seed)?;
    let config = IssuerConfig {
        max_expires_in_hours: max_hours,
    };
    Ok(CredentialIssuer::new(Arc::new(keypair)).with_config(config))
}

/// Issue a credential with the local issuer key
pub fn issue(
    request: &IssueRequest,
    keys: &KeyArgs,
    seed: Option<&str>,
    max_hours: i64,
    json: bool,
) -> Result<()> {
    let issuer = local_issuer(keys, seed, max_hours)?;
    let issued = issuer.issue(request)?;

    if json {
        let output = serde_json::json!({
            "qr_data": issued.blob,
            "volunteer_public_key": issued.holder_public_key,
            "expires_at": issued.expires_at,
            "expires_in_hours": issued.expires_in_hours,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!("\n{}", style("Credential Issued").bold().underlined());
    println!();
    println!("  ID:        {}", request.id);
    println!("  Name:      {}", request.name);
    println!("  Role:      {}", style(&request.role).cyan());
    println!("  Issued:    {}", format_millis(issued.issued_at));
    println!(
        "  Expires:   {} ({}h)",
        style(format_millis(issued.expires_at)).yellow(),
        issued.expires_in_hours
    );
    println!();
    println!("{}", style("QR data:").bold());
    println!("{}", issued.blob);

    Ok(())
}

/// Verify a credential blob without contacting the server
pub fn verify(qr_data: &str, public_key: Option<&str>, keys: &KeyArgs, json: bool) -> Result<()> {
    let verifier = match public_key {
        Some(encoded) => CredentialVerifier::from_base64(encoded).context("Invalid issuer public key")?,
        None => CredentialVerifier::new(KeyStore::open(&keys.key_dir).load_public_key()?),
    };

    let result = verifier.verify(qr_data);

    if json {
        let verdict = Verdict::from(result.clone());
        println!("{}", serde_json::to_string_pretty(&verdict)?);
    } else {
        println!("\n{}", style("Verifying Credential").bold().underlined());
        println!();
        println!(
            "  Issuer:    {}",
            style(verifier.issuer_key().fingerprint()).dim()
        );
        println!();

        match &result {
            Ok(credential) => {
                println!("  ID:        {}", credential.id);
                println!("  Name:      {}", credential.name);
                println!(
                    "  Role:      {} ({})",
                    style(credential.role.label()).cyan(),
                    credential.role
                );
                println!("  Issued:    {}", format_millis(credential.issued_at));
                println!("  Expires:   {}", format_millis(credential.expires_at));
                println!(
                    "  Remaining: {} min",
                    credential.time_until_expiry_ms / 60_000
                );
                println!();
                println!("{}", style("Permissions:").bold());
                for permission in credential.permissions() {
                    println!("  • {}", permission);
                }
                println!();
                println!("{}", style("✓ Credential valid").green().bold());
            }
            Err(VerifyError::Expired {
                expired_at,
                current_time,
            }) => {
                println!("  Expired:   {}", style(format_millis(*expired_at)).red());
                println!("  Now:       {}", format_millis(*current_time));
                println!();
                println!("{}", style("✗ Credential expired").red().bold());
            }
            Err(err) => {
                println!("  Reason:    {}", err);
                println!();
                println!("{}", style("✗ Credential rejected").red().bold());
            }
        }
    }

    match result {
        Ok(_) => Ok(()),
        Err(err) => bail!("verification failed: {}", err.kind()),
    }
}
