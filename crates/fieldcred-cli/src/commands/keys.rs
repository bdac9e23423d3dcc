//! Issuer key management commands

use anyhow::{bail, Result};
use console::style;
use fieldcred_crypto::{IssuerKeyPair, KeyStore};

use crate::KeyArgs;

/// Create and persist a new issuer key pair
pub fn keygen(keys: &KeyArgs, force: bool) -> Result<()> {
    println!("\n{}", style("Generating Issuer Key").bold().underlined());
    println!();

    let store = KeyStore::new(&keys.key_dir)?;
    if store.has_keys() && !force {
        bail!(
            "Issuer key already exists in {}. Use --force to replace it",
            store.dir().display()
        );
    }

    if keys.passphrase.is_empty() {
        println!(
            "{}",
            style("Warning: no passphrase set, issuer.key is weakly protected").yellow()
        );
        println!();
    }

    let keypair = IssuerKeyPair::generate();
    store.save(&keypair, &keys.passphrase)?;

    let public_key = keypair.public_key();
    println!("  Directory:    {}", style(store.dir().display()).yellow());
    println!("  Public key:   {}", style(public_key.to_base64()).cyan());
    println!("  Fingerprint:  {}", public_key.fingerprint());
    println!();
    println!("{}", style("✓ Issuer key created").green().bold());
    if force {
        println!(
            "{}",
            style("  Credentials signed by the previous key no longer verify.").dim()
        );
    }

    Ok(())
}

/// Print the stored issuer public key
pub fn public_key(keys: &KeyArgs) -> Result<()> {
    let public_key = KeyStore::open(&keys.key_dir).load_public_key()?;

    println!("{}", public_key.to_base64());
    println!(
        "{}",
        style(format!("fingerprint {}", public_key.fingerprint())).dim()
    );

    Ok(())
}
