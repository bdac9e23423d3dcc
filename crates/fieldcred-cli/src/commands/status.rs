//! Status command - show configuration and status

use console::style;
use fieldcred_crypto::KeyStore;
use fieldcred_server::config::ServerConfig;

pub fn show() {
    println!(
        "\n{}",
        style("╔════════════════════════════════════════╗").cyan()
    );
    println!(
        "{}",
        style("║   fieldcred Status                     ║").cyan()
    );
    println!(
        "{}",
        style("╚════════════════════════════════════════╝").cyan()
    );
    println!();

    // Version info
    println!("{}", style("Version").bold().underlined());
    println!("  fieldcred-cli:   {}", env!("CARGO_PKG_VERSION"));
    println!();

    let config = match ServerConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            println!(
                "{}",
                style(format!("Invalid FIELDCRED_* configuration: {}", err)).red()
            );
            ServerConfig::default()
        }
    };

    // Environment
    println!("{}", style("Environment").bold().underlined());
    println!("  FIELDCRED_BIND:       {}", config.bind);
    println!("  FIELDCRED_KEY_DIR:    {}", config.key_dir.display());
    println!(
        "  FIELDCRED_KEY_PASSPHRASE: {}",
        if config.key_passphrase.is_empty() {
            style("Not set (weak key protection)").yellow()
        } else {
            style("Set").green()
        }
    );
    println!(
        "  FIELDCRED_ISSUER_SEED:    {}",
        if config.issuer_seed.is_some() {
            style("Set (overrides key dir)").green()
        } else {
            style("Not set").dim()
        }
    );
    println!("  Max validity:         {}h", config.max_expires_in_hours);
    println!("  CORS origins:         {}", config.cors_origins);
    println!();

    // Issuer key
    println!("{}", style("Issuer Key").bold().underlined());
    match KeyStore::open(&config.key_dir).load_public_key() {
        Ok(key) => {
            println!("  Public key:      {}", style(key.to_base64()).cyan());
            println!("  Fingerprint:     {}", key.fingerprint());
        }
        Err(_) if config.issuer_seed.is_some() => {
            println!("  {}", style("Provided via FIELDCRED_ISSUER_SEED").dim());
        }
        Err(_) => {
            println!(
                "  {}",
                style("No key found; the server generates one on first start").yellow()
            );
        }
    }
    println!();

    // Cryptography
    println!("{}", style("Cryptography").bold().underlined());
    println!("  Signatures:      Ed25519");
    println!("  Encoding:        base64(JSON {{payload, signature}})");
    println!("  Key at rest:     SHA3-256 derived keystream + tag");
    println!();

    // Quick help
    println!("{}", style("Quick Start").bold().underlined());
    println!("  Create key:      fieldcred keygen");
    println!("  Issue:           fieldcred issue --id VOL001 --name \"Test User\" --role medic");
    println!("  Verify:          fieldcred verify <qr_data>");
    println!("  Start server:    fieldcred serve");
}
