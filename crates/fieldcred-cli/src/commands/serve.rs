//! Serve command - runs the HTTP server in-process

use anyhow::Result;
use console::style;
use fieldcred_server::config::ServerConfig;

pub async fn run(bind: Option<String>) -> Result<()> {
    let mut config = ServerConfig::from_env()?;
    if let Some(bind) = bind {
        config.bind = bind;
    }

    println!(
        "\n{}",
        style("╔════════════════════════════════════════╗").cyan()
    );
    println!(
        "{}",
        style("║   fieldcred credential service         ║").cyan()
    );
    println!(
        "{}",
        style("╚════════════════════════════════════════╝").cyan()
    );
    println!();
    println!("  Bind:     {}", style(&config.bind).green());
    println!("  Key dir:  {}", config.key_dir.display());
    println!();
    println!("{}", style("Endpoints:").bold());
    println!("  Issue:       POST http://{}/credentials/issue", config.bind);
    println!("  Verify:      POST http://{}/credentials/verify", config.bind);
    println!("  Roles:       GET  http://{}/roles", config.bind);
    println!("  Public key:  GET  http://{}/issuer/public-key", config.bind);
    println!("  Health:      GET  http://{}/health", config.bind);
    println!();

    fieldcred_server::serve(config).await
}
