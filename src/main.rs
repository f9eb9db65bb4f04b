//! dev-proxy
//!
//! Runs a development server from a declarative TOML file: requests under a
//! configured path prefix are forwarded to a backend, everything else is
//! served by the host app.
//!
//! ```text
//!  client ──▶ dev server ──┬─ /__devtools/*  (devtools.enabled)
//!                          ├─ proxy rule ──▶ backend (e.g. http://localhost:8080)
//!                          └─ otherwise  ──▶ static_dir / 404
//! ```

use std::path::PathBuf;

use clap::Parser;

use dev_proxy::config::{load_config, ObservabilityConfig};
use dev_proxy::lifecycle::signals::wait_for_signal;
use dev_proxy::observability::logging;
use dev_proxy::{DevServer, Supervisor};

#[derive(Parser)]
#[command(name = "dev-proxy", version)]
#[command(
    about = "Development server with a declarative reverse-proxy rule table",
    long_about = None
)]
struct Cli {
    /// Path to the TOML declaration.
    #[arg(short, long, default_value = "devserver.toml")]
    config: PathBuf,

    /// Restart the server whenever the config file changes.
    #[arg(short, long)]
    watch: bool,

    /// Validate the config, print the rule table and exit.
    #[arg(long)]
    check: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let loaded = load_config(&cli.config);
    let observability = loaded
        .as_ref()
        .map(|c| c.observability.clone())
        .unwrap_or_else(|_| ObservabilityConfig::default());
    logging::init(&observability)?;

    tracing::info!("dev-proxy v{} starting", env!("CARGO_PKG_VERSION"));

    let config = loaded.inspect_err(|e| {
        tracing::error!(path = ?cli.config, error = %e, "Invalid configuration");
    })?;

    if cli.check {
        let server = DevServer::new(config)?;
        println!("{} proxy rule(s) in precedence order:", server.rules().len());
        for rule in server.rules().rules() {
            println!(
                "  {:<20} -> {} (tls verification: {})",
                rule.path_prefix(),
                rule.target(),
                rule.tls_verification().as_str()
            );
        }
        return Ok(());
    }

    Supervisor::new(cli.config.clone(), cli.watch)
        .run(config, wait_for_signal())
        .await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
