//! slm-registry - provision SLM resource registry devices from an inventory sheet
//!
//! Authenticates against Keycloak, reconciles registry resources with the
//! inventory and attaches deployment capabilities and submodels.

use clap::Parser;
use slm_registry_cli::cli::Cli;
use slm_registry_cli::config::Config;
use slm_registry_cli::error::CliError;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,slm_registry_client=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match Config::from_env() {
        Ok(config) => slm_registry_cli::run(cli, config).await,
        Err(e) => Err(CliError::from(e)),
    };

    match result {
        Ok(()) => std::process::exit(0),
        Err(e) => {
            e.print();
            std::process::exit(e.exit_code());
        }
    }
}
