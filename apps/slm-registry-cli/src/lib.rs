//! slm-registry CLI library
//!
//! Exposes the command surface and configuration for integration tests.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod output;

use cli::{Cli, Commands};
use config::Config;
use error::CliResult;

/// Dispatch a parsed command line.
pub async fn run(cli: Cli, config: Config) -> CliResult<()> {
    match cli.command {
        Commands::Setup(args) => commands::setup::execute(args, config).await,
        Commands::Token => commands::token::execute(&config).await,
        Commands::Resources(args) => commands::resources::execute(args, &config).await,
        Commands::Locations(args) => commands::locations::execute(args, &config).await,
    }
}
