//! Command-line surface

use crate::commands;
use clap::{Parser, Subcommand};

/// slm-registry - provision the SLM resource registry from a device inventory
#[derive(Parser, Debug)]
#[command(name = "slm-registry")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Reconcile the registry with the inventory file
    Setup(commands::setup::SetupArgs),

    /// Print a bearer token for the configured SLM user
    Token,

    /// Inspect and remove registry resources
    Resources(commands::resources::ResourcesArgs),

    /// Manage registry locations
    Locations(commands::locations::LocationsArgs),
}
