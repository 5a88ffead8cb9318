//! Registry location commands

use crate::config::Config;
use crate::error::CliResult;
use crate::output::{print_json, print_success};
use clap::{Args, Subcommand};
use slm_registry_client::build_registry_client;

/// Location commands
#[derive(Args, Debug)]
pub struct LocationsArgs {
    #[command(subcommand)]
    pub command: LocationsCommands,
}

#[derive(Subcommand, Debug)]
pub enum LocationsCommands {
    /// List all locations
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Create a location
    Create {
        /// Location identifier
        #[arg(long)]
        id: String,
        /// Display name
        #[arg(long)]
        name: String,
    },
    /// Delete a location
    Delete {
        /// Location identifier
        id: String,
    },
}

/// Execute location commands
pub async fn execute(args: LocationsArgs, config: &Config) -> CliResult<()> {
    let client = build_registry_client(&config.endpoint())?;

    match args.command {
        LocationsCommands::List { json } => {
            let locations = client.list_locations().await?;
            if json {
                print_json(&locations)?;
            } else if locations.is_empty() {
                println!("No locations found.");
            } else {
                println!("{:<38} {:<30}", "ID", "NAME");
                println!("{}", "-".repeat(70));
                for location in &locations {
                    println!(
                        "{:<38} {:<30}",
                        location.id,
                        location.name.as_deref().unwrap_or("-")
                    );
                }
            }
        }
        LocationsCommands::Create { id, name } => {
            client.create_location(&id, &name).await?;
            print_success(&format!("Created location {id} ({name})"));
        }
        LocationsCommands::Delete { id } => {
            client.delete_location(&id).await?;
            print_success(&format!("Deleted location {id}"));
        }
    }

    Ok(())
}
