//! Registry resource commands

use crate::config::Config;
use crate::error::{CliError, CliResult};
use crate::output::{print_json, print_key_value, print_success};
use clap::{Args, Subcommand};
use slm_registry_client::build_registry_client;
use slm_registry_client::models::RegistryResource;
use uuid::Uuid;

/// Resource commands
#[derive(Args, Debug)]
pub struct ResourcesArgs {
    #[command(subcommand)]
    pub command: ResourcesCommands,
}

#[derive(Subcommand, Debug)]
pub enum ResourcesCommands {
    /// List all registered resources
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show one resource
    Get {
        /// Resource UUID
        id: Uuid,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Delete one resource
    Delete {
        /// Resource UUID
        id: Uuid,
    },
}

/// Execute resource commands
pub async fn execute(args: ResourcesArgs, config: &Config) -> CliResult<()> {
    let client = build_registry_client(&config.endpoint())?;

    match args.command {
        ResourcesCommands::List { json } => {
            let resources = client.list_resources().await?;
            if json {
                print_json(&resources)?;
            } else if resources.is_empty() {
                println!("No resources registered.");
            } else {
                print_resource_table(&resources);
                println!();
                println!("{} resource(s)", resources.len());
            }
        }
        ResourcesCommands::Get { id, json } => {
            let resource = client
                .get_resource(id)
                .await?
                .ok_or_else(|| CliError::NotFound(format!("resource {id}")))?;
            if json {
                print_json(&resource)?;
            } else {
                print_key_value("ID", &resource.id.to_string());
                print_key_value("Hostname", resource.hostname.as_deref().unwrap_or("-"));
                print_key_value("IP", resource.ip.as_deref().unwrap_or("-"));
            }
        }
        ResourcesCommands::Delete { id } => {
            client.delete_resource(id).await?;
            print_success(&format!("Deleted resource {id}"));
        }
    }

    Ok(())
}

fn print_resource_table(resources: &[RegistryResource]) {
    println!("{:<38} {:<25} {:<16}", "ID", "HOSTNAME", "IP");
    println!("{}", "-".repeat(80));

    for resource in resources {
        println!(
            "{:<38} {:<25} {:<16}",
            resource.id,
            resource.hostname.as_deref().unwrap_or("-"),
            resource.ip.as_deref().unwrap_or("-"),
        );
    }
}
