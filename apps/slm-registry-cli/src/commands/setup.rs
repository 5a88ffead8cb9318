//! The setup command: reconcile the registry with the inventory

use crate::config::Config;
use crate::error::CliResult;
use crate::output::{print_json, print_setup_summary, print_warning};
use clap::Args;
use slm_registry_client::build_registry_client;
use slm_registry_client::inventory::Inventory;
use slm_registry_client::reconciler::SetupRunner;
use std::path::PathBuf;
use tracing::info;

/// Arguments for the setup command
#[derive(Args, Debug, Default)]
pub struct SetupArgs {
    /// Overwrite resources and capabilities that already exist
    #[arg(short, long)]
    pub force: bool,

    /// Delete inventory resources from the registry before creating them
    #[arg(long)]
    pub force_delete: bool,

    /// With --force-delete, delete every registry resource
    #[arg(long)]
    pub delete_all: bool,

    /// Upload submodel files listed in the inventory
    #[arg(long)]
    pub submodels: bool,

    /// Inventory CSV file (overrides INVENTORY_FILE)
    #[arg(long, value_name = "FILE")]
    pub inventory: Option<PathBuf>,

    /// Print the summary as JSON
    #[arg(long)]
    pub json: bool,
}

impl SetupArgs {
    /// Apply command-line flags on top of the environment configuration.
    /// A flag can only switch a setting on.
    pub fn apply_to(&self, config: &mut Config) {
        config.force_overwrite |= self.force;
        config.force_delete |= self.force_delete;
        config.delete_all |= self.delete_all;
        config.attach_submodels |= self.submodels;
        if let Some(path) = &self.inventory {
            config.inventory_file = path.clone();
        }
    }
}

/// Execute the setup command
pub async fn execute(args: SetupArgs, mut config: Config) -> CliResult<()> {
    args.apply_to(&mut config);
    config.log_summary();

    if config.delete_all && !config.force_delete {
        print_warning("--delete-all has no effect without --force-delete");
    }

    let inventory = Inventory::load(&config.inventory_file)?;
    info!(
        devices = inventory.devices().len(),
        rows = inventory.row_count(),
        "inventory loaded"
    );

    let client = build_registry_client(&config.endpoint())?;
    let report = SetupRunner::new(&client, &inventory, config.setup_options(), config.pacing)
        .run()
        .await?;

    if args.json {
        print_json(&report)?;
    } else {
        print_setup_summary(&report);
    }

    Ok(())
}
