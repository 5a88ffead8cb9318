//! Print a bearer token for manual API calls

use crate::config::Config;
use crate::error::CliResult;
use slm_registry_client::build_registry_client;

/// Execute the token command
pub async fn execute(config: &Config) -> CliResult<()> {
    let client = build_registry_client(&config.endpoint())?;
    let token = client.auth().fetch_token().await?;
    println!("{token}");
    Ok(())
}
