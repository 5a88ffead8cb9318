//! CLI error types and exit codes

use crate::config::ConfigError;
use slm_registry_client::RegistryError;
use thiserror::Error;

/// Exit codes for the CLI
/// - 0: Success
/// - 1: General error (configuration, inventory, I/O)
/// - 2: Authentication failed
/// - 3: Network error
/// - 4: Not found / request rejected by the registry
/// - 5: Registry server error
pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Inventory error: {0}")]
    Inventory(String),

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Connection failed: {0}\n\nTroubleshooting:\n  - Check that the SLM host is reachable\n  - Verify RESOURCE_REGISTRY_HOST and KEYCLOAK_HOST")]
    ConnectionFailed(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Registry error (status {status}): {message}")]
    Registry { status: u16, message: String },

    #[error("I/O error: {0}")]
    Io(String),
}

impl CliError {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Config(_) | CliError::Inventory(_) | CliError::Io(_) => 1,
            CliError::AuthenticationFailed(_) => 2,
            CliError::Network(_) | CliError::ConnectionFailed(_) => 3,
            CliError::NotFound(_) => 4,
            CliError::Registry { status, .. } => {
                if *status >= 500 {
                    5
                } else if *status == 401 || *status == 403 {
                    2
                } else {
                    4
                }
            }
        }
    }

    /// Print the error to stderr with appropriate formatting
    pub fn print(&self) {
        let use_color = std::env::var("NO_COLOR").is_err();

        if use_color {
            eprintln!("\x1b[31mError:\x1b[0m {}", self);
        } else {
            eprintln!("Error: {}", self);
        }

        if let Some(suggestion) = self.suggestion() {
            if use_color {
                eprintln!("\n\x1b[33mSuggestion:\x1b[0m {}", suggestion);
            } else {
                eprintln!("\nSuggestion: {}", suggestion);
            }
        }
    }

    fn suggestion(&self) -> Option<&'static str> {
        match self {
            CliError::AuthenticationFailed(_) => {
                Some("Check SLM_USER, SLM_PASSWORD and KEYCLOAK_REALM.")
            }
            CliError::Inventory(_) => Some(
                "Export the DEVICES sheet as CSV and point INVENTORY_FILE (or --inventory) at it.",
            ),
            CliError::ConnectionFailed(_) => Some("Check your network connection and try again."),
            _ => None,
        }
    }
}

impl From<RegistryError> for CliError {
    fn from(e: RegistryError) -> Self {
        match e {
            RegistryError::Auth(msg) => CliError::AuthenticationFailed(msg),
            RegistryError::NotFound(msg) => CliError::NotFound(msg),
            RegistryError::Api { status, body } => CliError::Registry {
                status,
                message: body,
            },
            RegistryError::Http(e) => {
                if e.is_connect() {
                    CliError::ConnectionFailed(e.to_string())
                } else if e.is_timeout() {
                    CliError::Network("Request timed out".to_string())
                } else {
                    CliError::Network(e.to_string())
                }
            }
            RegistryError::Parse(msg) => CliError::Registry {
                status: 502,
                message: msg,
            },
            RegistryError::InvalidConfig(msg) => CliError::Config(msg),
            RegistryError::InventoryNotFound(path) => CliError::Inventory(format!(
                "file '{path}' does not exist. Add the file or set INVENTORY_FILE accordingly"
            )),
            RegistryError::Inventory(msg) => CliError::Inventory(msg),
            RegistryError::Io(e) => CliError::Io(e.to_string()),
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        CliError::Config(e.to_string())
    }
}

impl From<std::io::Error> for CliError {
    fn from(e: std::io::Error) -> Self {
        CliError::Io(e.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        CliError::Io(format!("JSON error: {}", e))
    }
}
