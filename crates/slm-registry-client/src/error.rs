//! Error types for the SLM registry client.

use thiserror::Error;

/// Result alias used throughout the crate.
pub type RegistryResult<T> = Result<T, RegistryError>;

#[derive(Debug, Error)]
pub enum RegistryError {
    /// Token acquisition or registry authentication failed.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// The registry answered 404.
    #[error("not found: {0}")]
    NotFound(String),

    /// Any other non-success answer from the registry.
    #[error("registry returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error("HTTP transport error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("failed to parse registry response: {0}")]
    Parse(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("inventory file '{0}' does not exist")]
    InventoryNotFound(String),

    #[error("invalid inventory: {0}")]
    Inventory(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<csv::Error> for RegistryError {
    fn from(e: csv::Error) -> Self {
        RegistryError::Inventory(e.to_string())
    }
}
