//! Client for the SLM resource registry and the inventory-driven setup flow.
//!
//! - [`auth`]: access tokens from the Keycloak realm
//! - [`client`]: registry REST calls
//! - [`inventory`]: the desired device state, read from the rack sheet
//! - [`reconciler`]: the ordered setup passes

pub mod auth;
pub mod capability;
pub mod client;
pub mod error;
pub mod inventory;
pub mod models;
pub mod reconciler;

pub use error::{RegistryError, RegistryResult};

use std::time::Duration;

/// Connection settings for [`build_registry_client`].
///
/// The [`Debug`] impl redacts the password.
#[derive(Clone)]
pub struct RegistryEndpoint {
    pub registry_url: String,
    pub keycloak_url: String,
    pub realm: String,
    pub client_id: String,
    pub username: String,
    pub password: String,
    pub timeout: Duration,
}

impl std::fmt::Debug for RegistryEndpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegistryEndpoint")
            .field("registry_url", &self.registry_url)
            .field("keycloak_url", &self.keycloak_url)
            .field("realm", &self.realm)
            .field("client_id", &self.client_id)
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Build a [`client::RegistryClient`] with password-grant authentication.
pub fn build_registry_client(endpoint: &RegistryEndpoint) -> RegistryResult<client::RegistryClient> {
    let http_client = reqwest::Client::builder()
        .timeout(endpoint.timeout)
        .build()
        .map_err(|e| RegistryError::InvalidConfig(format!("failed to build HTTP client: {e}")))?;

    let auth = auth::KeycloakAuth::new(
        auth::PasswordCredentials {
            token_url: auth::token_url(&endpoint.keycloak_url, &endpoint.realm),
            client_id: endpoint.client_id.clone(),
            username: endpoint.username.clone(),
            password: endpoint.password.clone(),
        },
        http_client,
    );

    client::RegistryClient::new(&endpoint.registry_url, &endpoint.realm, auth, endpoint.timeout)
}
