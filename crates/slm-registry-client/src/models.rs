//! Wire models for the resource registry API.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A resource record as listed by `GET /resources`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryResource {
    pub id: Uuid,
    #[serde(default)]
    pub hostname: Option<String>,
    #[serde(default)]
    pub ip: Option<String>,
}

impl RegistryResource {
    /// `id, hostname, ip` line used in setup summaries.
    #[must_use]
    pub fn summary_line(&self) -> String {
        format!(
            "{}, {}, {}",
            self.id,
            self.hostname.as_deref().unwrap_or("-"),
            self.ip.as_deref().unwrap_or("-")
        )
    }
}

/// Form payload for `PUT /resources/{id}`.
///
/// The [`Debug`] impl redacts the device password.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceItem {
    pub resource_hostname: String,
    pub resource_ip: String,
    pub resource_connection_port: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_password: Option<String>,
}

impl std::fmt::Debug for DeviceItem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeviceItem")
            .field("resource_hostname", &self.resource_hostname)
            .field("resource_ip", &self.resource_ip)
            .field("resource_connection_port", &self.resource_connection_port)
            .field("resource_username", &self.resource_username)
            .field(
                "resource_password",
                &self.resource_password.as_ref().map(|_| "[REDACTED]"),
            )
            .finish()
    }
}

/// A capability already attached to a resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentCapability {
    pub name: String,
    #[serde(default)]
    pub id: Option<String>,
}

/// A location known to the registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
}
