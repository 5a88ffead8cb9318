//! Environment-driven configuration for the registry CLI.

use slm_registry_client::auth::{DEFAULT_CLIENT_ID, DEFAULT_REALM};
use slm_registry_client::reconciler::{Pacing, SetupOptions};
use slm_registry_client::RegistryEndpoint;
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

const DEFAULT_SLM_HOST: &str = "http://192.168.153.47";
const REGISTRY_PORT: u16 = 9010;
const KEYCLOAK_PORT: u16 = 7080;

/// Settings shared by every command.
///
/// The [`Debug`] impl redacts the SLM password.
#[derive(Clone)]
pub struct Config {
    pub slm_host: String,
    pub slm_user: String,
    pub slm_password: String,
    pub registry_url: String,
    pub keycloak_url: String,
    pub realm: String,
    pub client_id: String,
    pub inventory_file: PathBuf,
    pub force_overwrite: bool,
    pub force_delete: bool,
    pub delete_all: bool,
    pub attach_submodels: bool,
    pub pacing: Pacing,
    pub request_timeout: Duration,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("slm_host", &self.slm_host)
            .field("slm_user", &self.slm_user)
            .field("slm_password", &"[REDACTED]")
            .field("registry_url", &self.registry_url)
            .field("keycloak_url", &self.keycloak_url)
            .field("realm", &self.realm)
            .field("client_id", &self.client_id)
            .field("inventory_file", &self.inventory_file)
            .field("force_overwrite", &self.force_overwrite)
            .field("force_delete", &self.force_delete)
            .field("delete_all", &self.delete_all)
            .field("attach_submodels", &self.attach_submodels)
            .field("pacing", &self.pacing)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_reader(|key| std::env::var(key))
    }

    /// Load configuration from a custom variable reader.
    ///
    /// Tests supply variables this way without touching the process environment.
    pub fn from_reader<F>(reader: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Result<String, std::env::VarError>,
    {
        let get = |key: &str| reader(key).ok().filter(|v| !v.trim().is_empty());

        let slm_host = get("SLM_HOST")
            .unwrap_or_else(|| DEFAULT_SLM_HOST.to_string())
            .trim_end_matches('/')
            .to_string();

        let registry_url = get("RESOURCE_REGISTRY_HOST")
            .unwrap_or_else(|| format!("{slm_host}:{REGISTRY_PORT}"));
        let keycloak_url =
            get("KEYCLOAK_HOST").unwrap_or_else(|| format!("{slm_host}:{KEYCLOAK_PORT}"));

        for (key, url) in [
            ("RESOURCE_REGISTRY_HOST", &registry_url),
            ("KEYCLOAK_HOST", &keycloak_url),
        ] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(ConfigError::InvalidValue(
                    key.into(),
                    format!("'{url}' is not an http(s) URL"),
                ));
            }
        }

        let inventory_file = get("INVENTORY_FILE")
            .or_else(|| get("XLSX_FILE"))
            .unwrap_or_else(|| "example.csv".to_string());

        let flag = |key: &str| match get(key) {
            Some(value) => parse_flag(key, &value),
            None => Ok(false),
        };

        let secs = |key: &str, default: u64| match get(key) {
            Some(value) => value
                .trim()
                .parse::<u64>()
                .map(Duration::from_secs)
                .map_err(|e| ConfigError::InvalidValue(key.into(), e.to_string())),
            None => Ok(Duration::from_secs(default)),
        };

        let defaults = Pacing::default();
        let pacing = Pacing {
            after_delete: secs("PAUSE_AFTER_DELETE_SECS", defaults.after_delete.as_secs())?,
            after_create: secs("PAUSE_AFTER_CREATE_SECS", defaults.after_create.as_secs())?,
            readiness_retry: secs(
                "PAUSE_READINESS_RETRY_SECS",
                defaults.readiness_retry.as_secs(),
            )?,
        };

        Ok(Self {
            slm_user: get("SLM_USER").unwrap_or_else(|| "fabos".to_string()),
            slm_password: get("SLM_PASSWORD").unwrap_or_else(|| "password".to_string()),
            realm: get("KEYCLOAK_REALM").unwrap_or_else(|| DEFAULT_REALM.to_string()),
            client_id: get("KEYCLOAK_CLIENT_ID").unwrap_or_else(|| DEFAULT_CLIENT_ID.to_string()),
            inventory_file: PathBuf::from(inventory_file),
            force_overwrite: flag("FORCE_OVERWRITE")?,
            force_delete: flag("FORCE_DELETE")?,
            delete_all: flag("DELETE_ALL")?,
            attach_submodels: flag("ATTACH_SUBMODELS")?,
            pacing,
            request_timeout: secs("REQUEST_TIMEOUT_SECS", 30)?,
            slm_host,
            registry_url,
            keycloak_url,
        })
    }

    /// Connection settings for the registry client.
    #[must_use]
    pub fn endpoint(&self) -> RegistryEndpoint {
        RegistryEndpoint {
            registry_url: self.registry_url.clone(),
            keycloak_url: self.keycloak_url.clone(),
            realm: self.realm.clone(),
            client_id: self.client_id.clone(),
            username: self.slm_user.clone(),
            password: self.slm_password.clone(),
            timeout: self.request_timeout,
        }
    }

    #[must_use]
    pub fn setup_options(&self) -> SetupOptions {
        SetupOptions {
            force_overwrite: self.force_overwrite,
            force_delete: self.force_delete,
            delete_all: self.delete_all,
            attach_submodels: self.attach_submodels,
        }
    }

    /// Log the effective configuration, password redacted.
    pub fn log_summary(&self) {
        info!(
            slm_host = %self.slm_host,
            slm_user = %self.slm_user,
            registry = %self.registry_url,
            keycloak = %self.keycloak_url,
            realm = %self.realm,
            inventory = %self.inventory_file.display(),
            force_overwrite = self.force_overwrite,
            force_delete = self.force_delete,
            delete_all = self.delete_all,
            attach_submodels = self.attach_submodels,
            "effective configuration"
        );
    }
}

/// Accepts `true`/`1`/`yes` and `false`/`0`/`no`, case-insensitively.
pub fn parse_flag(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        other => Err(ConfigError::InvalidValue(
            key.into(),
            format!("'{other}' is not a boolean"),
        )),
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for {0}: {1}")]
    InvalidValue(String, String),
}
