//! Resource registry HTTP client (reqwest-based).
//!
//! Wraps the registry's REST surface: resources, their deployment
//! capabilities and submodels, and locations. Every request carries the
//! bearer token from [`KeycloakAuth`] and the `Realm` header.

use crate::auth::KeycloakAuth;
use crate::capability::Capability;
use crate::error::{RegistryError, RegistryResult};
use crate::models::{DeploymentCapability, DeviceItem, Location, RegistryResource};
use reqwest::{multipart, Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, warn};
use uuid::Uuid;

/// Client for one resource registry.
#[derive(Debug, Clone)]
pub struct RegistryClient {
    /// Base URL of the registry (e.g., "http://192.168.153.47:9010").
    base_url: String,
    realm: String,
    auth: KeycloakAuth,
    http_client: Client,
}

impl RegistryClient {
    /// Create a new registry client.
    pub fn new(
        base_url: &str,
        realm: &str,
        auth: KeycloakAuth,
        timeout: Duration,
    ) -> RegistryResult<Self> {
        let http_client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("slm-registry-client/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| {
                RegistryError::InvalidConfig(format!("failed to build HTTP client: {e}"))
            })?;

        Ok(Self::with_http_client(base_url, realm, auth, http_client))
    }

    /// Create a client with a pre-built `reqwest::Client` (for testing).
    #[must_use]
    pub fn with_http_client(
        base_url: &str,
        realm: &str,
        auth: KeycloakAuth,
        http_client: Client,
    ) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            realm: realm.to_string(),
            auth,
            http_client,
        }
    }

    #[must_use]
    pub fn auth(&self) -> &KeycloakAuth {
        &self.auth
    }

    // ── Resources ─────────────────────────────────────────────────────

    /// List every resource in the registry (GET /resources).
    ///
    /// Refreshes the access token first; the setup flow calls this between
    /// long pauses. Records whose id is not a UUID are skipped.
    pub async fn list_resources(&self) -> RegistryResult<Vec<RegistryResource>> {
        self.auth.refresh().await?;
        let url = format!("{}/resources", self.base_url);
        let entries: Vec<serde_json::Value> = self.get(&url).await?;

        let mut resources = Vec::with_capacity(entries.len());
        for entry in entries {
            let raw_id = entry.get("id").map(ToString::to_string).unwrap_or_default();
            match serde_json::from_value::<RegistryResource>(entry) {
                Ok(resource) => resources.push(resource),
                Err(e) => warn!(id = %raw_id, error = %e, "skipping unreadable registry resource"),
            }
        }
        debug!(count = resources.len(), "listed registry resources");
        Ok(resources)
    }

    /// Ids of every registered resource.
    pub async fn resource_ids(&self) -> RegistryResult<Vec<Uuid>> {
        Ok(self
            .list_resources()
            .await?
            .into_iter()
            .map(|r| r.id)
            .collect())
    }

    /// Fetch one resource (GET /resources/:id); `None` when unknown.
    pub async fn get_resource(&self, id: Uuid) -> RegistryResult<Option<RegistryResource>> {
        let url = format!("{}/resources/{}", self.base_url, id);
        match self.get(&url).await {
            Ok(resource) => Ok(Some(resource)),
            Err(RegistryError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Create or overwrite a resource (PUT /resources/:id, form body).
    ///
    /// Only 200 and 201 count as written.
    pub async fn create_resource(&self, id: Uuid, item: &DeviceItem) -> RegistryResult<()> {
        let url = format!("{}/resources/{}", self.base_url, id);
        debug!("registry PUT {}", url);
        let builder = self.authorized(self.http_client.put(&url)).await?;
        let response = builder.form(item).send().await?;

        let status = response.status();
        match status {
            StatusCode::OK | StatusCode::CREATED => Ok(()),
            _ if status.is_success() => Err(RegistryError::Api {
                status: status.as_u16(),
                body: response
                    .text()
                    .await
                    .unwrap_or_else(|_| "<no body>".to_string()),
            }),
            _ => self.handle_error_response(response).await,
        }
    }

    /// Delete a resource (DELETE /resources/:id).
    pub async fn delete_resource(&self, id: Uuid) -> RegistryResult<()> {
        let url = format!("{}/resources/{}", self.base_url, id);
        self.delete(&url).await
    }

    // ── Capabilities ──────────────────────────────────────────────────

    /// Capabilities currently attached to a resource.
    pub async fn list_deployment_capabilities(
        &self,
        id: Uuid,
    ) -> RegistryResult<Vec<DeploymentCapability>> {
        let url = format!(
            "{}/resources/{}/deployment-capabilities",
            self.base_url, id
        );
        self.get(&url).await
    }

    /// Attach a capability to a resource.
    pub async fn add_capability(&self, id: Uuid, capability: Capability) -> RegistryResult<()> {
        let url = format!("{}/resources/{}/capabilities", self.base_url, id);
        debug!("registry PUT {} (capability={})", url, capability);
        let builder = self
            .authorized(self.http_client.put(&url))
            .await?
            .query(&[("capabilityId", capability.id())]);
        let response = builder.send().await?;
        self.expect_success(response).await
    }

    // ── Submodels ─────────────────────────────────────────────────────

    /// Upload one submodel file (e.g. an AASX package) to a resource.
    pub async fn add_submodel(&self, id: Uuid, file: &Path) -> RegistryResult<()> {
        let bytes = tokio::fs::read(file).await?;
        let file_name = file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "submodel.aasx".to_string());

        let part = multipart::Part::bytes(bytes)
            .file_name(file_name)
            .mime_str("application/octet-stream")?;
        let form = multipart::Form::new().part("file", part);

        let url = format!("{}/resources/{}/submodels", self.base_url, id);
        debug!("registry POST {} (file={})", url, file.display());
        let builder = self.authorized(self.http_client.post(&url)).await?;
        let response = builder.multipart(form).send().await?;
        self.expect_success(response).await
    }

    // ── Locations ─────────────────────────────────────────────────────

    pub async fn list_locations(&self) -> RegistryResult<Vec<Location>> {
        let url = format!("{}/resources/locations", self.base_url);
        self.get(&url).await
    }

    pub async fn create_location(&self, id: &str, name: &str) -> RegistryResult<()> {
        let url = format!("{}/resources/locations", self.base_url);
        debug!("registry POST {} (id={}, name={})", url, id, name);
        let builder = self
            .authorized(self.http_client.post(&url))
            .await?
            .query(&[("id", id), ("name", name)]);
        let response = builder.send().await?;
        self.expect_success(response).await
    }

    pub async fn delete_location(&self, id: &str) -> RegistryResult<()> {
        let url = format!("{}/resources/locations", self.base_url);
        debug!("registry DELETE {} (id={})", url, id);
        let builder = self
            .authorized(self.http_client.delete(&url))
            .await?
            .query(&[("id", id)]);
        let response = builder.send().await?;
        self.expect_success(response).await
    }

    // ── Internal HTTP Methods ─────────────────────────────────────────

    async fn authorized(&self, builder: RequestBuilder) -> RegistryResult<RequestBuilder> {
        let builder = self.auth.apply(builder).await?;
        Ok(builder.header("Realm", &self.realm))
    }

    async fn get<T: DeserializeOwned>(&self, url: &str) -> RegistryResult<T> {
        debug!("registry GET {}", url);
        let builder = self.authorized(self.http_client.get(url)).await?;
        let response = builder.send().await?;
        self.handle_response(response).await
    }

    async fn delete(&self, url: &str) -> RegistryResult<()> {
        debug!("registry DELETE {}", url);
        let builder = self.authorized(self.http_client.delete(url)).await?;
        let response = builder.send().await?;
        self.expect_success(response).await
    }

    // ── Response Handling ─────────────────────────────────────────────

    async fn handle_response<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> RegistryResult<T> {
        if response.status().is_success() {
            let body = response.text().await?;
            serde_json::from_str(&body).map_err(|e| RegistryError::Parse(e.to_string()))
        } else {
            self.handle_error_response(response).await
        }
    }

    async fn expect_success(&self, response: reqwest::Response) -> RegistryResult<()> {
        if response.status().is_success() {
            Ok(())
        } else {
            self.handle_error_response(response).await
        }
    }

    async fn handle_error_response<T>(&self, response: reqwest::Response) -> RegistryResult<T> {
        let status = response.status();
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "<no body>".to_string());

        match status {
            StatusCode::NOT_FOUND => Err(RegistryError::NotFound(body)),
            StatusCode::UNAUTHORIZED => {
                self.auth.invalidate_cache().await;
                Err(RegistryError::Auth(format!(
                    "registry rejected the access token (401): {body}"
                )))
            }
            _ => {
                if status.is_server_error() {
                    warn!(status = status.as_u16(), "registry server error");
                }
                Err(RegistryError::Api {
                    status: status.as_u16(),
                    body,
                })
            }
        }
    }
}
