//! Mock resource registry and identity provider on one wiremock server.

#![allow(dead_code)]

use serde_json::{json, Value};
use slm_registry_client::auth::{token_url, KeycloakAuth, PasswordCredentials, DEFAULT_CLIENT_ID};
use slm_registry_client::capability::Capability;
use slm_registry_client::client::RegistryClient;
use uuid::Uuid;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const TEST_TOKEN: &str = "test-token-123";
pub const TOKEN_PATH: &str = "/auth/realms/fabos/protocol/openid-connect/token";

pub struct MockRegistry {
    pub server: MockServer,
}

impl MockRegistry {
    pub async fn new() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    pub fn uri(&self) -> String {
        self.server.uri()
    }

    /// Registry client whose Keycloak and registry both point at this server.
    pub fn client(&self) -> RegistryClient {
        let auth = KeycloakAuth::new(
            PasswordCredentials {
                token_url: token_url(&self.uri(), "fabos"),
                client_id: DEFAULT_CLIENT_ID.to_string(),
                username: "fabos".to_string(),
                password: "password".to_string(),
            },
            reqwest::Client::new(),
        );
        RegistryClient::with_http_client(&self.uri(), "fabos", auth, reqwest::Client::new())
    }

    // =========================================================================
    // Identity provider
    // =========================================================================

    pub async fn mock_token(&self) {
        Mock::given(method("POST"))
            .and(path(TOKEN_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": TEST_TOKEN,
                "token_type": "Bearer",
                "expires_in": 300
            })))
            .mount(&self.server)
            .await;
    }

    pub async fn mock_token_rejected(&self) {
        Mock::given(method("POST"))
            .and(path(TOKEN_PATH))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "error": "invalid_grant",
                "error_description": "Invalid user credentials"
            })))
            .mount(&self.server)
            .await;
    }

    // =========================================================================
    // Resources
    // =========================================================================

    /// Answer every `GET /resources` with the given list.
    pub async fn mock_resources(&self, resources: Vec<Value>) {
        Mock::given(method("GET"))
            .and(path("/resources"))
            .respond_with(ResponseTemplate::new(200).set_body_json(Value::Array(resources)))
            .mount(&self.server)
            .await;
    }

    /// Answer the next `n` `GET /resources` with the given list.
    ///
    /// Mount before [`Self::mock_resources`] so the later answer takes over.
    pub async fn mock_resources_times(&self, resources: Vec<Value>, n: u64) {
        Mock::given(method("GET"))
            .and(path("/resources"))
            .respond_with(ResponseTemplate::new(200).set_body_json(Value::Array(resources)))
            .up_to_n_times(n)
            .mount(&self.server)
            .await;
    }

    pub async fn mock_create(&self, id: Uuid, status: u16, expected_calls: u64) {
        Mock::given(method("PUT"))
            .and(path(format!("/resources/{id}")))
            .and(header("Authorization", format!("Bearer {TEST_TOKEN}").as_str()))
            .and(header("Realm", "fabos"))
            .respond_with(ResponseTemplate::new(status).set_body_json(json!({"id": id})))
            .expect(expected_calls)
            .mount(&self.server)
            .await;
    }

    pub async fn mock_delete(&self, id: Uuid, status: u16, expected_calls: u64) {
        Mock::given(method("DELETE"))
            .and(path(format!("/resources/{id}")))
            .respond_with(ResponseTemplate::new(status))
            .expect(expected_calls)
            .mount(&self.server)
            .await;
    }

    // =========================================================================
    // Capabilities & submodels
    // =========================================================================

    pub async fn mock_deployment_capabilities(&self, id: Uuid, names: &[&str]) {
        let body: Vec<Value> = names.iter().map(|n| json!({ "name": n })).collect();
        Mock::given(method("GET"))
            .and(path(format!("/resources/{id}/deployment-capabilities")))
            .respond_with(ResponseTemplate::new(200).set_body_json(Value::Array(body)))
            .mount(&self.server)
            .await;
    }

    pub async fn mock_add_capability(
        &self,
        id: Uuid,
        capability: Capability,
        status: u16,
        expected_calls: u64,
    ) {
        Mock::given(method("PUT"))
            .and(path(format!("/resources/{id}/capabilities")))
            .and(query_param("capabilityId", capability.id()))
            .respond_with(ResponseTemplate::new(status))
            .expect(expected_calls)
            .mount(&self.server)
            .await;
    }

    pub async fn mock_add_submodel(&self, id: Uuid, status: u16, expected_calls: u64) {
        Mock::given(method("POST"))
            .and(path(format!("/resources/{id}/submodels")))
            .respond_with(ResponseTemplate::new(status))
            .expect(expected_calls)
            .mount(&self.server)
            .await;
    }
}
