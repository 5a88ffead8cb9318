//! Identity provider authentication: OIDC password grant against Keycloak.

use crate::error::{RegistryError, RegistryResult};
use reqwest::RequestBuilder;
use serde::Deserialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::{debug, info};

/// Default OIDC client used by the self-service portal.
pub const DEFAULT_CLIENT_ID: &str = "self-service-portal";

/// Default Keycloak realm of the SLM installation.
pub const DEFAULT_REALM: &str = "fabos";

/// Build the OpenID Connect token endpoint for a Keycloak host and realm.
#[must_use]
pub fn token_url(keycloak_host: &str, realm: &str) -> String {
    format!(
        "{}/auth/realms/{}/protocol/openid-connect/token",
        keycloak_host.trim_end_matches('/'),
        realm
    )
}

/// Resource owner credentials for the password grant.
///
/// The [`Debug`] impl redacts the password.
#[derive(Clone)]
pub struct PasswordCredentials {
    pub token_url: String,
    pub client_id: String,
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for PasswordCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PasswordCredentials")
            .field("token_url", &self.token_url)
            .field("client_id", &self.client_id)
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    #[serde(default)]
    expires_in: Option<u64>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
}

#[derive(Debug, Clone)]
struct CachedToken {
    access_token: String,
    expires_at: Option<Instant>,
}

impl CachedToken {
    fn is_expired(&self) -> bool {
        match self.expires_at {
            Some(exp) => Instant::now() >= exp,
            None => false,
        }
    }
}

/// Token source for registry requests.
///
/// Clones share the cached token.
#[derive(Debug, Clone)]
pub struct KeycloakAuth {
    credentials: PasswordCredentials,
    cached_token: Arc<RwLock<Option<CachedToken>>>,
    http_client: reqwest::Client,
}

impl KeycloakAuth {
    #[must_use]
    pub fn new(credentials: PasswordCredentials, http_client: reqwest::Client) -> Self {
        Self {
            credentials,
            cached_token: Arc::new(RwLock::new(None)),
            http_client,
        }
    }

    /// Request a fresh access token from the identity provider.
    pub async fn fetch_token(&self) -> RegistryResult<String> {
        debug!(token_url = %self.credentials.token_url, "requesting access token");

        let form = [
            ("client_id", self.credentials.client_id.as_str()),
            ("grant_type", "password"),
            ("username", self.credentials.username.as_str()),
            ("password", self.credentials.password.as_str()),
        ];

        let response = self
            .http_client
            .post(&self.credentials.token_url)
            .form(&form)
            .send()
            .await
            .map_err(|e| RegistryError::Auth(format!("token request failed: {e}")))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            RegistryError::Auth(format!(
                "failed to read identity provider response ({status}): {e}"
            ))
        })?;
        let parsed: Option<TokenResponse> = serde_json::from_str(&body).ok();

        let Some(token) = parsed else {
            return Err(RegistryError::Auth(format!(
                "identity provider returned {status} without a token response"
            )));
        };

        let Some(access_token) = token.access_token.filter(|t| !t.is_empty()) else {
            let reason = token
                .error_description
                .or(token.error)
                .unwrap_or_else(|| format!("HTTP {status}"));
            return Err(RegistryError::Auth(format!(
                "no access_token from identity provider ({status}): {reason}"
            )));
        };

        info!(status = status.as_u16(), "got access token from identity provider");

        // Treat the token as expired 30 seconds early.
        let expires_at = token
            .expires_in
            .map(|secs| Instant::now() + Duration::from_secs(secs.saturating_sub(30)));

        let mut cache = self.cached_token.write().await;
        *cache = Some(CachedToken {
            access_token: access_token.clone(),
            expires_at,
        });

        Ok(access_token)
    }

    /// Return the cached token, fetching a new one when absent or expired.
    pub async fn bearer_token(&self) -> RegistryResult<String> {
        {
            let cache = self.cached_token.read().await;
            if let Some(cached) = cache.as_ref() {
                if !cached.is_expired() {
                    return Ok(cached.access_token.clone());
                }
            }
        }
        self.fetch_token().await
    }

    /// Force a token refresh regardless of the cached token's lifetime.
    pub async fn refresh(&self) -> RegistryResult<()> {
        debug!("refreshing access token");
        self.fetch_token().await.map(|_| ())
    }

    /// Attach the bearer token to a request.
    pub async fn apply(&self, builder: RequestBuilder) -> RegistryResult<RequestBuilder> {
        let token = self.bearer_token().await?;
        Ok(builder.bearer_auth(token))
    }

    /// Drop the cached token (after a 401 from the registry).
    pub async fn invalidate_cache(&self) {
        let mut cache = self.cached_token.write().await;
        *cache = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_url() {
        assert_eq!(
            token_url("http://10.0.0.1:7080/", "fabos"),
            "http://10.0.0.1:7080/auth/realms/fabos/protocol/openid-connect/token"
        );
    }

    #[test]
    fn test_credentials_debug_redacts_password() {
        let creds = PasswordCredentials {
            token_url: "http://kc/token".to_string(),
            client_id: DEFAULT_CLIENT_ID.to_string(),
            username: "fabos".to_string(),
            password: "hunter2".to_string(),
        };
        let debug = format!("{creds:?}");
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("hunter2"));
    }

    #[test]
    fn test_cached_token_expiry() {
        let fresh = CachedToken {
            access_token: "a".into(),
            expires_at: Some(Instant::now() + Duration::from_secs(60)),
        };
        assert!(!fresh.is_expired());

        let stale = CachedToken {
            access_token: "a".into(),
            expires_at: Some(Instant::now()),
        };
        assert!(stale.is_expired());

        let forever = CachedToken {
            access_token: "a".into(),
            expires_at: None,
        };
        assert!(!forever.is_expired());
    }

    /// Serves one token response whose body stops short of its Content-Length.
    async fn truncated_token_server() -> String {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request_complete(&request) {
                let n = stream.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }
            stream
                .write_all(
                    b"HTTP/1.1 200 OK\r\nContent-Type: application/json\r\n\
                      Content-Length: 100\r\n\r\n{\"access_token\"",
                )
                .await
                .unwrap();
            stream.shutdown().await.unwrap();
        });
        format!("http://{addr}/token")
    }

    fn request_complete(request: &[u8]) -> bool {
        let text = String::from_utf8_lossy(request);
        let Some((head, body)) = text.split_once("\r\n\r\n") else {
            return false;
        };
        let length = head
            .lines()
            .filter_map(|line| line.split_once(':'))
            .find(|(name, _)| name.eq_ignore_ascii_case("content-length"))
            .and_then(|(_, value)| value.trim().parse::<usize>().ok())
            .unwrap_or(0);
        body.len() >= length
    }

    #[tokio::test]
    async fn test_unreadable_token_body_is_auth_error() {
        let auth = KeycloakAuth::new(
            PasswordCredentials {
                token_url: truncated_token_server().await,
                client_id: DEFAULT_CLIENT_ID.to_string(),
                username: "fabos".to_string(),
                password: "password".to_string(),
            },
            reqwest::Client::new(),
        );

        match auth.fetch_token().await {
            Err(RegistryError::Auth(message)) => {
                assert!(
                    message.contains("failed to read identity provider response"),
                    "{message}"
                );
            }
            other => panic!("expected an auth error, got {other:?}"),
        }
    }
}
