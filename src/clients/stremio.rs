use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::RemoteConfig;
use crate::models::{AddonDescriptor, AddonManifest};

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Invalid credentials: {0}")]
    InvalidCredentials(String),

    #[error("Network unavailable: {0}")]
    NetworkUnavailable(String),

    #[error("Manifest fetch failed for {url}: {reason}")]
    ManifestFetchFailed { url: String, reason: String },

    #[error("Remote error: {0}")]
    Remote(String),
}

impl ApiError {
    fn manifest(url: &str, reason: impl Into<String>) -> Self {
        Self::ManifestFetchFailed {
            url: url.to_string(),
            reason: reason.into(),
        }
    }
}

fn transport_error(err: &reqwest::Error) -> ApiError {
    if err.is_connect() || err.is_timeout() {
        ApiError::NetworkUnavailable(err.to_string())
    } else {
        ApiError::Remote(err.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteUser {
    #[serde(rename = "_id", default)]
    pub id: String,
    #[serde(default)]
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub auth_key: String,
    pub user: RemoteUser,
}

/// Retrieves and validates addon manifests.
#[async_trait]
pub trait ManifestFetcher: Send + Sync {
    /// Fetches `{transport_url}/manifest.json`. A manifest without `id`,
    /// `name` or `version` is a failed fetch.
    async fn fetch_manifest(&self, transport_url: &str) -> Result<AddonDescriptor, ApiError>;
}

/// Remote account service holding the authoritative addon collections.
#[async_trait]
pub trait AccountApi: ManifestFetcher {
    async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, ApiError>;

    /// An empty collection is a valid answer.
    async fn get_addon_collection(&self, auth_key: &str)
    -> Result<Vec<AddonDescriptor>, ApiError>;

    async fn set_addon_collection(
        &self,
        auth_key: &str,
        addons: &[AddonDescriptor],
    ) -> Result<(), ApiError>;
}

/// URL of the manifest served by an addon installed from `transport_url`.
#[must_use]
pub fn manifest_url(transport_url: &str) -> String {
    let trimmed = transport_url.trim_end_matches('/');
    if trimmed.ends_with("/manifest.json") {
        trimmed.to_string()
    } else {
        format!("{trimmed}/manifest.json")
    }
}

#[derive(Debug, Deserialize)]
struct RpcEnvelope {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<Value>,
}

fn error_message(error: &Value) -> String {
    error
        .get("message")
        .and_then(Value::as_str)
        .map_or_else(|| error.to_string(), str::to_string)
}

#[derive(Debug, Deserialize)]
struct AddonCollectionResult {
    #[serde(default)]
    addons: Option<Vec<AddonDescriptor>>,
}

#[derive(Debug, Clone)]
pub struct StremioClient {
    client: Client,
    api_base: String,
    manifest_timeout: Duration,
}

impl StremioClient {
    pub fn new(config: &RemoteConfig) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to build HTTP client: {e}"))?;

        Ok(Self {
            client,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            manifest_timeout: Duration::from_secs(config.manifest_timeout_seconds),
        })
    }

    /// Underlying HTTP client, shared with the health probe for pooling.
    #[must_use]
    pub fn http_client(&self) -> &Client {
        &self.client
    }

    async fn rpc<T: DeserializeOwned>(
        &self,
        method: &str,
        body: Value,
    ) -> Result<(StatusCode, Option<T>, Option<Value>), ApiError> {
        let url = format!("{}/api/{method}", self.api_base);
        debug!(method, "Calling account API");

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| transport_error(&e))?;

        let status = response.status();
        let text = response.text().await.map_err(|e| transport_error(&e))?;

        // Only 2xx and 401 reach the caller; anything else is a server-side failure.
        if !status.is_success() && status != StatusCode::UNAUTHORIZED {
            let detail = serde_json::from_str::<RpcEnvelope>(&text)
                .ok()
                .and_then(|envelope| envelope.error)
                .map(|error| format!(": {}", error_message(&error)))
                .unwrap_or_default();
            warn!(method, %status, "Account API returned an error status");
            return Err(ApiError::Remote(format!(
                "{method} failed with HTTP {status}{detail}"
            )));
        }

        let envelope: RpcEnvelope = match serde_json::from_str(&text) {
            Ok(envelope) => envelope,
            Err(e) if status.is_success() => {
                return Err(ApiError::Remote(format!(
                    "Failed to parse {method} response: {e}"
                )));
            }
            Err(_) => RpcEnvelope {
                result: None,
                error: None,
            },
        };

        let result = envelope
            .result
            .filter(|v| !v.is_null())
            .map(serde_json::from_value)
            .transpose()
            .map_err(|e| ApiError::Remote(format!("Unexpected {method} result: {e}")))?;

        Ok((status, result, envelope.error))
    }
}

#[async_trait]
impl ManifestFetcher for StremioClient {
    async fn fetch_manifest(&self, transport_url: &str) -> Result<AddonDescriptor, ApiError> {
        let url = manifest_url(transport_url);
        url::Url::parse(&url).map_err(|e| ApiError::manifest(transport_url, e.to_string()))?;

        let response = self
            .client
            .get(&url)
            .timeout(self.manifest_timeout)
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() || e.is_timeout() {
                    ApiError::manifest(transport_url, "Cannot reach addon URL")
                } else {
                    ApiError::manifest(transport_url, e.to_string())
                }
            })?;

        match response.status() {
            StatusCode::OK => {}
            StatusCode::NOT_FOUND => {
                return Err(ApiError::manifest(
                    transport_url,
                    "Addon manifest not found at this URL",
                ));
            }
            status => {
                return Err(ApiError::manifest(transport_url, format!("HTTP {status}")));
            }
        }

        let manifest: AddonManifest = response
            .json()
            .await
            .map_err(|e| ApiError::manifest(transport_url, format!("Invalid manifest: {e}")))?;

        if let Some(field) = manifest.missing_required_field() {
            return Err(ApiError::manifest(
                transport_url,
                format!("Invalid addon manifest - missing required field: {field}"),
            ));
        }

        Ok(AddonDescriptor::new(transport_url, manifest))
    }
}

#[async_trait]
impl AccountApi for StremioClient {
    async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, ApiError> {
        let body = json!({ "type": "Auth", "email": email, "password": password });
        let (status, result, error) = self.rpc::<LoginResponse>("login", body).await?;

        if status == StatusCode::UNAUTHORIZED {
            return Err(ApiError::InvalidCredentials(
                "Invalid email or password".to_string(),
            ));
        }

        if let Some(error) = error {
            return Err(ApiError::InvalidCredentials(error_message(&error)));
        }

        match result {
            Some(login) if !login.auth_key.is_empty() => Ok(login),
            _ => Err(ApiError::Remote(
                "Invalid login response - no auth key".to_string(),
            )),
        }
    }

    async fn get_addon_collection(
        &self,
        auth_key: &str,
    ) -> Result<Vec<AddonDescriptor>, ApiError> {
        let body = json!({ "type": "AddonCollectionGet", "authKey": auth_key, "update": true });
        let (status, result, error) = self
            .rpc::<AddonCollectionResult>("addonCollectionGet", body)
            .await?;

        if status == StatusCode::UNAUTHORIZED {
            return Err(ApiError::InvalidCredentials(
                "Invalid or expired auth key".to_string(),
            ));
        }

        if let Some(error) = error {
            return Err(ApiError::Remote(error_message(&error)));
        }

        Ok(result.and_then(|r| r.addons).unwrap_or_default())
    }

    async fn set_addon_collection(
        &self,
        auth_key: &str,
        addons: &[AddonDescriptor],
    ) -> Result<(), ApiError> {
        let body = json!({ "type": "AddonCollectionSet", "authKey": auth_key, "addons": addons });
        let (status, result, error) = self.rpc::<Value>("addonCollectionSet", body).await?;

        if status == StatusCode::UNAUTHORIZED {
            return Err(ApiError::InvalidCredentials(
                "Invalid or expired auth key".to_string(),
            ));
        }

        if let Some(error) = error {
            return Err(ApiError::Remote(error_message(&error)));
        }

        let rejected = result
            .as_ref()
            .and_then(|r| r.get("success"))
            .and_then(Value::as_bool)
            == Some(false);

        if rejected {
            warn!("Account API rejected the addon collection update");
            return Err(ApiError::Remote(
                "Failed to update addon collection".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manifest_url_appends_when_missing() {
        assert_eq!(
            manifest_url("https://addon.example.com"),
            "https://addon.example.com/manifest.json"
        );
        assert_eq!(
            manifest_url("https://addon.example.com/cfg/"),
            "https://addon.example.com/cfg/manifest.json"
        );
        assert_eq!(
            manifest_url("https://addon.example.com/cfg/manifest.json"),
            "https://addon.example.com/cfg/manifest.json"
        );
    }

    #[test]
    fn error_message_prefers_message_field() {
        let err = json!({ "message": "User not found", "code": 2 });
        assert_eq!(error_message(&err), "User not found");
        assert_eq!(error_message(&json!("plain")), "\"plain\"");
    }

    #[test]
    fn login_response_parses_remote_shape() {
        let json = r#"{"authKey":"abc","user":{"_id":"u1","email":"a@b.c"}}"#;
        let login: LoginResponse = serde_json::from_str(json).unwrap();
        assert_eq!(login.auth_key, "abc");
        assert_eq!(login.user.id, "u1");
    }
}
