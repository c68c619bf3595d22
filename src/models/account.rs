use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::domain::{AccountId, AccountStatus, ApiKeyId, ApiService};
use crate::models::addon::AddonDescriptor;
use crate::models::saved_addon::SavedAddonExport;

/// A managed account as persisted in the vault.
///
/// `auth_key`, `password` and every [`ApiKey::api_key`] hold ciphertext
/// produced by [`crate::crypto::CredentialCipher`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: AccountId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub auth_key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default)]
    pub addons: Vec<AddonDescriptor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_keys: Option<Vec<ApiKey>>,
    pub last_sync: DateTime<Utc>,
    #[serde(default)]
    pub status: AccountStatus,
}

impl Account {
    #[must_use]
    pub fn api_keys(&self) -> &[ApiKey] {
        self.api_keys.as_deref().unwrap_or_default()
    }

    #[must_use]
    pub fn find_api_key(&self, id: ApiKeyId) -> Option<&ApiKey> {
        self.api_keys().iter().find(|k| k.id == id)
    }
}

/// A service credential stored with an account (debrid, TMDB, Trakt, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiKey {
    pub id: ApiKeyId,
    pub service: ApiService,
    /// Encrypted key material.
    pub api_key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Map<String, Value>>,
    pub created_at: DateTime<Utc>,
}

/// Plaintext form of an API key as entered by the user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiKeyInput {
    pub service: ApiService,
    pub api_key: String,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub metadata: Option<Map<String, Value>>,
}

/// Versioned export envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountExport {
    pub version: String,
    pub exported_at: DateTime<Utc>,
    pub accounts: Vec<ExportedAccount>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub saved_addons: Option<Vec<SavedAddonExport>>,
}

/// Account entry of an export. Credentials are plaintext and only present when
/// the user explicitly asked for them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportedAccount {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default)]
    pub addons: Vec<AddonDescriptor>,
}

/// Partial edit of an API key; `None` fields are left as they are.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiKeyUpdate {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub metadata: Option<Map<String, Value>>,
}
