//! Domain service for managed accounts and their addon collections.
//!
//! Every operation that changes an account's addons reads the remote
//! collection, changes it and writes the whole collection back. Operations on
//! the same account are serialized; different accounts may run concurrently.

use serde::Serialize;
use thiserror::Error;

use crate::clients::ApiError;
use crate::crypto::CryptoError;
use crate::domain::{AccountId, ApiKeyId};
use crate::models::{
    Account, AccountExport, AddonDescriptor, ApiKey, ApiKeyInput, ApiKeyUpdate, MergeResult,
    MergeStrategy, SavedAddon,
};
use crate::services::debrid::DebridError;
use crate::services::merge::RemovalOutcome;
use crate::services::updates::AddonUpdateInfo;

/// Errors specific to account operations.
#[derive(Debug, Error)]
pub enum AccountError {
    #[error("Account not found: {0}")]
    NotFound(AccountId),

    #[error("API key not found: {0}")]
    ApiKeyNotFound(ApiKeyId),

    #[error("Addon not found: {0}")]
    AddonNotFound(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error(transparent)]
    Crypto(#[from] CryptoError),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Debrid(#[from] DebridError),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl From<anyhow::Error> for AccountError {
    fn from(err: anyhow::Error) -> Self {
        Self::Storage(err.to_string())
    }
}

/// Changes requested through `update_account`.
///
/// Supplying `auth_key`, or `email` together with `password`, replaces the
/// stored credentials once the remote accepts them.
#[derive(Debug, Clone, Default)]
pub struct AccountUpdate {
    pub name: Option<String>,
    pub auth_key: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Outcome of syncing every account.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SyncReport {
    pub synced: Vec<AccountId>,
    pub failed: Vec<(AccountId, String)>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReinstallOutcome {
    pub addons: Vec<AddonDescriptor>,
    /// `None` when the addon is protected and was left alone.
    pub updated_addon: Option<AddonDescriptor>,
    pub previous_version: Option<String>,
    pub new_version: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct BulkDebridResult {
    pub success: usize,
    pub failed: usize,
    pub errors: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ImportSummary {
    pub imported: Vec<AccountId>,
    /// Imported accounts that carried no auth key and need new credentials.
    pub without_credentials: Vec<AccountId>,
    /// Library entries that travelled with the export, for the caller to
    /// hand to the library.
    pub saved_addons: Vec<SavedAddon>,
}

#[async_trait::async_trait]
pub trait AccountService: Send + Sync {
    async fn list_accounts(&self) -> Vec<Account>;

    async fn get_account(&self, id: AccountId) -> Result<Account, AccountError>;

    /// Validates `auth_key` by fetching the collection, then stores the
    /// account.
    async fn add_account_by_auth_key(
        &self,
        auth_key: &str,
        name: &str,
    ) -> Result<Account, AccountError>;

    /// Logs in, fetches the collection and stores the account. The name
    /// defaults to the email.
    async fn add_account_by_credentials(
        &self,
        email: &str,
        password: &str,
        name: Option<&str>,
    ) -> Result<Account, AccountError>;

    async fn remove_account(&self, id: AccountId) -> Result<(), AccountError>;

    /// Refreshes the cached collection. On failure the account is marked
    /// `error` and keeps its last known addons.
    async fn sync_account(&self, id: AccountId) -> Result<Account, AccountError>;

    /// Syncs accounts one after another; a failure does not stop the rest.
    async fn sync_all(&self) -> Result<SyncReport, AccountError>;

    /// # Errors
    ///
    /// Credential changes rejected by the remote leave the stored account
    /// untouched.
    async fn update_account(
        &self,
        id: AccountId,
        update: AccountUpdate,
    ) -> Result<Account, AccountError>;

    /// Installs from `url`, replacing an addon with the same id in place.
    async fn install_addon(
        &self,
        id: AccountId,
        url: &str,
    ) -> Result<Vec<AddonDescriptor>, AccountError>;

    async fn remove_addons(
        &self,
        id: AccountId,
        addon_ids: &[String],
    ) -> Result<RemovalOutcome, AccountError>;

    async fn remove_addon(
        &self,
        id: AccountId,
        addon_id: &str,
    ) -> Result<RemovalOutcome, AccountError>;

    /// # Errors
    ///
    /// Returns [`AccountError::Validation`] unless `order` is a permutation of
    /// the current addon ids.
    async fn reorder_addons(
        &self,
        id: AccountId,
        order: &[String],
    ) -> Result<Vec<AddonDescriptor>, AccountError>;

    async fn reinstall_addon(
        &self,
        id: AccountId,
        addon_id: &str,
    ) -> Result<ReinstallOutcome, AccountError>;

    async fn apply_saved_addons(
        &self,
        id: AccountId,
        saved: &[SavedAddon],
        strategy: MergeStrategy,
    ) -> Result<MergeResult, AccountError>;

    /// Same merge as `apply_saved_addons` without writing anything.
    async fn preview_saved_addons(
        &self,
        id: AccountId,
        saved: &[SavedAddon],
        strategy: MergeStrategy,
    ) -> Result<MergeResult, AccountError>;

    async fn check_addon_updates(
        &self,
        id: AccountId,
    ) -> Result<Vec<AddonUpdateInfo>, AccountError>;

    async fn add_api_key(
        &self,
        id: AccountId,
        input: ApiKeyInput,
    ) -> Result<ApiKey, AccountError>;

    async fn update_api_key(
        &self,
        id: AccountId,
        key_id: ApiKeyId,
        update: ApiKeyUpdate,
    ) -> Result<ApiKey, AccountError>;

    async fn remove_api_key(&self, id: AccountId, key_id: ApiKeyId) -> Result<(), AccountError>;

    /// Decrypted key material.
    async fn reveal_api_key(&self, id: AccountId, key_id: ApiKeyId)
    -> Result<String, AccountError>;

    async fn apply_debrid_key(
        &self,
        id: AccountId,
        addon_id: &str,
        key_id: ApiKeyId,
    ) -> Result<AddonDescriptor, AccountError>;

    async fn remove_debrid_key(
        &self,
        id: AccountId,
        addon_id: &str,
    ) -> Result<AddonDescriptor, AccountError>;

    /// Applies the key to every addon of `addon_type` (a codec key such as
    /// `torrentio`).
    async fn bulk_apply_debrid_key(
        &self,
        id: AccountId,
        addon_type: &str,
        key_id: ApiKeyId,
    ) -> Result<BulkDebridResult, AccountError>;

    async fn bulk_remove_debrid(
        &self,
        id: AccountId,
        addon_type: &str,
    ) -> Result<BulkDebridResult, AccountError>;

    /// Credentials are only decrypted into the export when
    /// `include_credentials` is set.
    async fn export_accounts(
        &self,
        include_credentials: bool,
        saved_addons: Option<Vec<SavedAddon>>,
    ) -> Result<AccountExport, AccountError>;

    /// Imports accounts under fresh ids, appended after existing ones.
    ///
    /// # Errors
    ///
    /// Returns [`AccountError::Validation`] for malformed or unsupported
    /// payloads; nothing is stored in that case.
    async fn import_accounts(&self, json: &str) -> Result<ImportSummary, AccountError>;
}
