//! `AccountService` backed by a [`KeyValueStore`] and the remote account API.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};
use tracing::{info, warn};
use zeroize::Zeroizing;

use crate::clients::AccountApi;
use crate::constants::{export, storage};
use crate::crypto::{self, CredentialCipher};
use crate::db::{KeyValueStore, load_json, save_json};
use crate::domain::{AccountId, AccountStatus, ApiKeyId};
use crate::models::{
    Account, AccountExport, AddonDescriptor, ApiKey, ApiKeyInput, ApiKeyUpdate, ExportedAccount,
    MergeResult, MergeStrategy, SavedAddon,
};
use crate::services::account_service::{
    AccountError, AccountService, AccountUpdate, BulkDebridResult, ImportSummary,
    ReinstallOutcome, SyncReport,
};
use crate::services::debrid::{DebridError, DebridKeyApplier};
use crate::services::merge::{self, RemovalOutcome};
use crate::services::updates::{self, AddonUpdateInfo, ExecutionPolicy};

pub struct DefaultAccountService {
    store: Arc<dyn KeyValueStore>,
    api: Arc<dyn AccountApi>,
    cipher: Arc<CredentialCipher>,
    debrid: DebridKeyApplier,
    update_policy: ExecutionPolicy,
    accounts: RwLock<Vec<Account>>,
    account_locks: Mutex<HashMap<AccountId, Arc<Mutex<()>>>>,
    persist_lock: Mutex<()>,
}

impl DefaultAccountService {
    /// Loads persisted accounts from `store`.
    pub async fn load(
        store: Arc<dyn KeyValueStore>,
        api: Arc<dyn AccountApi>,
        cipher: Arc<CredentialCipher>,
        update_policy: ExecutionPolicy,
    ) -> Result<Self, AccountError> {
        let accounts: Vec<Account> = load_json(store.as_ref(), storage::ACCOUNTS)
            .await?
            .unwrap_or_default();
        info!(count = accounts.len(), "Loaded accounts");

        Ok(Self {
            store,
            api,
            cipher,
            debrid: DebridKeyApplier::default(),
            update_policy,
            accounts: RwLock::new(accounts),
            account_locks: Mutex::new(HashMap::new()),
            persist_lock: Mutex::new(()),
        })
    }

    async fn lock_account(&self, id: AccountId) -> OwnedMutexGuard<()> {
        let lock = self
            .account_locks
            .lock()
            .await
            .entry(id)
            .or_default()
            .clone();
        lock.lock_owned().await
    }

    async fn snapshot(&self, id: AccountId) -> Result<Account, AccountError> {
        self.accounts
            .read()
            .await
            .iter()
            .find(|a| a.id == id)
            .cloned()
            .ok_or(AccountError::NotFound(id))
    }

    /// Applies `change` to a copy of the account list, persists the copy and
    /// only then publishes it. A failed change or save leaves memory as it was.
    async fn update_accounts<T, F>(&self, change: F) -> Result<T, AccountError>
    where
        T: Send,
        F: FnOnce(&mut Vec<Account>) -> Result<T, AccountError> + Send,
    {
        let _guard = self.persist_lock.lock().await;
        let mut next = self.accounts.read().await.clone();
        let value = change(&mut next)?;
        save_json(self.store.as_ref(), storage::ACCOUNTS, &next).await?;
        *self.accounts.write().await = next;
        Ok(value)
    }

    /// Applies `change` to one account and persists.
    async fn commit<T, F>(&self, id: AccountId, change: F) -> Result<T, AccountError>
    where
        T: Send,
        F: FnOnce(&mut Account) -> Result<T, AccountError> + Send,
    {
        self.update_accounts(move |accounts| {
            let account = accounts
                .iter_mut()
                .find(|a| a.id == id)
                .ok_or(AccountError::NotFound(id))?;
            change(account)
        })
        .await
    }

    fn decrypt(&self, ciphertext: &str) -> Result<Zeroizing<String>, AccountError> {
        Ok(Zeroizing::new(self.cipher.decrypt(ciphertext)?))
    }

    async fn remote_collection(
        &self,
        account: &Account,
    ) -> Result<(Zeroizing<String>, Vec<AddonDescriptor>), AccountError> {
        let auth_key = self.decrypt(&account.auth_key)?;
        let addons = self.api.get_addon_collection(&auth_key).await?;
        Ok((auth_key, addons))
    }

    /// Pushes `addons` to the remote, then caches them locally. `status` is
    /// left as it is.
    async fn write_collection(
        &self,
        id: AccountId,
        auth_key: &str,
        addons: Vec<AddonDescriptor>,
    ) -> Result<Vec<AddonDescriptor>, AccountError> {
        self.api.set_addon_collection(auth_key, &addons).await?;
        self.cache_collection(id, addons).await
    }

    async fn cache_collection(
        &self,
        id: AccountId,
        addons: Vec<AddonDescriptor>,
    ) -> Result<Vec<AddonDescriptor>, AccountError> {
        self.commit(id, move |account| {
            account.addons = addons;
            account.last_sync = Utc::now();
            Ok(account.addons.clone())
        })
        .await
    }

    async fn fetch_for(&self, id: AccountId) -> Result<Vec<AddonDescriptor>, AccountError> {
        let account = self.snapshot(id).await?;
        Ok(self.remote_collection(&account).await?.1)
    }

    async fn store_new_account(&self, account: Account) -> Result<Account, AccountError> {
        let stored = account.clone();
        self.update_accounts(move |accounts| {
            accounts.push(stored);
            Ok(())
        })
        .await?;
        info!(account = %account.id, name = %account.name, "Account added");
        Ok(account)
    }

    fn ensure_not_protected(addon: &AddonDescriptor) -> Result<(), AccountError> {
        if addon.is_protected() {
            return Err(AccountError::Validation(format!(
                "Addon '{}' is protected and cannot be modified",
                addon.manifest.name
            )));
        }
        Ok(())
    }

    fn find_addon(addons: &[AddonDescriptor], addon_id: &str) -> Result<usize, AccountError> {
        addons
            .iter()
            .position(|a| a.id() == addon_id)
            .ok_or_else(|| AccountError::AddonNotFound(addon_id.to_string()))
    }

    fn find_key(account: &Account, key_id: ApiKeyId) -> Result<ApiKey, AccountError> {
        account
            .find_api_key(key_id)
            .cloned()
            .ok_or(AccountError::ApiKeyNotFound(key_id))
    }

    fn decrypt_export(&self, ciphertext: Option<&str>) -> Result<Option<String>, AccountError> {
        match ciphertext {
            Some(value) => {
                let plain = self.decrypt(value)?;
                Ok((!plain.is_empty()).then(|| plain.as_str().to_string()))
            }
            None => Ok(None),
        }
    }

    fn import_secret(&self, value: Option<&str>) -> Result<Option<String>, AccountError> {
        match value.filter(|v| !v.is_empty()) {
            Some(v) if crypto::is_encrypted(v) => Err(AccountError::Validation(
                "Import contains encrypted credentials; export them in plaintext first"
                    .to_string(),
            )),
            Some(v) => Ok(Some(self.cipher.encrypt(v)?)),
            None => Ok(None),
        }
    }

    async fn bulk_debrid<F>(
        &self,
        id: AccountId,
        addon_type: &str,
        change: F,
    ) -> Result<BulkDebridResult, AccountError>
    where
        F: Fn(&AddonDescriptor) -> Result<AddonDescriptor, DebridError> + Send + Sync,
    {
        let account = self.snapshot(id).await?;
        let (auth_key, mut addons) = self.remote_collection(&account).await?;
        let mut result = BulkDebridResult::default();

        if self.debrid.find_addons_by_type(&addons, addon_type).is_empty() {
            info!(account = %id, addon_type, "No addons of this type installed");
            return Ok(result);
        }

        for addon in &mut addons {
            if self.debrid.addon_type(&addon.transport_url) != Some(addon_type) {
                continue;
            }

            if addon.is_protected() {
                result.failed += 1;
                result
                    .errors
                    .push(format!("{}: addon is protected", addon.manifest.name));
                continue;
            }

            match change(addon) {
                Ok(updated) => {
                    *addon = updated;
                    result.success += 1;
                }
                Err(e) => {
                    warn!(addon = %addon.manifest.name, error = %e, "Bulk debrid change failed");
                    result.failed += 1;
                    result.errors.push(format!("{}: {e}", addon.manifest.name));
                }
            }
        }

        if result.success > 0 {
            self.write_collection(id, &auth_key, addons).await?;
        }

        info!(
            account = %id,
            addon_type,
            success = result.success,
            failed = result.failed,
            "Bulk debrid update finished"
        );
        Ok(result)
    }
}

#[async_trait]
impl AccountService for DefaultAccountService {
    async fn list_accounts(&self) -> Vec<Account> {
        self.accounts.read().await.clone()
    }

    async fn get_account(&self, id: AccountId) -> Result<Account, AccountError> {
        self.snapshot(id).await
    }

    async fn add_account_by_auth_key(
        &self,
        auth_key: &str,
        name: &str,
    ) -> Result<Account, AccountError> {
        let auth_key = auth_key.trim();
        let name = name.trim();
        if auth_key.is_empty() {
            return Err(AccountError::Validation("Auth key is required".to_string()));
        }
        if name.is_empty() {
            return Err(AccountError::Validation("Account name is required".to_string()));
        }

        let addons = self.api.get_addon_collection(auth_key).await?;

        let account = Account {
            id: AccountId::new(),
            name: name.to_string(),
            email: None,
            auth_key: self.cipher.encrypt(auth_key)?,
            password: None,
            addons,
            api_keys: None,
            last_sync: Utc::now(),
            status: AccountStatus::Active,
        };

        self.store_new_account(account).await
    }

    async fn add_account_by_credentials(
        &self,
        email: &str,
        password: &str,
        name: Option<&str>,
    ) -> Result<Account, AccountError> {
        let email = email.trim();
        if email.is_empty() || password.is_empty() {
            return Err(AccountError::Validation(
                "Email and password are required".to_string(),
            ));
        }

        let login = self.api.login(email, password).await?;
        let auth_key = Zeroizing::new(login.auth_key);
        let addons = self.api.get_addon_collection(&auth_key).await?;

        let name = name
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .unwrap_or(email);

        let account = Account {
            id: AccountId::new(),
            name: name.to_string(),
            email: Some(email.to_string()),
            auth_key: self.cipher.encrypt(&auth_key)?,
            password: Some(self.cipher.encrypt(password)?),
            addons,
            api_keys: None,
            last_sync: Utc::now(),
            status: AccountStatus::Active,
        };

        self.store_new_account(account).await
    }

    async fn remove_account(&self, id: AccountId) -> Result<(), AccountError> {
        let _guard = self.lock_account(id).await;
        self.update_accounts(|accounts| {
            let before = accounts.len();
            accounts.retain(|a| a.id != id);
            if accounts.len() == before {
                return Err(AccountError::NotFound(id));
            }
            Ok(())
        })
        .await?;
        self.account_locks.lock().await.remove(&id);
        info!(account = %id, "Account removed");
        Ok(())
    }

    async fn sync_account(&self, id: AccountId) -> Result<Account, AccountError> {
        let _guard = self.lock_account(id).await;
        self.snapshot(id).await?;

        match self.fetch_for(id).await {
            Ok(addons) => {
                self.commit(id, move |account| {
                    account.addons = addons;
                    account.last_sync = Utc::now();
                    account.status = AccountStatus::Active;
                    Ok(account.clone())
                })
                .await
            }
            Err(e) => {
                warn!(account = %id, error = %e, "Account sync failed");
                self.commit(id, |account| {
                    account.status = AccountStatus::Error;
                    Ok(())
                })
                .await?;
                Err(e)
            }
        }
    }

    async fn sync_all(&self) -> Result<SyncReport, AccountError> {
        let ids: Vec<AccountId> = self.accounts.read().await.iter().map(|a| a.id).collect();
        let mut guards = Vec::with_capacity(ids.len());
        let mut outcomes = Vec::with_capacity(ids.len());

        // Guards are held until the combined result is persisted.
        for id in ids {
            guards.push(self.lock_account(id).await);
            let outcome = self.fetch_for(id).await;
            if let Err(e) = &outcome {
                warn!(account = %id, error = %e, "Account sync failed");
            }
            outcomes.push((id, outcome));
        }

        let report = self
            .update_accounts(move |accounts| {
                let mut report = SyncReport::default();
                for (id, outcome) in outcomes {
                    let Some(account) = accounts.iter_mut().find(|a| a.id == id) else {
                        continue;
                    };
                    match outcome {
                        Ok(addons) => {
                            account.addons = addons;
                            account.last_sync = Utc::now();
                            account.status = AccountStatus::Active;
                            report.synced.push(id);
                        }
                        Err(e) => {
                            account.status = AccountStatus::Error;
                            report.failed.push((id, e.to_string()));
                        }
                    }
                }
                Ok(report)
            })
            .await?;
        drop(guards);
        info!(
            synced = report.synced.len(),
            failed = report.failed.len(),
            "Synced all accounts"
        );
        Ok(report)
    }

    async fn update_account(
        &self,
        id: AccountId,
        update: AccountUpdate,
    ) -> Result<Account, AccountError> {
        let _guard = self.lock_account(id).await;
        self.snapshot(id).await?;

        let name = match update.name {
            Some(name) if name.trim().is_empty() => {
                return Err(AccountError::Validation(
                    "Account name cannot be empty".to_string(),
                ));
            }
            other => other.map(|n| n.trim().to_string()),
        };

        let auth_key = update.auth_key.filter(|k| !k.trim().is_empty());

        // (auth key, optional (email, password)) once the remote accepted them
        let credentials = match (auth_key, update.email, update.password) {
            (Some(key), _, _) => Some((Zeroizing::new(key.trim().to_string()), None)),
            (None, Some(email), Some(password)) => {
                let login = self.api.login(&email, &password).await?;
                Some((Zeroizing::new(login.auth_key), Some((email, password))))
            }
            (None, Some(_), None) | (None, None, Some(_)) => {
                return Err(AccountError::Validation(
                    "Both email and password are required to change credentials".to_string(),
                ));
            }
            (None, None, None) => None,
        };

        let validated = match credentials {
            Some((auth_key, login)) => {
                let addons = self.api.get_addon_collection(&auth_key).await?;
                let login = match login {
                    Some((email, password)) => Some((email, self.cipher.encrypt(&password)?)),
                    None => None,
                };
                Some((self.cipher.encrypt(&auth_key)?, login, addons))
            }
            None => None,
        };

        let account = self
            .commit(id, move |account| {
                if let Some(name) = name {
                    account.name = name;
                }
                if let Some((auth_key, login, addons)) = validated {
                    account.auth_key = auth_key;
                    if let Some((email, password)) = login {
                        account.email = Some(email);
                        account.password = Some(password);
                    }
                    account.addons = addons;
                    account.status = AccountStatus::Active;
                    account.last_sync = Utc::now();
                }
                Ok(account.clone())
            })
            .await?;

        info!(account = %id, "Account updated");
        Ok(account)
    }

    async fn install_addon(
        &self,
        id: AccountId,
        url: &str,
    ) -> Result<Vec<AddonDescriptor>, AccountError> {
        let _guard = self.lock_account(id).await;
        let account = self.snapshot(id).await?;

        let mut descriptor = self.api.fetch_manifest(url.trim()).await?;
        let (auth_key, mut addons) = self.remote_collection(&account).await?;

        match addons.iter().position(|a| a.id() == descriptor.id()) {
            Some(index) => {
                Self::ensure_not_protected(&addons[index])?;
                descriptor.flags.clone_from(&addons[index].flags);
                addons[index] = descriptor;
            }
            None => addons.push(descriptor),
        }

        let addons = self.write_collection(id, &auth_key, addons).await?;
        info!(account = %id, url, "Addon installed");
        Ok(addons)
    }

    async fn remove_addons(
        &self,
        id: AccountId,
        addon_ids: &[String],
    ) -> Result<RemovalOutcome, AccountError> {
        let _guard = self.lock_account(id).await;
        let account = self.snapshot(id).await?;
        let (auth_key, current) = self.remote_collection(&account).await?;

        let outcome = merge::remove_addons(&current, addon_ids);
        if !outcome.protected.is_empty() {
            warn!(account = %id, protected = ?outcome.protected, "Protected addons were kept");
        }

        if outcome.removed.is_empty() {
            self.cache_collection(id, outcome.addons.clone()).await?;
        } else {
            self.write_collection(id, &auth_key, outcome.addons.clone())
                .await?;
            info!(account = %id, removed = ?outcome.removed, "Addons removed");
        }

        Ok(outcome)
    }

    async fn remove_addon(
        &self,
        id: AccountId,
        addon_id: &str,
    ) -> Result<RemovalOutcome, AccountError> {
        let outcome = self.remove_addons(id, &[addon_id.to_string()]).await?;
        if outcome.removed.is_empty() && outcome.protected.is_empty() {
            return Err(AccountError::AddonNotFound(addon_id.to_string()));
        }
        Ok(outcome)
    }

    async fn reorder_addons(
        &self,
        id: AccountId,
        order: &[String],
    ) -> Result<Vec<AddonDescriptor>, AccountError> {
        let _guard = self.lock_account(id).await;
        let account = self.snapshot(id).await?;
        let (auth_key, current) = self.remote_collection(&account).await?;

        let unique: HashSet<&str> = order.iter().map(String::as_str).collect();
        if order.len() != current.len() || unique.len() != order.len() {
            return Err(AccountError::Validation(format!(
                "New order must list each of the {} installed addons exactly once",
                current.len()
            )));
        }

        let mut by_id: HashMap<&str, &AddonDescriptor> =
            current.iter().map(|a| (a.id(), a)).collect();
        let reordered = order
            .iter()
            .map(|addon_id| {
                by_id.remove(addon_id.as_str()).cloned().ok_or_else(|| {
                    AccountError::Validation(format!("Addon {addon_id} is not installed"))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        self.write_collection(id, &auth_key, reordered).await
    }

    async fn reinstall_addon(
        &self,
        id: AccountId,
        addon_id: &str,
    ) -> Result<ReinstallOutcome, AccountError> {
        let _guard = self.lock_account(id).await;
        let account = self.snapshot(id).await?;
        let (auth_key, mut addons) = self.remote_collection(&account).await?;
        let index = Self::find_addon(&addons, addon_id)?;

        if addons[index].is_protected() {
            info!(account = %id, addon_id, "Skipping reinstall of protected addon");
            return Ok(ReinstallOutcome {
                addons,
                updated_addon: None,
                previous_version: None,
                new_version: None,
            });
        }

        let previous_version = addons[index].manifest.version.clone();
        let mut fresh = self
            .api
            .fetch_manifest(&addons[index].transport_url)
            .await?;
        fresh.flags.clone_from(&addons[index].flags);
        let new_version = fresh.manifest.version.clone();
        addons[index] = fresh.clone();

        let addons = self.write_collection(id, &auth_key, addons).await?;
        info!(account = %id, addon_id, %previous_version, %new_version, "Addon reinstalled");

        Ok(ReinstallOutcome {
            addons,
            updated_addon: Some(fresh),
            previous_version: Some(previous_version),
            new_version: Some(new_version),
        })
    }

    async fn apply_saved_addons(
        &self,
        id: AccountId,
        saved: &[SavedAddon],
        strategy: MergeStrategy,
    ) -> Result<MergeResult, AccountError> {
        let _guard = self.lock_account(id).await;
        let account = self.snapshot(id).await?;
        let (auth_key, current) = self.remote_collection(&account).await?;

        let (addons, result) = merge::merge(&current, saved, strategy, self.api.as_ref()).await;

        if result.has_changes() {
            self.write_collection(id, &auth_key, addons).await?;
        } else {
            self.cache_collection(id, addons).await?;
        }

        info!(
            account = %id,
            added = result.added.len(),
            updated = result.updated.len(),
            "Saved addons applied"
        );
        Ok(result)
    }

    async fn preview_saved_addons(
        &self,
        id: AccountId,
        saved: &[SavedAddon],
        strategy: MergeStrategy,
    ) -> Result<MergeResult, AccountError> {
        let account = self.snapshot(id).await?;
        let (_, current) = self.remote_collection(&account).await?;
        Ok(merge::preview_merge(&current, saved, strategy, self.api.as_ref()).await)
    }

    async fn check_addon_updates(
        &self,
        id: AccountId,
    ) -> Result<Vec<AddonUpdateInfo>, AccountError> {
        let account = self.snapshot(id).await?;
        Ok(updates::check_updates(&account.addons, self.api.as_ref(), self.update_policy).await)
    }

    async fn add_api_key(
        &self,
        id: AccountId,
        input: ApiKeyInput,
    ) -> Result<ApiKey, AccountError> {
        let secret = input.api_key.trim();
        if secret.is_empty() {
            return Err(AccountError::Validation("API key cannot be empty".to_string()));
        }

        let key = ApiKey {
            id: ApiKeyId::new(),
            service: input.service,
            api_key: self.cipher.encrypt(secret)?,
            label: input.label.filter(|l| !l.trim().is_empty()),
            metadata: input.metadata,
            created_at: Utc::now(),
        };

        let _guard = self.lock_account(id).await;
        let stored = key.clone();
        self.commit(id, move |account| {
            account.api_keys.get_or_insert_with(Vec::new).push(stored);
            Ok(())
        })
        .await?;

        info!(account = %id, service = %key.service, "API key added");
        Ok(key)
    }

    async fn update_api_key(
        &self,
        id: AccountId,
        key_id: ApiKeyId,
        update: ApiKeyUpdate,
    ) -> Result<ApiKey, AccountError> {
        let encrypted = match update.api_key.as_deref().map(str::trim) {
            Some("") => {
                return Err(AccountError::Validation("API key cannot be empty".to_string()));
            }
            Some(secret) => Some(self.cipher.encrypt(secret)?),
            None => None,
        };

        let _guard = self.lock_account(id).await;
        self.commit(id, move |account| {
            let key = account
                .api_keys
                .as_mut()
                .and_then(|keys| keys.iter_mut().find(|k| k.id == key_id))
                .ok_or(AccountError::ApiKeyNotFound(key_id))?;

            if let Some(value) = encrypted {
                key.api_key = value;
            }
            if let Some(label) = update.label {
                key.label = (!label.trim().is_empty()).then_some(label);
            }
            if update.metadata.is_some() {
                key.metadata = update.metadata;
            }
            Ok(key.clone())
        })
        .await
    }

    async fn remove_api_key(&self, id: AccountId, key_id: ApiKeyId) -> Result<(), AccountError> {
        let _guard = self.lock_account(id).await;
        self.commit(id, move |account| {
            let keys = account
                .api_keys
                .as_mut()
                .ok_or(AccountError::ApiKeyNotFound(key_id))?;
            let before = keys.len();
            keys.retain(|k| k.id != key_id);
            if keys.len() == before {
                return Err(AccountError::ApiKeyNotFound(key_id));
            }
            Ok(())
        })
        .await
    }

    async fn reveal_api_key(
        &self,
        id: AccountId,
        key_id: ApiKeyId,
    ) -> Result<String, AccountError> {
        let account = self.snapshot(id).await?;
        let key = Self::find_key(&account, key_id)?;
        Ok(self.cipher.decrypt(&key.api_key)?)
    }

    async fn apply_debrid_key(
        &self,
        id: AccountId,
        addon_id: &str,
        key_id: ApiKeyId,
    ) -> Result<AddonDescriptor, AccountError> {
        let _guard = self.lock_account(id).await;
        let account = self.snapshot(id).await?;
        let key = Self::find_key(&account, key_id)?;
        let secret = self.decrypt(&key.api_key)?;

        let (auth_key, mut addons) = self.remote_collection(&account).await?;
        let index = Self::find_addon(&addons, addon_id)?;
        Self::ensure_not_protected(&addons[index])?;

        let updated = self.debrid.apply_key(&addons[index], &key.service, &secret)?;
        addons[index] = updated.clone();

        self.write_collection(id, &auth_key, addons).await?;
        info!(account = %id, addon_id, service = %key.service, "Debrid key applied");
        Ok(updated)
    }

    async fn remove_debrid_key(
        &self,
        id: AccountId,
        addon_id: &str,
    ) -> Result<AddonDescriptor, AccountError> {
        let _guard = self.lock_account(id).await;
        let account = self.snapshot(id).await?;

        let (auth_key, mut addons) = self.remote_collection(&account).await?;
        let index = Self::find_addon(&addons, addon_id)?;
        Self::ensure_not_protected(&addons[index])?;

        let updated = self.debrid.remove_key(&addons[index])?;
        addons[index] = updated.clone();

        self.write_collection(id, &auth_key, addons).await?;
        info!(account = %id, addon_id, "Debrid key removed");
        Ok(updated)
    }

    async fn bulk_apply_debrid_key(
        &self,
        id: AccountId,
        addon_type: &str,
        key_id: ApiKeyId,
    ) -> Result<BulkDebridResult, AccountError> {
        let _guard = self.lock_account(id).await;
        let account = self.snapshot(id).await?;
        let key = Self::find_key(&account, key_id)?;
        if !key.service.is_debrid() {
            return Err(DebridError::InvalidServiceType(key.service.to_string()).into());
        }
        let secret = self.decrypt(&key.api_key)?;

        self.bulk_debrid(id, addon_type, |addon| {
            self.debrid.apply_key(addon, &key.service, &secret)
        })
        .await
    }

    async fn bulk_remove_debrid(
        &self,
        id: AccountId,
        addon_type: &str,
    ) -> Result<BulkDebridResult, AccountError> {
        let _guard = self.lock_account(id).await;
        self.bulk_debrid(id, addon_type, |addon| self.debrid.remove_key(addon))
            .await
    }

    async fn export_accounts(
        &self,
        include_credentials: bool,
        saved_addons: Option<Vec<SavedAddon>>,
    ) -> Result<AccountExport, AccountError> {
        let accounts = self.accounts.read().await.clone();

        let exported = accounts
            .into_iter()
            .map(|account| {
                let (auth_key, password) = if include_credentials {
                    (
                        self.decrypt_export(Some(&account.auth_key))?,
                        self.decrypt_export(account.password.as_deref())?,
                    )
                } else {
                    (None, None)
                };

                Ok(ExportedAccount {
                    name: account.name,
                    email: account.email,
                    auth_key,
                    password,
                    addons: account.addons,
                })
            })
            .collect::<Result<Vec<_>, AccountError>>()?;

        if include_credentials {
            warn!(count = exported.len(), "Exporting accounts with plaintext credentials");
        }

        Ok(AccountExport {
            version: export::FORMAT_VERSION.to_string(),
            exported_at: Utc::now(),
            accounts: exported,
            saved_addons,
        })
    }

    async fn import_accounts(&self, json: &str) -> Result<ImportSummary, AccountError> {
        let data: AccountExport = serde_json::from_str(json)
            .map_err(|e| AccountError::Validation(format!("Invalid import file: {e}")))?;

        let major = export::FORMAT_VERSION.split('.').next().unwrap_or_default();
        if data.version.split('.').next() != Some(major) {
            return Err(AccountError::Validation(format!(
                "Unsupported export version {}",
                data.version
            )));
        }

        let mut summary = ImportSummary::default();
        let mut imported = Vec::with_capacity(data.accounts.len());
        let now = Utc::now();

        for entry in data.accounts {
            let name = entry.name.trim();
            if name.is_empty() {
                return Err(AccountError::Validation(
                    "Imported account is missing a name".to_string(),
                ));
            }

            let auth_key = self.import_secret(entry.auth_key.as_deref())?;
            let password = self.import_secret(entry.password.as_deref())?;

            let id = AccountId::new();
            let status = if auth_key.is_some() {
                AccountStatus::Active
            } else {
                summary.without_credentials.push(id);
                AccountStatus::Error
            };

            imported.push(Account {
                id,
                name: name.to_string(),
                email: entry.email,
                auth_key: match auth_key {
                    Some(key) => key,
                    None => self.cipher.encrypt("")?,
                },
                password,
                addons: entry.addons,
                api_keys: None,
                last_sync: now,
                status,
            });
            summary.imported.push(id);
        }

        self.update_accounts(move |accounts| {
            accounts.extend(imported);
            Ok(())
        })
        .await?;

        summary.saved_addons = data.saved_addons.unwrap_or_default();
        info!(
            imported = summary.imported.len(),
            without_credentials = summary.without_credentials.len(),
            "Accounts imported"
        );
        Ok(summary)
    }
}
