//! Account engine scenarios against an in-process fake of the account API.

use addonvault::clients::{AccountApi, ApiError, LoginResponse, ManifestFetcher, RemoteUser};
use addonvault::constants::storage;
use addonvault::crypto::{self, CredentialCipher, KdfParams};
use addonvault::db::{KeyValueStore, MemoryStore};
use addonvault::domain::{AccountStatus, ApiService, DebridService};
use addonvault::models::{
    AddonDescriptor, AddonFlags, AddonManifest, ApiKeyInput, MergeStrategy, SavedAddon,
};
use addonvault::services::{
    AccountError, AccountService, AccountUpdate, DebridError, DefaultAccountService,
    ExecutionPolicy,
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

const TORRENTIO: &str = "https://torrentio.strem.fun/manifest.json";
const CINEMETA: &str = "https://v3-cinemeta.strem.io/manifest.json";

fn addon(url: &str, id: &str, version: &str) -> AddonDescriptor {
    AddonDescriptor::new(url, AddonManifest::new(id, id, version))
}

fn protected(mut addon: AddonDescriptor) -> AddonDescriptor {
    addon.flags = Some(AddonFlags {
        official: Some(true),
        protected: Some(true),
    });
    addon
}

/// Remote account service kept in memory. Unknown auth keys are rejected;
/// `offline` makes every call fail as a network error.
#[derive(Default)]
struct FakeApi {
    collections: Mutex<HashMap<String, Vec<AddonDescriptor>>>,
    logins: Mutex<HashMap<(String, String), String>>,
    manifests: Mutex<HashMap<String, AddonDescriptor>>,
    offline: AtomicBool,
    writes: AtomicUsize,
}

impl FakeApi {
    fn with_account(self, auth_key: &str, addons: Vec<AddonDescriptor>) -> Self {
        self.collections
            .lock()
            .unwrap()
            .insert(auth_key.to_string(), addons);
        self
    }

    fn with_login(self, email: &str, password: &str, auth_key: &str) -> Self {
        self.logins.lock().unwrap().insert(
            (email.to_string(), password.to_string()),
            auth_key.to_string(),
        );
        self
    }

    fn with_manifest(self, descriptor: AddonDescriptor) -> Self {
        self.manifests
            .lock()
            .unwrap()
            .insert(descriptor.transport_url.clone(), descriptor);
        self
    }

    fn collection(&self, auth_key: &str) -> Vec<AddonDescriptor> {
        self.collections
            .lock()
            .unwrap()
            .get(auth_key)
            .cloned()
            .unwrap_or_default()
    }

    fn revoke(&self, auth_key: &str) {
        self.collections.lock().unwrap().remove(auth_key);
    }

    fn check_online(&self) -> Result<(), ApiError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(ApiError::NetworkUnavailable("offline".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl ManifestFetcher for FakeApi {
    async fn fetch_manifest(&self, transport_url: &str) -> Result<AddonDescriptor, ApiError> {
        tokio::task::yield_now().await;
        self.manifests
            .lock()
            .unwrap()
            .get(transport_url)
            .cloned()
            .ok_or_else(|| ApiError::ManifestFetchFailed {
                url: transport_url.to_string(),
                reason: "HTTP 404".to_string(),
            })
    }
}

#[async_trait]
impl AccountApi for FakeApi {
    async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, ApiError> {
        self.check_online()?;
        let auth_key = self
            .logins
            .lock()
            .unwrap()
            .get(&(email.to_string(), password.to_string()))
            .cloned()
            .ok_or_else(|| ApiError::InvalidCredentials("Invalid email or password".to_string()))?;

        Ok(LoginResponse {
            auth_key,
            user: RemoteUser {
                id: "user-1".to_string(),
                email: email.to_string(),
                avatar: None,
            },
        })
    }

    async fn get_addon_collection(
        &self,
        auth_key: &str,
    ) -> Result<Vec<AddonDescriptor>, ApiError> {
        self.check_online()?;
        tokio::task::yield_now().await;
        self.collections
            .lock()
            .unwrap()
            .get(auth_key)
            .cloned()
            .ok_or_else(|| ApiError::InvalidCredentials("Invalid or expired auth key".to_string()))
    }

    async fn set_addon_collection(
        &self,
        auth_key: &str,
        addons: &[AddonDescriptor],
    ) -> Result<(), ApiError> {
        self.check_online()?;
        tokio::task::yield_now().await;
        let mut collections = self.collections.lock().unwrap();
        let slot = collections
            .get_mut(auth_key)
            .ok_or_else(|| ApiError::InvalidCredentials("Invalid or expired auth key".to_string()))?;
        *slot = addons.to_vec();
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

fn cipher() -> Arc<CredentialCipher> {
    let params = KdfParams {
        memory_cost_kib: 1024,
        time_cost: 1,
        parallelism: 1,
    };
    Arc::new(CredentialCipher::derive("test-passphrase", &crypto::generate_salt(), params).unwrap())
}

struct Harness {
    store: Arc<MemoryStore>,
    api: Arc<FakeApi>,
    cipher: Arc<CredentialCipher>,
    engine: DefaultAccountService,
}

async fn harness(api: FakeApi) -> Harness {
    let store = Arc::new(MemoryStore::new());
    let api = Arc::new(api);
    let cipher = cipher();
    let engine = DefaultAccountService::load(
        store.clone(),
        api.clone(),
        cipher.clone(),
        ExecutionPolicy::default(),
    )
    .await
    .unwrap();

    Harness {
        store,
        api,
        cipher,
        engine,
    }
}

#[tokio::test]
async fn credentials_are_encrypted_at_rest() {
    let h = harness(
        FakeApi::default()
            .with_login("me@example.com", "hunter22", "AUTH-1")
            .with_account("AUTH-1", vec![addon(CINEMETA, "cinemeta", "3.0.0")]),
    )
    .await;

    let account = h
        .engine
        .add_account_by_credentials("me@example.com", "hunter22", None)
        .await
        .unwrap();

    assert_eq!(account.name, "me@example.com");
    assert_eq!(account.addons.len(), 1);
    assert_eq!(account.status, AccountStatus::Active);
    assert_eq!(h.cipher.decrypt(&account.auth_key).unwrap(), "AUTH-1");

    let raw = h.store.get(storage::ACCOUNTS).await.unwrap().unwrap();
    assert!(!raw.contains("AUTH-1"));
    assert!(!raw.contains("hunter22"));

    let err = h
        .engine
        .add_account_by_credentials("me@example.com", "wrong", None)
        .await
        .unwrap_err();
    assert!(matches!(err, AccountError::Api(ApiError::InvalidCredentials(_))));
    assert_eq!(h.engine.list_accounts().await.len(), 1);
}

#[tokio::test]
async fn sync_failure_marks_error_and_keeps_addons() {
    let h = harness(FakeApi::default().with_account("K", vec![addon(CINEMETA, "cinemeta", "1")])).await;
    let account = h.engine.add_account_by_auth_key("K", "Main").await.unwrap();

    h.api.offline.store(true, Ordering::SeqCst);
    let err = h.engine.sync_account(account.id).await.unwrap_err();
    assert!(matches!(err, AccountError::Api(ApiError::NetworkUnavailable(_))));

    let stored = h.engine.get_account(account.id).await.unwrap();
    assert_eq!(stored.status, AccountStatus::Error);
    assert_eq!(stored.addons, account.addons);

    h.api.offline.store(false, Ordering::SeqCst);
    let synced = h.engine.sync_account(account.id).await.unwrap();
    assert_eq!(synced.status, AccountStatus::Active);
}

#[tokio::test]
async fn addon_writes_leave_error_status_alone() {
    let h = harness(
        FakeApi::default()
            .with_account(
                "K",
                vec![
                    addon(CINEMETA, "cinemeta", "1"),
                    addon("https://a.example.com/manifest.json", "a", "1"),
                    addon("https://b.example.com/manifest.json", "b", "1"),
                ],
            )
            .with_manifest(addon("https://c.example.com/manifest.json", "c", "1")),
    )
    .await;
    let account = h.engine.add_account_by_auth_key("K", "Main").await.unwrap();

    h.api.offline.store(true, Ordering::SeqCst);
    h.engine.sync_account(account.id).await.unwrap_err();
    h.api.offline.store(false, Ordering::SeqCst);
    let failed = h.engine.get_account(account.id).await.unwrap();
    assert_eq!(failed.status, AccountStatus::Error);

    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    h.engine
        .install_addon(account.id, "https://c.example.com/manifest.json")
        .await
        .unwrap();
    let installed = h.engine.get_account(account.id).await.unwrap();
    assert_eq!(installed.status, AccountStatus::Error);
    assert!(installed.last_sync > failed.last_sync);
    assert_eq!(installed.addons.len(), 4);

    let order = ["c", "b", "a", "cinemeta"].map(String::from);
    h.engine.reorder_addons(account.id, &order).await.unwrap();
    assert_eq!(
        h.engine.get_account(account.id).await.unwrap().status,
        AccountStatus::Error
    );

    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    h.engine
        .remove_addons(account.id, &["a".to_string()])
        .await
        .unwrap();
    let removed = h.engine.get_account(account.id).await.unwrap();
    assert_eq!(removed.status, AccountStatus::Error);
    assert!(removed.last_sync > installed.last_sync);
    assert_eq!(removed.addons.len(), 3);

    let healed = h.engine.sync_account(account.id).await.unwrap();
    assert_eq!(healed.status, AccountStatus::Active);
}

/// Memory store whose writes can be switched off.
#[derive(Default)]
struct FlakyStore {
    inner: MemoryStore,
    reject_writes: AtomicBool,
}

#[async_trait]
impl KeyValueStore for FlakyStore {
    async fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: &str) -> anyhow::Result<()> {
        if self.reject_writes.load(Ordering::SeqCst) {
            anyhow::bail!("disk full");
        }
        self.inner.set(key, value).await
    }

    async fn remove(&self, key: &str) -> anyhow::Result<()> {
        self.inner.remove(key).await
    }
}

#[tokio::test]
async fn failed_save_leaves_memory_unchanged() {
    let store = Arc::new(FlakyStore::default());
    let api = Arc::new(
        FakeApi::default()
            .with_account("K", vec![addon(CINEMETA, "cinemeta", "1")])
            .with_account("K2", Vec::new())
            .with_manifest(addon("https://c.example.com/manifest.json", "c", "1")),
    );
    let engine = DefaultAccountService::load(
        store.clone(),
        api.clone(),
        cipher(),
        ExecutionPolicy::default(),
    )
    .await
    .unwrap();
    let account = engine.add_account_by_auth_key("K", "Main").await.unwrap();

    store.reject_writes.store(true, Ordering::SeqCst);

    assert!(matches!(
        engine.add_account_by_auth_key("K2", "Second").await,
        Err(AccountError::Storage(_))
    ));
    assert_eq!(engine.list_accounts().await.len(), 1);

    let rename = AccountUpdate {
        name: Some("Renamed".to_string()),
        ..AccountUpdate::default()
    };
    assert!(engine.update_account(account.id, rename).await.is_err());
    assert_eq!(engine.get_account(account.id).await.unwrap().name, "Main");

    assert!(
        engine
            .install_addon(account.id, "https://c.example.com/manifest.json")
            .await
            .is_err()
    );
    assert_eq!(engine.get_account(account.id).await.unwrap().addons.len(), 1);

    assert!(engine.remove_account(account.id).await.is_err());
    assert_eq!(engine.list_accounts().await.len(), 1);

    store.reject_writes.store(false, Ordering::SeqCst);
    let reloaded = DefaultAccountService::load(store, api, cipher(), ExecutionPolicy::default())
        .await
        .unwrap();
    assert_eq!(reloaded.list_accounts().await, engine.list_accounts().await);
}

#[tokio::test]
async fn sync_all_isolates_failures() {
    let h = harness(
        FakeApi::default()
            .with_account("A", vec![addon(CINEMETA, "cinemeta", "1")])
            .with_account("B", Vec::new()),
    )
    .await;
    let a = h.engine.add_account_by_auth_key("A", "Alpha").await.unwrap();
    let b = h.engine.add_account_by_auth_key("B", "Beta").await.unwrap();

    h.api.revoke("A");
    h.api
        .collections
        .lock()
        .unwrap()
        .insert("B".to_string(), vec![addon(CINEMETA, "cinemeta", "2")]);

    let report = h.engine.sync_all().await.unwrap();
    assert_eq!(report.synced, vec![b.id]);
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].0, a.id);

    let a = h.engine.get_account(a.id).await.unwrap();
    let b = h.engine.get_account(b.id).await.unwrap();
    assert_eq!(a.status, AccountStatus::Error);
    assert_eq!(a.addons.len(), 1);
    assert_eq!(b.status, AccountStatus::Active);
    assert_eq!(b.addons[0].manifest.version, "2");
}

#[tokio::test]
async fn rejected_credential_update_leaves_account_untouched() {
    let h = harness(
        FakeApi::default()
            .with_account("OLD", Vec::new())
            .with_account("NEW", vec![addon(CINEMETA, "cinemeta", "1")])
            .with_login("new@example.com", "right-pass", "NEW"),
    )
    .await;
    let account = h.engine.add_account_by_auth_key("OLD", "Main").await.unwrap();

    let err = h
        .engine
        .update_account(
            account.id,
            AccountUpdate {
                name: Some("Renamed".to_string()),
                email: Some("new@example.com".to_string()),
                password: Some("wrong-pass".to_string()),
                ..AccountUpdate::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AccountError::Api(ApiError::InvalidCredentials(_))));

    let stored = h.engine.get_account(account.id).await.unwrap();
    assert_eq!(stored.auth_key, account.auth_key);
    assert_eq!(stored.name, "Main");

    let updated = h
        .engine
        .update_account(
            account.id,
            AccountUpdate {
                name: Some("Renamed".to_string()),
                email: Some("new@example.com".to_string()),
                password: Some("right-pass".to_string()),
                ..AccountUpdate::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.name, "Renamed");
    assert_eq!(h.cipher.decrypt(&updated.auth_key).unwrap(), "NEW");
    assert_eq!(updated.addons.len(), 1);
    assert_eq!(updated.email.as_deref(), Some("new@example.com"));
}

#[tokio::test]
async fn reorder_requires_a_permutation() {
    let h = harness(FakeApi::default().with_account(
        "K",
        vec![
            addon(CINEMETA, "cinemeta", "1"),
            addon("https://a.example.com/manifest.json", "a", "1"),
            addon("https://b.example.com/manifest.json", "b", "1"),
        ],
    ))
    .await;
    let account = h.engine.add_account_by_auth_key("K", "Main").await.unwrap();

    let foreign = ["b", "a", "zzz"].map(String::from);
    assert!(matches!(
        h.engine.reorder_addons(account.id, &foreign).await,
        Err(AccountError::Validation(_))
    ));
    let short = ["b", "a"].map(String::from);
    assert!(matches!(
        h.engine.reorder_addons(account.id, &short).await,
        Err(AccountError::Validation(_))
    ));
    assert_eq!(h.api.writes.load(Ordering::SeqCst), 0);

    let order = ["b", "cinemeta", "a"].map(String::from);
    let addons = h.engine.reorder_addons(account.id, &order).await.unwrap();
    let ids: Vec<_> = addons.iter().map(|a| a.id().to_string()).collect();
    assert_eq!(ids, order);
    let remote: Vec<_> = h.api.collection("K").iter().map(|a| a.id().to_string()).collect();
    assert_eq!(remote, order);
}

#[tokio::test]
async fn install_replaces_in_place_and_removal_keeps_protected() {
    let h = harness(
        FakeApi::default()
            .with_account(
                "K",
                vec![
                    protected(addon(CINEMETA, "cinemeta", "1")),
                    addon("https://a.example.com/manifest.json", "a", "1"),
                    addon("https://b.example.com/manifest.json", "b", "1"),
                ],
            )
            .with_manifest(addon("https://a.example.com/v2", "a", "2")),
    )
    .await;
    let account = h.engine.add_account_by_auth_key("K", "Main").await.unwrap();

    let addons = h
        .engine
        .install_addon(account.id, "https://a.example.com/v2")
        .await
        .unwrap();
    assert_eq!(addons[1].manifest.version, "2");
    assert_eq!(addons[1].transport_url, "https://a.example.com/v2");
    assert_eq!(addons.len(), 3);

    let ids = ["cinemeta", "b"].map(String::from);
    let outcome = h.engine.remove_addons(account.id, &ids).await.unwrap();
    assert_eq!(outcome.removed, vec!["b".to_string()]);
    assert_eq!(outcome.protected, vec!["cinemeta".to_string()]);
    assert_eq!(h.api.collection("K").len(), 2);

    assert!(matches!(
        h.engine.remove_addon(account.id, "missing").await,
        Err(AccountError::AddonNotFound(_))
    ));
}

#[tokio::test]
async fn same_account_operations_do_not_lose_writes() {
    let h = harness(
        FakeApi::default()
            .with_account("K", Vec::new())
            .with_manifest(addon("https://one.example.com", "one", "1"))
            .with_manifest(addon("https://two.example.com", "two", "1")),
    )
    .await;
    let account = h.engine.add_account_by_auth_key("K", "Main").await.unwrap();

    let (first, second) = tokio::join!(
        h.engine.install_addon(account.id, "https://one.example.com"),
        h.engine.install_addon(account.id, "https://two.example.com"),
    );
    first.unwrap();
    second.unwrap();

    let mut remote: Vec<_> = h.api.collection("K").iter().map(|a| a.id().to_string()).collect();
    remote.sort();
    assert_eq!(remote, vec!["one", "two"]);
    assert_eq!(h.engine.get_account(account.id).await.unwrap().addons.len(), 2);
}

#[tokio::test]
async fn bulk_debrid_skips_protected_and_rejects_non_debrid_keys() {
    let h = harness(FakeApi::default().with_account(
        "K",
        vec![
            addon(TORRENTIO, "torrentio", "1"),
            protected(addon(
                "https://torrentio.strem.fun/sort=size/manifest.json",
                "torrentio-locked",
                "1",
            )),
            addon(CINEMETA, "cinemeta", "1"),
        ],
    ))
    .await;
    let account = h.engine.add_account_by_auth_key("K", "Main").await.unwrap();

    let rd = h
        .engine
        .add_api_key(
            account.id,
            ApiKeyInput {
                service: ApiService::Debrid(DebridService::RealDebrid),
                api_key: "RDKEY".to_string(),
                label: Some("RD".to_string()),
                metadata: None,
            },
        )
        .await
        .unwrap();
    assert_ne!(rd.api_key, "RDKEY");
    assert_eq!(h.engine.reveal_api_key(account.id, rd.id).await.unwrap(), "RDKEY");

    let result = h
        .engine
        .bulk_apply_debrid_key(account.id, "torrentio", rd.id)
        .await
        .unwrap();
    assert_eq!(result.success, 1);
    assert_eq!(result.failed, 1);

    let remote = h.api.collection("K");
    assert!(remote[0].transport_url.contains("realdebrid=RDKEY"));
    assert!(!remote[1].transport_url.contains("realdebrid"));
    assert_eq!(remote[2].transport_url, CINEMETA);

    let removed = h
        .engine
        .remove_debrid_key(account.id, "torrentio")
        .await
        .unwrap();
    assert!(!removed.transport_url.contains("realdebrid"));

    let tmdb = h
        .engine
        .add_api_key(
            account.id,
            ApiKeyInput {
                service: ApiService::Tmdb,
                api_key: "TMDB".to_string(),
                label: None,
                metadata: None,
            },
        )
        .await
        .unwrap();
    assert!(matches!(
        h.engine.bulk_apply_debrid_key(account.id, "torrentio", tmdb.id).await,
        Err(AccountError::Debrid(DebridError::InvalidServiceType(_)))
    ));

    h.engine.remove_api_key(account.id, tmdb.id).await.unwrap();
    assert!(matches!(
        h.engine.remove_api_key(account.id, tmdb.id).await,
        Err(AccountError::ApiKeyNotFound(_))
    ));
}

#[tokio::test]
async fn saved_addons_merge_into_remote_collection() {
    let h = harness(
        FakeApi::default()
            .with_account(
                "K",
                vec![
                    protected(addon(CINEMETA, "cinemeta", "1")),
                    addon("https://a.example.com/old", "a", "1"),
                ],
            )
            .with_manifest(addon("https://a.example.com/new", "a", "2"))
            .with_manifest(addon("https://c.example.com", "c", "1")),
    )
    .await;
    let account = h.engine.add_account_by_auth_key("K", "Main").await.unwrap();

    let saved = vec![
        SavedAddon::new("Cinemeta", addon(CINEMETA, "cinemeta", "1"), Vec::new()),
        SavedAddon::new("A", addon("https://a.example.com/new", "a", "1"), Vec::new()),
        SavedAddon::new("C", addon("https://c.example.com", "c", "1"), Vec::new()),
    ];

    let preview = h
        .engine
        .preview_saved_addons(account.id, &saved, MergeStrategy::ReplaceMatching)
        .await
        .unwrap();
    assert_eq!(h.api.writes.load(Ordering::SeqCst), 0);

    let result = h
        .engine
        .apply_saved_addons(account.id, &saved, MergeStrategy::ReplaceMatching)
        .await
        .unwrap();
    assert_eq!(result, preview);
    assert_eq!(result.protected.len(), 1);
    assert_eq!(result.updated.len(), 1);
    assert_eq!(result.added.len(), 1);

    let remote = h.api.collection("K");
    let urls: Vec<_> = remote.iter().map(|a| a.transport_url.as_str()).collect();
    assert_eq!(
        urls,
        vec![CINEMETA, "https://a.example.com/new", "https://c.example.com"]
    );
}

#[tokio::test]
async fn export_import_round_trip() {
    let h = harness(
        FakeApi::default()
            .with_login("me@example.com", "hunter22", "AUTH-1")
            .with_account("AUTH-1", vec![addon(CINEMETA, "cinemeta", "1")])
            .with_account("K2", Vec::new()),
    )
    .await;
    let first = h
        .engine
        .add_account_by_credentials("me@example.com", "hunter22", Some("Main"))
        .await
        .unwrap();
    h.engine.add_account_by_auth_key("K2", "Second").await.unwrap();

    let redacted = h.engine.export_accounts(false, None).await.unwrap();
    assert_eq!(redacted.version, "1.0.0");
    assert!(redacted.accounts.iter().all(|a| a.auth_key.is_none() && a.password.is_none()));

    let full = h.engine.export_accounts(true, None).await.unwrap();
    assert_eq!(full.accounts[0].auth_key.as_deref(), Some("AUTH-1"));
    assert_eq!(full.accounts[0].password.as_deref(), Some("hunter22"));

    let other = harness(FakeApi::default()).await;
    let summary = other
        .engine
        .import_accounts(&serde_json::to_string(&full).unwrap())
        .await
        .unwrap();
    assert_eq!(summary.imported.len(), 2);
    assert!(summary.without_credentials.is_empty());

    let imported = other.engine.get_account(summary.imported[0]).await.unwrap();
    assert_ne!(imported.id, first.id);
    assert_eq!(imported.name, "Main");
    assert_eq!(other.cipher.decrypt(&imported.auth_key).unwrap(), "AUTH-1");
    assert_eq!(imported.addons.len(), 1);

    let summary = other
        .engine
        .import_accounts(&serde_json::to_string(&redacted).unwrap())
        .await
        .unwrap();
    assert_eq!(summary.without_credentials.len(), 2);
    let bare = other.engine.get_account(summary.imported[0]).await.unwrap();
    assert_eq!(bare.status, AccountStatus::Error);
    assert_eq!(other.engine.list_accounts().await.len(), 4);
}

#[tokio::test]
async fn malformed_import_is_a_validation_error() {
    let h = harness(FakeApi::default()).await;

    for payload in [
        "{not json",
        r#"{"version":"2.0.0","exportedAt":"2026-01-01T00:00:00Z","accounts":[]}"#,
        r#"{"version":"1.0.0","exportedAt":"2026-01-01T00:00:00Z","accounts":[{"name":"  "}]}"#,
    ] {
        assert!(
            matches!(
                h.engine.import_accounts(payload).await,
                Err(AccountError::Validation(_))
            ),
            "{payload}"
        );
    }
    assert!(h.engine.list_accounts().await.is_empty());
    assert!(h.store.get(storage::ACCOUNTS).await.unwrap().is_none());
}
