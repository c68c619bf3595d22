//! SQLite-backed store and vault wiring on a temporary database file.

use addonvault::config::Config;
use addonvault::constants::storage;
use addonvault::db::{KeyValueStore, Store, load_json, save_json};
use addonvault::services::VaultError;
use addonvault::state::AppContext;

fn temp_db_url() -> String {
    let path = std::env::temp_dir().join(format!("addonvault-{}.db", uuid::Uuid::new_v4()));
    format!("sqlite:{}", path.display())
}

fn test_config() -> Config {
    let mut config = Config::default();
    config.general.database_path = temp_db_url();
    config.security.argon2_memory_cost_kib = 1024;
    config.security.argon2_time_cost = 1;
    config
}

#[tokio::test]
async fn sqlite_store_upserts_and_removes() {
    let url = temp_db_url();
    let store = Store::new(&url).await.unwrap();
    store.ping().await.unwrap();

    assert!(store.get("missing").await.unwrap().is_none());

    store.set("a", "one").await.unwrap();
    store.set("a", "two").await.unwrap();
    store.set("b", "three").await.unwrap();
    assert_eq!(store.get("a").await.unwrap().as_deref(), Some("two"));

    let mut keys = store.keys().await.unwrap();
    keys.sort();
    assert_eq!(keys, vec!["a", "b"]);

    store.remove("a").await.unwrap();
    store.remove("a").await.unwrap();
    assert!(store.get("a").await.unwrap().is_none());

    // Values survive a reconnect.
    let reopened = Store::new(&url).await.unwrap();
    assert_eq!(reopened.get("b").await.unwrap().as_deref(), Some("three"));
}

#[tokio::test]
async fn unusable_database_directory_is_reported() {
    let blocker = std::env::temp_dir().join(format!("addonvault-file-{}", uuid::Uuid::new_v4()));
    std::fs::write(&blocker, b"not a directory").unwrap();
    let url = format!("sqlite:{}", blocker.join("nested").join("vault.db").display());

    let err = Store::new(&url).await.err().unwrap();
    assert!(
        err.to_string().contains("Failed to create database directory"),
        "{err:#}"
    );

    std::fs::remove_file(blocker).unwrap();
}

#[tokio::test]
async fn json_documents_round_trip_through_sqlite() {
    let store = Store::new(&temp_db_url()).await.unwrap();

    let doc = vec!["x".to_string(), "y".to_string()];
    save_json(&store, "doc", &doc).await.unwrap();
    let loaded: Option<Vec<String>> = load_json(&store, "doc").await.unwrap();
    assert_eq!(loaded, Some(doc));

    store.set("doc", "{broken").await.unwrap();
    let err = load_json::<Vec<String>>(&store, "doc").await.unwrap_err();
    assert!(err.to_string().contains("Corrupt JSON"));
}

#[tokio::test]
async fn context_unlocks_with_master_password() {
    let ctx = AppContext::new(test_config()).await.unwrap();

    let services = ctx.unlock(None).await.unwrap();
    assert!(services.accounts.list_accounts().await.is_empty());

    ctx.vault.setup_master_password("long enough").await.unwrap();
    assert!(ctx.unlock(None).await.is_err());
    assert!(ctx.unlock(Some("wrong password")).await.is_err());

    let services = ctx.unlock(Some("long enough")).await.unwrap();
    assert!(services.library.list().await.is_empty());

    let report = ctx.vault.wipe_all().await;
    assert!(report.is_complete());
    for &key in storage::ALL {
        assert!(ctx.store.get(key).await.unwrap().is_none(), "{key}");
    }
    assert!(matches!(
        ctx.vault.unlock("long enough").await,
        Err(VaultError::NotConfigured)
    ));
}

#[tokio::test]
async fn required_master_password_must_be_configured() {
    let mut config = test_config();
    config.security.master_password = true;
    let ctx = AppContext::new(config).await.unwrap();

    let err = ctx.unlock(None).await.unwrap_err();
    assert!(err.to_string().contains("vault setup"));
}
