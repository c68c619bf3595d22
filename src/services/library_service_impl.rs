//! `LibraryService` persisted as a single JSON document in the key-value store.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::info;

use crate::clients::ManifestFetcher;
use crate::constants::storage;
use crate::db::{KeyValueStore, load_json, save_json};
use crate::domain::SavedAddonId;
use crate::models::SavedAddon;
use crate::services::health::{HealthProber, HealthSummary, health_summary};
use crate::services::library_service::{
    LibraryError, LibraryService, validate_name, validate_tags,
};
use crate::services::updates::{self, AddonUpdateInfo, ExecutionPolicy};

pub struct DefaultLibraryService {
    store: Arc<dyn KeyValueStore>,
    fetcher: Arc<dyn ManifestFetcher>,
    prober: HealthProber,
    update_policy: ExecutionPolicy,
    entries: RwLock<Vec<SavedAddon>>,
    persist_lock: Mutex<()>,
}

impl DefaultLibraryService {
    pub async fn load(
        store: Arc<dyn KeyValueStore>,
        fetcher: Arc<dyn ManifestFetcher>,
        prober: HealthProber,
        update_policy: ExecutionPolicy,
    ) -> Result<Self, LibraryError> {
        let entries: Vec<SavedAddon> = load_json(store.as_ref(), storage::ADDON_LIBRARY)
            .await?
            .unwrap_or_default();

        Ok(Self {
            store,
            fetcher,
            prober,
            update_policy,
            entries: RwLock::new(entries),
            persist_lock: Mutex::new(()),
        })
    }

    /// Saves a changed copy of the library and swaps it in once the write
    /// succeeded.
    async fn update_entries<T, F>(&self, change: F) -> Result<T, LibraryError>
    where
        T: Send,
        F: FnOnce(&mut Vec<SavedAddon>) -> Result<T, LibraryError> + Send,
    {
        let _guard = self.persist_lock.lock().await;
        let mut next = self.entries.read().await.clone();
        let value = change(&mut next)?;
        save_json(self.store.as_ref(), storage::ADDON_LIBRARY, &next).await?;
        *self.entries.write().await = next;
        Ok(value)
    }

    async fn modify<T, F>(&self, id: SavedAddonId, change: F) -> Result<T, LibraryError>
    where
        T: Send,
        F: FnOnce(&mut SavedAddon) -> T + Send,
    {
        self.update_entries(move |entries| {
            let entry = entries
                .iter_mut()
                .find(|e| e.id == id)
                .ok_or(LibraryError::NotFound(id))?;
            Ok(change(entry))
        })
        .await
    }
}

#[async_trait]
impl LibraryService for DefaultLibraryService {
    async fn list(&self) -> Vec<SavedAddon> {
        self.entries.read().await.clone()
    }

    async fn get(&self, id: SavedAddonId) -> Result<SavedAddon, LibraryError> {
        self.entries
            .read()
            .await
            .iter()
            .find(|e| e.id == id)
            .cloned()
            .ok_or(LibraryError::NotFound(id))
    }

    async fn create(
        &self,
        name: &str,
        url: &str,
        tags: &[String],
    ) -> Result<SavedAddon, LibraryError> {
        let name = validate_name(name)?;
        let tags = validate_tags(tags)?;

        let url = url.trim();
        url::Url::parse(url)
            .map_err(|e| LibraryError::Validation(format!("Invalid URL format: {e}")))?;

        let descriptor = self.fetcher.fetch_manifest(url).await?;
        let saved = SavedAddon::new(name, descriptor, tags);

        let stored = saved.clone();
        self.update_entries(move |entries| {
            entries.push(stored);
            Ok(())
        })
        .await?;

        info!(id = %saved.id, name = %saved.name, addon = %saved.manifest.id, "Saved addon created");
        Ok(saved)
    }

    async fn update(
        &self,
        id: SavedAddonId,
        name: Option<&str>,
        tags: Option<&[String]>,
    ) -> Result<SavedAddon, LibraryError> {
        let name = name.map(validate_name).transpose()?;
        let tags = tags.map(validate_tags).transpose()?;

        self.modify(id, move |entry| {
            if let Some(name) = name {
                entry.name = name;
            }
            if let Some(tags) = tags {
                entry.tags = tags;
            }
            entry.updated_at = Utc::now();
            entry.clone()
        })
        .await
    }

    async fn delete(&self, id: SavedAddonId) -> Result<(), LibraryError> {
        self.update_entries(|entries| {
            let before = entries.len();
            entries.retain(|e| e.id != id);
            if entries.len() == before {
                return Err(LibraryError::NotFound(id));
            }
            Ok(())
        })
        .await?;
        info!(%id, "Saved addon deleted");
        Ok(())
    }

    async fn mark_used(&self, ids: &[SavedAddonId]) -> Result<(), LibraryError> {
        if ids.is_empty() {
            return Ok(());
        }

        let wanted: HashSet<SavedAddonId> = ids.iter().copied().collect();
        let now = Utc::now();
        self.update_entries(move |entries| {
            for entry in entries.iter_mut().filter(|e| wanted.contains(&e.id)) {
                entry.last_used = Some(now);
            }
            Ok(())
        })
        .await
    }

    async fn all_tags(&self) -> Vec<String> {
        self.entries
            .read()
            .await
            .iter()
            .flat_map(|e| e.tags.iter().cloned())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    async fn check_health(
        &self,
        on_progress: &mut (dyn FnMut(usize, usize) + Send),
    ) -> Result<HealthSummary, LibraryError> {
        let snapshot = self.entries.read().await.clone();
        let checked = self.prober.probe_saved(snapshot, on_progress).await;

        let health: HashMap<SavedAddonId, _> = checked
            .iter()
            .filter_map(|e| e.health.map(|h| (e.id, h)))
            .collect();

        let summary = self
            .update_entries(move |entries| {
                for entry in entries.iter_mut() {
                    if let Some(h) = health.get(&entry.id) {
                        entry.health = Some(*h);
                    }
                }
                Ok(health_summary(entries))
            })
            .await?;

        info!(
            online = summary.online,
            offline = summary.offline,
            "Saved addon health check finished"
        );
        Ok(summary)
    }

    async fn check_updates(&self) -> Vec<AddonUpdateInfo> {
        let descriptors: Vec<_> = self
            .entries
            .read()
            .await
            .iter()
            .map(SavedAddon::cached_descriptor)
            .collect();
        updates::check_updates(&descriptors, self.fetcher.as_ref(), self.update_policy).await
    }

    async fn import(&self, saved: Vec<SavedAddon>) -> Result<usize, LibraryError> {
        let added = self
            .update_entries(move |entries| {
                let existing: HashSet<SavedAddonId> = entries.iter().map(|e| e.id).collect();
                let fresh: Vec<SavedAddon> = saved
                    .into_iter()
                    .filter(|s| !existing.contains(&s.id))
                    .collect();
                let added = fresh.len();
                entries.extend(fresh);
                Ok(added)
            })
            .await?;
        info!(added, "Saved addons imported");
        Ok(added)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::ApiError;
    use crate::db::MemoryStore;
    use crate::models::{AddonDescriptor, AddonManifest};
    use crate::services::health::LivenessProbe;

    struct StaticFetcher;

    #[async_trait]
    impl ManifestFetcher for StaticFetcher {
        async fn fetch_manifest(&self, url: &str) -> Result<AddonDescriptor, ApiError> {
            if url.contains("missing") {
                return Err(ApiError::ManifestFetchFailed {
                    url: url.to_string(),
                    reason: "Addon manifest not found".to_string(),
                });
            }
            Ok(AddonDescriptor::new(
                url,
                AddonManifest::new("com.example.addon", "Example", "2.0.0"),
            ))
        }
    }

    struct UpWhenHealthy;

    #[async_trait]
    impl LivenessProbe for UpWhenHealthy {
        async fn is_online(&self, url: &str) -> bool {
            url.contains("healthy")
        }
    }

    async fn library(store: Arc<MemoryStore>) -> DefaultLibraryService {
        DefaultLibraryService::load(
            store,
            Arc::new(StaticFetcher),
            HealthProber::new(Arc::new(UpWhenHealthy), 5),
            ExecutionPolicy::default(),
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn create_validates_and_persists() {
        let store = Arc::new(MemoryStore::new());
        let lib = library(store.clone()).await;

        let saved = lib
            .create(" My addon ", "https://healthy.example.com", &["rd".to_string()])
            .await
            .unwrap();
        assert_eq!(saved.name, "My addon");
        assert_eq!(saved.manifest.version, "2.0.0");

        assert!(matches!(
            lib.create("x", "not a url", &[]).await,
            Err(LibraryError::Validation(_))
        ));
        assert!(matches!(
            lib.create("x", "https://example.com", &["Bad Tag".to_string()]).await,
            Err(LibraryError::Validation(_))
        ));
        assert!(matches!(
            lib.create("x", "https://missing.example.com", &[]).await,
            Err(LibraryError::Api(_))
        ));

        let reloaded = library(store).await;
        assert_eq!(reloaded.list().await, vec![saved]);
    }

    #[derive(Default)]
    struct FlakyStore {
        inner: MemoryStore,
        reject_writes: std::sync::atomic::AtomicBool,
    }

    #[async_trait]
    impl KeyValueStore for FlakyStore {
        async fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
            self.inner.get(key).await
        }

        async fn set(&self, key: &str, value: &str) -> anyhow::Result<()> {
            if self.reject_writes.load(std::sync::atomic::Ordering::SeqCst) {
                anyhow::bail!("disk full");
            }
            self.inner.set(key, value).await
        }

        async fn remove(&self, key: &str) -> anyhow::Result<()> {
            self.inner.remove(key).await
        }
    }

    #[tokio::test]
    async fn failed_save_is_not_applied() {
        let store = Arc::new(FlakyStore::default());
        let lib = DefaultLibraryService::load(
            store.clone(),
            Arc::new(StaticFetcher),
            HealthProber::new(Arc::new(UpWhenHealthy), 5),
            ExecutionPolicy::default(),
        )
        .await
        .unwrap();
        let kept = lib.create("kept", "https://a.example.com", &[]).await.unwrap();

        store
            .reject_writes
            .store(true, std::sync::atomic::Ordering::SeqCst);

        assert!(matches!(
            lib.create("lost", "https://b.example.com", &[]).await,
            Err(LibraryError::Storage(_))
        ));
        assert!(lib.update(kept.id, Some("renamed"), None).await.is_err());
        assert!(lib.delete(kept.id).await.is_err());

        assert_eq!(lib.list().await, vec![kept]);
    }

    #[tokio::test]
    async fn update_delete_and_tags() {
        let lib = library(Arc::new(MemoryStore::new())).await;
        let a = lib
            .create("a", "https://a.example.com", &["rd".to_string(), "4k".to_string()])
            .await
            .unwrap();
        let b = lib
            .create("b", "https://b.example.com", &["anime".to_string()])
            .await
            .unwrap();

        assert_eq!(lib.all_tags().await, vec!["4k", "anime", "rd"]);

        let renamed = lib
            .update(a.id, Some("renamed"), Some(&["ad".to_string()]))
            .await
            .unwrap();
        assert_eq!(renamed.name, "renamed");
        assert_eq!(renamed.tags, vec!["ad"]);

        lib.delete(b.id).await.unwrap();
        assert!(matches!(lib.delete(b.id).await, Err(LibraryError::NotFound(_))));
        assert_eq!(lib.all_tags().await, vec!["ad"]);
    }

    #[tokio::test]
    async fn mark_used_and_import_skip_existing() {
        let lib = library(Arc::new(MemoryStore::new())).await;
        let a = lib.create("a", "https://a.example.com", &[]).await.unwrap();

        lib.mark_used(&[a.id, SavedAddonId::new()]).await.unwrap();
        assert!(lib.get(a.id).await.unwrap().last_used.is_some());

        let other = SavedAddon::new(
            "other",
            AddonDescriptor::new("https://o.example.com", AddonManifest::new("o", "O", "1")),
            Vec::new(),
        );
        let added = lib.import(vec![a.clone(), other]).await.unwrap();
        assert_eq!(added, 1);
        assert_eq!(lib.list().await.len(), 2);
    }

    #[tokio::test]
    async fn health_check_persists_results() {
        let store = Arc::new(MemoryStore::new());
        let lib = library(store.clone()).await;
        lib.create("up", "https://healthy.example.com", &[]).await.unwrap();
        lib.create("down", "https://dead.example.com", &[]).await.unwrap();

        let mut calls = Vec::new();
        let summary = lib
            .check_health(&mut |done, total| calls.push((done, total)))
            .await
            .unwrap();

        assert_eq!(summary.online, 1);
        assert_eq!(summary.offline, 1);
        assert_eq!(calls, vec![(2, 2)]);

        let reloaded = library(store).await;
        assert!(reloaded.list().await.iter().all(|e| e.health.is_some()));
    }

    #[tokio::test]
    async fn update_check_compares_cached_version() {
        let lib = library(Arc::new(MemoryStore::new())).await;
        let stale = SavedAddon::new(
            "stale",
            AddonDescriptor::new(
                "https://stale.example.com",
                AddonManifest::new("com.example.addon", "Example", "1.0.0"),
            ),
            Vec::new(),
        );
        lib.import(vec![stale]).await.unwrap();

        let updates = lib.check_updates().await;
        assert_eq!(updates.len(), 1);
        assert!(updates[0].has_update);
        assert_eq!(updates[0].latest_version, "2.0.0");
    }
}
