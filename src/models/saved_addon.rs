use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::SavedAddonId;
use crate::models::addon::{AddonDescriptor, AddonManifest};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddonHealth {
    pub is_online: bool,
    pub last_checked: DateTime<Utc>,
}

/// Reusable addon configuration kept in the local library, independent of
/// any account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedAddon {
    pub id: SavedAddonId,
    pub name: String,
    pub install_url: String,
    /// Manifest snapshot taken when the addon was saved.
    pub manifest: AddonManifest,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub health: Option<AddonHealth>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_used: Option<DateTime<Utc>>,
}

impl SavedAddon {
    #[must_use]
    pub fn new(name: impl Into<String>, descriptor: AddonDescriptor, tags: Vec<String>) -> Self {
        let now = Utc::now();
        Self {
            id: SavedAddonId::new(),
            name: name.into(),
            install_url: descriptor.transport_url,
            manifest: descriptor.manifest,
            tags,
            health: None,
            created_at: now,
            updated_at: now,
            last_used: None,
        }
    }

    /// Descriptor built from the cached manifest snapshot.
    #[must_use]
    pub fn cached_descriptor(&self) -> AddonDescriptor {
        AddonDescriptor::new(self.install_url.clone(), self.manifest.clone())
    }
}

/// Saved addons travel through exports unchanged; timestamps are RFC 3339.
pub type SavedAddonExport = SavedAddon;

/// How an existing addon with the same manifest id is treated during a merge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MergeStrategy {
    #[default]
    ReplaceMatching,
    AddOnly,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddedAddon {
    pub addon_id: String,
    pub name: String,
    pub install_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatedAddon {
    pub addon_id: String,
    pub old_url: String,
    pub new_url: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SkipReason {
    FetchFailed,
    AlreadyExists,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkippedAddon {
    pub addon_id: String,
    pub reason: SkipReason,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProtectedAddon {
    pub addon_id: String,
    pub name: String,
}

/// Outcome of applying saved addons to a collection. Each saved addon lands
/// in exactly one bucket.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeResult {
    pub added: Vec<AddedAddon>,
    pub updated: Vec<UpdatedAddon>,
    pub skipped: Vec<SkippedAddon>,
    pub protected: Vec<ProtectedAddon>,
}

impl MergeResult {
    #[must_use]
    pub fn total(&self) -> usize {
        self.added.len() + self.updated.len() + self.skipped.len() + self.protected.len()
    }

    /// True when the merge changed the collection.
    #[must_use]
    pub fn has_changes(&self) -> bool {
        !self.added.is_empty() || !self.updated.is_empty()
    }
}
