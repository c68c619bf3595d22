use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BehaviorHints {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub adult: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub p2p: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub configurable: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub configuration_required: Option<bool>,
}

/// Addon manifest as published at `{transportUrl}/manifest.json`.
///
/// Fields this crate does not model are kept in `extra` so a collection can be
/// written back to the remote without losing anything.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddonManifest {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub types: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub catalogs: Option<Vec<Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resources: Option<Vec<Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_prefixes: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub behavior_hints: Option<BehaviorHints>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl AddonManifest {
    /// Minimal manifest with only the identity fields filled in.
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            version: version.into(),
            ..Default::default()
        }
    }

    /// Returns the first required field that is missing or blank.
    #[must_use]
    pub fn missing_required_field(&self) -> Option<&'static str> {
        if self.id.trim().is_empty() {
            Some("id")
        } else if self.name.trim().is_empty() {
            Some("name")
        } else if self.version.trim().is_empty() {
            Some("version")
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddonFlags {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub official: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protected: Option<bool>,
}

/// One entry of an account's addon collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddonDescriptor {
    pub transport_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transport_name: Option<String>,
    pub manifest: AddonManifest,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flags: Option<AddonFlags>,
}

impl AddonDescriptor {
    #[must_use]
    pub fn new(transport_url: impl Into<String>, manifest: AddonManifest) -> Self {
        Self {
            transport_url: transport_url.into(),
            transport_name: None,
            manifest,
            flags: None,
        }
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.manifest.id
    }

    #[must_use]
    pub fn is_protected(&self) -> bool {
        self.flags
            .as_ref()
            .and_then(|f| f.protected)
            .unwrap_or(false)
    }

    #[must_use]
    pub fn is_official(&self) -> bool {
        self.flags.as_ref().and_then(|f| f.official).unwrap_or(false)
    }

    /// Copy of this descriptor pointing at a different transport URL.
    #[must_use]
    pub fn with_transport_url(&self, transport_url: String) -> Self {
        Self {
            transport_url,
            ..self.clone()
        }
    }
}
