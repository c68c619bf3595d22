//! Domain service for the saved-addon library.
//!
//! The library holds reusable addon configurations independent of any
//! account. Entries are applied to accounts through the merge engine.

use thiserror::Error;

use crate::clients::ApiError;
use crate::constants::limits;
use crate::domain::SavedAddonId;
use crate::models::SavedAddon;
use crate::services::health::HealthSummary;
use crate::services::updates::AddonUpdateInfo;

#[derive(Debug, Error)]
pub enum LibraryError {
    #[error("Saved addon not found: {0}")]
    NotFound(SavedAddonId),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl From<anyhow::Error> for LibraryError {
    fn from(err: anyhow::Error) -> Self {
        Self::Storage(err.to_string())
    }
}

/// Lowercases, joins whitespace runs with `-` and drops anything outside
/// `[a-z0-9-]`.
#[must_use]
pub fn normalize_tag(tag: &str) -> String {
    tag.trim()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '-')
        .collect()
}

pub fn validate_name(name: &str) -> Result<String, LibraryError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(LibraryError::Validation(
            "Saved addon name cannot be empty".to_string(),
        ));
    }
    if trimmed.chars().count() > limits::MAX_SAVED_ADDON_NAME {
        return Err(LibraryError::Validation(format!(
            "Saved addon name is too long (max {} characters)",
            limits::MAX_SAVED_ADDON_NAME
        )));
    }
    Ok(trimmed.to_string())
}

pub fn validate_tag(tag: &str) -> Result<(), LibraryError> {
    if tag.is_empty() {
        return Err(LibraryError::Validation("Tag name cannot be empty".to_string()));
    }
    if tag.chars().count() > limits::MAX_TAG_LEN {
        return Err(LibraryError::Validation(format!(
            "Tag '{tag}' is too long (max {} characters)",
            limits::MAX_TAG_LEN
        )));
    }
    if !tag
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
    {
        return Err(LibraryError::Validation(format!(
            "Tag '{tag}' must be lowercase alphanumeric with hyphens only"
        )));
    }
    Ok(())
}

/// Validates every tag and drops duplicates, keeping first occurrence order.
pub fn validate_tags(tags: &[String]) -> Result<Vec<String>, LibraryError> {
    let mut out: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        let tag = tag.trim();
        validate_tag(tag)?;
        if !out.iter().any(|t| t == tag) {
            out.push(tag.to_string());
        }
    }
    Ok(out)
}

#[async_trait::async_trait]
pub trait LibraryService: Send + Sync {
    async fn list(&self) -> Vec<SavedAddon>;

    async fn get(&self, id: SavedAddonId) -> Result<SavedAddon, LibraryError>;

    /// Fetches the manifest at `url` and saves it under `name`.
    async fn create(
        &self,
        name: &str,
        url: &str,
        tags: &[String],
    ) -> Result<SavedAddon, LibraryError>;

    async fn update(
        &self,
        id: SavedAddonId,
        name: Option<&str>,
        tags: Option<&[String]>,
    ) -> Result<SavedAddon, LibraryError>;

    async fn delete(&self, id: SavedAddonId) -> Result<(), LibraryError>;

    /// Stamps `last_used` on every listed entry; unknown ids are ignored.
    async fn mark_used(&self, ids: &[SavedAddonId]) -> Result<(), LibraryError>;

    /// Sorted, deduplicated tags across the library.
    async fn all_tags(&self) -> Vec<String>;

    /// Probes every entry, persists the health results and returns the
    /// summary. `on_progress(completed, total)` runs after each window.
    async fn check_health(
        &self,
        on_progress: &mut (dyn FnMut(usize, usize) + Send),
    ) -> Result<HealthSummary, LibraryError>;

    /// Compares each entry's cached manifest version with the published one.
    async fn check_updates(&self) -> Vec<AddonUpdateInfo>;

    /// Adds entries whose id is not already present; returns how many were
    /// added.
    async fn import(&self, saved: Vec<SavedAddon>) -> Result<usize, LibraryError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_tags() {
        assert_eq!(normalize_tag("  Real Debrid "), "real-debrid");
        assert_eq!(normalize_tag("4K!!"), "4k");
        assert_eq!(normalize_tag("Anime / Movies"), "anime--movies");
    }

    #[test]
    fn tag_validation() {
        assert!(validate_tag("rd-4k").is_ok());
        assert!(validate_tag("").is_err());
        assert!(validate_tag("Upper").is_err());
        assert!(validate_tag(&"a".repeat(51)).is_err());
        assert!(validate_tag(&"a".repeat(50)).is_ok());

        let tags = vec!["rd".to_string(), "4k".to_string(), "rd".to_string()];
        assert_eq!(validate_tags(&tags).unwrap(), vec!["rd", "4k"]);
    }

    #[test]
    fn name_validation() {
        assert_eq!(validate_name("  Torrentio RD ").unwrap(), "Torrentio RD");
        assert!(validate_name("   ").is_err());
        assert!(validate_name(&"n".repeat(101)).is_err());
        assert!(validate_name(&"n".repeat(100)).is_ok());
    }
}
