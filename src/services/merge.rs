//! Applies saved addons to an account collection.
//!
//! Identity is `manifest.id`. Existing entries keep their index; new entries
//! are appended. Protected entries are never replaced or removed.

use tracing::{debug, warn};
use url::Url;

use crate::clients::ManifestFetcher;
use crate::models::{
    AddedAddon, AddonDescriptor, MergeResult, MergeStrategy, ProtectedAddon, SavedAddon,
    SkipReason, SkippedAddon, UpdatedAddon,
};

/// Collection after a removal, with what was dropped and what was kept
/// because it is protected.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RemovalOutcome {
    pub addons: Vec<AddonDescriptor>,
    pub removed: Vec<String>,
    pub protected: Vec<String>,
}

fn id_taken_elsewhere(addons: &[AddonDescriptor], id: &str, except: Option<usize>) -> bool {
    addons
        .iter()
        .enumerate()
        .any(|(i, a)| Some(i) != except && a.id() == id)
}

/// Merges `saved` into `current`, in the order of `saved`.
///
/// A replacement is only made from a freshly fetched manifest; a failed fetch
/// skips the entry. A new addon falls back to the cached manifest when the
/// fetch fails. A replacement identical to the existing entry is reported as
/// `already-exists`, so re-running a merge is a no-op.
pub async fn merge<F>(
    current: &[AddonDescriptor],
    saved: &[SavedAddon],
    strategy: MergeStrategy,
    fetcher: &F,
) -> (Vec<AddonDescriptor>, MergeResult)
where
    F: ManifestFetcher + ?Sized,
{
    let mut addons = current.to_vec();
    let mut result = MergeResult::default();

    for saved_addon in saved {
        let addon_id = saved_addon.manifest.id.clone();

        if let Some(index) = addons.iter().position(|a| a.id() == addon_id) {
            let existing = &addons[index];

            if existing.is_protected() {
                result.protected.push(ProtectedAddon {
                    addon_id,
                    name: existing.manifest.name.clone(),
                });
                continue;
            }

            if strategy == MergeStrategy::AddOnly {
                result.skipped.push(SkippedAddon {
                    addon_id,
                    reason: SkipReason::AlreadyExists,
                });
                continue;
            }

            match fetcher.fetch_manifest(&saved_addon.install_url).await {
                Ok(mut fresh) => {
                    fresh.flags.clone_from(&existing.flags);

                    let unchanged = urls_equivalent(&existing.transport_url, &fresh.transport_url)
                        && existing.manifest == fresh.manifest;

                    if unchanged || id_taken_elsewhere(&addons, fresh.id(), Some(index)) {
                        result.skipped.push(SkippedAddon {
                            addon_id,
                            reason: SkipReason::AlreadyExists,
                        });
                        continue;
                    }

                    let old_url = std::mem::replace(&mut addons[index], fresh).transport_url;
                    result.updated.push(UpdatedAddon {
                        addon_id,
                        old_url,
                        new_url: addons[index].transport_url.clone(),
                    });
                }
                Err(e) => {
                    warn!(addon = %saved_addon.name, error = %e, "Skipping saved addon update");
                    result.skipped.push(SkippedAddon {
                        addon_id,
                        reason: SkipReason::FetchFailed,
                    });
                }
            }
        } else {
            let descriptor = match fetcher.fetch_manifest(&saved_addon.install_url).await {
                Ok(fresh) => fresh,
                Err(e) => {
                    warn!(
                        addon = %saved_addon.name,
                        error = %e,
                        "Manifest fetch failed, using cached manifest"
                    );
                    saved_addon.cached_descriptor()
                }
            };

            if id_taken_elsewhere(&addons, descriptor.id(), None) {
                result.skipped.push(SkippedAddon {
                    addon_id,
                    reason: SkipReason::AlreadyExists,
                });
                continue;
            }

            result.added.push(AddedAddon {
                addon_id,
                name: descriptor.manifest.name.clone(),
                install_url: descriptor.transport_url.clone(),
            });
            addons.push(descriptor);
        }
    }

    debug!(
        added = result.added.len(),
        updated = result.updated.len(),
        skipped = result.skipped.len(),
        protected = result.protected.len(),
        "Merge finished"
    );

    (addons, result)
}

/// Runs [`merge`] and keeps only the report. Manifests are still fetched.
pub async fn preview_merge<F>(
    current: &[AddonDescriptor],
    saved: &[SavedAddon],
    strategy: MergeStrategy,
    fetcher: &F,
) -> MergeResult
where
    F: ManifestFetcher + ?Sized,
{
    merge(current, saved, strategy, fetcher).await.1
}

/// Drops addons whose id is in `ids`, except protected ones.
#[must_use]
pub fn remove_addons(current: &[AddonDescriptor], ids: &[String]) -> RemovalOutcome {
    let mut outcome = RemovalOutcome::default();

    for addon in current {
        if !ids.iter().any(|id| id == addon.id()) {
            outcome.addons.push(addon.clone());
        } else if addon.is_protected() {
            outcome.protected.push(addon.id().to_string());
            outcome.addons.push(addon.clone());
        } else {
            outcome.removed.push(addon.id().to_string());
        }
    }

    outcome
}

fn normalize_url(raw: &str) -> String {
    let normalized = match Url::parse(raw) {
        Ok(mut url) => {
            let mut pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
            if pairs.is_empty() {
                url.set_query(None);
            } else {
                pairs.sort_by(|a, b| a.0.cmp(&b.0));
                url.query_pairs_mut().clear().extend_pairs(pairs);
            }
            url.to_string()
        }
        Err(_) => raw.to_string(),
    };

    let lower = normalized.to_lowercase();
    match lower.strip_suffix('/') {
        Some(stripped) => stripped.to_string(),
        None => lower,
    }
}

/// Compares two addon URLs ignoring case, query parameter order and a
/// trailing slash.
#[must_use]
pub fn urls_equivalent(a: &str, b: &str) -> bool {
    normalize_url(a) == normalize_url(b)
}
