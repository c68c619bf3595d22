//! Detects installed addons whose published manifest has a newer version.

use futures::FutureExt;
use futures::stream::{self, StreamExt};
use serde::Serialize;
use tracing::{info, warn};

use crate::clients::ManifestFetcher;
use crate::config::UpdateCheckConfig;
use crate::models::AddonDescriptor;

/// How many manifest requests may be in flight at once.
///
/// The default of one keeps update checks sequential so a single addon host
/// is not hit with a burst of requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecutionPolicy {
    pub concurrency: usize,
}

impl ExecutionPolicy {
    pub const SEQUENTIAL: Self = Self { concurrency: 1 };

    #[must_use]
    pub fn bounded(concurrency: usize) -> Self {
        Self {
            concurrency: concurrency.max(1),
        }
    }
}

impl Default for ExecutionPolicy {
    fn default() -> Self {
        Self::SEQUENTIAL
    }
}

impl From<&UpdateCheckConfig> for ExecutionPolicy {
    fn from(config: &UpdateCheckConfig) -> Self {
        Self::bounded(config.concurrency)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddonUpdateInfo {
    pub addon_id: String,
    pub name: String,
    pub transport_url: String,
    pub installed_version: String,
    pub latest_version: String,
    pub has_update: bool,
}

/// Addons the update checker looks at: neither protected nor official.
#[must_use]
pub fn checkable(addons: &[AddonDescriptor]) -> Vec<&AddonDescriptor> {
    addons
        .iter()
        .filter(|a| !a.is_protected() && !a.is_official())
        .collect()
}

/// Fetches the latest manifest of every checkable addon. Addons whose fetch
/// fails are left out of the result; the rest keep input order.
pub async fn check_updates<F>(
    addons: &[AddonDescriptor],
    fetcher: &F,
    policy: ExecutionPolicy,
) -> Vec<AddonUpdateInfo>
where
    F: ManifestFetcher + ?Sized,
{
    let targets = checkable(addons);
    info!(count = targets.len(), concurrency = policy.concurrency, "Checking addon updates");

    let fetches: Vec<_> = targets
        .into_iter()
        .map(|addon| {
            async move {
                match fetcher.fetch_manifest(&addon.transport_url).await {
                    Ok(latest) => Some(AddonUpdateInfo {
                        addon_id: addon.manifest.id.clone(),
                        name: addon.manifest.name.clone(),
                        transport_url: addon.transport_url.clone(),
                        installed_version: addon.manifest.version.clone(),
                        has_update: latest.manifest.version != addon.manifest.version,
                        latest_version: latest.manifest.version,
                    }),
                    Err(e) => {
                        warn!(addon = %addon.manifest.name, error = %e, "Update check failed");
                        None
                    }
                }
            }
            .boxed()
        })
        .collect();

    let results: Vec<Option<AddonUpdateInfo>> = stream::iter(fetches)
        .buffered(policy.concurrency.max(1))
        .collect()
        .await;

    results.into_iter().flatten().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::ApiError;
    use crate::models::{AddonFlags, AddonManifest};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Serves version 2.0.0 for every URL except ones containing "broken",
    /// and records the peak number of concurrent fetches.
    #[derive(Default)]
    struct CountingFetcher {
        in_flight: AtomicUsize,
        peak: AtomicUsize,
    }

    #[async_trait]
    impl ManifestFetcher for CountingFetcher {
        async fn fetch_manifest(&self, url: &str) -> Result<AddonDescriptor, ApiError> {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(std::time::Duration::from_millis(5)).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            if url.contains("broken") {
                return Err(ApiError::ManifestFetchFailed {
                    url: url.to_string(),
                    reason: "HTTP 500".to_string(),
                });
            }
            Ok(AddonDescriptor::new(url, AddonManifest::new("x", "X", "2.0.0")))
        }
    }

    fn addon(id: &str, version: &str, flags: Option<AddonFlags>) -> AddonDescriptor {
        let mut a = AddonDescriptor::new(
            format!("https://{id}.example.com/manifest.json"),
            AddonManifest::new(id, id, version),
        );
        a.flags = flags;
        a
    }

    #[tokio::test]
    async fn skips_protected_official_and_failed() {
        let addons = vec![
            addon("old", "1.0.0", None),
            addon(
                "official",
                "1.0.0",
                Some(AddonFlags {
                    official: Some(true),
                    protected: None,
                }),
            ),
            addon("broken", "1.0.0", None),
            addon("current", "2.0.0", None),
            addon(
                "locked",
                "1.0.0",
                Some(AddonFlags {
                    official: None,
                    protected: Some(true),
                }),
            ),
        ];

        let fetcher = CountingFetcher::default();
        let updates = check_updates(&addons, &fetcher, ExecutionPolicy::default()).await;

        let summary: Vec<(&str, bool)> = updates
            .iter()
            .map(|u| (u.addon_id.as_str(), u.has_update))
            .collect();
        assert_eq!(summary, vec![("old", true), ("current", false)]);
        assert_eq!(updates[0].latest_version, "2.0.0");
        assert_eq!(fetcher.peak.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn bounded_policy_limits_in_flight_requests() {
        let addons: Vec<_> = (0..8).map(|i| addon(&format!("a{i}"), "1.0.0", None)).collect();
        let fetcher = CountingFetcher::default();

        let updates = check_updates(&addons, &fetcher, ExecutionPolicy::bounded(3)).await;

        assert_eq!(updates.len(), 8);
        assert!(fetcher.peak.load(Ordering::SeqCst) <= 3);
        let ids: Vec<_> = updates.iter().map(|u| u.addon_id.clone()).collect();
        let expected: Vec<_> = (0..8).map(|i| format!("a{i}")).collect();
        assert_eq!(ids, expected);
    }

    #[test]
    fn zero_concurrency_is_clamped() {
        assert_eq!(ExecutionPolicy::bounded(0), ExecutionPolicy::SEQUENTIAL);
    }
}
