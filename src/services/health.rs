//! Liveness checks for addon manifest endpoints.

use async_trait::async_trait;
use chrono::Utc;
use futures::future::join_all;
use reqwest::{Client, StatusCode};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use crate::clients::manifest_url;
use crate::config::HealthConfig;
use crate::models::{AddonHealth, SavedAddon};

#[async_trait]
pub trait LivenessProbe: Send + Sync {
    /// Any failure counts as offline.
    async fn is_online(&self, url: &str) -> bool;
}

/// HEAD request against the manifest endpoint; only `200 OK` is online.
pub struct HttpLivenessProbe {
    client: Client,
    timeout: Duration,
}

impl HttpLivenessProbe {
    #[must_use]
    pub const fn new(client: Client, timeout: Duration) -> Self {
        Self { client, timeout }
    }
}

#[async_trait]
impl LivenessProbe for HttpLivenessProbe {
    async fn is_online(&self, url: &str) -> bool {
        let target = manifest_url(url);
        match self.client.head(&target).timeout(self.timeout).send().await {
            Ok(response) => response.status() == StatusCode::OK,
            Err(e) => {
                debug!(url = %target, error = %e, "Health probe failed");
                false
            }
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct HealthSummary {
    pub online: usize,
    pub offline: usize,
    pub unchecked: usize,
}

pub struct HealthProber {
    probe: Arc<dyn LivenessProbe>,
    window: usize,
}

impl HealthProber {
    #[must_use]
    pub fn new(probe: Arc<dyn LivenessProbe>, window: usize) -> Self {
        Self {
            probe,
            window: window.max(1),
        }
    }

    #[must_use]
    pub fn http(client: Client, config: &HealthConfig) -> Self {
        let probe = HttpLivenessProbe::new(client, Duration::from_secs(config.timeout_seconds));
        Self::new(Arc::new(probe), config.concurrency)
    }

    pub async fn probe(&self, url: &str) -> AddonHealth {
        let is_online = self.probe.is_online(url).await;
        AddonHealth {
            is_online,
            last_checked: Utc::now(),
        }
    }

    /// Probes `urls` in windows of at most `window` concurrent requests.
    /// `on_progress(completed, total)` runs after each window; the output is
    /// in input order.
    pub async fn probe_all<F>(&self, urls: &[String], mut on_progress: F) -> Vec<AddonHealth>
    where
        F: FnMut(usize, usize) + Send,
    {
        let total = urls.len();
        let mut results = Vec::with_capacity(total);

        for chunk in urls.chunks(self.window) {
            let checked = join_all(chunk.iter().map(|url| self.probe(url))).await;
            results.extend(checked);
            on_progress(results.len(), total);
        }

        results
    }

    pub async fn probe_saved<F>(&self, saved: Vec<SavedAddon>, on_progress: F) -> Vec<SavedAddon>
    where
        F: FnMut(usize, usize) + Send,
    {
        let urls: Vec<String> = saved.iter().map(|s| s.install_url.clone()).collect();
        let health = self.probe_all(&urls, on_progress).await;

        saved
            .into_iter()
            .zip(health)
            .map(|(mut addon, health)| {
                addon.health = Some(health);
                addon
            })
            .collect()
    }
}

#[must_use]
pub fn health_summary(saved: &[SavedAddon]) -> HealthSummary {
    saved
        .iter()
        .fold(HealthSummary::default(), |mut summary, addon| {
            match addon.health {
                None => summary.unchecked += 1,
                Some(h) if h.is_online => summary.online += 1,
                Some(_) => summary.offline += 1,
            }
            summary
        })
}
