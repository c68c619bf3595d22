//! Provider-specific addon URL codecs.
//!
//! Each provider implements [`AddonCodec`]; the [`CodecRegistry`] resolves a
//! URL to the first codec whose `detect` accepts it.

pub mod torrentio;

pub use torrentio::TorrentioCodec;

use thiserror::Error;

use crate::domain::DebridService;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CodecError {
    #[error("Invalid addon URL: {0}")]
    InvalidUrl(String),
}

/// Structured view of the configuration embedded in an addon URL.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddonUrlConfig {
    /// Scheme, host and port, without a trailing slash.
    pub base_url: String,
    pub quality_filter: Option<String>,
    pub debrid_service: Option<DebridService>,
    pub debrid_key: Option<String>,
    /// Parameters the codec does not understand, in their original order.
    pub other_params: Vec<String>,
}

pub trait AddonCodec: Send + Sync {
    /// Stable registry key, e.g. `torrentio`.
    fn key(&self) -> &'static str;

    fn display_name(&self) -> &'static str;

    fn detect(&self, url: &str) -> bool;

    fn parse(&self, url: &str) -> Result<AddonUrlConfig, CodecError>;

    fn build(&self, config: &AddonUrlConfig) -> String;

    /// Sets the debrid service and key, replacing any existing ones.
    fn apply_debrid(
        &self,
        url: &str,
        service: DebridService,
        key: &str,
    ) -> Result<String, CodecError> {
        let mut config = self.parse(url)?;
        config.debrid_service = Some(service);
        config.debrid_key = Some(key.to_string());
        Ok(self.build(&config))
    }

    fn remove_debrid(&self, url: &str) -> Result<String, CodecError> {
        let mut config = self.parse(url)?;
        config.debrid_service = None;
        config.debrid_key = None;
        Ok(self.build(&config))
    }

    fn current_debrid(&self, url: &str) -> Option<(DebridService, String)> {
        let config = self.parse(url).ok()?;
        config.debrid_service.zip(config.debrid_key)
    }
}

/// Ordered set of codecs; lookup is first match.
pub struct CodecRegistry {
    codecs: Vec<Box<dyn AddonCodec>>,
}

impl Default for CodecRegistry {
    fn default() -> Self {
        Self::new().with_codec(TorrentioCodec::new())
    }
}

impl CodecRegistry {
    /// Empty registry; most callers want [`CodecRegistry::default`].
    #[must_use]
    pub fn new() -> Self {
        Self { codecs: Vec::new() }
    }

    #[must_use]
    pub fn with_codec(mut self, codec: impl AddonCodec + 'static) -> Self {
        self.codecs.push(Box::new(codec));
        self
    }

    #[must_use]
    pub fn resolve(&self, url: &str) -> Option<&dyn AddonCodec> {
        self.codecs
            .iter()
            .find(|codec| codec.detect(url))
            .map(|codec| codec.as_ref())
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&dyn AddonCodec> {
        self.codecs
            .iter()
            .find(|codec| codec.key() == key)
            .map(|codec| codec.as_ref())
    }

    /// `(key, display name)` for every registered codec.
    #[must_use]
    pub fn supported(&self) -> Vec<(&'static str, &'static str)> {
        self.codecs
            .iter()
            .map(|c| (c.key(), c.display_name()))
            .collect()
    }
}
