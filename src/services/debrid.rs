//! Provider-agnostic application of debrid keys to addon URLs.

use thiserror::Error;

use crate::addons::{AddonCodec, CodecError, CodecRegistry};
use crate::domain::{ApiService, DebridService};
use crate::models::AddonDescriptor;

#[derive(Debug, Error)]
pub enum DebridError {
    #[error("Unsupported addon type: {0}")]
    UnsupportedAddonType(String),

    #[error("Service '{0}' is not a debrid service")]
    InvalidServiceType(String),

    #[error(transparent)]
    Codec(#[from] CodecError),
}

pub struct DebridKeyApplier {
    registry: CodecRegistry,
}

impl Default for DebridKeyApplier {
    fn default() -> Self {
        Self::new(CodecRegistry::default())
    }
}

impl DebridKeyApplier {
    #[must_use]
    pub const fn new(registry: CodecRegistry) -> Self {
        Self { registry }
    }

    fn codec_for(&self, addon: &AddonDescriptor) -> Result<&dyn AddonCodec, DebridError> {
        self.registry
            .resolve(&addon.transport_url)
            .ok_or_else(|| DebridError::UnsupportedAddonType(addon.manifest.name.clone()))
    }

    /// Returns a copy of `addon` whose URL carries `service` and `secret`.
    /// Only `transport_url` differs from the input.
    pub fn apply_key(
        &self,
        addon: &AddonDescriptor,
        service: &ApiService,
        secret: &str,
    ) -> Result<AddonDescriptor, DebridError> {
        let codec = self.codec_for(addon)?;
        let debrid = service
            .debrid()
            .ok_or_else(|| DebridError::InvalidServiceType(service.to_string()))?;

        let url = codec.apply_debrid(&addon.transport_url, debrid, secret)?;
        Ok(addon.with_transport_url(url))
    }

    pub fn remove_key(&self, addon: &AddonDescriptor) -> Result<AddonDescriptor, DebridError> {
        let codec = self.codec_for(addon)?;
        let url = codec.remove_debrid(&addon.transport_url)?;
        Ok(addon.with_transport_url(url))
    }

    /// Registry key of the codec handling `url`.
    #[must_use]
    pub fn addon_type(&self, url: &str) -> Option<&'static str> {
        self.registry.resolve(url).map(|codec| codec.key())
    }

    #[must_use]
    pub fn type_name(&self, key: &str) -> Option<&'static str> {
        self.registry.get(key).map(|codec| codec.display_name())
    }

    #[must_use]
    pub fn supported_types(&self) -> Vec<(&'static str, &'static str)> {
        self.registry.supported()
    }

    #[must_use]
    pub fn find_addons_by_type<'a>(
        &self,
        addons: &'a [AddonDescriptor],
        key: &str,
    ) -> Vec<&'a AddonDescriptor> {
        addons
            .iter()
            .filter(|addon| self.addon_type(&addon.transport_url) == Some(key))
            .collect()
    }

    /// Debrid service currently configured in the addon's URL.
    #[must_use]
    pub fn current_service(&self, addon: &AddonDescriptor) -> Option<DebridService> {
        self.registry
            .resolve(&addon.transport_url)?
            .current_debrid(&addon.transport_url)
            .map(|(service, _)| service)
    }
}
