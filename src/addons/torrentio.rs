//! Codec for Torrentio-style addon URLs.
//!
//! Format: `https://{host}/{config}/manifest.json` where `{config}` is a
//! `|`-separated list such as `qualityfilter=480p|realdebrid=KEY`.

use url::Url;

use super::{AddonCodec, AddonUrlConfig, CodecError};
use crate::domain::DebridService;

pub const TORRENTIO_HOSTS: &[&str] = &[
    "torrentio.strem.fun",
    "torrentio.strem.now.sh",
    "torrentio.strem.io",
];

const QUALITY_FILTER: &str = "qualityfilter=";
const MANIFEST_SEGMENT: &str = "manifest.json";

#[derive(Debug, Clone, Copy, Default)]
pub struct TorrentioCodec;

impl TorrentioCodec {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

/// True when a manifest id looks like a Torrentio build.
#[must_use]
pub fn is_torrentio_manifest(manifest_id: &str) -> bool {
    manifest_id.contains("torrentio")
}

fn base_url(url: &Url) -> String {
    let host = url.host_str().unwrap_or_default();
    match url.port() {
        Some(port) => format!("{}://{host}:{port}", url.scheme()),
        None => format!("{}://{host}", url.scheme()),
    }
}

/// Escapes the characters that would end the path segment or be lost to
/// decoding. `|` is the separator and never appears inside a parameter.
fn escape_param(param: &str) -> String {
    let mut out = String::with_capacity(param.len());
    for c in param.chars() {
        match c {
            '%' => out.push_str("%25"),
            '/' => out.push_str("%2F"),
            '?' => out.push_str("%3F"),
            '#' => out.push_str("%23"),
            ' ' => out.push_str("%20"),
            _ => out.push(c),
        }
    }
    out
}

fn parse_debrid_param(param: &str) -> Option<(DebridService, &str)> {
    let (name, value) = param.split_once('=')?;
    DebridService::from_id(name).map(|service| (service, value))
}

impl AddonCodec for TorrentioCodec {
    fn key(&self) -> &'static str {
        "torrentio"
    }

    fn display_name(&self) -> &'static str {
        "Torrentio"
    }

    fn detect(&self, url: &str) -> bool {
        Url::parse(url)
            .ok()
            .and_then(|u| u.host_str().map(str::to_string))
            .is_some_and(|host| TORRENTIO_HOSTS.contains(&host.as_str()))
    }

    fn parse(&self, url: &str) -> Result<AddonUrlConfig, CodecError> {
        let parsed = Url::parse(url).map_err(|e| CodecError::InvalidUrl(format!("{url}: {e}")))?;

        let mut config = AddonUrlConfig {
            base_url: base_url(&parsed),
            ..Default::default()
        };

        let Some(segment) = parsed
            .path_segments()
            .and_then(|mut segments| segments.find(|s| !s.is_empty() && *s != MANIFEST_SEGMENT))
        else {
            return Ok(config);
        };

        let decoded = urlencoding::decode(segment)
            .map_err(|e| CodecError::InvalidUrl(format!("bad config segment encoding: {e}")))?;

        for param in decoded.split('|') {
            if let Some(quality) = param.strip_prefix(QUALITY_FILTER) {
                config.quality_filter = Some(quality.to_string());
            } else if let Some((service, key)) = parse_debrid_param(param) {
                config.debrid_service = Some(service);
                config.debrid_key = Some(key.to_string());
            } else if !param.is_empty() {
                config.other_params.push(param.to_string());
            }
        }

        Ok(config)
    }

    fn build(&self, config: &AddonUrlConfig) -> String {
        let mut params = Vec::with_capacity(config.other_params.len() + 2);

        if let Some(quality) = config.quality_filter.as_deref().filter(|q| !q.is_empty()) {
            params.push(format!("{QUALITY_FILTER}{}", escape_param(quality)));
        }

        if let (Some(service), Some(key)) = (
            config.debrid_service,
            config.debrid_key.as_deref().filter(|k| !k.is_empty()),
        ) {
            params.push(format!("{}={}", service.as_str(), escape_param(key)));
        }

        params.extend(config.other_params.iter().map(|param| escape_param(param)));

        if params.is_empty() {
            format!("{}/{MANIFEST_SEGMENT}", config.base_url)
        } else {
            format!("{}/{}/{MANIFEST_SEGMENT}", config.base_url, params.join("|"))
        }
    }
}
