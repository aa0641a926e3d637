//! Configuration for the builder, the validator and the CLI.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{IndexError, Result};
use crate::log::LogConfig;

/// Top-level configuration, loadable from a YAML or JSON file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IndexConfig {
    /// Rules applied by the builder and the validator
    #[serde(default)]
    pub validation: ValidationConfig,

    /// Logging setup for the CLI
    #[serde(default)]
    pub log: LogConfig,
}

impl IndexConfig {
    /// Load configuration from a file.
    ///
    /// Files ending in `.json` are read as JSON; everything else as YAML.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            IndexError::ConfigError(format!("Failed to read {}: {}", path.display(), e))
        })?;

        let is_json = path
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("json"))
            .unwrap_or(false);

        if is_json {
            Ok(serde_json::from_str(&content)?)
        } else {
            Ok(serde_yaml::from_str(&content)?)
        }
    }
}

/// Validation rules
///
/// The defaults are the strict OCI rules. [`ValidationConfig::buildx`]
/// relaxes them for documents produced by Docker Buildx.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// Accept Docker schema2 manifest and manifest-list media types
    #[serde(default)]
    pub accept_docker_media_types: bool,

    /// Exempt Buildx attestation manifests from platform uniqueness
    #[serde(default)]
    pub exempt_attestations: bool,

    /// Accept an index document without a top-level `mediaType`
    #[serde(default)]
    pub allow_missing_media_type: bool,

    /// Re-hash entry content when a content source is available
    #[serde(default = "default_true")]
    pub verify_digests: bool,
}

fn default_true() -> bool {
    true
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            accept_docker_media_types: false,
            exempt_attestations: false,
            allow_missing_media_type: false,
            verify_digests: true,
        }
    }
}

impl ValidationConfig {
    /// Rules for indexes pushed by Docker Buildx: Docker media types,
    /// attestation manifests and an omitted `mediaType` are all accepted.
    pub fn buildx() -> Self {
        Self {
            accept_docker_media_types: true,
            exempt_attestations: true,
            allow_missing_media_type: true,
            ..Self::default()
        }
    }
}
