//! Image index document model and serialization.

use std::collections::BTreeMap;

use a3s_index_core::error::Result;
use serde::{Deserialize, Serialize};

use super::descriptor::Descriptor;
use super::media_type::MediaType;
use super::platform::{Platform, PlatformKey};

/// `schemaVersion` of every OCI image index.
pub const SCHEMA_VERSION: u32 = 2;

/// Annotation Buildx sets on provenance and SBOM manifests.
pub const REFERENCE_TYPE_ANNOTATION: &str = "vnd.docker.reference.type";

/// Value of [`REFERENCE_TYPE_ANNOTATION`] marking an attestation manifest.
pub const ATTESTATION_MANIFEST: &str = "attestation-manifest";

/// One entry of an index: a manifest descriptor plus the platform it targets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestReference {
    #[serde(flatten)]
    descriptor: Descriptor,
    platform: Platform,
}

impl ManifestReference {
    pub fn new(descriptor: Descriptor, platform: Platform) -> Self {
        Self {
            descriptor,
            platform,
        }
    }

    pub fn descriptor(&self) -> &Descriptor {
        &self.descriptor
    }

    pub fn platform(&self) -> &Platform {
        &self.platform
    }

    pub fn platform_key(&self) -> PlatformKey {
        self.platform.key()
    }

    /// Whether this entry is a Buildx attestation manifest.
    pub fn is_attestation(&self) -> bool {
        self.descriptor.annotation(REFERENCE_TYPE_ANNOTATION) == Some(ATTESTATION_MANIFEST)
    }

    pub fn into_parts(self) -> (Descriptor, Platform) {
        (self.descriptor, self.platform)
    }
}

/// An OCI image index.
///
/// Values produced by [`IndexBuilder`](crate::IndexBuilder) always satisfy
/// the index invariants. Values produced by [`parse`](crate::parse) are
/// candidates and must go through the [`Validator`](crate::Validator).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageIndex {
    pub(crate) schema_version: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) media_type: Option<MediaType>,
    pub(crate) manifests: Vec<ManifestReference>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub(crate) annotations: BTreeMap<String, String>,
}

impl ImageIndex {
    pub(crate) fn new(
        manifests: Vec<ManifestReference>,
        annotations: BTreeMap<String, String>,
    ) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            media_type: Some(MediaType::ImageIndexV1),
            manifests,
            annotations,
        }
    }

    pub fn schema_version(&self) -> u32 {
        self.schema_version
    }

    /// `None` when a parsed document omitted `mediaType`.
    pub fn media_type(&self) -> Option<&MediaType> {
        self.media_type.as_ref()
    }

    pub fn manifests(&self) -> &[ManifestReference] {
        &self.manifests
    }

    pub fn annotations(&self) -> &BTreeMap<String, String> {
        &self.annotations
    }

    /// Find the first non-attestation entry for a platform.
    pub fn find(&self, platform: &Platform) -> Option<&ManifestReference> {
        let key = platform.key();
        self.manifests
            .iter()
            .find(|m| !m.is_attestation() && m.platform_key() == key)
    }

    /// Serialize to the canonical compact document.
    ///
    /// Field order and sorted annotations make the output byte-stable.
    pub fn to_json(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    /// Serialize for humans.
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Descriptor of the canonical serialized document.
    pub fn descriptor(&self) -> Result<Descriptor> {
        let bytes = self.to_json()?;
        Ok(Descriptor::for_content(MediaType::ImageIndexV1, &bytes))
    }
}
