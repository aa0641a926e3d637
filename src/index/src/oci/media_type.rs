//! Media types recognized on index entries.

use std::fmt;

use serde::{Deserialize, Serialize};

/// OCI image manifest.
pub const IMAGE_MANIFEST_V1: &str = "application/vnd.oci.image.manifest.v1+json";
/// OCI image index.
pub const IMAGE_INDEX_V1: &str = "application/vnd.oci.image.index.v1+json";
/// Docker image manifest, schema 2.
pub const DOCKER_MANIFEST_V2: &str = "application/vnd.docker.distribution.manifest.v2+json";
/// Docker manifest list, schema 2.
pub const DOCKER_MANIFEST_LIST_V2: &str =
    "application/vnd.docker.distribution.manifest.list.v2+json";

/// Media type of a descriptor.
///
/// Unknown strings are kept verbatim in [`MediaType::Unrecognized`] so that
/// parsing never fails on them; validation rejects them instead.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum MediaType {
    ImageManifestV1,
    ImageIndexV1,
    DockerManifestV2,
    DockerManifestListV2,
    Unrecognized(String),
}

impl MediaType {
    pub fn as_str(&self) -> &str {
        match self {
            Self::ImageManifestV1 => IMAGE_MANIFEST_V1,
            Self::ImageIndexV1 => IMAGE_INDEX_V1,
            Self::DockerManifestV2 => DOCKER_MANIFEST_V2,
            Self::DockerManifestListV2 => DOCKER_MANIFEST_LIST_V2,
            Self::Unrecognized(raw) => raw,
        }
    }

    pub fn is_docker(&self) -> bool {
        matches!(self, Self::DockerManifestV2 | Self::DockerManifestListV2)
    }

    /// Whether a descriptor with this media type may appear in `manifests`.
    ///
    /// Nested indexes are allowed. Docker schema2 types only when
    /// `accept_docker` is set.
    pub fn is_index_entry(&self, accept_docker: bool) -> bool {
        match self {
            Self::ImageManifestV1 | Self::ImageIndexV1 => true,
            Self::DockerManifestV2 | Self::DockerManifestListV2 => accept_docker,
            Self::Unrecognized(_) => false,
        }
    }
}

impl From<&str> for MediaType {
    fn from(raw: &str) -> Self {
        match raw {
            IMAGE_MANIFEST_V1 => Self::ImageManifestV1,
            IMAGE_INDEX_V1 => Self::ImageIndexV1,
            DOCKER_MANIFEST_V2 => Self::DockerManifestV2,
            DOCKER_MANIFEST_LIST_V2 => Self::DockerManifestListV2,
            other => Self::Unrecognized(other.to_string()),
        }
    }
}

impl From<String> for MediaType {
    fn from(raw: String) -> Self {
        match Self::from(raw.as_str()) {
            Self::Unrecognized(_) => Self::Unrecognized(raw),
            known => known,
        }
    }
}

impl From<MediaType> for String {
    fn from(media_type: MediaType) -> Self {
        match media_type {
            MediaType::Unrecognized(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_types_map_to_variants() {
        assert_eq!(MediaType::from(IMAGE_MANIFEST_V1), MediaType::ImageManifestV1);
        assert_eq!(MediaType::from(IMAGE_INDEX_V1), MediaType::ImageIndexV1);
        assert_eq!(
            MediaType::from(DOCKER_MANIFEST_LIST_V2),
            MediaType::DockerManifestListV2
        );
    }

    #[test]
    fn test_unrecognized_keeps_raw_string() {
        let media_type = MediaType::from("application/vnd.oci.image.layer.v1.tar+gzip");
        assert_eq!(
            media_type,
            MediaType::Unrecognized("application/vnd.oci.image.layer.v1.tar+gzip".to_string())
        );
        assert_eq!(
            media_type.to_string(),
            "application/vnd.oci.image.layer.v1.tar+gzip"
        );
    }

    #[test]
    fn test_serde_uses_raw_string() {
        let json = serde_json::to_string(&MediaType::ImageIndexV1).unwrap();
        assert_eq!(json, format!("\"{}\"", IMAGE_INDEX_V1));

        let parsed: MediaType = serde_json::from_str("\"text/plain\"").unwrap();
        assert_eq!(parsed, MediaType::Unrecognized("text/plain".to_string()));
    }

    #[test]
    fn test_index_entry_acceptance() {
        assert!(MediaType::ImageManifestV1.is_index_entry(false));
        assert!(MediaType::ImageIndexV1.is_index_entry(false));
        assert!(MediaType::DockerManifestV2.is_index_entry(true));
        assert!(!MediaType::DockerManifestV2.is_index_entry(false));
        assert!(!MediaType::Unrecognized("x".to_string()).is_index_entry(true));
    }
}
