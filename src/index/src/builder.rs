//! Incremental image index assembly.
//!
//! Build pipelines produce one manifest per target platform, usually from
//! parallel tasks. Each task hands its manifest to a shared [`IndexBuilder`],
//! which checks it against everything accumulated so far and rejects it
//! immediately on conflict. Once all producers have finished, [`build`]
//! snapshots the accumulated state into an [`ImageIndex`].
//!
//! [`build`]: IndexBuilder::build

use std::collections::{BTreeMap, HashSet};

use a3s_index_core::config::ValidationConfig;
use a3s_index_core::error::{IndexError, Result};
use parking_lot::Mutex;

use crate::oci::{Descriptor, ImageIndex, ManifestReference, Platform, PlatformKey};

/// Accumulates manifest references into an image index.
///
/// All methods take `&self`; share it across producers with `Arc`.
pub struct IndexBuilder {
    config: ValidationConfig,
    state: Mutex<BuilderState>,
}

#[derive(Default)]
struct BuilderState {
    manifests: Vec<ManifestReference>,
    platforms: HashSet<PlatformKey>,
    annotations: BTreeMap<String, String>,
}

impl IndexBuilder {
    /// Create an empty builder with default validation rules.
    pub fn new() -> Self {
        Self::with_config(ValidationConfig::default())
    }

    pub fn with_config(config: ValidationConfig) -> Self {
        Self {
            config,
            state: Mutex::new(BuilderState::default()),
        }
    }

    /// Append a manifest for `platform`.
    ///
    /// # Errors
    ///
    /// - `DuplicatePlatform` if the platform tuple is already present
    /// - `InvalidDescriptor` if the media type is not accepted or the digest
    ///   is malformed
    ///
    /// A repeated platform is reported as `DuplicatePlatform` even when the
    /// descriptor is also invalid. On error the builder is unchanged.
    pub fn add_manifest(&self, descriptor: Descriptor, platform: Platform) -> Result<()> {
        let reference = ManifestReference::new(descriptor, platform);
        let key = reference.platform_key();
        let exempt = self.config.exempt_attestations && reference.is_attestation();

        let mut state = self.state.lock();
        if !exempt && state.platforms.contains(&key) {
            drop(state);
            tracing::warn!(platform = %key, "Rejected duplicate platform");
            return Err(key.duplicate_error());
        }

        if let Some(defect) = reference.descriptor().defects(&self.config).into_iter().next() {
            drop(state);
            tracing::warn!(
                platform = %key,
                digest = %reference.descriptor().digest,
                error = %defect,
                "Rejected manifest"
            );
            return Err(defect);
        }

        if !exempt {
            state.platforms.insert(key.clone());
        }
        state.manifests.push(reference);
        let count = state.manifests.len();
        drop(state);

        tracing::debug!(platform = %key, count, "Added manifest to index");
        Ok(())
    }

    /// Insert or replace an index annotation.
    pub fn set_annotation(&self, key: impl Into<String>, value: impl Into<String>) -> Result<()> {
        let key = key.into();
        if key.is_empty() {
            return Err(IndexError::InvalidKey);
        }
        self.state.lock().annotations.insert(key, value.into());
        Ok(())
    }

    /// Snapshot the accumulated manifests into an image index.
    ///
    /// The builder is left intact, so later calls see the same entries plus
    /// anything added since.
    pub fn build(&self) -> Result<ImageIndex> {
        let state = self.state.lock();
        if state.manifests.is_empty() {
            return Err(IndexError::EmptyIndex);
        }
        let index = ImageIndex::new(state.manifests.clone(), state.annotations.clone());
        drop(state);

        tracing::info!(manifests = index.manifests().len(), "Built image index");
        Ok(index)
    }

    /// Number of manifests accumulated so far.
    pub fn len(&self) -> usize {
        self.state.lock().manifests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for IndexBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oci::index::{ATTESTATION_MANIFEST, REFERENCE_TYPE_ANNOTATION};
    use crate::oci::media_type::IMAGE_INDEX_V1;
    use crate::oci::MediaType;
    use a3s_index_core::error::ErrorKind;
    use std::sync::Arc;

    fn manifest(content: &str) -> Descriptor {
        Descriptor::for_content(MediaType::ImageManifestV1, content.as_bytes())
    }

    #[test]
    fn test_build_empty_fails() {
        let builder = IndexBuilder::new();
        assert!(matches!(builder.build(), Err(IndexError::EmptyIndex)));
    }

    #[test]
    fn test_build_after_one_manifest() {
        let builder = IndexBuilder::new();
        builder
            .add_manifest(manifest("amd64"), Platform::new("linux", "amd64"))
            .unwrap();
        let index = builder.build().unwrap();
        assert_eq!(index.manifests().len(), 1);
        assert_eq!(index.schema_version(), 2);
        assert_eq!(index.media_type().unwrap().as_str(), IMAGE_INDEX_V1);
    }

    #[test]
    fn test_duplicate_platform_rejected() {
        let builder = IndexBuilder::new();
        builder
            .add_manifest(manifest("first"), Platform::new("linux", "amd64"))
            .unwrap();

        let err = builder
            .add_manifest(manifest("second"), Platform::new("linux", "amd64"))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DuplicatePlatform);
        assert_eq!(builder.len(), 1);
    }

    #[test]
    fn test_variants_are_distinct_platforms() {
        let builder = IndexBuilder::new();
        builder
            .add_manifest(manifest("v6"), Platform::new("linux", "arm").with_variant("v6"))
            .unwrap();
        builder
            .add_manifest(manifest("v7"), Platform::new("linux", "arm").with_variant("v7"))
            .unwrap();
        let err = builder
            .add_manifest(manifest("v7b"), Platform::new("linux", "arm").with_variant("v7"))
            .unwrap_err();
        assert_eq!(err.to_string(), "duplicate platform linux/arm (variant v7)");
        assert_eq!(builder.len(), 2);
    }

    #[test]
    fn test_invalid_descriptor_rejected() {
        let builder = IndexBuilder::new();

        let bad_digest = Descriptor::new(MediaType::ImageManifestV1, "sha256:aaa", 1234);
        let err = builder
            .add_manifest(bad_digest, Platform::new("linux", "amd64"))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidDescriptor);

        let bad_type = Descriptor::for_content("application/vnd.oci.image.layer.v1.tar", b"x");
        let err = builder
            .add_manifest(bad_type, Platform::new("linux", "amd64"))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidDescriptor);

        // The platform was never claimed
        assert!(builder.is_empty());
        builder
            .add_manifest(manifest("ok"), Platform::new("linux", "amd64"))
            .unwrap();
    }

    #[test]
    fn test_attestations_share_platform_when_exempt() {
        let builder = IndexBuilder::with_config(ValidationConfig {
            exempt_attestations: true,
            ..ValidationConfig::default()
        });
        for content in ["sbom-amd64", "sbom-arm64"] {
            let descriptor = manifest(content)
                .with_annotation(REFERENCE_TYPE_ANNOTATION, ATTESTATION_MANIFEST);
            builder
                .add_manifest(descriptor, Platform::new("unknown", "unknown"))
                .unwrap();
        }
        assert_eq!(builder.len(), 2);
    }

    #[test]
    fn test_attestations_unique_by_default() {
        let builder = IndexBuilder::new();
        let attestation = |c: &str| {
            manifest(c).with_annotation(REFERENCE_TYPE_ANNOTATION, ATTESTATION_MANIFEST)
        };
        builder
            .add_manifest(attestation("a"), Platform::new("unknown", "unknown"))
            .unwrap();
        let err = builder
            .add_manifest(attestation("b"), Platform::new("unknown", "unknown"))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DuplicatePlatform);
    }

    #[test]
    fn test_duplicate_reported_before_invalid_descriptor() {
        let builder = IndexBuilder::new();
        builder
            .add_manifest(manifest("amd64"), Platform::new("linux", "amd64"))
            .unwrap();

        let bad = Descriptor::new("text/plain", "sha256:aaa", 1);
        let err = builder
            .add_manifest(bad, Platform::new("linux", "amd64"))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DuplicatePlatform);
        assert_eq!(builder.len(), 1);
    }

    #[test]
    fn test_docker_media_type_opt_in() {
        let docker = Descriptor::for_content(MediaType::DockerManifestV2, b"docker");

        let strict = IndexBuilder::new();
        let err = strict
            .add_manifest(docker.clone(), Platform::new("linux", "amd64"))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidDescriptor);

        let buildx = IndexBuilder::with_config(ValidationConfig::buildx());
        buildx
            .add_manifest(docker, Platform::new("linux", "amd64"))
            .unwrap();
    }

    #[test]
    fn test_set_annotation() {
        let builder = IndexBuilder::new();
        assert!(matches!(
            builder.set_annotation("", "x"),
            Err(IndexError::InvalidKey)
        ));
        builder.set_annotation("org.opencontainers.image.version", "1.0").unwrap();
        builder.set_annotation("org.opencontainers.image.version", "1.1").unwrap();
        builder
            .add_manifest(manifest("amd64"), Platform::new("linux", "amd64"))
            .unwrap();

        let index = builder.build().unwrap();
        assert_eq!(index.annotations().len(), 1);
        assert_eq!(index.annotations()["org.opencontainers.image.version"], "1.1");
    }

    #[test]
    fn test_insertion_order_preserved() {
        let builder = IndexBuilder::new();
        for arch in ["s390x", "amd64", "arm64", "ppc64le"] {
            builder
                .add_manifest(manifest(arch), Platform::new("linux", arch))
                .unwrap();
        }
        let index = builder.build().unwrap();
        let archs: Vec<&str> = index
            .manifests()
            .iter()
            .map(|m| m.platform().architecture.as_str())
            .collect();
        assert_eq!(archs, ["s390x", "amd64", "arm64", "ppc64le"]);
    }

    #[test]
    fn test_build_is_snapshot() {
        let builder = IndexBuilder::new();
        builder
            .add_manifest(manifest("amd64"), Platform::new("linux", "amd64"))
            .unwrap();
        let first = builder.build().unwrap();
        builder
            .add_manifest(manifest("arm64"), Platform::new("linux", "arm64"))
            .unwrap();
        assert_eq!(first.manifests().len(), 1);
        assert_eq!(builder.build().unwrap().manifests().len(), 2);
    }

    #[test]
    fn test_concurrent_producers_same_platform() {
        let builder = Arc::new(IndexBuilder::new());

        let results: Vec<Result<()>> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..16)
                .map(|i| {
                    let builder = Arc::clone(&builder);
                    scope.spawn(move || {
                        builder.add_manifest(
                            manifest(&format!("build-{i}")),
                            Platform::new("linux", "arm64"),
                        )
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
        assert_eq!(builder.len(), 1);
    }
}
