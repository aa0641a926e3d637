//! Content descriptors.

use std::collections::BTreeMap;

use a3s_index_core::config::ValidationConfig;
use a3s_index_core::error::{IndexError, Result};
use serde::{Deserialize, Serialize};

use super::digest::Digest;
use super::media_type::MediaType;

/// Pointer to a content blob: media type, digest and size.
///
/// `digest` is kept as the raw string so that a parsed document with a
/// malformed digest can still be inspected and reported on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Descriptor {
    /// Media type of the referenced content
    pub media_type: MediaType,
    /// Digest of the referenced content (e.g., "sha256:abc123...")
    pub digest: String,
    /// Size of the referenced content in bytes
    pub size: u64,
    /// Alternate download locations
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub urls: Option<Vec<String>>,
    /// Arbitrary metadata
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotations: Option<BTreeMap<String, String>>,
}

impl Descriptor {
    pub fn new(media_type: impl Into<MediaType>, digest: impl Into<String>, size: u64) -> Self {
        Self {
            media_type: media_type.into(),
            digest: digest.into(),
            size,
            urls: None,
            annotations: None,
        }
    }

    /// Describe `content` by its SHA-256 digest and length.
    pub fn for_content(media_type: impl Into<MediaType>, content: &[u8]) -> Self {
        Self::new(
            media_type,
            Digest::sha256(content).to_string(),
            content.len() as u64,
        )
    }

    pub fn with_annotation(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.annotations
            .get_or_insert_with(BTreeMap::new)
            .insert(key.into(), value.into());
        self
    }

    /// Look up an annotation value.
    pub fn annotation(&self, key: &str) -> Option<&str> {
        self.annotations
            .as_ref()
            .and_then(|a| a.get(key))
            .map(|v| v.as_str())
    }

    /// Parse the digest string.
    pub fn parsed_digest(&self) -> Result<Digest> {
        Digest::parse(&self.digest)
    }

    /// Every defect that makes this descriptor unusable as an index entry.
    ///
    /// Returns an empty list for a well-formed descriptor.
    pub fn defects(&self, config: &ValidationConfig) -> Vec<IndexError> {
        let mut defects = Vec::new();

        if !self.media_type.is_index_entry(config.accept_docker_media_types) {
            let reason = if self.media_type.is_docker() {
                format!("Docker media type {} is not accepted", self.media_type)
            } else {
                format!("unrecognized media type '{}'", self.media_type)
            };
            defects.push(IndexError::InvalidDescriptor {
                digest: self.digest.clone(),
                reason,
            });
        }

        if let Err(e) = self.parsed_digest() {
            defects.push(e);
        }

        defects
    }
}
