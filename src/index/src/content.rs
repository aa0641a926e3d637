//! Content sources for digest verification.
//!
//! The validator never fetches content itself; callers hand it a
//! [`ContentSource`] backed by whatever already holds the blobs: a registry
//! client, an in-memory cache, or an OCI image layout on disk.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use a3s_index_core::error::{IndexError, Result};

use crate::oci::Digest;

/// Supplies raw bytes for a digest.
pub trait ContentSource: Send + Sync {
    /// Fetch the blob for `digest`, or `None` if this source does not hold it.
    fn fetch(&self, digest: &Digest) -> Result<Option<Vec<u8>>>;
}

/// In-memory blob map.
#[derive(Debug, Default, Clone)]
pub struct MemoryContent {
    blobs: HashMap<Digest, Vec<u8>>,
}

impl MemoryContent {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `content` under its SHA-256 digest and return the digest.
    pub fn insert(&mut self, content: impl Into<Vec<u8>>) -> Digest {
        let content = content.into();
        let digest = Digest::sha256(&content);
        self.blobs.insert(digest.clone(), content);
        digest
    }

    /// Store `content` under an arbitrary digest, matching or not.
    pub fn insert_as(&mut self, digest: Digest, content: impl Into<Vec<u8>>) {
        self.blobs.insert(digest, content.into());
    }

    pub fn len(&self) -> usize {
        self.blobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blobs.is_empty()
    }
}

impl ContentSource for MemoryContent {
    fn fetch(&self, digest: &Digest) -> Result<Option<Vec<u8>>> {
        Ok(self.blobs.get(digest).cloned())
    }
}

/// Blobs of an OCI image layout directory.
///
/// ```text
/// layout/
/// ├── oci-layout
/// ├── index.json
/// └── blobs/
///     └── sha256/
///         └── <encoded>
/// ```
#[derive(Debug, Clone)]
pub struct LayoutContent {
    root_dir: PathBuf,
}

impl LayoutContent {
    /// Open an OCI image layout.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if `oci-layout` or `blobs/` is missing.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let root_dir = path.as_ref().to_path_buf();

        if !root_dir.join("oci-layout").exists() {
            return Err(IndexError::ConfigError(format!(
                "Not a valid OCI layout: missing oci-layout file in {}",
                root_dir.display()
            )));
        }
        if !root_dir.join("blobs").is_dir() {
            return Err(IndexError::ConfigError(format!(
                "Not a valid OCI layout: missing blobs directory in {}",
                root_dir.display()
            )));
        }

        Ok(Self { root_dir })
    }

    pub fn root_dir(&self) -> &Path {
        &self.root_dir
    }

    /// Path of the blob for `digest`.
    pub fn blob_path(&self, digest: &Digest) -> PathBuf {
        self.root_dir
            .join("blobs")
            .join(digest.algorithm().as_str())
            .join(digest.encoded())
    }

    /// Raw bytes of the layout's top-level `index.json`.
    pub fn index_bytes(&self) -> Result<Vec<u8>> {
        let index_path = self.root_dir.join("index.json");
        std::fs::read(&index_path).map_err(|e| {
            IndexError::ConfigError(format!(
                "Failed to read index.json at {}: {}",
                index_path.display(),
                e
            ))
        })
    }
}

impl ContentSource for LayoutContent {
    fn fetch(&self, digest: &Digest) -> Result<Option<Vec<u8>>> {
        let path = self.blob_path(digest);
        match std::fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(IndexError::IoError(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_oci_layout(dir: &Path) {
        std::fs::create_dir_all(dir.join("blobs/sha256")).unwrap();
        std::fs::write(dir.join("oci-layout"), r#"{"imageLayoutVersion":"1.0.0"}"#).unwrap();
        std::fs::write(dir.join("index.json"), r#"{"schemaVersion":2,"manifests":[]}"#).unwrap();
    }

    #[test]
    fn test_memory_insert_and_fetch() {
        let mut content = MemoryContent::new();
        let digest = content.insert(b"manifest".to_vec());
        assert_eq!(content.len(), 1);
        assert_eq!(content.fetch(&digest).unwrap().unwrap(), b"manifest");

        let other = Digest::sha256(b"other");
        assert!(content.fetch(&other).unwrap().is_none());
    }

    #[test]
    fn test_memory_insert_as() {
        let mut content = MemoryContent::new();
        let digest = Digest::sha256(b"claimed");
        content.insert_as(digest.clone(), b"tampered".to_vec());
        assert_eq!(content.fetch(&digest).unwrap().unwrap(), b"tampered");
    }

    #[test]
    fn test_layout_open_valid() {
        let tmp = TempDir::new().unwrap();
        create_test_oci_layout(tmp.path());
        let layout = LayoutContent::open(tmp.path()).unwrap();
        assert_eq!(layout.root_dir(), tmp.path());
        assert!(layout.index_bytes().unwrap().starts_with(b"{"));
    }

    #[test]
    fn test_layout_open_missing_marker() {
        let tmp = TempDir::new().unwrap();
        std::fs::create_dir_all(tmp.path().join("blobs")).unwrap();
        let err = LayoutContent::open(tmp.path()).unwrap_err();
        assert!(err.to_string().contains("missing oci-layout"));
    }

    #[test]
    fn test_layout_open_missing_blobs() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join("oci-layout"), "{}").unwrap();
        let err = LayoutContent::open(tmp.path()).unwrap_err();
        assert!(err.to_string().contains("missing blobs"));
    }

    #[test]
    fn test_layout_fetch() {
        let tmp = TempDir::new().unwrap();
        create_test_oci_layout(tmp.path());
        let digest = Digest::sha256(b"blob");
        std::fs::write(
            tmp.path().join("blobs/sha256").join(digest.encoded()),
            b"blob",
        )
        .unwrap();

        let layout = LayoutContent::open(tmp.path()).unwrap();
        assert_eq!(layout.fetch(&digest).unwrap().unwrap(), b"blob");
        assert!(layout.fetch(&Digest::sha256(b"absent")).unwrap().is_none());
    }
}
