//! A3S Index - multi-architecture OCI image indexes.
//!
//! Assembles per-architecture manifests into an OCI image index, validates
//! existing index documents, and verifies content digests.

pub mod builder;
pub mod content;
pub mod oci;
pub mod validator;
pub mod verifier;

// Re-export common types
pub use a3s_index_core::{ErrorKind, IndexConfig, IndexError, Result, ValidationConfig};
pub use builder::IndexBuilder;
pub use content::{ContentSource, LayoutContent, MemoryContent};
pub use oci::{Descriptor, Digest, DigestAlgorithm, ImageIndex, ManifestReference, MediaType};
pub use oci::{Platform, PlatformKey};
pub use validator::{parse, ParsedIndex, ValidationReport, Validator, Violation};
pub use verifier::verify;

/// A3S Index version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
