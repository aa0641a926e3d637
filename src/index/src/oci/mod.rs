//! OCI image index model.
//!
//! Value types for the documents a multi-architecture build produces:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  ImageIndex  (application/vnd.oci.image.index.v1+json)      │
//! │                                                              │
//! │  manifests:                                                  │
//! │  ├── ManifestReference = Descriptor + Platform (linux/amd64) │
//! │  ├── ManifestReference = Descriptor + Platform (linux/arm64) │
//! │  └── ...                                                     │
//! │  annotations: { key: value }                                 │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod descriptor;
pub mod digest;
pub mod index;
pub mod media_type;
pub mod platform;

pub use descriptor::Descriptor;
pub use digest::{Digest, DigestAlgorithm};
pub use index::{ImageIndex, ManifestReference, SCHEMA_VERSION};
pub use media_type::MediaType;
pub use platform::{Platform, PlatformKey};
