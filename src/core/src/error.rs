//! Error taxonomy shared by the index library and CLI.

use thiserror::Error;

/// A3S Index error types
#[derive(Error, Debug)]
pub enum IndexError {
    /// Two manifest entries claim the same (os, architecture, variant) tuple
    #[error("duplicate platform {os}/{architecture}{}", variant_suffix(.variant))]
    DuplicatePlatform {
        os: String,
        architecture: String,
        variant: Option<String>,
    },

    /// Descriptor digest malformed or media type not accepted
    #[error("invalid descriptor {digest}: {reason}")]
    InvalidDescriptor { digest: String, reason: String },

    /// Index has no manifests
    #[error("image index has no manifests")]
    EmptyIndex,

    /// Empty annotation key
    #[error("invalid annotation key: key must not be empty")]
    InvalidKey,

    /// Bytes do not form an image index document
    #[error("malformed image index document: {0}")]
    MalformedDocument(String),

    /// Index-level field does not carry the expected constant
    #[error("schema mismatch: {field} is {actual}, expected {expected}")]
    SchemaMismatch {
        field: String,
        expected: String,
        actual: String,
    },

    /// Content does not hash to (or is not as long as) its descriptor claims
    #[error(
        "digest mismatch for {digest}: got {actual_digest} over {actual_size} bytes, expected {expected_size} bytes"
    )]
    DigestMismatch {
        digest: String,
        actual_digest: String,
        expected_size: u64,
        actual_size: u64,
    },

    /// Digest names an algorithm this crate cannot compute
    #[error("unsupported digest algorithm: {0}")]
    UnsupportedDigestAlgorithm(String),

    /// Platform string does not parse as os/architecture[/variant]
    #[error("invalid platform '{0}': expected os/architecture[/variant]")]
    InvalidPlatform(String),

    /// I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Taxonomy tag of an [`IndexError`], for callers that match on kind only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    DuplicatePlatform,
    InvalidDescriptor,
    EmptyIndex,
    InvalidKey,
    MalformedDocument,
    SchemaMismatch,
    DigestMismatch,
    UnsupportedDigestAlgorithm,
    InvalidPlatform,
    Io,
    Serialization,
    Config,
}

impl IndexError {
    /// Return the taxonomy tag of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::DuplicatePlatform { .. } => ErrorKind::DuplicatePlatform,
            Self::InvalidDescriptor { .. } => ErrorKind::InvalidDescriptor,
            Self::EmptyIndex => ErrorKind::EmptyIndex,
            Self::InvalidKey => ErrorKind::InvalidKey,
            Self::MalformedDocument(_) => ErrorKind::MalformedDocument,
            Self::SchemaMismatch { .. } => ErrorKind::SchemaMismatch,
            Self::DigestMismatch { .. } => ErrorKind::DigestMismatch,
            Self::UnsupportedDigestAlgorithm(_) => ErrorKind::UnsupportedDigestAlgorithm,
            Self::InvalidPlatform(_) => ErrorKind::InvalidPlatform,
            Self::IoError(_) => ErrorKind::Io,
            Self::SerializationError(_) => ErrorKind::Serialization,
            Self::ConfigError(_) => ErrorKind::Config,
        }
    }
}

fn variant_suffix(variant: &Option<String>) -> String {
    match variant {
        Some(v) => format!(" (variant {v})"),
        None => String::new(),
    }
}

impl From<serde_json::Error> for IndexError {
    fn from(err: serde_json::Error) -> Self {
        IndexError::SerializationError(err.to_string())
    }
}

impl From<serde_yaml::Error> for IndexError {
    fn from(err: serde_yaml::Error) -> Self {
        IndexError::SerializationError(err.to_string())
    }
}

/// Result type alias for A3S Index operations
pub type Result<T> = std::result::Result<T, IndexError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_platform_display_with_variant() {
        let error = IndexError::DuplicatePlatform {
            os: "linux".to_string(),
            architecture: "arm64".to_string(),
            variant: Some("v7".to_string()),
        };
        assert_eq!(error.to_string(), "duplicate platform linux/arm64 (variant v7)");
    }

    #[test]
    fn test_duplicate_platform_display_without_variant() {
        let error = IndexError::DuplicatePlatform {
            os: "linux".to_string(),
            architecture: "amd64".to_string(),
            variant: None,
        };
        assert_eq!(error.to_string(), "duplicate platform linux/amd64");
    }

    #[test]
    fn test_invalid_descriptor_display() {
        let error = IndexError::InvalidDescriptor {
            digest: "sha256:xyz".to_string(),
            reason: "encoded hash is not lowercase hex".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "invalid descriptor sha256:xyz: encoded hash is not lowercase hex"
        );
    }

    #[test]
    fn test_digest_mismatch_display() {
        let error = IndexError::DigestMismatch {
            digest: "sha256:aaa".to_string(),
            actual_digest: "sha256:bbb".to_string(),
            expected_size: 3,
            actual_size: 4,
        };
        assert_eq!(
            error.to_string(),
            "digest mismatch for sha256:aaa: got sha256:bbb over 4 bytes, expected 3 bytes"
        );
    }

    #[test]
    fn test_schema_mismatch_display() {
        let error = IndexError::SchemaMismatch {
            field: "schemaVersion".to_string(),
            expected: "2".to_string(),
            actual: "1".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "schema mismatch: schemaVersion is 1, expected 2"
        );
    }

    #[test]
    fn test_kind_mapping() {
        assert_eq!(IndexError::EmptyIndex.kind(), ErrorKind::EmptyIndex);
        assert_eq!(IndexError::InvalidKey.kind(), ErrorKind::InvalidKey);
        assert_eq!(
            IndexError::UnsupportedDigestAlgorithm("md5".to_string()).kind(),
            ErrorKind::UnsupportedDigestAlgorithm
        );
        assert_eq!(
            IndexError::MalformedDocument("eof".to_string()).kind(),
            ErrorKind::MalformedDocument
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let index_error: IndexError = io_error.into();
        assert!(matches!(index_error, IndexError::IoError(_)));
        assert!(index_error.to_string().contains("file not found"));
    }

    #[test]
    fn test_serde_json_error_conversion() {
        let err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let index_error: IndexError = err.into();
        assert_eq!(index_error.kind(), ErrorKind::Serialization);
    }
}
