//! Content digests.
//!
//! A digest is `<algorithm>:<encoded>`, e.g.
//! `sha256:6c3c624b58dbbcd3c0dd82b4c53f04194d1247c6eebdaab7c610cf7d66709b3b`.

use std::fmt;
use std::str::FromStr;

use a3s_index_core::error::{IndexError, Result};
use sha2::{Digest as _, Sha256, Sha512};

/// Hash algorithm named by a digest.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DigestAlgorithm {
    Sha256,
    Sha512,
    /// Syntactically valid but not registered here
    Other(String),
}

impl DigestAlgorithm {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Sha256 => "sha256",
            Self::Sha512 => "sha512",
            Self::Other(name) => name,
        }
    }

    /// Length of the hex-encoded hash, for registered algorithms.
    pub fn encoded_len(&self) -> Option<usize> {
        match self {
            Self::Sha256 => Some(64),
            Self::Sha512 => Some(128),
            Self::Other(_) => None,
        }
    }

    /// Whether content can be hashed with this algorithm.
    pub fn is_supported(&self) -> bool {
        !matches!(self, Self::Other(_))
    }

    /// Hash `data`, returning the lowercase hex encoding.
    fn hash_hex(&self, data: &[u8]) -> Result<String> {
        match self {
            Self::Sha256 => Ok(hex::encode(Sha256::digest(data))),
            Self::Sha512 => Ok(hex::encode(Sha512::digest(data))),
            Self::Other(name) => Err(IndexError::UnsupportedDigestAlgorithm(name.clone())),
        }
    }
}

impl From<&str> for DigestAlgorithm {
    fn from(name: &str) -> Self {
        match name {
            "sha256" => Self::Sha256,
            "sha512" => Self::Sha512,
            other => Self::Other(other.to_string()),
        }
    }
}

impl fmt::Display for DigestAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A well-formed content digest.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Digest {
    algorithm: DigestAlgorithm,
    encoded: String,
}

impl Digest {
    /// Parse and check a digest string.
    ///
    /// The algorithm must follow `[a-z0-9]+([+._-][a-z0-9]+)*` and the
    /// encoded part must be lowercase hex of the algorithm's length, when
    /// the algorithm is registered. Unknown algorithms parse successfully.
    pub fn parse(s: &str) -> Result<Self> {
        let invalid = |reason: &str| IndexError::InvalidDescriptor {
            digest: s.to_string(),
            reason: reason.to_string(),
        };

        let (algorithm, encoded) = s
            .split_once(':')
            .ok_or_else(|| invalid("expected <algorithm>:<encoded>"))?;

        if !is_valid_algorithm(algorithm) {
            return Err(invalid("malformed algorithm component"));
        }
        if encoded.is_empty() {
            return Err(invalid("empty encoded hash"));
        }
        if !encoded
            .bytes()
            .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
        {
            return Err(invalid("encoded hash is not lowercase hex"));
        }

        let algorithm = DigestAlgorithm::from(algorithm);
        if let Some(expected) = algorithm.encoded_len() {
            if encoded.len() != expected {
                return Err(invalid(&format!(
                    "{} hash must be {} hex characters, got {}",
                    algorithm,
                    expected,
                    encoded.len()
                )));
            }
        }

        Ok(Self {
            algorithm,
            encoded: encoded.to_string(),
        })
    }

    /// Compute the digest of `data` with the given algorithm.
    pub fn compute(algorithm: &DigestAlgorithm, data: &[u8]) -> Result<Self> {
        let encoded = algorithm.hash_hex(data)?;
        Ok(Self {
            algorithm: algorithm.clone(),
            encoded,
        })
    }

    /// Compute the SHA-256 digest of `data`.
    pub fn sha256(data: &[u8]) -> Self {
        Self {
            algorithm: DigestAlgorithm::Sha256,
            encoded: hex::encode(Sha256::digest(data)),
        }
    }

    pub fn algorithm(&self) -> &DigestAlgorithm {
        &self.algorithm
    }

    pub fn encoded(&self) -> &str {
        &self.encoded
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.algorithm, self.encoded)
    }
}

impl FromStr for Digest {
    type Err = IndexError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

fn is_valid_algorithm(algorithm: &str) -> bool {
    !algorithm.is_empty()
        && algorithm
            .split(|c| matches!(c, '+' | '.' | '_' | '-'))
            .all(|part| {
                !part.is_empty()
                    && part
                        .bytes()
                        .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit())
            })
}
