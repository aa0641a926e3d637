//! Digest verification of fetched content.

use a3s_index_core::error::{IndexError, Result};

use crate::oci::{Descriptor, Digest};

/// Check that `content` is exactly what `descriptor` claims.
///
/// # Errors
///
/// - `InvalidDescriptor` if the descriptor's digest is malformed
/// - `UnsupportedDigestAlgorithm` if the digest names an algorithm other
///   than sha256 or sha512
/// - `DigestMismatch` if the length or the recomputed hash differs
pub fn verify(descriptor: &Descriptor, content: &[u8]) -> Result<()> {
    let claimed = descriptor.parsed_digest()?;
    let actual = Digest::compute(claimed.algorithm(), content)?;
    let actual_size = content.len() as u64;

    if actual != claimed || actual_size != descriptor.size {
        return Err(IndexError::DigestMismatch {
            digest: descriptor.digest.clone(),
            actual_digest: actual.to_string(),
            expected_size: descriptor.size,
            actual_size,
        });
    }

    Ok(())
}
