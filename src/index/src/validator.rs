//! Parsing and validation of existing image index documents.
//!
//! [`parse`] only fails when the bytes are not an index document at all.
//! Everything semantic is left to the [`Validator`], which runs every check
//! and reports all violations in one pass:
//!
//! 1. schema: `schemaVersion` and `mediaType` constants
//! 2. non-empty `manifests`
//! 3. unique platform tuples
//! 4. well-formed entry descriptors
//! 5. digest verification, when a [`ContentSource`] is supplied

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::ops::Range;

use a3s_index_core::config::ValidationConfig;
use a3s_index_core::error::{ErrorKind, IndexError, Result};
use serde::Deserialize;
use serde_json::value::RawValue;

use crate::content::ContentSource;
use crate::oci::{Descriptor, Digest, ImageIndex, ManifestReference, MediaType, PlatformKey};
use crate::oci::SCHEMA_VERSION;
use crate::verifier::verify;

/// Wire shape used to locate each manifest entry in the input.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawIndex<'a> {
    schema_version: u32,
    #[serde(default)]
    media_type: Option<MediaType>,
    #[serde(borrow)]
    manifests: Vec<&'a RawValue>,
    #[serde(default)]
    annotations: Option<BTreeMap<String, String>>,
}

/// A candidate index together with the document it was parsed from.
#[derive(Debug, Clone)]
pub struct ParsedIndex {
    index: ImageIndex,
    entry_spans: Vec<Range<usize>>,
    document: Vec<u8>,
}

impl ParsedIndex {
    pub fn index(&self) -> &ImageIndex {
        &self.index
    }

    pub fn into_index(self) -> ImageIndex {
        self.index
    }

    /// Byte range of each `manifests` entry within the document.
    pub fn entry_spans(&self) -> &[Range<usize>] {
        &self.entry_spans
    }

    /// Raw bytes of `manifests[position]` as they appeared in the document.
    pub fn entry_bytes(&self, position: usize) -> Option<&[u8]> {
        self.entry_spans
            .get(position)
            .map(|span| &self.document[span.clone()])
    }

    pub fn document(&self) -> &[u8] {
        &self.document
    }

    /// SHA-256 digest of the document exactly as received.
    pub fn digest(&self) -> Digest {
        Digest::sha256(&self.document)
    }

    /// Descriptor of the document exactly as received.
    pub fn descriptor(&self) -> Descriptor {
        let media_type = self
            .index
            .media_type()
            .cloned()
            .unwrap_or(MediaType::ImageIndexV1);
        Descriptor::for_content(media_type, &self.document)
    }
}

/// Parse an image index document.
///
/// # Errors
///
/// Returns `MalformedDocument` if the bytes are not JSON, lack a required
/// field, or have a field of the wrong type. Semantic problems (bad digests,
/// duplicates, wrong constants) do not fail parsing.
pub fn parse(bytes: &[u8]) -> Result<ParsedIndex> {
    let raw: RawIndex<'_> = serde_json::from_slice(bytes)
        .map_err(|e| IndexError::MalformedDocument(e.to_string()))?;

    let base = bytes.as_ptr() as usize;
    let mut manifests = Vec::with_capacity(raw.manifests.len());
    let mut entry_spans = Vec::with_capacity(raw.manifests.len());

    for (position, value) in raw.manifests.iter().enumerate() {
        let text = value.get();
        let start = text.as_ptr() as usize - base;
        entry_spans.push(start..start + text.len());

        let reference: ManifestReference = serde_json::from_str(text).map_err(|e| {
            IndexError::MalformedDocument(format!("manifests[{}]: {}", position, e))
        })?;
        manifests.push(reference);
    }

    let index = ImageIndex {
        schema_version: raw.schema_version,
        media_type: raw.media_type,
        manifests,
        annotations: raw.annotations.unwrap_or_default(),
    };

    tracing::debug!(
        manifests = index.manifests().len(),
        bytes = bytes.len(),
        "Parsed image index"
    );

    Ok(ParsedIndex {
        index,
        entry_spans,
        document: bytes.to_vec(),
    })
}

/// One problem found by the validator.
#[derive(Debug)]
pub struct Violation {
    entries: Vec<usize>,
    error: IndexError,
}

impl Violation {
    fn document(error: IndexError) -> Self {
        Self {
            entries: Vec::new(),
            error,
        }
    }

    fn entry(position: usize, error: IndexError) -> Self {
        Self {
            entries: vec![position],
            error,
        }
    }

    /// Positions in `manifests` this violation concerns; empty for
    /// document-level violations.
    pub fn entries(&self) -> &[usize] {
        &self.entries
    }

    pub fn error(&self) -> &IndexError {
        &self.error
    }

    pub fn kind(&self) -> ErrorKind {
        self.error.kind()
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.entries.is_empty() {
            let positions: Vec<String> = self.entries.iter().map(|p| p.to_string()).collect();
            write!(f, "manifests[{}]: ", positions.join(","))?;
        }
        write!(f, "{}", self.error)
    }
}

/// Ordered violations from one validation pass.
#[derive(Debug, Default)]
pub struct ValidationReport {
    violations: Vec<Violation>,
}

impl ValidationReport {
    /// True when no violations were found.
    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn len(&self) -> usize {
        self.violations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Violation> {
        self.violations.iter()
    }

    pub fn into_violations(self) -> Vec<Violation> {
        self.violations
    }

    /// Kinds of all violations, in report order.
    pub fn kinds(&self) -> Vec<ErrorKind> {
        self.violations.iter().map(Violation::kind).collect()
    }

    fn push(&mut self, violation: Violation) {
        self.violations.push(violation);
    }
}

/// Checks candidate indexes against the index invariants.
#[derive(Debug, Clone, Default)]
pub struct Validator {
    config: ValidationConfig,
}

impl Validator {
    pub fn new(config: ValidationConfig) -> Self {
        Self { config }
    }

    /// Run the structural and semantic checks.
    pub fn validate(&self, index: &ImageIndex) -> ValidationReport {
        self.run(index, None)
    }

    /// Run all checks, including digest verification against `source`.
    ///
    /// Entries whose content `source` does not hold are skipped.
    pub fn validate_with_content(
        &self,
        index: &ImageIndex,
        source: &dyn ContentSource,
    ) -> ValidationReport {
        self.run(index, Some(source))
    }

    /// Parse then validate.
    pub fn validate_bytes(
        &self,
        bytes: &[u8],
        source: Option<&dyn ContentSource>,
    ) -> Result<ValidationReport> {
        let parsed = parse(bytes)?;
        Ok(self.run(parsed.index(), source))
    }

    fn run(&self, index: &ImageIndex, source: Option<&dyn ContentSource>) -> ValidationReport {
        let mut report = ValidationReport::default();

        self.check_schema(index, &mut report);
        self.check_non_empty(index, &mut report);
        self.check_unique_platforms(index, &mut report);
        self.check_descriptors(index, &mut report);
        if let Some(source) = source {
            if self.config.verify_digests {
                self.check_digests(index, source, &mut report);
            }
        }

        tracing::info!(
            manifests = index.manifests().len(),
            violations = report.len(),
            "Validated image index"
        );
        report
    }

    fn check_schema(&self, index: &ImageIndex, report: &mut ValidationReport) {
        if index.schema_version() != SCHEMA_VERSION {
            report.push(Violation::document(IndexError::SchemaMismatch {
                field: "schemaVersion".to_string(),
                expected: SCHEMA_VERSION.to_string(),
                actual: index.schema_version().to_string(),
            }));
        }

        let accepted = match index.media_type() {
            Some(MediaType::ImageIndexV1) => true,
            Some(MediaType::DockerManifestListV2) => self.config.accept_docker_media_types,
            Some(_) => false,
            None => self.config.allow_missing_media_type,
        };
        if !accepted {
            report.push(Violation::document(IndexError::SchemaMismatch {
                field: "mediaType".to_string(),
                expected: MediaType::ImageIndexV1.to_string(),
                actual: index
                    .media_type()
                    .map_or_else(|| "<absent>".to_string(), |m| m.to_string()),
            }));
        }
    }

    fn check_non_empty(&self, index: &ImageIndex, report: &mut ValidationReport) {
        if index.manifests().is_empty() {
            report.push(Violation::document(IndexError::EmptyIndex));
        }
    }

    fn check_unique_platforms(&self, index: &ImageIndex, report: &mut ValidationReport) {
        let mut order: Vec<PlatformKey> = Vec::new();
        let mut positions: HashMap<PlatformKey, Vec<usize>> = HashMap::new();

        for (position, entry) in index.manifests().iter().enumerate() {
            if self.config.exempt_attestations && entry.is_attestation() {
                continue;
            }
            let key = entry.platform_key();
            let seen = positions.entry(key.clone()).or_default();
            if seen.is_empty() {
                order.push(key);
            }
            seen.push(position);
        }

        for key in order {
            let entries = &positions[&key];
            if entries.len() > 1 {
                report.push(Violation {
                    entries: entries.clone(),
                    error: key.duplicate_error(),
                });
            }
        }
    }

    fn check_descriptors(&self, index: &ImageIndex, report: &mut ValidationReport) {
        for (position, entry) in index.manifests().iter().enumerate() {
            for defect in entry.descriptor().defects(&self.config) {
                report.push(Violation::entry(position, defect));
            }
        }
    }

    fn check_digests(
        &self,
        index: &ImageIndex,
        source: &dyn ContentSource,
        report: &mut ValidationReport,
    ) {
        for (position, entry) in index.manifests().iter().enumerate() {
            let descriptor = entry.descriptor();
            // Malformed digests were already reported.
            let Ok(digest) = descriptor.parsed_digest() else {
                continue;
            };

            if !digest.algorithm().is_supported() {
                report.push(Violation::entry(
                    position,
                    IndexError::UnsupportedDigestAlgorithm(digest.algorithm().to_string()),
                ));
                continue;
            }

            match source.fetch(&digest) {
                Ok(Some(content)) => {
                    if let Err(e) = verify(descriptor, &content) {
                        report.push(Violation::entry(position, e));
                    }
                }
                Ok(None) => {
                    tracing::debug!(digest = %digest, "Content not available, skipping verification");
                }
                Err(e) => {
                    tracing::warn!(digest = %digest, error = %e, "Failed to fetch content for verification");
                }
            }
        }
    }
}
