//! `a3s-index create` command.

use std::path::PathBuf;

use a3s_index::{Descriptor, IndexBuilder, IndexConfig, IndexError, MediaType, Platform};
use clap::Args;
use serde::Deserialize;

use crate::output;

/// Annotation key for the index creation time.
const CREATED_ANNOTATION: &str = "org.opencontainers.image.created";

#[derive(Args)]
pub struct CreateArgs {
    /// Manifest blob and its platform, as FILE=OS/ARCH[/VARIANT] (repeatable)
    #[arg(short, long = "manifest", value_name = "FILE=PLATFORM", required = true)]
    pub manifests: Vec<String>,

    /// Index annotation as KEY=VALUE (repeatable)
    #[arg(short, long = "annotation", value_name = "KEY=VALUE")]
    pub annotations: Vec<String>,

    /// Add org.opencontainers.image.created with the current time
    #[arg(long)]
    pub created: bool,

    /// Write the index to a file and print its digest instead of the document
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Pretty-print the document
    #[arg(long)]
    pub pretty: bool,
}

pub async fn execute(args: CreateArgs, config: &IndexConfig) -> Result<(), Box<dyn std::error::Error>> {
    let mut targets = Vec::with_capacity(args.manifests.len());
    for spec in &args.manifests {
        let (file, platform) = spec
            .rsplit_once('=')
            .filter(|(file, _)| !file.is_empty())
            .ok_or_else(|| format!("invalid manifest '{spec}': expected FILE=OS/ARCH[/VARIANT]"))?;
        targets.push((PathBuf::from(file), platform.parse::<Platform>()?));
    }

    // Hash the blobs in parallel, but add them in argument order so the
    // document (and its digest) is reproducible.
    let handles: Vec<_> = targets
        .into_iter()
        .map(|(path, platform)| tokio::spawn(describe_manifest(path, platform)))
        .collect();

    let builder = IndexBuilder::with_config(config.validation.clone());
    for handle in handles {
        let (descriptor, platform) = handle.await??;
        builder.add_manifest(descriptor, platform)?;
    }

    for annotation in &args.annotations {
        let (key, value) = output::parse_key_value(annotation)?;
        builder.set_annotation(key, value)?;
    }
    if args.created {
        let now = chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true);
        builder.set_annotation(CREATED_ANNOTATION, now)?;
    }

    let index = builder.build()?;
    let document = if args.pretty {
        index.to_json_pretty()?.into_bytes()
    } else {
        index.to_json()?
    };

    match args.output {
        Some(path) => {
            std::fs::write(&path, &document)
                .map_err(|e| format!("Failed to write {}: {}", path.display(), e))?;
            let descriptor = Descriptor::for_content(MediaType::ImageIndexV1, &document);
            tracing::info!(
                path = %path.display(),
                digest = %descriptor.digest,
                manifests = index.manifests().len(),
                "Wrote image index"
            );
            println!("{}", descriptor.digest);
        }
        None => println!("{}", String::from_utf8_lossy(&document)),
    }

    Ok(())
}

/// Read a manifest blob and describe it.
async fn describe_manifest(
    path: PathBuf,
    platform: Platform,
) -> a3s_index::Result<(Descriptor, Platform)> {
    let bytes = tokio::fs::read(&path).await.map_err(|e| {
        IndexError::ConfigError(format!("Failed to read manifest {}: {}", path.display(), e))
    })?;
    let descriptor = Descriptor::for_content(detect_media_type(&bytes), &bytes);
    tracing::debug!(
        path = %path.display(),
        platform = %platform,
        digest = %descriptor.digest,
        "Described manifest"
    );
    Ok((descriptor, platform))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct MediaTypeProbe {
    media_type: Option<MediaType>,
}

/// Media type declared inside a manifest blob, defaulting to an OCI manifest.
pub(crate) fn detect_media_type(bytes: &[u8]) -> MediaType {
    serde_json::from_slice::<MediaTypeProbe>(bytes)
        .ok()
        .and_then(|probe| probe.media_type)
        .unwrap_or(MediaType::ImageManifestV1)
}
