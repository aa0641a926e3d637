//! `a3s-index digest` command.

use std::path::PathBuf;

use a3s_index::{Descriptor, MediaType};
use clap::Args;

use super::create::detect_media_type;

#[derive(Args)]
pub struct DigestArgs {
    /// Blob to describe
    pub file: PathBuf,

    /// Media type to record (default: read from the blob, else OCI manifest)
    #[arg(long)]
    pub media_type: Option<String>,
}

pub async fn execute(args: DigestArgs) -> Result<(), Box<dyn std::error::Error>> {
    let bytes = std::fs::read(&args.file)
        .map_err(|e| format!("Failed to read {}: {}", args.file.display(), e))?;

    let media_type = match args.media_type {
        Some(raw) => MediaType::from(raw),
        None => detect_media_type(&bytes),
    };
    let descriptor = Descriptor::for_content(media_type, &bytes);

    println!("{}", serde_json::to_string_pretty(&descriptor)?);
    Ok(())
}
