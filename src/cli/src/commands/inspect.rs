//! `a3s-index inspect` command.

use std::path::PathBuf;

use clap::Args;

use super::read_index;
use crate::output;

#[derive(Args)]
pub struct InspectArgs {
    /// Index document, or an OCI image layout directory
    pub path: PathBuf,

    /// Only show entry digests (one per line)
    #[arg(short, long)]
    pub quiet: bool,
}

pub async fn execute(args: InspectArgs) -> Result<(), Box<dyn std::error::Error>> {
    let (bytes, _) = read_index(&args.path)?;
    let parsed = a3s_index::parse(&bytes)?;
    let index = parsed.index();

    if args.quiet {
        for entry in index.manifests() {
            println!("{}", entry.descriptor().digest);
        }
        return Ok(());
    }

    let mut table = output::new_table(&["PLATFORM", "MEDIA TYPE", "DIGEST", "SIZE"]);
    for entry in index.manifests() {
        let descriptor = entry.descriptor();
        let platform = if entry.is_attestation() {
            format!("{} (attestation)", entry.platform())
        } else {
            entry.platform().to_string()
        };
        table.add_row(vec![
            platform,
            descriptor.media_type.to_string(),
            output::short_digest(&descriptor.digest),
            output::format_bytes(descriptor.size),
        ]);
    }
    println!("{table}");

    for (key, value) in index.annotations() {
        println!("{key}={value}");
    }
    println!("Digest: {}", parsed.digest());

    Ok(())
}
