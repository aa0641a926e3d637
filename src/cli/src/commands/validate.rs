//! `a3s-index validate` command.

use std::path::PathBuf;

use a3s_index::{IndexConfig, LayoutContent, Validator};
use clap::Args;

use super::read_index;

#[derive(Args)]
pub struct ValidateArgs {
    /// Index document, or an OCI image layout directory
    pub path: PathBuf,

    /// OCI image layout holding the manifest blobs to verify digests against
    #[arg(long, value_name = "DIR")]
    pub layout: Option<PathBuf>,

    /// Skip digest verification
    #[arg(long)]
    pub no_verify: bool,

    /// Only print violations
    #[arg(short, long)]
    pub quiet: bool,
}

pub async fn execute(args: ValidateArgs, config: &IndexConfig) -> Result<(), Box<dyn std::error::Error>> {
    let (bytes, mut layout) = read_index(&args.path)?;
    if let Some(dir) = &args.layout {
        layout = Some(LayoutContent::open(dir)?);
    }

    let mut validation = config.validation.clone();
    if args.no_verify {
        validation.verify_digests = false;
    }
    let validator = Validator::new(validation);

    let parsed = a3s_index::parse(&bytes)?;
    let report = match &layout {
        Some(layout) => validator.validate_with_content(parsed.index(), layout),
        None => validator.validate(parsed.index()),
    };

    for violation in report.iter() {
        println!("{violation}");
    }

    if !report.is_valid() {
        return Err(format!("{} violation(s) found", report.len()).into());
    }

    if !args.quiet {
        println!(
            "valid: {} manifest(s), {}",
            parsed.index().manifests().len(),
            parsed.digest()
        );
    }
    Ok(())
}
