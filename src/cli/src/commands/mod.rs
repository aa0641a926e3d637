//! CLI command definitions and dispatch.

mod create;
mod digest;
mod inspect;
mod validate;
mod version;

pub use create::CreateArgs;
pub use digest::DigestArgs;
pub use inspect::InspectArgs;
pub use validate::ValidateArgs;

use std::path::{Path, PathBuf};

use a3s_index::{IndexConfig, LayoutContent};
use clap::{Parser, Subcommand};

/// A3S Index: assemble and check multi-architecture OCI image indexes.
#[derive(Parser)]
#[command(name = "a3s-index", version, about)]
pub struct Cli {
    /// Configuration file (YAML, or JSON when it ends in .json)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Subcommand)]
pub enum Command {
    /// Assemble per-platform manifests into an image index
    Create(create::CreateArgs),
    /// Check an image index and report every violation
    Validate(validate::ValidateArgs),
    /// List the entries of an image index
    Inspect(inspect::InspectArgs),
    /// Print the descriptor of a blob
    Digest(digest::DigestArgs),
    /// Show version information
    Version(version::VersionArgs),
}

/// Load the configuration file, or defaults when none is given.
pub fn load_config(path: Option<&Path>) -> a3s_index::Result<IndexConfig> {
    match path {
        Some(path) => IndexConfig::from_file(path),
        None => Ok(IndexConfig::default()),
    }
}

/// Read an index document from a file, or from `index.json` of an OCI layout.
///
/// Returns the layout too when `path` is one.
pub(crate) fn read_index(
    path: &Path,
) -> Result<(Vec<u8>, Option<LayoutContent>), Box<dyn std::error::Error>> {
    if path.is_dir() {
        let layout = LayoutContent::open(path)?;
        let bytes = layout.index_bytes()?;
        Ok((bytes, Some(layout)))
    } else {
        let bytes = std::fs::read(path)
            .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
        Ok((bytes, None))
    }
}

/// Dispatch a parsed CLI to the appropriate command handler.
pub async fn dispatch(cli: Cli, config: IndexConfig) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Command::Create(args) => create::execute(args, &config).await,
        Command::Validate(args) => validate::execute(args, &config).await,
        Command::Inspect(args) => inspect::execute(args).await,
        Command::Digest(args) => digest::execute(args).await,
        Command::Version(args) => version::execute(args).await,
    }
}
