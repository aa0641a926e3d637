//! A3S Index Core - Shared Types
//!
//! Error taxonomy and configuration shared by the index library and CLI.

pub mod config;
pub mod error;
pub mod log;

// Re-export commonly used types
pub use config::{IndexConfig, ValidationConfig};
pub use error::{ErrorKind, IndexError, Result};
pub use log::{LogConfig, LogFormat};

/// A3S Index version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
