//! Error types for documentation generation.

use std::path::PathBuf;
use std::process::ExitStatus;

use thiserror::Error;

/// Errors that can occur while generating a documentation project.
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("`{command}` exited with {status}:\n{output}")]
    ExternalTool {
        command: String,
        status: ExitStatus,
        /// Combined stdout and stderr of the failed process.
        output: String,
    },

    #[error("unsupported image type \"{0}\"")]
    UnsupportedAsset(String),

    #[error("malformed page artifact {}: {source}", path.display())]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
