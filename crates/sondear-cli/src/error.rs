//! Error types for the CLI

use sondear::SondearError;
use thiserror::Error;

/// Result type for CLI operations
pub type CliResult<T> = Result<T, CliError>;

/// Errors that can occur in the CLI
#[derive(Debug, Error)]
pub enum CliError {
    /// The named fuzz target is not registered
    #[error("target unit not found: {name}")]
    TargetNotFound {
        /// Qualified name that failed to resolve
        name: String,
    },

    /// The generated test file could not be emitted
    #[error("unable to write the generated test file: {0}")]
    WriteTestFile(#[source] SondearError),

    /// A command-line argument was rejected
    #[error("invalid argument: {message}")]
    InvalidArgument {
        /// Why the argument was rejected
        message: String,
    },

    /// Serializing the coverage summary failed
    #[error("report serialization failed: {0}")]
    Report(#[from] serde_json::Error),

    /// IO error while writing report artifacts
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Process exit code for this failure: `2` for resolution and usage
    /// errors, `1` for emission failures.
    #[must_use]
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::TargetNotFound { .. } | Self::InvalidArgument { .. } => 2,
            Self::WriteTestFile(_) | Self::Report(_) | Self::Io(_) => 1,
        }
    }
}

impl From<SondearError> for CliError {
    fn from(error: SondearError) -> Self {
        match error {
            SondearError::UnknownUnit { name } => Self::TargetNotFound { name },
            SondearError::UnknownMember { unit, .. } => Self::TargetNotFound { name: unit },
            other => Self::WriteTestFile(other),
        }
    }
}
