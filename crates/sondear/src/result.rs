//! Result and error types for Sondear.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for Sondear operations
pub type SondearResult<T> = Result<T, SondearError>;

/// Errors that can occur in Sondear
#[derive(Debug, Error)]
pub enum SondearError {
    /// A named fuzz target could not be resolved in the registry
    #[error("unknown fuzz target `{name}`")]
    UnknownUnit {
        /// Qualified unit name that failed to resolve
        name: String,
    },

    /// A member lookup on a resolved unit failed
    #[error("unit `{unit}` has no member `{member}` with the requested parameters")]
    UnknownMember {
        /// Qualified unit name
        unit: String,
        /// Member name that failed to resolve
        member: String,
    },

    /// The report directory for generated tests could not be created
    #[error("failed to create report directory `{path}`")]
    CreateReportDir {
        /// Directory that could not be created
        path: PathBuf,
        /// Underlying io failure
        #[source]
        source: std::io::Error,
    },

    /// The generated test file could not be written
    #[error("failed to write test file `{path}`")]
    WriteTestFile {
        /// File that could not be written
        path: PathBuf,
        /// Underlying io failure
        #[source]
        source: std::io::Error,
    },
}

impl SondearError {
    /// True for the two test-file emission failures, which a caller must
    /// surface rather than swallow.
    #[must_use]
    pub fn is_write_failure(&self) -> bool {
        matches!(
            self,
            Self::CreateReportDir { .. } | Self::WriteTestFile { .. }
        )
    }
}
