//! Emission of generated test files.

use super::builder::{RenderProfile, TestCaseBuilder};
use super::snake_case;
use crate::result::{SondearError, SondearResult};
use crate::results::FuzzedUnitResult;
use std::path::{Path, PathBuf};
use tracing::{debug, error};

const DEFAULT_REPORT_DIR: &str = "fuzzing-report";

/// Filesystem operations the writer depends on, separated out so write
/// failures can be exercised in tests.
pub trait FileSystemOps {
    /// Create a directory and all of its parents.
    fn create_dir_all(&self, path: &Path) -> std::io::Result<()>;

    /// Write a file, creating or truncating it.
    fn write(&self, path: &Path, contents: &[u8]) -> std::io::Result<()>;
}

/// The real filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct RealFileSystem;

impl FileSystemOps for RealFileSystem {
    fn create_dir_all(&self, path: &Path) -> std::io::Result<()> {
        std::fs::create_dir_all(path)
    }

    fn write(&self, path: &Path, contents: &[u8]) -> std::io::Result<()> {
        std::fs::write(path, contents)
    }
}

/// Writes the generated test file for a fuzzed unit into the report
/// directory.
///
/// The two emission failure modes, directory creation and content
/// writing, are surfaced as distinct errors and never swallowed.
#[derive(Debug)]
pub struct TestFileWriter<F = RealFileSystem> {
    fs: F,
    report_dir: PathBuf,
    profile: RenderProfile,
}

impl Default for TestFileWriter<RealFileSystem> {
    fn default() -> Self {
        Self::new(RealFileSystem)
    }
}

impl<F: FileSystemOps> TestFileWriter<F> {
    /// Create a writer over the given filesystem, targeting the default
    /// `fuzzing-report/` directory.
    #[must_use]
    pub fn new(fs: F) -> Self {
        Self {
            fs,
            report_dir: PathBuf::from(DEFAULT_REPORT_DIR),
            profile: RenderProfile::default(),
        }
    }

    /// Write into a different report directory.
    #[must_use]
    pub fn with_report_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.report_dir = dir.into();
        self
    }

    /// Render generated tests with a custom profile.
    #[must_use]
    pub fn with_profile(mut self, profile: RenderProfile) -> Self {
        self.profile = profile;
        self
    }

    /// Build the test file for `result` and write it as
    /// `<report_dir>/<unit_snake_case>_test.rs`. Returns the written
    /// path.
    pub fn write_unit_tests(&self, result: &FuzzedUnitResult) -> SondearResult<PathBuf> {
        let content = TestCaseBuilder::new(result)
            .with_profile(self.profile.clone())
            .build();
        let path = self
            .report_dir
            .join(format!("{}_test.rs", snake_case(result.name())));

        self.fs
            .create_dir_all(&self.report_dir)
            .map_err(|source| {
                error!(path = %self.report_dir.display(), "failed to create report directory");
                SondearError::CreateReportDir {
                    path: self.report_dir.clone(),
                    source,
                }
            })?;

        self.fs
            .write(&path, content.as_bytes())
            .map_err(|source| {
                error!(path = %path.display(), "failed to write test file");
                SondearError::WriteTestFile {
                    path: path.clone(),
                    source,
                }
            })?;

        debug!(path = %path.display(), tests = result.results().len(), "wrote generated tests");
        Ok(path)
    }
}
