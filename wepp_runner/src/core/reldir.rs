//! Relative directory fragments spliced into run files and input paths.

use std::fmt;
use std::path::{MAIN_SEPARATOR, Path, PathBuf};
use std::str::FromStr;

use serde::Serialize;

use crate::error::RunError;

/// Shared hillslope inputs for omni scenarios, relative to a scenario's runs dir.
pub const OMNI_SHARED_RUNS: &str = "../../../../../wepp/runs/";

/// A relative directory that is either empty or ends with a path separator.
///
/// The fragment is concatenated directly in front of file names inside run
/// files, so the trailing separator is required.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RelDir(String);

impl RelDir {
    pub fn new(value: impl Into<String>) -> Result<Self, RunError> {
        let value = value.into();
        if value.is_empty() || value.ends_with('/') || value.ends_with(MAIN_SEPARATOR) {
            Ok(Self(value))
        } else {
            Err(RunError::MalformedRelDir { value })
        }
    }

    pub fn empty() -> Self {
        Self(String::new())
    }

    pub fn omni() -> Self {
        Self(OMNI_SHARED_RUNS.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Resolve `file_name` under `base`, through this fragment when set.
    pub fn join(&self, base: &Path, file_name: &str) -> PathBuf {
        if self.0.is_empty() {
            base.join(file_name)
        } else {
            base.join(&self.0).join(file_name)
        }
    }
}

impl fmt::Display for RelDir {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for RelDir {
    type Err = RunError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RelDir::new(s)
    }
}

/// Where a hillslope finds its slope and climate files.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputDirs {
    pub slp_dir: RelDir,
    pub cli_dir: RelDir,
}

impl InputDirs {
    /// Slope and climate shared with the base project (omni scenarios).
    pub fn omni() -> Self {
        Self {
            slp_dir: RelDir::omni(),
            cli_dir: RelDir::omni(),
        }
    }
}
