//! Driver configuration, optionally stored as TOML.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};

/// Simulator binary used when no name is configured or requested.
#[cfg(windows)]
pub const PLATFORM_DEFAULT_BINARY: &str = "wepp2014.exe";
#[cfg(not(windows))]
pub const PLATFORM_DEFAULT_BINARY: &str = "wepp";

/// Driver configuration (TOML).
///
/// Constructed once at startup and passed to [`crate::make::RunFileWriter`] and
/// [`crate::run::Simulator`]. Missing fields take the defaults below.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct WeppConfig {
    /// Directory holding the simulator binaries.
    pub bin_dir: PathBuf,

    /// Directory holding the `*.template` run-file templates.
    pub template_dir: PathBuf,

    /// Binary name under `bin_dir` used when a run does not name one.
    /// `None` selects the platform default.
    pub default_binary: Option<String>,

    pub browse: BrowseConfig,
}

/// How watershed failures link to their log in the web front-end.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct BrowseConfig {
    /// Path component the link starts at.
    pub marker: String,
    /// Link used when the log path does not contain `marker`.
    pub fallback_link: String,
}

impl Default for BrowseConfig {
    fn default() -> Self {
        Self {
            marker: "wepp".to_string(),
            fallback_link: "browse/wepp/runs/pw0.err".to_string(),
        }
    }
}

impl Default for WeppConfig {
    fn default() -> Self {
        Self {
            bin_dir: PathBuf::from("bin"),
            template_dir: PathBuf::from("templates"),
            default_binary: None,
            browse: BrowseConfig::default(),
        }
    }
}

impl WeppConfig {
    pub fn validate(&self) -> Result<()> {
        if self.bin_dir.as_os_str().is_empty() {
            return Err(anyhow!("bin_dir must be set"));
        }
        if self.template_dir.as_os_str().is_empty() {
            return Err(anyhow!("template_dir must be set"));
        }
        if let Some(name) = &self.default_binary
            && name.trim().is_empty()
        {
            return Err(anyhow!("default_binary must not be blank"));
        }
        if self.browse.marker.is_empty() || self.browse.marker.contains(['/', '\\']) {
            return Err(anyhow!(
                "browse.marker must be a single path component: {:?}",
                self.browse.marker
            ));
        }
        Ok(())
    }

    /// Binary name used when a run does not request one.
    pub fn default_binary_name(&self) -> &str {
        self.default_binary
            .as_deref()
            .unwrap_or(PLATFORM_DEFAULT_BINARY)
    }
}

/// Load config from a TOML file.
///
/// If the file is missing, returns `WeppConfig::default()`.
pub fn load_config(path: &Path) -> Result<WeppConfig> {
    if !path.exists() {
        let cfg = WeppConfig::default();
        cfg.validate()?;
        return Ok(cfg);
    }
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: WeppConfig =
        toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))?;
    cfg.validate()?;
    Ok(cfg)
}
