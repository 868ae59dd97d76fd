//! Client configuration, optionally loaded from a TOML file.

use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};

pub const DEFAULT_BASE_URL: &str = "https://wepp.cloud/webservices/metquery/";

/// metquery client configuration (TOML).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct MetqueryConfig {
    /// Service root. `monthly` and `daily` are joined onto it, so it must end with `/`.
    pub base_url: String,

    /// Whole-request deadline in seconds, body download included. `None`
    /// (the default) waits as long as the service takes.
    pub timeout_secs: Option<u64>,
}

impl Default for MetqueryConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: None,
        }
    }
}

impl MetqueryConfig {
    pub fn validate(&self) -> Result<()> {
        if !self.base_url.ends_with('/') {
            return Err(anyhow!("base_url must end with '/': {}", self.base_url));
        }
        reqwest::Url::parse(&self.base_url)
            .with_context(|| format!("parse base_url {}", self.base_url))?;
        if self.timeout_secs == Some(0) {
            return Err(anyhow!("timeout_secs must be > 0"));
        }
        Ok(())
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

/// Load config from a TOML file.
///
/// If the file is missing, returns `MetqueryConfig::default()`.
pub fn load_config(path: &Path) -> Result<MetqueryConfig> {
    if !path.exists() {
        let cfg = MetqueryConfig::default();
        cfg.validate()?;
        return Ok(cfg);
    }
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: MetqueryConfig =
        toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))?;
    cfg.validate()?;
    Ok(cfg)
}
