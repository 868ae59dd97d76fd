//! Simulator binary lookup under the configured `bin_dir`.

use std::env::consts::EXE_SUFFIX;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::debug;

use crate::config::WeppConfig;

/// Pseudo-option always offered next to the versioned `wepp_*` binaries.
pub const LATEST: &str = "latest";

/// Absolute path of the simulator to launch.
///
/// An explicit `name` prefers `<bin_dir>/<name><EXE_SUFFIX>` when that file
/// exists and falls back to `<bin_dir>/<name>`. Without a name the configured
/// default (or the platform default) is used.
pub fn resolve_binary(config: &WeppConfig, name: Option<&str>) -> Result<PathBuf> {
    let path = match name {
        Some(name) => {
            let suffixed = config.bin_dir.join(format!("{name}{EXE_SUFFIX}"));
            if !EXE_SUFFIX.is_empty() && suffixed.is_file() {
                suffixed
            } else {
                config.bin_dir.join(name)
            }
        }
        None => config.bin_dir.join(config.default_binary_name()),
    };
    let path = std::path::absolute(&path)
        .with_context(|| format!("resolve binary path {}", path.display()))?;
    debug!(binary = %path.display(), "resolved simulator binary");
    Ok(path)
}

/// Binary names that can be requested explicitly: `wepp_*` files without an
/// extension, plus [`LATEST`], sorted.
pub fn available_binaries(bin_dir: &Path) -> Result<Vec<String>> {
    let mut names = vec![LATEST.to_string()];
    let entries =
        fs::read_dir(bin_dir).with_context(|| format!("read bin dir {}", bin_dir.display()))?;
    for entry in entries {
        let entry = entry.with_context(|| format!("read entry in {}", bin_dir.display()))?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.starts_with("wepp_") && !name.contains('.') {
            names.push(name);
        }
    }
    names.sort();
    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(bin_dir: &Path) -> WeppConfig {
        WeppConfig {
            bin_dir: bin_dir.to_path_buf(),
            ..WeppConfig::default()
        }
    }

    #[test]
    fn explicit_name_resolves_under_bin_dir() {
        let temp = tempfile::tempdir().expect("tempdir");
        fs::write(temp.path().join(format!("wepp_2017{EXE_SUFFIX}")), "").expect("write");
        let path = resolve_binary(&config(temp.path()), Some("wepp_2017")).expect("resolve");
        assert!(path.is_absolute());
        assert_eq!(path.file_name().unwrap(), format!("wepp_2017{EXE_SUFFIX}").as_str());
    }

    #[test]
    fn default_name_comes_from_config() {
        let temp = tempfile::tempdir().expect("tempdir");
        let mut cfg = config(temp.path());
        assert!(
            resolve_binary(&cfg, None)
                .expect("resolve")
                .ends_with(crate::config::PLATFORM_DEFAULT_BINARY)
        );
        cfg.default_binary = Some("wepp_dev".to_string());
        assert!(resolve_binary(&cfg, None).expect("resolve").ends_with("wepp_dev"));
    }

    #[test]
    fn relative_bin_dir_becomes_absolute() {
        let cfg = config(Path::new("bin"));
        let path = resolve_binary(&cfg, Some("wepp_x")).expect("resolve");
        assert!(path.is_absolute());
        assert!(path.ends_with("bin/wepp_x"));
    }

    #[test]
    fn lists_versioned_binaries_and_latest() {
        let temp = tempfile::tempdir().expect("tempdir");
        for name in ["wepp_2020", "wepp_2017", "wepp_2017.exe", "wepp", "README"] {
            fs::write(temp.path().join(name), "").expect("write");
        }
        let names = available_binaries(temp.path()).expect("list");
        assert_eq!(names, ["latest", "wepp_2017", "wepp_2020"]);
    }
}
