use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::core::types::RunKey;

/// Classified failures of run-file generation and simulation runs.
///
/// Returned wrapped in `anyhow::Error`; use `downcast_ref::<RunError>()` to
/// classify.
#[derive(Error, Debug)]
pub enum RunError {
    #[error("missing required input {}", .path.display())]
    MissingArtifact { path: PathBuf },
    #[error("relative directory must be empty or end with a path separator: {value:?}")]
    MalformedRelDir { value: String },
    #[error("template {template} references unknown placeholder {{{name}}}")]
    UnknownPlaceholder { template: String, name: String },
    #[error("error running wepp for {key}\nSee {}", see_log(.log_path, .link.as_deref()))]
    SimulationFailed {
        key: RunKey,
        log_path: PathBuf,
        link: Option<String>,
    },
}

fn see_log(log_path: &Path, link: Option<&str>) -> String {
    match link {
        Some(link) => format!("<a href=\"{link}\">{}</a>", log_path.display()),
        None => log_path.display().to_string(),
    }
}
