//! Browse links for watershed logs shown in the web front-end.

use std::path::{Component, Path};

/// Link to `log_path` relative to the project root.
///
/// The project root is the parent of the last path component equal to
/// `marker`. Returns `None` when no component matches.
pub fn browse_link(log_path: &Path, marker: &str) -> Option<String> {
    let parts: Vec<String> = log_path
        .components()
        .filter_map(|component| match component {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();
    let start = parts.iter().rposition(|part| part == marker)?;
    Some(format!("browse/{}", parts[start..].join("/")))
}
