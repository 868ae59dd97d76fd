//! Run-file templates stored as `<name>.template` under the template dir.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::debug;

use crate::core::template::strip_comments;

/// Templates the run-file writer knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateName {
    Hillslope,
    RevegHillslope,
    SsHillslope,
    SsBatchHillslope,
    Flowpath,
    SsFlowpath,
    Watershed,
    SsWatershed,
    SsBatchWatershed,
}

impl TemplateName {
    pub const ALL: [TemplateName; 9] = [
        TemplateName::Hillslope,
        TemplateName::RevegHillslope,
        TemplateName::SsHillslope,
        TemplateName::SsBatchHillslope,
        TemplateName::Flowpath,
        TemplateName::SsFlowpath,
        TemplateName::Watershed,
        TemplateName::SsWatershed,
        TemplateName::SsBatchWatershed,
    ];

    pub fn file_name(self) -> &'static str {
        match self {
            TemplateName::Hillslope => "hillslope.template",
            TemplateName::RevegHillslope => "reveg_hillslope.template",
            TemplateName::SsHillslope => "ss_hillslope.template",
            TemplateName::SsBatchHillslope => "ss_batch_hillslope.template",
            TemplateName::Flowpath => "flowpath.template",
            TemplateName::SsFlowpath => "ss_flowpath.template",
            TemplateName::Watershed => "watershed.template",
            TemplateName::SsWatershed => "ss_watershed.template",
            TemplateName::SsBatchWatershed => "ss_batch_watershed.template",
        }
    }
}

impl fmt::Display for TemplateName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.file_name())
    }
}

/// Reads templates from disk on every call, so edits take effect immediately.
#[derive(Debug, Clone)]
pub struct TemplateStore {
    dir: PathBuf,
}

impl TemplateStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Template text with comments stripped.
    pub fn load(&self, name: TemplateName) -> Result<String> {
        let path = self.dir.join(name.file_name());
        let raw = fs::read_to_string(&path)
            .with_context(|| format!("read template {}", path.display()))?;
        debug!(template = %name, bytes = raw.len(), "loaded template");
        Ok(strip_comments(&raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_strips_comments() {
        let temp = tempfile::tempdir().expect("tempdir");
        fs::write(
            temp.path().join("ss_watershed.template"),
            "m  # units\nY\n{sub_n}   # hillslopes\n",
        )
        .expect("write");

        let store = TemplateStore::new(temp.path());
        let text = store.load(TemplateName::SsWatershed).expect("load");
        assert_eq!(text, "m\nY\n{sub_n}");
    }

    #[test]
    fn missing_template_names_the_path() {
        let temp = tempfile::tempdir().expect("tempdir");
        let err = TemplateStore::new(temp.path())
            .load(TemplateName::Flowpath)
            .unwrap_err();
        assert!(format!("{err:#}").contains("flowpath.template"));
    }
}
