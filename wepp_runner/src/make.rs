//! Run-file generation.
//!
//! Each `make_*` operation renders one template with a typed parameter record
//! and writes the result into the runs directory under the conventional name,
//! overwriting whatever is there.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{debug, instrument};

use crate::config::WeppConfig;
use crate::core::plan::{WATERSHED_STEM, artifact_name, hillslope_stem};
use crate::core::reldir::InputDirs;
use crate::core::template::render;
use crate::io::templates::{TemplateName, TemplateStore};

/// Hillslope pass-file stub stitched into watershed run files.
const HILLSTUB: &str = "\nM\nY\n../output/H{wepp_id}.pass.dat";
/// Stub for single-storm batches; pass files live under the batch key.
const HILLSTUB_SS_BATCH: &str = "\nM\nY\n../output/{ss_batch_key}/H{wepp_id}.pass.dat";
/// Stub whose pass file path is given directly, minus `.pass.dat`.
const HILLSTUB_OMNI_CONTRASTS: &str = "\nM\nY\n{wepp_id_path}.pass.dat";

#[derive(Serialize)]
struct HillslopeParams<'a> {
    wepp_id: u32,
    sim_years: u32,
    cli_dir: &'a str,
    slp_dir: &'a str,
}

#[derive(Serialize)]
struct SsHillslopeParams<'a> {
    wepp_id: u32,
    cli_dir: &'a str,
    slp_dir: &'a str,
}

#[derive(Serialize)]
struct SsBatchHillslopeParams<'a> {
    wepp_id: u32,
    ss_batch_id: u32,
    ss_batch_key: &'a str,
    cli_dir: &'a str,
    slp_dir: &'a str,
}

#[derive(Serialize)]
struct FlowpathParams<'a> {
    fp: &'a str,
    wepp_id: u32,
    sim_years: u32,
}

#[derive(Serialize)]
struct SsFlowpathParams<'a> {
    fp: &'a str,
    wepp_id: u32,
    runs_dir: &'a str,
}

#[derive(Serialize)]
struct WatershedParams<'a> {
    sub_n: usize,
    hillslopes_block: &'a str,
    sim_years: u32,
}

#[derive(Serialize)]
struct SsWatershedParams<'a> {
    sub_n: usize,
    hillslopes_block: &'a str,
}

#[derive(Serialize)]
struct SsBatchWatershedParams<'a> {
    sub_n: usize,
    hillslopes_block: &'a str,
    ss_batch_id: u32,
    ss_batch_key: &'a str,
}

#[derive(Serialize)]
struct StubParams<'a> {
    wepp_id: u32,
    ss_batch_key: &'a str,
}

#[derive(Serialize)]
struct OmniStubParams<'a> {
    wepp_id_path: &'a str,
}

/// Writes run-control files from the configured templates.
#[derive(Debug, Clone)]
pub struct RunFileWriter {
    templates: TemplateStore,
}

impl RunFileWriter {
    pub fn new(templates: TemplateStore) -> Self {
        Self { templates }
    }

    pub fn from_config(config: &WeppConfig) -> Self {
        Self::new(TemplateStore::new(&config.template_dir))
    }

    /// Continuous hillslope run, `p<id>.run`.
    ///
    /// `reveg` selects the revegetation template.
    #[instrument(skip(self, runs_dir, dirs))]
    pub fn make_hillslope_run(
        &self,
        wepp_id: u32,
        sim_years: u32,
        runs_dir: &Path,
        reveg: bool,
        dirs: &InputDirs,
    ) -> Result<PathBuf> {
        let name = if reveg {
            TemplateName::RevegHillslope
        } else {
            TemplateName::Hillslope
        };
        let params = HillslopeParams {
            wepp_id,
            sim_years,
            cli_dir: dirs.cli_dir.as_str(),
            slp_dir: dirs.slp_dir.as_str(),
        };
        let path = runs_dir.join(artifact_name(&hillslope_stem(wepp_id), None, "run"));
        self.write(name, &params, &path)
    }

    /// Single-storm hillslope run, `p<id>.run`.
    #[instrument(skip(self, runs_dir, dirs))]
    pub fn make_ss_hillslope_run(
        &self,
        wepp_id: u32,
        runs_dir: &Path,
        dirs: &InputDirs,
    ) -> Result<PathBuf> {
        let params = SsHillslopeParams {
            wepp_id,
            cli_dir: dirs.cli_dir.as_str(),
            slp_dir: dirs.slp_dir.as_str(),
        };
        let path = runs_dir.join(artifact_name(&hillslope_stem(wepp_id), None, "run"));
        self.write(TemplateName::SsHillslope, &params, &path)
    }

    /// Single-storm batch hillslope run, `p<id>.<batch>.run`.
    #[instrument(skip(self, runs_dir, dirs))]
    pub fn make_ss_batch_hillslope_run(
        &self,
        wepp_id: u32,
        runs_dir: &Path,
        ss_batch_key: &str,
        ss_batch_id: u32,
        dirs: &InputDirs,
    ) -> Result<PathBuf> {
        let params = SsBatchHillslopeParams {
            wepp_id,
            ss_batch_id,
            ss_batch_key,
            cli_dir: dirs.cli_dir.as_str(),
            slp_dir: dirs.slp_dir.as_str(),
        };
        let path = runs_dir.join(artifact_name(
            &hillslope_stem(wepp_id),
            Some(ss_batch_id),
            "run",
        ));
        self.write(TemplateName::SsBatchHillslope, &params, &path)
    }

    /// Flowpath run, `<fp>.run` in the flowpath runs directory.
    #[instrument(skip(self, fp_runs_dir))]
    pub fn make_flowpath_run(
        &self,
        fp: &str,
        wepp_id: u32,
        sim_years: u32,
        fp_runs_dir: &Path,
    ) -> Result<PathBuf> {
        let params = FlowpathParams {
            fp,
            wepp_id,
            sim_years,
        };
        let path = fp_runs_dir.join(artifact_name(fp, None, "run"));
        self.write(TemplateName::Flowpath, &params, &path)
    }

    /// Single-storm flowpath run, `<fp>.run`. The template receives the
    /// absolute runs directory.
    #[instrument(skip(self, runs_dir))]
    pub fn make_ss_flowpath_run(&self, fp: &str, wepp_id: u32, runs_dir: &Path) -> Result<PathBuf> {
        let abs = std::path::absolute(runs_dir)
            .with_context(|| format!("resolve runs dir {}", runs_dir.display()))?;
        let abs = abs.to_string_lossy();
        let params = SsFlowpathParams {
            fp,
            wepp_id,
            runs_dir: &abs,
        };
        let path = runs_dir.join(artifact_name(fp, None, "run"));
        self.write(TemplateName::SsFlowpath, &params, &path)
    }

    /// Continuous watershed run, `pw0.run`, stitching hillslope pass files
    /// from `../output/`.
    #[instrument(skip(self, wepp_ids, runs_dir), fields(hillslopes = wepp_ids.len()))]
    pub fn make_watershed_run(
        &self,
        sim_years: u32,
        wepp_ids: &[u32],
        runs_dir: &Path,
    ) -> Result<PathBuf> {
        let block = hillslopes_block(wepp_ids, None)?;
        let params = WatershedParams {
            sub_n: wepp_ids.len(),
            hillslopes_block: &block,
            sim_years,
        };
        self.write(TemplateName::Watershed, &params, &watershed_run_path(runs_dir, None))
    }

    /// Continuous watershed run, `pw0.run`, whose hillslope pass files come
    /// from arbitrary relative paths (`<path>.pass.dat`).
    #[instrument(skip(self, wepp_path_ids, runs_dir), fields(hillslopes = wepp_path_ids.len()))]
    pub fn make_watershed_omni_contrasts_run(
        &self,
        sim_years: u32,
        wepp_path_ids: &[String],
        runs_dir: &Path,
    ) -> Result<PathBuf> {
        let mut block = String::new();
        for wepp_id_path in wepp_path_ids {
            block.push_str(&render(
                "omni contrasts hillslope stub",
                HILLSTUB_OMNI_CONTRASTS,
                &OmniStubParams { wepp_id_path },
            )?);
        }
        let params = WatershedParams {
            sub_n: wepp_path_ids.len(),
            hillslopes_block: &block,
            sim_years,
        };
        self.write(TemplateName::Watershed, &params, &watershed_run_path(runs_dir, None))
    }

    /// Single-storm watershed run, `pw0.run`.
    #[instrument(skip(self, wepp_ids, runs_dir), fields(hillslopes = wepp_ids.len()))]
    pub fn make_ss_watershed_run(&self, wepp_ids: &[u32], runs_dir: &Path) -> Result<PathBuf> {
        let block = hillslopes_block(wepp_ids, None)?;
        let params = SsWatershedParams {
            sub_n: wepp_ids.len(),
            hillslopes_block: &block,
        };
        self.write(TemplateName::SsWatershed, &params, &watershed_run_path(runs_dir, None))
    }

    /// Single-storm batch watershed run, `pw0.<batch>.run`.
    #[instrument(skip(self, wepp_ids, runs_dir), fields(hillslopes = wepp_ids.len()))]
    pub fn make_ss_batch_watershed_run(
        &self,
        wepp_ids: &[u32],
        runs_dir: &Path,
        ss_batch_key: &str,
        ss_batch_id: u32,
    ) -> Result<PathBuf> {
        let block = hillslopes_block(wepp_ids, Some(ss_batch_key))?;
        let params = SsBatchWatershedParams {
            sub_n: wepp_ids.len(),
            hillslopes_block: &block,
            ss_batch_id,
            ss_batch_key,
        };
        self.write(
            TemplateName::SsBatchWatershed,
            &params,
            &watershed_run_path(runs_dir, Some(ss_batch_id)),
        )
    }

    fn write<T: Serialize>(&self, name: TemplateName, params: &T, path: &Path) -> Result<PathBuf> {
        let template = self.templates.load(name)?;
        let rendered = render(name.file_name(), &template, params)?;
        fs::write(path, rendered).with_context(|| format!("write run file {}", path.display()))?;
        debug!(template = %name, path = %path.display(), "wrote run file");
        Ok(path.to_path_buf())
    }
}

fn watershed_run_path(runs_dir: &Path, ss_batch_id: Option<u32>) -> PathBuf {
    runs_dir.join(artifact_name(WATERSHED_STEM, ss_batch_id, "run"))
}

/// Concatenated hillslope stubs, batch-keyed when `ss_batch_key` is set.
fn hillslopes_block(wepp_ids: &[u32], ss_batch_key: Option<&str>) -> Result<String> {
    let (label, stub) = match ss_batch_key {
        Some(_) => ("ss batch hillslope stub", HILLSTUB_SS_BATCH),
        None => ("hillslope stub", HILLSTUB),
    };
    let mut block = String::new();
    for &wepp_id in wepp_ids {
        let params = StubParams {
            wepp_id,
            ss_batch_key: ss_batch_key.unwrap_or_default(),
        };
        block.push_str(&render(label, stub, &params)?);
    }
    Ok(block)
}
