//! Artifact naming and per-kind run plans.
//!
//! Every WEPP artifact is named `<stem>[.<batch>].<ext>`: stem `p<id>` for
//! hillslopes, `pw0` for the watershed, the flowpath id for flowpaths.

use std::path::{Path, PathBuf};

use crate::core::reldir::InputDirs;
use crate::core::types::RunKey;

/// Stem shared by all watershed artifacts.
pub const WATERSHED_STEM: &str = "pw0";

/// Hillslope artifact stem, `p<id>`.
pub fn hillslope_stem(wepp_id: u32) -> String {
    format!("p{wepp_id}")
}

/// `<stem>[.<batch>].<ext>`
pub fn artifact_name(stem: &str, batch: Option<u32>, ext: &str) -> String {
    match batch {
        Some(batch) => format!("{stem}.{batch}.{ext}"),
        None => format!("{stem}.{ext}"),
    }
}

/// Everything one simulation invocation reads, writes and cleans up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunPlan {
    pub key: RunKey,
    /// Working directory of the simulator process.
    pub workdir: PathBuf,
    /// Inputs that must exist before launch, in check order.
    pub required: Vec<PathBuf>,
    /// Run-control file fed to the simulator on stdin.
    pub run_file: PathBuf,
    /// Combined stdout/stderr log.
    pub log_file: PathBuf,
    /// Files removed after a successful run.
    pub cleanup: Vec<PathBuf>,
}

/// Plan for a hillslope run, or a single-storm batch hillslope run when
/// `ss_batch_id` is set.
pub fn hillslope_plan(
    wepp_id: u32,
    runs_dir: &Path,
    dirs: &InputDirs,
    ss_batch_id: Option<u32>,
) -> RunPlan {
    let stem = hillslope_stem(wepp_id);
    let run_file = runs_dir.join(artifact_name(&stem, ss_batch_id, "run"));
    RunPlan {
        key: RunKey::Hillslope {
            wepp_id,
            ss_batch_id,
        },
        workdir: runs_dir.to_path_buf(),
        required: vec![
            runs_dir.join(artifact_name(&stem, None, "man")),
            runs_dir.join(artifact_name(&stem, None, "sol")),
            dirs.slp_dir
                .join(runs_dir, &artifact_name(&stem, None, "slp")),
            dirs.cli_dir
                .join(runs_dir, &artifact_name(&stem, ss_batch_id, "cli")),
            run_file.clone(),
        ],
        run_file,
        log_file: runs_dir.join(artifact_name(&stem, ss_batch_id, "err")),
        cleanup: Vec::new(),
    }
}

/// Plan for a flowpath run.
///
/// Management, climate and soil come from the parent hillslope in `runs_dir`;
/// slope and run file live in `fp_runs_dir`, which is also the working directory.
pub fn flowpath_plan(fp_id: &str, wepp_id: u32, runs_dir: &Path, fp_runs_dir: &Path) -> RunPlan {
    let stem = hillslope_stem(wepp_id);
    let run_file = fp_runs_dir.join(artifact_name(fp_id, None, "run"));
    let log_file = fp_runs_dir.join(artifact_name(fp_id, None, "err"));
    RunPlan {
        key: RunKey::Flowpath {
            fp_id: fp_id.to_string(),
        },
        workdir: fp_runs_dir.to_path_buf(),
        required: vec![
            runs_dir.join(artifact_name(&stem, None, "man")),
            fp_runs_dir.join(artifact_name(fp_id, None, "slp")),
            runs_dir.join(artifact_name(&stem, None, "cli")),
            runs_dir.join(artifact_name(&stem, None, "sol")),
            run_file.clone(),
        ],
        cleanup: vec![
            run_file.clone(),
            fp_runs_dir.join(artifact_name(fp_id, None, "loss.dat")),
            fp_runs_dir.join(artifact_name(fp_id, None, "single_event.dat")),
            log_file.clone(),
        ],
        run_file,
        log_file,
    }
}

/// Plan for a watershed run, or a single-storm batch watershed run when
/// `ss_batch_id` is set.
pub fn watershed_plan(runs_dir: &Path, ss_batch_id: Option<u32>) -> RunPlan {
    let file =
        |batch: Option<u32>, ext: &str| runs_dir.join(artifact_name(WATERSHED_STEM, batch, ext));
    let run_file = file(ss_batch_id, "run");
    RunPlan {
        key: RunKey::Watershed { ss_batch_id },
        workdir: runs_dir.to_path_buf(),
        required: vec![
            file(None, "str"),
            file(None, "chn"),
            file(None, "imp"),
            file(None, "man"),
            file(None, "slp"),
            file(ss_batch_id, "cli"),
            file(None, "sol"),
            run_file.clone(),
        ],
        run_file,
        log_file: file(ss_batch_id, "err"),
        cleanup: Vec::new(),
    }
}
