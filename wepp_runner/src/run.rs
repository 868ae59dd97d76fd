//! Orchestration for single simulator runs.
//!
//! Every run follows the same protocol: check the plan's inputs, launch the
//! resolved binary with the run file on stdin, stream the merged output into
//! the `.err` log while watching for the success marker, then finalize. The
//! process exit status is not consulted; the marker alone decides success.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use tracing::{debug, info, instrument, warn};

use crate::config::WeppConfig;
use crate::core::browse::browse_link;
use crate::core::plan::{RunPlan, flowpath_plan, hillslope_plan, watershed_plan};
use crate::core::reldir::InputDirs;
use crate::core::types::RunOutcome;
use crate::error::RunError;
use crate::io::binary::resolve_binary;
use crate::io::process::{LaunchRequest, Launcher, ProcessLauncher};
use crate::io::status::StatusChannel;

/// A hillslope run in `runs_dir`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HillslopeRun {
    pub wepp_id: u32,
    pub runs_dir: PathBuf,
    /// Where slope and climate inputs live relative to `runs_dir`.
    pub dirs: InputDirs,
    /// Binary name under the configured bin dir; `None` for the default.
    pub binary: Option<String>,
}

impl HillslopeRun {
    pub fn new(wepp_id: u32, runs_dir: impl Into<PathBuf>) -> Self {
        Self {
            wepp_id,
            runs_dir: runs_dir.into(),
            dirs: InputDirs::default(),
            binary: None,
        }
    }
}

/// A flowpath run. Parent hillslope inputs come from `runs_dir`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowpathRun {
    pub fp_id: String,
    pub wepp_id: u32,
    pub runs_dir: PathBuf,
    pub fp_runs_dir: PathBuf,
    pub binary: Option<String>,
}

/// A watershed run in `runs_dir`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatershedRun {
    pub runs_dir: PathBuf,
    pub binary: Option<String>,
}

impl WatershedRun {
    pub fn new(runs_dir: impl Into<PathBuf>) -> Self {
        Self {
            runs_dir: runs_dir.into(),
            binary: None,
        }
    }
}

/// Runs WEPP through a [`Launcher`].
///
/// Each call blocks until the simulator exits. Runs share no state, so
/// callers may drive many simulators from separate threads.
pub struct Simulator<L: Launcher = ProcessLauncher> {
    config: WeppConfig,
    launcher: L,
}

impl Simulator<ProcessLauncher> {
    pub fn new(config: WeppConfig) -> Self {
        Self::with_launcher(config, ProcessLauncher)
    }
}

impl<L: Launcher> Simulator<L> {
    pub fn with_launcher(config: WeppConfig, launcher: L) -> Self {
        Self { config, launcher }
    }

    pub fn config(&self) -> &WeppConfig {
        &self.config
    }

    pub fn launcher(&self) -> &L {
        &self.launcher
    }

    #[instrument(skip_all, fields(wepp_id = req.wepp_id))]
    pub fn run_hillslope(&self, req: &HillslopeRun) -> Result<RunOutcome> {
        let plan = hillslope_plan(req.wepp_id, &req.runs_dir, &req.dirs, None);
        self.execute(&plan, req.binary.as_deref(), None)
    }

    #[instrument(skip_all, fields(wepp_id = req.wepp_id, ss_batch_id = ss_batch_id))]
    pub fn run_ss_batch_hillslope(&self, req: &HillslopeRun, ss_batch_id: u32) -> Result<RunOutcome> {
        let plan = hillslope_plan(req.wepp_id, &req.runs_dir, &req.dirs, Some(ss_batch_id));
        self.execute(&plan, req.binary.as_deref(), None)
    }

    /// On success the flowpath's run, log and per-event outputs are removed.
    #[instrument(skip_all, fields(fp_id = %req.fp_id))]
    pub fn run_flowpath(&self, req: &FlowpathRun) -> Result<RunOutcome> {
        let plan = flowpath_plan(&req.fp_id, req.wepp_id, &req.runs_dir, &req.fp_runs_dir);
        self.execute(&plan, req.binary.as_deref(), None)
    }

    /// Output lines are forwarded to `status` as they arrive.
    #[instrument(skip_all, fields(runs_dir = %req.runs_dir.display()))]
    pub fn run_watershed(
        &self,
        req: &WatershedRun,
        status: Option<StatusChannel<'_>>,
    ) -> Result<RunOutcome> {
        let plan = watershed_plan(&req.runs_dir, None);
        self.execute(&plan, req.binary.as_deref(), status)
    }

    #[instrument(skip_all, fields(runs_dir = %req.runs_dir.display(), ss_batch_id = ss_batch_id))]
    pub fn run_ss_batch_watershed(
        &self,
        req: &WatershedRun,
        ss_batch_id: u32,
        status: Option<StatusChannel<'_>>,
    ) -> Result<RunOutcome> {
        let plan = watershed_plan(&req.runs_dir, Some(ss_batch_id));
        self.execute(&plan, req.binary.as_deref(), status)
    }

    fn execute(
        &self,
        plan: &RunPlan,
        binary: Option<&str>,
        status: Option<StatusChannel<'_>>,
    ) -> Result<RunOutcome> {
        let start = Instant::now();
        check_preconditions(plan)?;
        let program = resolve_binary(&self.config, binary)?;
        info!(key = %plan.key, program = %program.display(), "starting wepp");

        let log = File::create(&plan.log_file)
            .with_context(|| format!("create log {}", plan.log_file.display()))?;
        let mut log = BufWriter::new(log);

        let request = LaunchRequest {
            program,
            workdir: plan.workdir.clone(),
            stdin_path: plan.run_file.clone(),
        };
        let lines = self.launcher.launch(&request)?;
        let status = status.filter(|_| plan.key.is_watershed());
        let succeeded = stream_and_classify(lines, &mut log, plan.key.marker(), status)
            .with_context(|| format!("stream output into {}", plan.log_file.display()))?;
        drop(log);

        if !succeeded {
            warn!(key = %plan.key, log = %plan.log_file.display(), "wepp did not report success");
            return Err(RunError::SimulationFailed {
                key: plan.key.clone(),
                log_path: plan.log_file.clone(),
                link: self.failure_link(plan),
            }
            .into());
        }

        remove_all(&plan.cleanup)?;
        let elapsed = start.elapsed();
        info!(key = %plan.key, elapsed_ms = elapsed.as_millis() as u64, "wepp finished");
        Ok(RunOutcome {
            key: plan.key.clone(),
            elapsed,
        })
    }

    fn failure_link(&self, plan: &RunPlan) -> Option<String> {
        if !plan.key.is_watershed() {
            return None;
        }
        let browse = &self.config.browse;
        let absolute = std::path::absolute(&plan.log_file).unwrap_or_else(|_| plan.log_file.clone());
        Some(browse_link(&absolute, &browse.marker).unwrap_or_else(|| browse.fallback_link.clone()))
    }
}

/// First missing input wins; nothing is created when one is absent.
fn check_preconditions(plan: &RunPlan) -> Result<()> {
    for path in &plan.required {
        if !path.exists() {
            warn!(key = %plan.key, path = %path.display(), "missing required input");
            return Err(RunError::MissingArtifact { path: path.clone() }.into());
        }
    }
    debug!(inputs = plan.required.len(), "preconditions satisfied");
    Ok(())
}

/// Log every non-empty trimmed line, forward it to `status`, and report
/// whether any line contained `marker`. The stream is always drained.
fn stream_and_classify<I, W>(
    lines: I,
    log: &mut W,
    marker: &str,
    status: Option<StatusChannel<'_>>,
) -> Result<bool>
where
    I: Iterator<Item = Result<String>>,
    W: Write,
{
    let mut succeeded = false;
    for line in lines {
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        writeln!(log, "{line}")?;
        log.flush()?;
        if let Some(status) = status {
            status.publish(line);
        }
        if line.contains(marker) {
            succeeded = true;
        }
    }
    Ok(succeeded)
}

fn remove_all(paths: &[PathBuf]) -> Result<()> {
    for path in paths {
        remove_if_present(path)?;
    }
    Ok(())
}

fn remove_if_present(path: &Path) -> Result<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e).with_context(|| format!("remove {}", path.display())),
    }
}
