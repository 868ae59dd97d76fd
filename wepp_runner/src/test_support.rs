//! Test-only launchers, publishers and fixture writers.

use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::Result;

use crate::config::WeppConfig;
use crate::io::process::{LaunchRequest, Launcher};
use crate::io::status::StatusPublisher;
use crate::io::templates::TemplateName;

/// Launcher that yields canned output lines and records every request.
#[derive(Debug, Default)]
pub struct ScriptedLauncher {
    lines: Vec<String>,
    requests: RefCell<Vec<LaunchRequest>>,
}

impl ScriptedLauncher {
    pub fn new(lines: &[&str]) -> Self {
        Self {
            lines: lines.iter().map(|line| (*line).to_string()).collect(),
            requests: RefCell::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<LaunchRequest> {
        self.requests.borrow().clone()
    }

    pub fn launch_count(&self) -> usize {
        self.requests.borrow().len()
    }
}

impl Launcher for ScriptedLauncher {
    type Lines = std::vec::IntoIter<Result<String>>;

    fn launch(&self, request: &LaunchRequest) -> Result<Self::Lines> {
        self.requests.borrow_mut().push(request.clone());
        let lines: Vec<Result<String>> = self
            .lines
            .iter()
            .map(|line| Ok(format!("{line}\n")))
            .collect();
        Ok(lines.into_iter())
    }
}

/// Publisher that keeps every `(channel, line)` pair.
#[derive(Debug, Default)]
pub struct RecordingPublisher {
    messages: Mutex<Vec<(String, String)>>,
}

impl RecordingPublisher {
    pub fn messages(&self) -> Vec<(String, String)> {
        self.messages
            .lock()
            .map(|messages| messages.clone())
            .unwrap_or_default()
    }
}

impl StatusPublisher for RecordingPublisher {
    fn publish(&self, channel: &str, line: &str) {
        if let Ok(mut messages) = self.messages.lock() {
            messages.push((channel.to_string(), line.to_string()));
        }
    }
}

/// Config rooted at `root`: binaries in `root/bin`, templates in
/// `root/templates`.
pub fn config_with_binary(root: &Path) -> WeppConfig {
    WeppConfig {
        bin_dir: root.join("bin"),
        template_dir: root.join("templates"),
        ..WeppConfig::default()
    }
}

/// Create an empty file (and its parent directories).
pub fn touch(path: &Path) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create parent dir");
    }
    fs::write(path, "").expect("touch file");
}

/// Inputs of a hillslope run with slope and climate next to the run file.
pub fn touch_hillslope_inputs(runs_dir: &Path, wepp_id: u32, ss_batch_id: Option<u32>) {
    let batch = ss_batch_id.map(|b| format!(".{b}")).unwrap_or_default();
    for name in [
        format!("p{wepp_id}.man"),
        format!("p{wepp_id}.sol"),
        format!("p{wepp_id}.slp"),
        format!("p{wepp_id}{batch}.cli"),
        format!("p{wepp_id}{batch}.run"),
    ] {
        touch(&runs_dir.join(name));
    }
}

/// Parent hillslope inputs in `runs_dir` plus flowpath slope and run file.
pub fn touch_flowpath_inputs(runs_dir: &Path, fp_runs_dir: &Path, fp_id: &str, wepp_id: u32) {
    for ext in ["man", "cli", "sol"] {
        touch(&runs_dir.join(format!("p{wepp_id}.{ext}")));
    }
    touch(&fp_runs_dir.join(format!("{fp_id}.slp")));
    touch(&fp_runs_dir.join(format!("{fp_id}.run")));
}

pub fn touch_watershed_inputs(runs_dir: &Path, ss_batch_id: Option<u32>) {
    let batch = ss_batch_id.map(|b| format!(".{b}")).unwrap_or_default();
    for ext in ["str", "chn", "imp", "man", "slp", "sol"] {
        touch(&runs_dir.join(format!("pw0.{ext}")));
    }
    touch(&runs_dir.join(format!("pw0{batch}.cli")));
    touch(&runs_dir.join(format!("pw0{batch}.run")));
}

/// Minimal templates for every run kind, with comments like the real ones.
pub fn write_sample_templates(dir: &Path) {
    fs::create_dir_all(dir).expect("create template dir");
    for name in TemplateName::ALL {
        let body = match name {
            TemplateName::Hillslope | TemplateName::RevegHillslope => {
                "m  # english units\n{slp_dir}p{wepp_id}.slp\n{cli_dir}p{wepp_id}.cli\n{sim_years}  # years\n"
            }
            TemplateName::SsHillslope => "m\n{slp_dir}p{wepp_id}.slp\n{cli_dir}p{wepp_id}.cli\n",
            TemplateName::SsBatchHillslope => {
                "m\n{cli_dir}p{wepp_id}.{ss_batch_id}.cli\n../output/{ss_batch_key}/H{wepp_id}.pass.dat\n"
            }
            TemplateName::Flowpath => "{fp}.slp\np{wepp_id}.cli\n{sim_years}\n",
            TemplateName::SsFlowpath => "{runs_dir}/p{wepp_id}.cli\n{fp}.slp\n",
            TemplateName::Watershed => "m\n{sub_n}  # hillslopes{hillslopes_block}\n{sim_years}\n",
            TemplateName::SsWatershed => "m\n{sub_n}{hillslopes_block}\n",
            TemplateName::SsBatchWatershed => {
                "m\n{sub_n}{hillslopes_block}\npw0.{ss_batch_id}.cli\n{ss_batch_key}\n"
            }
        };
        fs::write(dir.join(name.file_name()), body).expect("write template");
    }
}

/// Install a shell script standing in for WEPP: it echoes its stdin, then
/// prints `final_line`.
#[cfg(unix)]
pub fn install_fake_wepp(bin_dir: &Path, name: &str, final_line: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    fs::create_dir_all(bin_dir).expect("create bin dir");
    let path = bin_dir.join(name);
    let script = format!("#!/bin/sh\ncat\necho 'progress on stderr' 1>&2\necho '{final_line}'\n");
    fs::write(&path, script).expect("write fake wepp");
    let mut perms = fs::metadata(&path).expect("metadata").permissions();
    perms.set_mode(0o755);
    fs::set_permissions(&path, perms).expect("chmod fake wepp");
    path
}

