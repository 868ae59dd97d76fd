//! Launching the simulator and reading its merged output line by line.

use std::fs::File;
use std::io::{self, BufRead, BufReader, Read};
use std::path::PathBuf;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};

use anyhow::{Context, Result, anyhow};
use tracing::{debug, error, instrument, warn};

/// Parameters for one simulator launch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchRequest {
    /// Absolute path of the simulator binary.
    pub program: PathBuf,
    /// Working directory of the child process.
    pub workdir: PathBuf,
    /// File whose contents become the child's stdin.
    pub stdin_path: PathBuf,
}

/// Abstraction over how the simulator is started.
///
/// `launch` returns the child's stdout and stderr merged into one line stream.
/// The stream ends only after the output is drained and the process has
/// exited. Tests use scripted launchers that yield canned lines without
/// spawning anything.
pub trait Launcher {
    type Lines: Iterator<Item = Result<String>>;

    fn launch(&self, request: &LaunchRequest) -> Result<Self::Lines>;
}

/// Launcher that spawns the simulator as a child process.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessLauncher;

impl Launcher for ProcessLauncher {
    type Lines = ChildLines;

    #[instrument(skip_all, fields(program = %request.program.display(), workdir = %request.workdir.display()))]
    fn launch(&self, request: &LaunchRequest) -> Result<ChildLines> {
        let stdin = File::open(&request.stdin_path)
            .with_context(|| format!("open run file {}", request.stdin_path.display()))?;

        let mut cmd = Command::new(&request.program);
        cmd.current_dir(&request.workdir)
            .stdin(Stdio::from(stdin))
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        debug!("spawning child process");
        let mut child = match cmd.spawn() {
            Ok(c) => c,
            Err(e) => {
                error!(err = %e, "failed to spawn simulator");
                return Err(e)
                    .with_context(|| format!("spawn simulator {}", request.program.display()));
            }
        };

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| anyhow!("stdout was not piped"))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| anyhow!("stderr was not piped"))?;

        let (tx, rx) = mpsc::channel();
        let readers = vec![spawn_reader(stdout, tx.clone()), spawn_reader(stderr, tx)];

        Ok(ChildLines {
            child: Some(child),
            rx,
            readers,
        })
    }
}

/// Merged stdout/stderr lines of a running child, in arrival order.
///
/// Yields `None` once both pipes are closed and the child has been reaped.
/// Dropping it early still drains the output and waits for the child, so an
/// abandoned run never leaves a zombie process behind.
pub struct ChildLines {
    child: Option<Child>,
    rx: Receiver<io::Result<String>>,
    readers: Vec<JoinHandle<()>>,
}

impl ChildLines {
    /// Discard unread output, join the readers and reap the child.
    ///
    /// Returns `None` if the child was already reaped.
    fn finish(&mut self) -> Option<io::Result<ExitStatus>> {
        while self.rx.recv().is_ok() {}
        for reader in self.readers.drain(..) {
            if reader.join().is_err() {
                warn!("output reader thread panicked");
            }
        }
        let mut child = self.child.take()?;
        Some(child.wait())
    }
}

impl Iterator for ChildLines {
    type Item = Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Ok(line) = self.rx.recv() {
            return Some(line.context("read simulator output"));
        }

        // Both readers hung up: output is drained.
        match self.finish()? {
            Ok(status) => {
                debug!(exit_code = ?status.code(), "simulator exited");
                None
            }
            Err(e) => Some(Err(e).context("wait for simulator")),
        }
    }
}

impl Drop for ChildLines {
    fn drop(&mut self) {
        if let Some(Err(e)) = self.finish() {
            warn!(err = %e, "failed to reap simulator");
        }
    }
}

fn spawn_reader<R: Read + Send + 'static>(
    reader: R,
    tx: Sender<io::Result<String>>,
) -> JoinHandle<()> {
    thread::spawn(move || {
        let mut reader = BufReader::new(reader);
        loop {
            let mut buf = Vec::new();
            match reader.read_until(b'\n', &mut buf) {
                Ok(0) => break,
                Ok(_) => {
                    let line = String::from_utf8_lossy(&buf).into_owned();
                    if tx.send(Ok(line)).is_err() {
                        break;
                    }
                }
                Err(e) => {
                    let _ = tx.send(Err(e));
                    break;
                }
            }
        }
    })
}
