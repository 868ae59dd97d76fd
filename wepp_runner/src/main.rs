//! Command-line driver for WEPP run files and simulations.

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use tracing::debug;

use wepp_runner::exit_codes;
use wepp_runner::io::binary::available_binaries;
use wepp_runner::{
    FlowpathRun, HillslopeRun, InputDirs, RelDir, RunError, RunFileWriter, RunOutcome, Simulator,
    StatusChannel, TracingPublisher, WatershedRun, WeppConfig, logging,
};

#[derive(Parser)]
#[command(name = "wepp-runner", version, about = "Write WEPP run files and run the simulator")]
struct Cli {
    /// TOML config file. Defaults apply when it does not exist.
    #[arg(long, global = true, default_value = "wepp.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Write one run-control file from its template.
    Make {
        #[command(subcommand)]
        kind: MakeKind,
    },
    /// Run the simulator for one hillslope, flowpath or watershed.
    Run {
        #[command(subcommand)]
        kind: RunKind,
    },
    /// List binary names accepted by `--binary`.
    Binaries,
}

/// Relative slope/climate directories; each must be empty or end with `/`.
#[derive(Args, Debug, Default)]
struct DirArgs {
    #[arg(long)]
    slp_dir: Option<RelDir>,
    #[arg(long)]
    cli_dir: Option<RelDir>,
}

impl DirArgs {
    fn into_dirs(self) -> InputDirs {
        InputDirs {
            slp_dir: self.slp_dir.unwrap_or_default(),
            cli_dir: self.cli_dir.unwrap_or_default(),
        }
    }
}

#[derive(Subcommand)]
enum MakeKind {
    Hillslope {
        #[arg(long)]
        wepp_id: u32,
        #[arg(long)]
        sim_years: u32,
        #[arg(long)]
        runs_dir: PathBuf,
        /// Use the revegetation template.
        #[arg(long)]
        reveg: bool,
        #[command(flatten)]
        dirs: DirArgs,
    },
    SsHillslope {
        #[arg(long)]
        wepp_id: u32,
        #[arg(long)]
        runs_dir: PathBuf,
        #[command(flatten)]
        dirs: DirArgs,
    },
    SsBatchHillslope {
        #[arg(long)]
        wepp_id: u32,
        #[arg(long)]
        runs_dir: PathBuf,
        #[arg(long)]
        ss_batch_key: String,
        #[arg(long)]
        ss_batch_id: u32,
        #[command(flatten)]
        dirs: DirArgs,
    },
    Flowpath {
        #[arg(long)]
        fp: String,
        #[arg(long)]
        wepp_id: u32,
        #[arg(long)]
        sim_years: u32,
        #[arg(long)]
        fp_runs_dir: PathBuf,
    },
    SsFlowpath {
        #[arg(long)]
        fp: String,
        #[arg(long)]
        wepp_id: u32,
        #[arg(long)]
        runs_dir: PathBuf,
    },
    Watershed {
        #[arg(long)]
        sim_years: u32,
        /// Comma-separated hillslope ids.
        #[arg(long, value_delimiter = ',', required = true)]
        wepp_ids: Vec<u32>,
        #[arg(long)]
        runs_dir: PathBuf,
    },
    /// Watershed run stitching pass files from other scenarios.
    WatershedOmniContrasts {
        #[arg(long)]
        sim_years: u32,
        /// Comma-separated pass-file paths without `.pass.dat`.
        #[arg(long, value_delimiter = ',', required = true)]
        wepp_path_ids: Vec<String>,
        #[arg(long)]
        runs_dir: PathBuf,
    },
    SsWatershed {
        #[arg(long, value_delimiter = ',', required = true)]
        wepp_ids: Vec<u32>,
        #[arg(long)]
        runs_dir: PathBuf,
    },
    SsBatchWatershed {
        #[arg(long, value_delimiter = ',', required = true)]
        wepp_ids: Vec<u32>,
        #[arg(long)]
        runs_dir: PathBuf,
        #[arg(long)]
        ss_batch_key: String,
        #[arg(long)]
        ss_batch_id: u32,
    },
}

#[derive(Subcommand)]
enum RunKind {
    Hillslope {
        #[arg(long)]
        wepp_id: u32,
        #[arg(long)]
        runs_dir: PathBuf,
        /// Run single-storm batch `<id>` instead of the continuous simulation.
        #[arg(long)]
        ss_batch_id: Option<u32>,
        #[arg(long)]
        binary: Option<String>,
        #[command(flatten)]
        dirs: DirArgs,
    },
    Flowpath {
        #[arg(long)]
        fp: String,
        #[arg(long)]
        wepp_id: u32,
        #[arg(long)]
        runs_dir: PathBuf,
        #[arg(long)]
        fp_runs_dir: PathBuf,
        #[arg(long)]
        binary: Option<String>,
    },
    Watershed {
        #[arg(long)]
        runs_dir: PathBuf,
        #[arg(long)]
        ss_batch_id: Option<u32>,
        #[arg(long)]
        binary: Option<String>,
        /// Forward each output line to this status channel. Lines are logged
        /// to stderr under the `wepp_runner::status` target at `info`.
        #[arg(long)]
        status_channel: Option<String>,
    },
}

fn main() {
    logging::init();
    if let Err(err) = run() {
        eprintln!("{:#}", err);
        std::process::exit(exit_code(&err));
    }
}

fn exit_code(err: &anyhow::Error) -> i32 {
    match err.downcast_ref::<RunError>() {
        Some(RunError::MissingArtifact { .. }) => exit_codes::MISSING_INPUT,
        Some(RunError::SimulationFailed { .. }) => exit_codes::SIMULATION_FAILED,
        _ => exit_codes::INVALID,
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let config = load(&cli.config)?;
    match cli.command {
        Command::Make { kind } => {
            let path = make(&RunFileWriter::from_config(&config), kind)?;
            println!("{}", path.display());
        }
        Command::Run { kind } => {
            let outcome = simulate(&Simulator::new(config), kind)?;
            println!("{} completed in {:.2}s", outcome.key, outcome.elapsed.as_secs_f64());
        }
        Command::Binaries => {
            for name in available_binaries(&config.bin_dir)? {
                println!("{name}");
            }
        }
    }
    Ok(())
}

fn load(path: &Path) -> Result<WeppConfig> {
    let config = wepp_runner::load_config(path)?;
    debug!(bin_dir = %config.bin_dir.display(), template_dir = %config.template_dir.display(), "loaded config");
    Ok(config)
}

fn make(writer: &RunFileWriter, kind: MakeKind) -> Result<PathBuf> {
    match kind {
        MakeKind::Hillslope {
            wepp_id,
            sim_years,
            runs_dir,
            reveg,
            dirs,
        } => writer.make_hillslope_run(wepp_id, sim_years, &runs_dir, reveg, &dirs.into_dirs()),
        MakeKind::SsHillslope {
            wepp_id,
            runs_dir,
            dirs,
        } => writer.make_ss_hillslope_run(wepp_id, &runs_dir, &dirs.into_dirs()),
        MakeKind::SsBatchHillslope {
            wepp_id,
            runs_dir,
            ss_batch_key,
            ss_batch_id,
            dirs,
        } => writer.make_ss_batch_hillslope_run(
            wepp_id,
            &runs_dir,
            &ss_batch_key,
            ss_batch_id,
            &dirs.into_dirs(),
        ),
        MakeKind::Flowpath {
            fp,
            wepp_id,
            sim_years,
            fp_runs_dir,
        } => writer.make_flowpath_run(&fp, wepp_id, sim_years, &fp_runs_dir),
        MakeKind::SsFlowpath {
            fp,
            wepp_id,
            runs_dir,
        } => writer.make_ss_flowpath_run(&fp, wepp_id, &runs_dir),
        MakeKind::Watershed {
            sim_years,
            wepp_ids,
            runs_dir,
        } => writer.make_watershed_run(sim_years, &wepp_ids, &runs_dir),
        MakeKind::WatershedOmniContrasts {
            sim_years,
            wepp_path_ids,
            runs_dir,
        } => writer.make_watershed_omni_contrasts_run(sim_years, &wepp_path_ids, &runs_dir),
        MakeKind::SsWatershed { wepp_ids, runs_dir } => {
            writer.make_ss_watershed_run(&wepp_ids, &runs_dir)
        }
        MakeKind::SsBatchWatershed {
            wepp_ids,
            runs_dir,
            ss_batch_key,
            ss_batch_id,
        } => writer.make_ss_batch_watershed_run(&wepp_ids, &runs_dir, &ss_batch_key, ss_batch_id),
    }
}

fn simulate(sim: &Simulator, kind: RunKind) -> Result<RunOutcome> {
    match kind {
        RunKind::Hillslope {
            wepp_id,
            runs_dir,
            ss_batch_id,
            binary,
            dirs,
        } => {
            let req = HillslopeRun {
                wepp_id,
                runs_dir,
                dirs: dirs.into_dirs(),
                binary,
            };
            match ss_batch_id {
                Some(batch) => sim.run_ss_batch_hillslope(&req, batch),
                None => sim.run_hillslope(&req),
            }
        }
        RunKind::Flowpath {
            fp,
            wepp_id,
            runs_dir,
            fp_runs_dir,
            binary,
        } => sim.run_flowpath(&FlowpathRun {
            fp_id: fp,
            wepp_id,
            runs_dir,
            fp_runs_dir,
            binary,
        }),
        RunKind::Watershed {
            runs_dir,
            ss_batch_id,
            binary,
            status_channel,
        } => {
            let req = WatershedRun { runs_dir, binary };
            let publisher = TracingPublisher;
            let status = status_channel
                .as_deref()
                .map(|channel| StatusChannel::new(channel, &publisher));
            match ss_batch_id {
                Some(batch) => sim.run_ss_batch_watershed(&req, batch, status),
                None => sim.run_watershed(&req, status),
            }
        }
    }
}
