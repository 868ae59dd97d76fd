//! Command-line access to the metquery climate service.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::debug;

use metquery::{BoundingBox, DailyQuery, Dataset, Method, MetqueryClient, MetqueryError, logging};

/// Exit code when the service reports its rate limit.
const RATE_LIMITED: i32 = 4;

#[derive(Parser)]
#[command(name = "metquery", version, about = "Query the metquery climate service")]
struct Cli {
    /// TOML config file. Defaults apply when it does not exist.
    #[arg(long, global = true, default_value = "metquery.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print 12 monthly values for a point as a JSON array (missing months are null).
    Monthly {
        /// Dataset id, e.g. `prism/ppt`.
        dataset: Dataset,
        #[arg(long, allow_hyphen_values = true)]
        lng: f64,
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,
        #[arg(long, value_enum, default_value_t = Method::Cubic)]
        method: Method,
        /// Units string, e.g. `in`, `f`, `dailyin`. Omit for the dataset default.
        #[arg(long)]
        units: Option<String>,
    },
    /// Download daily data for a bounding box into a file.
    Daily {
        #[arg(long)]
        dataset: String,
        /// `west,south,east,north`
        #[arg(long, allow_hyphen_values = true)]
        bbox: BoundingBox,
        #[arg(long)]
        year: Option<i32>,
        #[arg(long)]
        start_year: Option<i32>,
        #[arg(long)]
        end_year: Option<i32>,
        #[arg(long)]
        dst: PathBuf,
    },
    /// List the monthly dataset ids.
    Datasets,
}

fn main() {
    logging::init();
    if let Err(err) = run() {
        eprintln!("{:#}", err);
        std::process::exit(exit_code(&err));
    }
}

fn exit_code(err: &anyhow::Error) -> i32 {
    match err.downcast_ref::<MetqueryError>() {
        Some(MetqueryError::RateLimited { .. }) => RATE_LIMITED,
        _ => 1,
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Command::Datasets => {
            for dataset in Dataset::ALL {
                println!("{dataset}");
            }
            Ok(())
        }
        Command::Monthly {
            dataset,
            lng,
            lat,
            method,
            units,
        } => {
            let client = client(&cli.config)?;
            let series = client.monthly(dataset, lng, lat, method, units.as_deref())?;
            println!(
                "{}",
                serde_json::to_string(&series).context("serialize monthly values")?
            );
            Ok(())
        }
        Command::Daily {
            dataset,
            bbox,
            year,
            start_year,
            end_year,
            dst,
        } => {
            let client = client(&cli.config)?;
            let query = DailyQuery {
                dataset,
                bbox,
                year,
                start_year,
                end_year,
            };
            let bytes = client.download_daily(&query, &dst)?;
            println!("{} bytes -> {}", bytes, dst.display());
            Ok(())
        }
    }
}

fn client(config_path: &std::path::Path) -> Result<MetqueryClient> {
    let config = metquery::load_config(config_path)?;
    debug!(base_url = %config.base_url, "loaded config");
    MetqueryClient::new(&config)
}
