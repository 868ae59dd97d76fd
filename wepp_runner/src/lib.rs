//! Driver for the WEPP erosion simulator.
//!
//! Generates WEPP run-control files from templates and runs the simulator
//! binary against prepared input directories, deciding success by the marker
//! line WEPP prints on completion.
//!
//! - **[`core`]**: pure logic (artifact naming, run plans, template rendering,
//!   browse links). No I/O.
//! - **[`io`]**: side effects (binary lookup, process launch, template files,
//!   status publishing). Isolated behind traits so tests can script them.
//!
//! [`make`] and [`run`] coordinate the two to implement the run-file and
//! simulation operations.

pub mod config;
pub mod core;
pub mod error;
pub mod exit_codes;
pub mod io;
pub mod logging;
pub mod make;
pub mod run;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use config::{WeppConfig, load_config};
pub use crate::core::reldir::{InputDirs, RelDir};
pub use crate::core::types::{RunKey, RunOutcome};
pub use error::RunError;
pub use io::status::{StatusChannel, StatusPublisher, TracingPublisher};
pub use make::RunFileWriter;
pub use run::{FlowpathRun, HillslopeRun, Simulator, WatershedRun};
