//! Stable exit codes for the `wepp-runner` binary.

/// Command succeeded.
pub const OK: i32 = 0;
/// Invalid arguments, config, templates or other errors.
pub const INVALID: i32 = 1;
/// A required input artifact was missing; the simulator was not started.
pub const MISSING_INPUT: i32 = 2;
/// The simulator ran but never printed its success marker.
pub const SIMULATION_FAILED: i32 = 3;
