//! Deterministic, pure logic shared by the run-file writer and the simulator.
//!
//! Core modules must be free of I/O side effects. They derive names, paths and
//! rendered text from typed inputs and are tested in isolation.

pub mod browse;
pub mod plan;
pub mod reldir;
pub mod template;
pub mod types;
