//! I/O helpers: templates on disk, binary lookup, the simulator process and
//! status publishing.

pub mod binary;
pub mod process;
pub mod status;
pub mod templates;
