//! Client for the metquery climate-data service.
//!
//! metquery interpolates gridded climate products (PRISM, Daymet, E-OBS, AGDC)
//! at a single lng/lat point and returns 12 monthly values. This crate builds
//! the request URLs, validates the response shape, and applies the per-dataset
//! missing-value sentinel and unit conversions:
//!
//! - **[`dataset`]** and **[`units`]**: the dataset catalogue and the pure
//!   conversion arithmetic. No I/O.
//! - **[`client`]**: the blocking HTTP client. One GET per call, no retries,
//!   no caching.

pub mod client;
pub mod config;
pub mod dataset;
pub mod error;
pub mod logging;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
pub mod units;

pub use client::{BoundingBox, DailyQuery, MetqueryClient, daily_url, monthly_url};
pub use config::{MetqueryConfig, load_config};
pub use dataset::{Dataset, Method, MonthlySeries, Sentinel};
pub use error::MetqueryError;
