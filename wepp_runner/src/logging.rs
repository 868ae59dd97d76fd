//! Development-time tracing for the driver.
//!
//! # Separation of Concerns
//!
//! - **Tracing (this module)**: diagnostics via `RUST_LOG`, output to stderr.
//!   Not persisted.
//!
//! - **Run logs (`run`)**: the simulator's own output in `<stem>.err` next to
//!   the run file. Always written, unaffected by `RUST_LOG`.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Filter used when `RUST_LOG` is unset: warnings, plus the status lines
/// [`crate::io::status::TracingPublisher`] emits at `info`.
pub const DEFAULT_FILTER: &str = "warn,wepp_runner::status=info";

/// Initialize tracing subscriber for development logging.
///
/// Reads `RUST_LOG` env var. Defaults to [`DEFAULT_FILTER`] if unset.
/// Output: stderr, compact format.
///
/// # Example
/// ```bash
/// RUST_LOG=wepp_runner=debug wepp-runner run hillslope --wepp-id 7 --runs-dir wepp/runs
/// ```
pub fn init() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .init();
}

#[cfg(test)]
mod tests {
    use std::io::{self, Write};
    use std::sync::{Arc, Mutex};

    use tracing::{debug, info};

    use super::*;
    use crate::io::status::{StatusPublisher, TracingPublisher};

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().expect("capture lock").extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn default_filter_lets_status_lines_through() {
        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::registry()
            .with(EnvFilter::new(DEFAULT_FILTER))
            .with(fmt::layer().with_writer(move || writer.clone()).with_ansi(false));

        tracing::subscriber::with_default(subscriber, || {
            TracingPublisher.publish("ab-cd_wepp", "CHANNEL ROUTING");
            info!("run bookkeeping");
            debug!("step detail");
        });

        let text = String::from_utf8(captured.0.lock().expect("capture lock").clone())
            .expect("utf8 output");
        assert!(text.contains("CHANNEL ROUTING"), "{text}");
        assert!(text.contains("ab-cd_wepp"));
        assert!(!text.contains("run bookkeeping"));
        assert!(!text.contains("step detail"));
    }
}
