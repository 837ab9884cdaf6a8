//! Logging setup.
//!
//! Diagnostics go to stderr so stdout stays clean for JSON output.
//! `RUST_LOG` wins over the verbosity flags when set.

use crate::error::{ReadyError, Result};
use std::sync::Once;
use tracing_subscriber::EnvFilter;

/// Initialize the global subscriber for the binary.
///
/// Verbosity: 0 = warn, 1 = info, 2 = debug, 3+ = trace. `quiet` forces
/// error-only output. `json` switches to one JSON object per line.
///
/// # Errors
///
/// Returns an error if a global subscriber is already installed.
pub fn init_logging(verbose: u8, quiet: bool, json: bool) -> Result<()> {
    let default_level = if quiet {
        "error"
    } else {
        match verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("beads_ready={default_level}")));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(verbose >= 2);

    let installed = if json {
        builder.json().try_init()
    } else {
        builder.without_time().try_init()
    };

    installed.map_err(|e| ReadyError::Config(format!("logging: {e}")))
}

/// Initialize logging for tests (idempotent, captured by the test harness).
pub fn init_test_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("beads_ready=debug"));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init();
    });
}
