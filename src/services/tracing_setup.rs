//! Global tracing subscriber for the binary
//!
//! The terminal owns stdout, so logs go to a file. `RUST_LOG` overrides the
//! default `info` filter.

use std::fs::File;
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Default log location: `<tmp>/manview.log`
pub fn default_log_path() -> PathBuf {
    std::env::temp_dir().join("manview.log")
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Install the global subscriber writing to `log_file`
///
/// Returns false (and installs nothing) when the file can't be created or a
/// subscriber is already set; the viewer runs fine without logs.
pub fn init_global(log_file: &Path) -> bool {
    let file = match File::create(log_file) {
        Ok(file) => file,
        Err(e) => {
            eprintln!("Warning: cannot open log file {}: {}", log_file.display(), e);
            return false;
        }
    };

    tracing_subscriber::registry()
        .with(env_filter())
        .with(
            fmt::layer()
                .with_writer(std::sync::Mutex::new(file))
                .with_ansi(false)
                .with_target(true),
        )
        .try_init()
        .is_ok()
}
