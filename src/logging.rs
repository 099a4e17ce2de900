//! Tracing setup. The TUI owns the terminal, so it logs to a file; the
//! one-shot subcommands log to stderr.

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

use crate::error::{Context, Result, simple_error};

/// `RUST_LOG` wins; otherwise `-v` count picks the level for this crate.
fn env_filter(verbosity: u8) -> EnvFilter {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(format!("user_panel={level}")))
}

/// Append log lines to `path`, creating parent directories as needed.
pub fn init_file(path: &Path, verbosity: u8) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).with_ctx(|| format!("creating {}", parent.display()))?;
        }
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_ctx(|| format!("opening log file {}", path.display()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter(verbosity))
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()
        .map_err(|e| simple_error(format!("installing file logger: {e}")))
}

pub fn init_stderr(verbosity: u8) -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter(verbosity))
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|e| simple_error(format!("installing stderr logger: {e}")))
}
