//! Logging setup: append to a log file under the XDG state directory, or to stderr.

use anyhow::{anyhow, Context, Result};
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::fmt::format::{DefaultFields, Format};
use tracing_subscriber::fmt::SubscriberBuilder;
use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "info,mdlocal=debug,mdlocal_core=debug";
const LOG_FILE: &str = "mdlocal.log";

/// Path of the log file: `~/.local/state/mdlocal/mdlocal.log`.
pub fn log_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("mdlocal")?;
    Ok(xdg_dirs.place_state_file(LOG_FILE)?)
}

/// Opens `path` for appending, creating missing parent directories.
pub fn open_log_file(path: &Path) -> io::Result<File> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)?;
    }
    fs::OpenOptions::new().create(true).append(true).open(path)
}

/// Installs the global subscriber writing to [`log_path`] and returns that path.
/// Errors leave no subscriber installed, so the caller can fall back to
/// [`init_logging_stderr`].
pub fn init_logging() -> Result<PathBuf> {
    let path = log_path()?;
    let file = open_log_file(&path)
        .with_context(|| format!("cannot open log file {}", path.display()))?;

    subscriber()
        .with_writer(Mutex::new(file))
        .try_init()
        .map_err(|e| anyhow!("cannot install log subscriber: {e}"))?;

    tracing::info!(path = %path.display(), "mdlocal logging initialized");
    Ok(path)
}

/// Installs the global subscriber writing to stderr.
pub fn init_logging_stderr() {
    // Already initialized is the only failure; keep the existing subscriber.
    let _ = subscriber().with_writer(io::stderr).try_init();
}

fn subscriber() -> SubscriberBuilder<DefaultFields, Format, EnvFilter> {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_ansi(false)
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}
