//! Tracing setup. The terminal belongs to the UI, so log lines go to a file.

use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "rogsh=info";

/// `<data_local_dir>/rogsh/rogsh.log`.
pub fn default_log_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|dir| dir.join("rogsh").join("rogsh.log"))
}

fn open_log(path: &Path) -> std::io::Result<File> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    OpenOptions::new().create(true).append(true).open(path)
}

/// Installs the global subscriber writing to `path` (or the default log path).
///
/// Returns the file in use, or `None` when logging is off because no file
/// could be opened.
pub fn init(path: Option<PathBuf>) -> Option<PathBuf> {
    let path = path.or_else(default_log_path)?;
    let file = open_log(&path).ok()?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()
        .ok()?;

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "rogsh starting");
    Some(path)
}
