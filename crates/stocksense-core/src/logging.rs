//! Subscriber setup shared by the binaries: stderr plus an append-only log file.

use std::fs::{self, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

pub const DEFAULT_LOG_DIR: &str = "logs";
pub const LOG_FILE_NAME: &str = "stocksense.log";
pub const DEFAULT_FILTER: &str = "stocksense=info";

/// Install the global subscriber. `RUST_LOG` overrides `default_filter`.
///
/// Returns the log file path. Fails if the directory cannot be created or a
/// subscriber is already installed.
pub fn init(log_dir: &Path, default_filter: &str) -> io::Result<PathBuf> {
    let path = open_log_file(log_dir)?;
    let file = OpenOptions::new().create(true).append(true).open(&path)?;

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(io::stderr))
        .with(fmt::layer().with_writer(Mutex::new(file)).with_ansi(false))
        .try_init()
        .map_err(io::Error::other)?;

    Ok(path)
}

fn open_log_file(log_dir: &Path) -> io::Result<PathBuf> {
    fs::create_dir_all(log_dir)?;
    Ok(log_dir.join(LOG_FILE_NAME))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_directory_is_created() {
        let temp = tempfile::tempdir().expect("temp dir");
        let dir = temp.path().join("nested").join("logs");

        let path = open_log_file(&dir).expect("directory created");

        assert!(dir.is_dir());
        assert_eq!(path, dir.join(LOG_FILE_NAME));
    }
}
