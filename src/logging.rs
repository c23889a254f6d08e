use std::fs::{self, OpenOptions};
use std::path::Path;
use std::sync::Mutex;

use thiserror::Error;
use tracing_subscriber::{fmt, prelude::*, util::TryInitError, EnvFilter};

/// Environment variable holding the filter directives
pub const LOG_ENV: &str = "COOKFINITY_LOG";
pub const DEFAULT_DIRECTIVE: &str = "cookfinity=info";

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("cannot open log file: {0}")]
    Io(#[from] std::io::Error),
    #[error("a global subscriber is already installed: {0}")]
    Init(#[from] TryInitError),
}

pub fn env_filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE))
}

/// Sends all logging to `path`. The terminal belongs to the UI, so nothing
/// is ever written to stdout or stderr.
pub fn init_file_logging(path: &Path) -> Result<(), LoggingError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(path)?;

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .with_thread_names(true),
        )
        .with(env_filter())
        .try_init()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn logs_land_in_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("logs").join("cookfinity.log");
        init_file_logging(&path).unwrap();

        tracing::info!(target: "cookfinity::logging", "kitchen open");
        let text = fs::read_to_string(&path).unwrap();
        assert!(text.contains("kitchen open"));

        assert!(matches!(
            init_file_logging(&path),
            Err(LoggingError::Init(_))
        ));
    }
}
