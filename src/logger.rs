//! Logging setup.

use chrono::Local;
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use tracing::Level;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::error::{AppError, Result};
use crate::setting::Settings;

/// Log level constants (same scale as `log.level`)
pub const DEBUG: i32 = 10;
pub const INFO: i32 = 20;
pub const WARNING: i32 = 30;
pub const ERROR: i32 = 40;

/// Convert integer log level to tracing Level
pub fn level_from_int(level: i32) -> Level {
    match level {
        i32::MIN..=10 => Level::DEBUG,
        11..=20 => Level::INFO,
        21..=30 => Level::WARN,
        _ => Level::ERROR,
    }
}

/// Initialize the global subscriber from `log.*` settings.
///
/// `RUST_LOG` directives are honoured on top of `log.level`.
pub fn init_logger(settings: &Settings) -> Result<()> {
    let log_level = settings.get_int("log.level").unwrap_or(INFO as i64) as i32;
    let log_console = settings.get_bool("log.console").unwrap_or(true);
    let log_file = settings.get_bool("log.file").unwrap_or(false);
    let log_folder = settings.get_string("log.folder").unwrap_or_else(|| "log".to_string());

    let filter = EnvFilter::from_default_env().add_directive(level_from_int(log_level).into());

    let console_layer = log_console.then(|| {
        fmt::layer()
            .with_target(true)
            .with_thread_ids(false)
            .with_thread_names(false)
            .with_ansi(true)
    });

    let file_layer = if log_file {
        let file = open_log_file(&log_file_path(Path::new(&log_folder)))?;
        Some(fmt::layer().with_writer(std::sync::Mutex::new(file)).with_ansi(false))
    } else {
        None
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| AppError::Logger(e.to_string()))
}

fn open_log_file(path: &Path) -> Result<fs::File> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    Ok(OpenOptions::new().create(true).append(true).open(path)?)
}

/// Log file path for today
pub fn log_file_path(folder: &Path) -> PathBuf {
    let today = Local::now().format("%Y%m%d").to_string();
    folder.join(format!("bar_ingest_{}.log", today))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_from_int() {
        assert_eq!(level_from_int(DEBUG), Level::DEBUG);
        assert_eq!(level_from_int(INFO), Level::INFO);
        assert_eq!(level_from_int(WARNING), Level::WARN);
        assert_eq!(level_from_int(ERROR), Level::ERROR);
        assert_eq!(level_from_int(0), Level::DEBUG);
    }

    #[test]
    fn test_log_file_path() {
        let path = log_file_path(Path::new("log"));
        let name = path.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("bar_ingest_"));
        assert!(name.ends_with(".log"));
        assert_eq!(name.len(), "bar_ingest_YYYYMMDD.log".len());
    }

    #[test]
    fn test_open_log_file_creates_folder() {
        let dir = tempfile::tempdir().unwrap();
        let path = log_file_path(&dir.path().join("nested"));
        open_log_file(&path).unwrap();
        assert!(path.exists());
    }
}
