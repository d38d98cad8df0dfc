//! A small `log` backend for hosts embedding the engine.
//!
//! Records go to stderr, and optionally to an append-only file, as
//! `{timestamp} {level} [{target}] {message}`.

use anyhow::{Context, Result};
use chrono::Local;
use log::{LevelFilter, Log, Metadata, Record};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

pub struct PaperLogger {
    level: LevelFilter,
    file: Option<Mutex<File>>,
    log_path: Option<PathBuf>,
}

impl PaperLogger {
    /// A logger writing only to stderr.
    pub fn new(level: LevelFilter) -> Self {
        Self {
            level,
            file: None,
            log_path: None,
        }
    }

    /// A logger that also appends every record to `path`.
    pub fn with_file(level: LevelFilter, path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("Failed to open log file: {}", path.display()))?;
        Ok(Self {
            level,
            file: Some(Mutex::new(file)),
            log_path: Some(path.to_path_buf()),
        })
    }

    pub fn log_path(&self) -> Option<&Path> {
        self.log_path.as_deref()
    }

    /// Installs a stderr logger as the global `log` backend.
    pub fn init(level: LevelFilter) -> Result<()> {
        Self::new(level).install()
    }

    pub fn install(self) -> Result<()> {
        let level = self.level;
        log::set_boxed_logger(Box::new(self))
            .map(|()| log::set_max_level(level))
            .map_err(|e| anyhow::anyhow!("Failed to set logger: {}", e))?;
        log::debug!("paper logger initialized at {}", level);
        Ok(())
    }

    fn format(record: &Record) -> String {
        let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S%.3f");
        format!(
            "{} {} [{}] {}",
            timestamp,
            record.level(),
            record.target(),
            record.args()
        )
    }
}

impl Log for PaperLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let message = Self::format(record);
        if let Some(file) = &self.file {
            if let Ok(mut file) = file.lock() {
                let _ = writeln!(file, "{}", message);
            }
        }
        eprintln!("{}", message);
    }

    fn flush(&self) {
        if let Some(file) = &self.file {
            if let Ok(mut file) = file.lock() {
                let _ = file.flush();
            }
        }
    }
}

/// Marks the start of a named phase in the log.
pub fn log_section(name: &str) {
    let separator = "=".repeat(50);
    log::info!("{}", separator);
    log::info!("SECTION: {}", name);
    log::info!("{}", separator);
}

#[cfg(test)]
mod tests {
    use super::*;
    use log::Level;

    #[test]
    fn test_level_filtering() {
        let logger = PaperLogger::new(LevelFilter::Warn);
        let warn = Metadata::builder().level(Level::Warn).build();
        let debug = Metadata::builder().level(Level::Debug).build();
        assert!(logger.enabled(&warn));
        assert!(!logger.enabled(&debug));
    }

    #[test]
    fn test_file_sink() {
        let path = std::env::temp_dir().join(format!("paper_logger_{}.log", std::process::id()));
        let logger = PaperLogger::with_file(LevelFilter::Info, &path).unwrap();
        assert_eq!(logger.log_path(), Some(path.as_path()));
        logger.log(
            &Record::builder()
                .level(Level::Info)
                .target("scene")
                .args(format_args!("node updated"))
                .build(),
        );
        logger.flush();
        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("INFO [scene] node updated"));
        let _ = std::fs::remove_file(&path);
    }
}
