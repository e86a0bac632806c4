//! Flat text log of failed lookups and downloads.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};

pub const DEFAULT_LOG_FILE: &str = "download_log.txt";

/// Appends `timestamp - message` lines to a file.
///
/// Failures to write are reported through `log` and otherwise ignored, so a
/// read-only directory never turns a reported error into a different one.
#[derive(Debug, Clone)]
pub struct ErrorLog {
    path: PathBuf,
}

impl ErrorLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn record(&self, message: &str) {
        log::error!("{}", message);
        let line = format_entry(Local::now(), message);
        let result = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .and_then(|mut file| file.write_all(line.as_bytes()));

        if let Err(e) = result {
            log::warn!("could not write to {}: {}", self.path.display(), e);
        }
    }
}

impl Default for ErrorLog {
    fn default() -> Self {
        Self::new(DEFAULT_LOG_FILE)
    }
}

fn format_entry(at: DateTime<Local>, message: &str) -> String {
    // one entry per line
    let message = message.replace('\n', " | ");
    format!("{} - {}\n", at.format("%Y-%m-%d %H:%M:%S,%3f"), message)
}
