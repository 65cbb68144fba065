//! File-save collaborator for CSV exports.

use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::NaiveDate;

use crate::error::{Error, Result};
use crate::format::format_iso_date;

/// Builds `{prefix}_{YYYY-MM-DD}.csv`.
pub fn export_filename(prefix: &str, today: NaiveDate) -> String {
    format!("{prefix}_{}.csv", format_iso_date(today))
}

/// Destination for an exported payload.
pub trait ExportSink {
    /// Saves `payload` under `filename` and returns where it landed.
    ///
    /// # Errors
    ///
    /// Returns an error if the payload could not be stored. Callers do not
    /// retry.
    fn save(&mut self, filename: &str, payload: &str) -> Result<PathBuf>;
}

/// Writes exports as files inside one directory.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl ExportSink for DirectorySink {
    fn save(&mut self, filename: &str, payload: &str) -> Result<PathBuf> {
        if !self.dir.is_dir() {
            return Err(Error::ExportDirNotFound(self.dir.clone()));
        }
        let path = self.dir.join(filename);
        let file = File::create(&path)?;
        let mut buf = io::BufWriter::new(file);
        buf.write_all(payload.as_bytes())?;
        buf.flush()?;
        Ok(path)
    }
}

/// Keeps exports in memory instead of writing files.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    pub saved: Vec<(String, String)>,
}

impl ExportSink for MemorySink {
    fn save(&mut self, filename: &str, payload: &str) -> Result<PathBuf> {
        self.saved.push((filename.to_string(), payload.to_string()));
        Ok(PathBuf::from(filename))
    }
}
