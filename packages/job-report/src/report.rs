//! CSV report sink.

use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::Result;
use crate::summary::ReportRow;

/// Report columns, in the order [`ReportRow`] serializes its fields.
pub const COLUMNS: [&str; 21] = [
    "id",
    "name",
    "playbook",
    "description",
    "inventory",
    "project",
    "date",
    "time",
    "organization",
    "exe_user",
    "total_hosts",
    "success",
    "unreachable",
    "failed",
    "skipped",
    "rescued",
    "ignored",
    "canceled",
    "inventory_failed",
    "project_failed",
    "ansible_failed",
];

/// Destination for finished report rows.
pub trait ReportSink {
    /// Append `rows` in order. A failure is fatal to the run.
    fn append(&mut self, rows: &[ReportRow]) -> Result<()>;
}

/// Appends rows to a CSV file that starts with a fixed header line.
#[derive(Debug)]
pub struct ReportWriter {
    path: PathBuf,
}

impl ReportWriter {
    /// Create (or truncate) the report file and write the header.
    ///
    /// Missing parent directories are created.
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, format!("{}\n", COLUMNS.join(",")))?;

        debug!(path = %path.display(), "Report file created");
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ReportSink for ReportWriter {
    fn append(&mut self, rows: &[ReportRow]) -> Result<()> {
        let file = OpenOptions::new().append(true).open(&self.path)?;
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);

        for row in rows {
            writer.serialize(row)?;
        }
        writer.flush()?;

        Ok(())
    }
}
