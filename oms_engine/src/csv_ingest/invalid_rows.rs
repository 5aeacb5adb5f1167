use std::{
    fs::File,
    path::{Path, PathBuf},
};

use chrono::{DateTime, Utc};
use csv::{StringRecord, Writer};
use log::*;

use super::CsvIngestError;

/// Collects the rows of one ingestion run that could not be turned into orders.
///
/// The output file is only created when the first row is recorded, so clean runs leave nothing behind. Rows are
/// written verbatim, under the (sanitised) header of the source file.
pub struct InvalidRowsWriter {
    path: PathBuf,
    headers: Vec<String>,
    writer: Option<Writer<File>>,
    rows: usize,
}

impl InvalidRowsWriter {
    /// `source_name` is the name of the file being ingested. Its stem is appended to the timestamped output name.
    pub fn new(dir: &Path, source_name: &str, headers: Vec<String>, now: DateTime<Utc>) -> Self {
        let path = dir.join(Self::file_name(source_name, now));
        Self { path, headers, writer: None, rows: 0 }
    }

    pub fn file_name(source_name: &str, now: DateTime<Utc>) -> String {
        let stem = Path::new(source_name).file_stem().and_then(|s| s.to_str()).unwrap_or("upload");
        format!("invalid_orders_{}_{stem}.csv", now.format("%Y%m%d_%H%M%S"))
    }

    pub fn path(&self) -> &Path {
        self.path.as_path()
    }

    pub fn rows_written(&self) -> usize {
        self.rows
    }

    pub fn record(&mut self, row: &StringRecord) -> Result<(), CsvIngestError> {
        if self.writer.is_none() {
            self.open()?;
        }
        let Some(writer) = self.writer.as_mut() else {
            return Err(CsvIngestError::InvalidRowsOutput("The output file is not open".to_string()));
        };
        writer.write_record(row).map_err(|e| CsvIngestError::InvalidRowsOutput(e.to_string()))?;
        self.rows += 1;
        Ok(())
    }

    /// Pushes everything recorded so far to disk. Called after every batch.
    pub fn flush(&mut self) -> Result<(), CsvIngestError> {
        if let Some(w) = self.writer.as_mut() {
            w.flush().map_err(|e| CsvIngestError::InvalidRowsOutput(e.to_string()))?;
        }
        Ok(())
    }

    /// Flushes and closes the file. Returns its path if any rows were written.
    pub fn finish(mut self) -> Result<Option<PathBuf>, CsvIngestError> {
        self.flush()?;
        match self.writer.take() {
            Some(_) => Ok(Some(self.path)),
            None => Ok(None),
        }
    }

    fn open(&mut self) -> Result<(), CsvIngestError> {
        if let Some(dir) = self.path.parent() {
            std::fs::create_dir_all(dir).map_err(|e| CsvIngestError::InvalidRowsOutput(e.to_string()))?;
        }
        let mut writer = Writer::from_path(&self.path)
            .map_err(|e| CsvIngestError::InvalidRowsOutput(format!("{}: {e}", self.path.display())))?;
        writer.write_record(&self.headers).map_err(|e| CsvIngestError::InvalidRowsOutput(e.to_string()))?;
        debug!("🧾️ Writing invalid rows to {}", self.path.display());
        self.writer = Some(writer);
        Ok(())
    }
}
