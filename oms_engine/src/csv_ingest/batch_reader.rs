use std::{fs::File, io::Read, path::PathBuf};

use csv::{ReaderBuilder, StringRecord};
use log::*;
use tokio::sync::mpsc;

use super::{sanitize_header, CsvIngestError};

/// Reads a CSV source in batches of at most `batch_size` records. This is a blocking reader.
pub struct CsvBatchReader<R: Read> {
    reader: csv::Reader<R>,
    headers: Vec<String>,
    batch_size: usize,
    done: bool,
}

impl CsvBatchReader<File> {
    pub fn from_path(path: &std::path::Path, batch_size: usize) -> Result<Self, CsvIngestError> {
        let file = File::open(path)
            .map_err(|e| CsvIngestError::OpenFailed { path: path.display().to_string(), reason: e.to_string() })?;
        Self::new(file, batch_size)
    }
}

impl<R: Read> CsvBatchReader<R> {
    /// Reads and sanitises the header row.
    pub fn new(source: R, batch_size: usize) -> Result<Self, CsvIngestError> {
        let mut reader = ReaderBuilder::new().has_headers(true).flexible(true).from_reader(source);
        let headers = reader
            .headers()
            .map_err(|e| CsvIngestError::ReadFailed(e.to_string()))?
            .iter()
            .map(sanitize_header)
            .collect::<Vec<_>>();
        if headers.iter().all(|h| h.is_empty()) {
            return Err(CsvIngestError::MissingHeader);
        }
        Ok(Self { reader, headers, batch_size: batch_size.max(1), done: false })
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Returns the next batch, or `None` once the source is exhausted.
    pub fn next_batch(&mut self) -> Result<Option<Vec<StringRecord>>, CsvIngestError> {
        if self.done {
            return Ok(None);
        }
        let mut batch = Vec::with_capacity(self.batch_size);
        while batch.len() < self.batch_size {
            let mut record = StringRecord::new();
            let more = self.reader.read_record(&mut record).map_err(|e| {
                self.done = true;
                CsvIngestError::ReadFailed(e.to_string())
            })?;
            if !more {
                self.done = true;
                break;
            }
            batch.push(record);
        }
        if batch.is_empty() {
            Ok(None)
        } else {
            Ok(Some(batch))
        }
    }
}

/// The async face of a [`CsvBatchReader`]. Batches are produced on a blocking thread, one step ahead of the consumer.
pub struct CsvBatchStream {
    headers: Vec<String>,
    batches: mpsc::Receiver<Result<Vec<StringRecord>, CsvIngestError>>,
}

impl CsvBatchStream {
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// The next batch of records. After an error, the stream ends.
    pub async fn next_batch(&mut self) -> Option<Result<Vec<StringRecord>, CsvIngestError>> {
        self.batches.recv().await
    }
}

/// Opens the file and starts reading it in the background.
///
/// Dropping the stream stops the reader after its current batch.
pub async fn open_batches(path: PathBuf, batch_size: usize) -> Result<CsvBatchStream, CsvIngestError> {
    let mut reader = tokio::task::spawn_blocking(move || CsvBatchReader::from_path(&path, batch_size))
        .await
        .map_err(|e| CsvIngestError::ReadFailed(e.to_string()))??;
    let headers = reader.headers().to_vec();
    let (tx, rx) = mpsc::channel(1);
    tokio::task::spawn_blocking(move || loop {
        match reader.next_batch() {
            Ok(Some(batch)) => {
                trace!("🧾️ Read a batch of {} rows", batch.len());
                if tx.blocking_send(Ok(batch)).is_err() {
                    break;
                }
            },
            Ok(None) => break,
            Err(e) => {
                let _ = tx.blocking_send(Err(e));
                break;
            },
        }
    });
    Ok(CsvBatchStream { headers, batches: rx })
}
