use std::{
    fmt::Debug,
    path::{Path, PathBuf},
};

use chrono::Utc;
use log::*;
use tokio_util::sync::CancellationToken;

use super::{errors::IngestError, order_flow_api::OrderFlowApi, OrderFlowError};
use crate::{
    csv_ingest::{open_batches, ColumnMap, CsvIngestError, InvalidRowsWriter, DEFAULT_BATCH_SIZE},
    db::traits::OrderManagement,
    events::{EventPublisher, EventSource},
    intake::{BulkIntakeMessage, FileStager, ObjectPath, ObjectStore, QueueDelivery},
    inventory::InventoryService,
};

#[derive(Debug, Clone)]
pub struct IngestConfig {
    /// Where downloaded files are staged before parsing.
    pub staging_dir: PathBuf,
    /// Where invalid-rows files are written. This directory is served to users.
    pub public_dir: PathBuf,
    /// The URL prefix under which `public_dir` is served.
    pub public_base_url: String,
    pub batch_size: usize,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            staging_dir: PathBuf::from("data/staging"),
            public_dir: PathBuf::from("public"),
            public_base_url: "http://localhost:8080/public".to_string(),
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestReport {
    pub rows: usize,
    pub persisted: usize,
    /// Rows that were stored, but whose order.created event could not be published.
    pub unannounced: usize,
    pub invalid: usize,
    pub invalid_rows_file: Option<PathBuf>,
    pub download_url: Option<String>,
    /// False if reading stopped before the end of the file.
    pub completed: bool,
    pub cancelled: bool,
}

/// What the queue consumer should do with a delivery once it has been handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Remove the message from the queue.
    Ack,
    /// Leave the message alone, so that it is redelivered after its visibility timeout.
    Abandon,
}

/// Turns queued bulk uploads into orders.
#[derive(Clone)]
pub struct BulkIngestApi<S, B, I, E> {
    stager: FileStager<S>,
    orders: OrderFlowApi<B, I, E>,
    config: IngestConfig,
}

impl<S, B, I, E> Debug for BulkIngestApi<S, B, I, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "BulkIngestApi")
    }
}

impl<S, B, I, E> BulkIngestApi<S, B, I, E>
where
    S: ObjectStore,
    B: OrderManagement,
    I: InventoryService,
    E: EventPublisher,
{
    pub fn new(store: S, orders: OrderFlowApi<B, I, E>, config: IngestConfig) -> Self {
        let stager = FileStager::new(store, config.staging_dir.clone());
        Self { stager, orders, config }
    }

    pub fn config(&self) -> &IngestConfig {
        &self.config
    }

    /// Handles one queue delivery and decides whether it should be acknowledged.
    ///
    /// Messages that can never succeed (undecodable bodies, files without the required columns) are acknowledged.
    /// Messages whose file could not be downloaded, or whose ingestion was interrupted by shutdown, are abandoned so
    /// that the queue redelivers them.
    pub async fn handle_delivery(&self, delivery: &QueueDelivery, shutdown: &CancellationToken) -> Disposition {
        let message = match BulkIntakeMessage::from_bytes(&delivery.body) {
            Ok(m) => m,
            Err(e) => {
                error!("🧾️ Discarding undecodable intake message {}. {e}", delivery.receipt);
                return Disposition::Ack;
            },
        };
        match self.process_message(&message, shutdown).await {
            Ok(report) if report.cancelled => {
                info!("🧾️ Ingestion of s3://{}/{} was interrupted. It will be redelivered", message.bucket, message.key);
                Disposition::Abandon
            },
            Ok(_) => Disposition::Ack,
            Err(IngestError::Stage(e)) => {
                warn!("🧾️ Could not stage s3://{}/{}. {e}. Leaving it for redelivery", message.bucket, message.key);
                Disposition::Abandon
            },
            Err(IngestError::Csv(e)) => {
                error!("🧾️ Could not ingest s3://{}/{}. {e}", message.bucket, message.key);
                Disposition::Ack
            },
        }
    }

    /// Downloads the referenced file and ingests it. The staged copy is removed afterwards.
    pub async fn process_message(
        &self,
        message: &BulkIntakeMessage,
        shutdown: &CancellationToken,
    ) -> Result<IngestReport, IngestError> {
        let object = message.object_path();
        let staged = self.stager.stage(&object).await?;
        let result = self.ingest_file(&staged, &object, shutdown).await;
        if let Err(e) = tokio::fs::remove_file(&staged).await {
            debug!("🧾️ Could not remove staged file {}. {e}", staged.display());
        }
        Ok(result?)
    }

    /// Parses a staged file batch by batch, and sends each row through validation, storage and publication.
    ///
    /// Rows that fail to parse, validate or store are copied to the invalid-rows file, which is flushed after every
    /// batch. A read error ends the run early, but everything ingested until then is kept.
    pub async fn ingest_file(
        &self,
        path: &Path,
        source: &ObjectPath,
        shutdown: &CancellationToken,
    ) -> Result<IngestReport, CsvIngestError> {
        let mut stream = open_batches(path.to_path_buf(), self.config.batch_size).await?;
        let columns = ColumnMap::from_headers(stream.headers())?;
        let mut invalid =
            InvalidRowsWriter::new(&self.config.public_dir, source.file_name(), stream.headers().to_vec(), Utc::now());
        let mut report = IngestReport::default();
        info!("🧾️ Ingesting {source}");
        loop {
            let next = tokio::select! {
                biased;
                _ = shutdown.cancelled() => {
                    report.cancelled = true;
                    break;
                },
                next = stream.next_batch() => next,
            };
            let batch = match next {
                Some(Ok(batch)) => batch,
                Some(Err(e)) => {
                    warn!("🧾️ Stopped reading {source} after {} rows. {e}", report.rows);
                    break;
                },
                None => {
                    report.completed = true;
                    break;
                },
            };
            for record in batch {
                report.rows += 1;
                let order = match columns.map_row(&record) {
                    Ok(order) => order,
                    Err(e) => {
                        debug!("🧾️ Row {} of {source} is invalid. {e}", line_of(&record));
                        invalid.record(&record)?;
                        continue;
                    },
                };
                match self.orders.process_new_order(order, EventSource::BulkIntake).await {
                    Ok(_) => report.persisted += 1,
                    Err(OrderFlowError::Publish { .. }) => {
                        report.persisted += 1;
                        report.unannounced += 1;
                    },
                    Err(e) => {
                        debug!("🧾️ Row {} of {source} was rejected. {e}", line_of(&record));
                        invalid.record(&record)?;
                    },
                }
            }
            invalid.flush()?;
        }
        report.invalid = invalid.rows_written();
        report.invalid_rows_file = invalid.finish()?;
        if let Some(file) = report.invalid_rows_file.as_ref().and_then(|p| p.file_name()).and_then(|f| f.to_str()) {
            let url = format!("{}/{file}", self.config.public_base_url.trim_end_matches('/'));
            info!("🧾️ {} rows of {source} could not be ingested. Download them from {url}", report.invalid);
            report.download_url = Some(url);
        }
        info!(
            "🧾️ Finished {source}. {} rows read, {} orders stored, {} invalid{}",
            report.rows,
            report.persisted,
            report.invalid,
            if report.completed { "" } else { " (incomplete)" }
        );
        Ok(report)
    }
}

fn line_of(record: &csv::StringRecord) -> u64 {
    record.position().map(|p| p.line()).unwrap_or_default()
}
