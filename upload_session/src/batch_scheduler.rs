use std::sync::Arc;

use tracing::{debug, warn};
use upload_client::{ProgressCallback, TransferProgress, UploadClient, UploadClientError};
use upload_types::{FilePayload, FolderId};

use crate::errors::{Result, UploadSessionError};

/// Whether a failed batch halts the ones queued behind it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BatchFailurePolicy {
    /// Stop scheduling after the first failed batch; files already
    /// persisted by earlier batches stay persisted, later batches are
    /// never attempted.
    #[default]
    HaltRemaining,
    /// Keep attempting the remaining batches, collecting every failure.
    ContinueRemaining,
}

/// One bounded slice of the final upload list.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadBatch {
    pub files: Vec<FilePayload>,
    /// Files of the overall upload not covered by this or any earlier
    /// batch. Drives the "N remaining" progress text and nothing else.
    pub remaining_after: usize,
}

/// Progress emitted while a scheduler run moves through its batches.
#[derive(Debug, Clone, PartialEq)]
pub enum BatchEvent {
    /// A batch is about to be submitted.
    Started {
        batch_index: usize,
        files_in_batch: usize,
        remaining_after: usize,
    },
    /// Cumulative byte progress across the whole run, not just the batch
    /// currently on the wire.
    Transfer(TransferProgress),
}

/// Callback receiving [`BatchEvent`]s. Called from the transfer path, so it
/// must be cheap and non-blocking.
pub type BatchEventFn = Arc<dyn Fn(BatchEvent) + Send + Sync + 'static>;

/// A failed batch inside an otherwise settled run.
#[derive(Debug)]
pub struct BatchFailure {
    pub batch_index: usize,
    pub error: UploadClientError,
}

/// What happened to one scheduler run, batch by batch. Per-batch failures
/// land here instead of failing the run as a whole.
#[derive(Debug, Default)]
pub struct BatchRunReport {
    pub batches_planned: usize,
    pub batches_attempted: usize,
    pub files_uploaded: usize,
    pub bytes_uploaded: u64,
    pub failures: Vec<BatchFailure>,
}

impl BatchRunReport {
    pub fn fully_succeeded(&self) -> bool {
        self.failures.is_empty() && self.batches_attempted == self.batches_planned
    }

    pub fn first_error(&self) -> Option<&UploadClientError> {
        self.failures.first().map(|failure| &failure.error)
    }
}

/// Drives batches through an [`UploadClient`] strictly one at a time, in
/// order. The next batch is not submitted until the previous one has
/// settled, so at most one request is ever in flight.
pub struct BatchScheduler {
    client: Arc<dyn UploadClient>,
    chunk_size: usize,
    failure_policy: BatchFailurePolicy,
}

impl BatchScheduler {
    pub fn new(client: Arc<dyn UploadClient>, chunk_size: usize, failure_policy: BatchFailurePolicy) -> Result<Self> {
        if chunk_size == 0 {
            return Err(UploadSessionError::InvalidChunkSize);
        }
        Ok(Self {
            client,
            chunk_size,
            failure_policy,
        })
    }

    /// Splits `files` into batches of at most `chunk_size`, preserving
    /// order. An empty list produces no batches.
    pub fn partition(files: Vec<FilePayload>, chunk_size: usize) -> Vec<UploadBatch> {
        debug_assert!(chunk_size > 0);

        let total = files.len();
        let mut batches = Vec::with_capacity(total.div_ceil(chunk_size.max(1)));
        let mut covered = 0;
        let mut files = files.into_iter();

        loop {
            let batch_files: Vec<FilePayload> = files.by_ref().take(chunk_size).collect();
            if batch_files.is_empty() {
                break;
            }
            covered += batch_files.len();
            batches.push(UploadBatch {
                files: batch_files,
                remaining_after: total - covered,
            });
        }

        batches
    }

    /// Runs every batch of `files` against the client, sequentially. The
    /// failure policy decides whether a failed batch stops the run early.
    pub async fn run(
        &self,
        destination: Option<&FolderId>,
        files: Vec<FilePayload>,
        events: Option<BatchEventFn>,
    ) -> BatchRunReport {
        let total_bytes: u64 = files.iter().map(|f| f.size()).sum();
        let batches = Self::partition(files, self.chunk_size);

        let mut report = BatchRunReport {
            batches_planned: batches.len(),
            ..Default::default()
        };

        if batches.is_empty() {
            return report;
        }

        debug!("scheduling {} batch(es), {total_bytes} bytes total", batches.len());

        let mut bytes_settled: u64 = 0;
        for (batch_index, batch) in batches.into_iter().enumerate() {
            let files_in_batch = batch.files.len();
            let batch_bytes: u64 = batch.files.iter().map(|f| f.size()).sum();

            if let Some(events) = &events {
                (events)(BatchEvent::Started {
                    batch_index,
                    files_in_batch,
                    remaining_after: batch.remaining_after,
                });
            }

            let progress = events.as_ref().map(|events| {
                let events = events.clone();
                let base = bytes_settled;
                let callback: ProgressCallback = Arc::new(move |p: TransferProgress| {
                    (events)(BatchEvent::Transfer(TransferProgress {
                        bytes_loaded: base + p.bytes_loaded,
                        total_bytes: Some(total_bytes),
                    }));
                });
                callback
            });

            report.batches_attempted += 1;
            let outcome = self.client.upload_batch(destination, &batch.files, progress).await;

            // The cumulative base advances whether or not the batch landed;
            // the transport may have consumed bytes either way and the
            // transfer text must never run backwards.
            bytes_settled += batch_bytes;

            match outcome {
                Ok(()) => {
                    report.files_uploaded += files_in_batch;
                    report.bytes_uploaded += batch_bytes;
                    debug!(
                        "batch {batch_index} settled: {files_in_batch} file(s), {} file(s) remaining",
                        batch.remaining_after
                    );
                },
                Err(error) => {
                    warn!("batch {batch_index} failed: {error}");
                    report.failures.push(BatchFailure { batch_index, error });
                    if self.failure_policy == BatchFailurePolicy::HaltRemaining {
                        break;
                    }
                },
            }
        }

        report
    }
}
