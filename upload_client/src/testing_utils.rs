use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use reqwest::StatusCode;
use tokio::sync::Mutex;
use upload_types::{FilePayload, FolderId};

use crate::error::{Result, UploadClientError};
use crate::interface::{ProgressCallback, TransferProgress, UploadClient};

/// One batch as a [`RecordingUploadClient`] saw it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedBatch {
    pub destination: Option<FolderId>,
    pub names: Vec<String>,
    pub total_bytes: u64,
}

/// In-memory stand-in for the remote endpoint. Records every batch it is
/// handed, rejects scripted batch indices with a server-style error, and
/// drives the progress callback the way the real transport does. Lives in
/// the library so downstream crates can test their scheduling and progress
/// wiring against it.
#[derive(Debug, Default)]
pub struct RecordingUploadClient {
    batches: Mutex<Vec<RecordedBatch>>,
    fail_on: HashSet<usize>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl RecordingUploadClient {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// A client that rejects the given zero-based batch indices and accepts
    /// everything else. The rejection message is
    /// `scripted failure for batch <index>`.
    pub fn failing_on(batch_indices: impl IntoIterator<Item = usize>) -> Arc<Self> {
        Arc::new(Self {
            fail_on: batch_indices.into_iter().collect(),
            ..Default::default()
        })
    }

    pub async fn batches(&self) -> Vec<RecordedBatch> {
        self.batches.lock().await.clone()
    }

    pub async fn batch_count(&self) -> usize {
        self.batches.lock().await.len()
    }

    /// Highest number of concurrently in-flight submissions observed. A
    /// strictly sequential scheduler keeps this at 1.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl UploadClient for RecordingUploadClient {
    async fn upload_batch(
        &self,
        destination: Option<&FolderId>,
        files: &[FilePayload],
        progress: Option<ProgressCallback>,
    ) -> Result<()> {
        if files.is_empty() {
            return Err(UploadClientError::InvalidArguments);
        }

        let in_flight = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(in_flight, Ordering::SeqCst);

        // Hold the in-flight gauge across an await point; overlapping
        // submissions would be observed here.
        tokio::task::yield_now().await;

        let total_bytes: u64 = files.iter().map(|f| f.size()).sum();
        let index = {
            let mut batches = self.batches.lock().await;
            batches.push(RecordedBatch {
                destination: destination.cloned(),
                names: files.iter().map(|f| f.name().to_owned()).collect(),
                total_bytes,
            });
            batches.len() - 1
        };

        if let Some(callback) = &progress {
            (callback)(TransferProgress {
                bytes_loaded: total_bytes / 2,
                total_bytes: Some(total_bytes),
            });
            (callback)(TransferProgress {
                bytes_loaded: total_bytes,
                total_bytes: Some(total_bytes),
            });
        }

        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.fail_on.contains(&index) {
            return Err(UploadClientError::Rejected {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                message: Some(format!("scripted failure for batch {index}")),
            });
        }

        Ok(())
    }
}
