use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::record::{ProgressHandle, ProgressRecord, ProgressUpdate};
use crate::reporter::ProgressReporter;

/// One call observed by a [`RecordingProgressReporter`], in arrival order.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordedEvent {
    Created(ProgressHandle, ProgressRecord),
    Updated(ProgressHandle, ProgressUpdate),
}

#[derive(Debug, Default)]
struct RecorderState {
    // Merged current value per handle, in creation order.
    records: Vec<(ProgressHandle, ProgressRecord)>,
    events: Vec<RecordedEvent>,
}

/// Captures every notification and update for later inspection, applying
/// each patch so the merged record state can be asserted directly. Lives in
/// the library so downstream crates can verify their own reporter wiring.
#[derive(Debug, Default)]
pub struct RecordingProgressReporter {
    state: Mutex<RecorderState>,
}

impl RecordingProgressReporter {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// All records created so far, each merged with the updates it has
    /// received.
    pub async fn records(&self) -> Vec<(ProgressHandle, ProgressRecord)> {
        self.state.lock().await.records.clone()
    }

    /// Merged state of the record behind `handle`, if it was ever created.
    pub async fn record(&self, handle: ProgressHandle) -> Option<ProgressRecord> {
        let state = self.state.lock().await;
        state.records.iter().find(|(h, _)| *h == handle).map(|(_, r)| r.clone())
    }

    /// Raw call sequence, in arrival order.
    pub async fn events(&self) -> Vec<RecordedEvent> {
        self.state.lock().await.events.clone()
    }
}

#[async_trait]
impl ProgressReporter for RecordingProgressReporter {
    async fn notify(&self, record: ProgressRecord) -> ProgressHandle {
        let handle = ProgressHandle::new();
        let mut state = self.state.lock().await;
        state.records.push((handle, record.clone()));
        state.events.push(RecordedEvent::Created(handle, record));
        handle
    }

    async fn update(&self, handle: ProgressHandle, update: ProgressUpdate) {
        let mut state = self.state.lock().await;
        if let Some((_, record)) = state.records.iter_mut().find(|(h, _)| *h == handle) {
            update.apply_to(record);
        }
        state.events.push(RecordedEvent::Updated(handle, update));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::ProgressStatus;

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_recording_merges_updates() {
        let reporter = RecordingProgressReporter::new();

        let handle = reporter.notify(ProgressRecord::loading("Uploading 2 files")).await;
        reporter.update(handle, ProgressUpdate::description("1 kB / 4 kB transferred")).await;
        reporter.update(handle, ProgressUpdate::success("Upload complete")).await;

        let record = reporter.record(handle).await.unwrap();
        assert_eq!(record.status, ProgressStatus::Success);
        assert!(!record.loading);
        assert_eq!(record.description, "Upload complete");
        assert_eq!(record.label, "Uploading 2 files");

        assert_eq!(reporter.events().await.len(), 3);
        assert_eq!(reporter.records().await.len(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_update_for_unknown_handle_is_recorded_only() {
        let reporter = RecordingProgressReporter::new();

        reporter.update(ProgressHandle::new(), ProgressUpdate::description("stray")).await;

        assert!(reporter.records().await.is_empty());
        assert_eq!(reporter.events().await.len(), 1);
    }
}
