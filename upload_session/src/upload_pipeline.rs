use std::sync::Arc;

use progress_reporting::{transfer_text, ProgressRecord, ProgressReporter, ProgressUpdate};
use tokio::sync::mpsc;
use tracing::{info, warn};
use upload_client::UploadClient;
use upload_types::{FilePayload, FolderId};

use crate::batch_scheduler::{BatchEvent, BatchEventFn, BatchFailurePolicy, BatchRunReport, BatchScheduler};
use crate::collision::NameCollisionIndex;
use crate::conflict_session::{ConflictResolutionSession, SessionState, SkipPolicy, SubmitOutcome};
use crate::constants::UPLOAD_CHUNK_SIZE;
use crate::errors::{Result, UploadSessionError};
use crate::invalidation::{CacheInvalidator, CacheScope};

/// Tunables for one pipeline instance.
#[derive(Debug, Clone)]
pub struct UploadPipelineConfig {
    /// Maximum files per network submission. Must be positive.
    pub chunk_size: usize,
    pub skip_policy: SkipPolicy,
    pub failure_policy: BatchFailurePolicy,
}

impl Default for UploadPipelineConfig {
    fn default() -> Self {
        Self {
            chunk_size: UPLOAD_CHUNK_SIZE,
            skip_policy: SkipPolicy::default(),
            failure_policy: BatchFailurePolicy::default(),
        }
    }
}

impl UploadPipelineConfig {
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    pub fn with_skip_policy(mut self, skip_policy: SkipPolicy) -> Self {
        self.skip_policy = skip_policy;
        self
    }

    pub fn with_failure_policy(mut self, failure_policy: BatchFailurePolicy) -> Self {
        self.failure_policy = failure_policy;
        self
    }
}

/// Settled result of one upload invocation.
#[derive(Debug)]
pub enum UploadOutcome {
    /// The selection was empty or resolved down to nothing. No network
    /// call, no progress record, no invalidation.
    NothingToUpload,
    /// Conflicts need decisions first. The session is handed back for the
    /// UI to drive and can be submitted once it is ready.
    ConflictsPending(ConflictResolutionSession),
    /// The user's decisions abandoned the upload.
    Aborted,
    /// Batches ran; the report says what settled and what failed.
    Completed(BatchRunReport),
}

/// Owns the collaborators and drives a selection of files from intake to a
/// settled upload: conflict annotation, resolution, batching, submission,
/// the progress record, and cache invalidation.
pub struct UploadPipeline {
    client: Arc<dyn UploadClient>,
    reporter: Arc<dyn ProgressReporter>,
    invalidator: Arc<dyn CacheInvalidator>,
    config: UploadPipelineConfig,
}

// Constructors
impl UploadPipeline {
    pub fn new(
        client: Arc<dyn UploadClient>,
        reporter: Arc<dyn ProgressReporter>,
        invalidator: Arc<dyn CacheInvalidator>,
    ) -> Self {
        Self {
            client,
            reporter,
            invalidator,
            config: UploadPipelineConfig::default(),
        }
    }

    pub fn with_config(
        client: Arc<dyn UploadClient>,
        reporter: Arc<dyn ProgressReporter>,
        invalidator: Arc<dyn CacheInvalidator>,
        config: UploadPipelineConfig,
    ) -> Result<Self> {
        if config.chunk_size == 0 {
            return Err(UploadSessionError::InvalidChunkSize);
        }
        Ok(Self {
            client,
            reporter,
            invalidator,
            config,
        })
    }
}

impl UploadPipeline {
    /// Annotates `files` against the destination's name index and opens a
    /// resolution session under this pipeline's skip policy.
    pub fn stage(&self, files: Vec<FilePayload>, index: &NameCollisionIndex) -> ConflictResolutionSession {
        ConflictResolutionSession::with_skip_policy(files, index, self.config.skip_policy)
    }

    /// Stages `files` and, when nothing conflicts, uploads immediately.
    /// When conflicts exist the untouched session is handed back instead;
    /// resolve it and pass it to [`submit`](Self::submit).
    pub async fn upload(
        &self,
        files: Vec<FilePayload>,
        index: &NameCollisionIndex,
        destination: Option<&FolderId>,
    ) -> Result<UploadOutcome> {
        let mut session = self.stage(files, index);
        match session.state() {
            SessionState::AwaitingResolution => Ok(UploadOutcome::ConflictsPending(session)),
            _ => self.submit(&mut session, destination).await,
        }
    }

    /// Submits a resolved session: materializes the final file list and
    /// drives it through the client batch by batch.
    pub async fn submit(
        &self,
        session: &mut ConflictResolutionSession,
        destination: Option<&FolderId>,
    ) -> Result<UploadOutcome> {
        match session.submit()? {
            SubmitOutcome::Aborted => {
                info!("upload abandoned during conflict resolution; nothing submitted");
                Ok(UploadOutcome::Aborted)
            },
            SubmitOutcome::Upload(files) if files.is_empty() => Ok(UploadOutcome::NothingToUpload),
            SubmitOutcome::Upload(files) => {
                let report = self.run_batches(files, destination).await?;
                Ok(UploadOutcome::Completed(report))
            },
        }
    }

    async fn run_batches(&self, files: Vec<FilePayload>, destination: Option<&FolderId>) -> Result<BatchRunReport> {
        let scheduler = BatchScheduler::new(self.client.clone(), self.config.chunk_size, self.config.failure_policy)?;

        let file_count = files.len();
        let label = if file_count == 1 {
            "Uploading 1 file".to_owned()
        } else {
            format!("Uploading {file_count} files")
        };
        let handle = self.reporter.notify(ProgressRecord::loading(label)).await;

        // Scheduler events fire on a synchronous callback inside the
        // transfer path; forward them through a channel so reporter calls
        // stay ordered without blocking the transfer.
        let (event_tx, mut event_rx) = mpsc::unbounded_channel::<BatchEvent>();
        let forwarder = {
            let reporter = self.reporter.clone();
            tokio::spawn(async move {
                while let Some(event) = event_rx.recv().await {
                    let update = match event {
                        BatchEvent::Started { remaining_after, .. } if remaining_after > 0 => {
                            ProgressUpdate::description(format!("{remaining_after} remaining"))
                        },
                        BatchEvent::Started { .. } => continue,
                        BatchEvent::Transfer(p) => {
                            ProgressUpdate::description(transfer_text(p.bytes_loaded, p.total_bytes))
                        },
                    };
                    reporter.update(handle, update).await;
                }
            })
        };

        let events: BatchEventFn = Arc::new(move |event| {
            // The receiver outlives the run; a send can only fail once the
            // forwarder has panicked, and the join below surfaces that.
            let _ = event_tx.send(event);
        });

        let report = scheduler.run(destination, files, Some(events)).await;

        // All senders are gone once the run settles, so the forwarder
        // drains the channel and exits; terminal updates below stay last.
        forwarder.await?;

        if report.fully_succeeded() {
            info!("upload complete: {} file(s), {} bytes", report.files_uploaded, report.bytes_uploaded);
            self.reporter.update(handle, ProgressUpdate::success("Upload complete")).await;
        } else {
            warn!("upload settled with {} failed batch(es)", report.failures.len());
            let description = report
                .first_error()
                .and_then(|error| error.server_message())
                .map(str::to_owned)
                .unwrap_or_else(|| "Upload failed".to_owned());
            self.reporter.update(handle, ProgressUpdate::error(description)).await;
        }

        // run_batches only ever sees a non-empty list, so at least one
        // batch was attempted and server state may have changed even when
        // batches failed.
        for scope in CacheScope::ALL {
            self.invalidator.invalidate(scope).await;
        }

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use progress_reporting::{ProgressStatus, RecordedEvent, RecordingProgressReporter};
    use tracing_test::traced_test;
    use upload_client::RecordingUploadClient;

    use super::*;
    use crate::candidate::ConflictResolution;
    use crate::invalidation::RecordingCacheInvalidator;

    fn file(name: &str, size: usize) -> FilePayload {
        FilePayload::new(name, "application/octet-stream", vec![0u8; size])
    }

    fn numbered_files(count: usize, size: usize) -> Vec<FilePayload> {
        (0..count).map(|n| file(&format!("file_{n:02}.bin"), size)).collect()
    }

    struct Harness {
        client: Arc<RecordingUploadClient>,
        reporter: Arc<RecordingProgressReporter>,
        invalidator: Arc<RecordingCacheInvalidator>,
        pipeline: UploadPipeline,
    }

    fn harness(client: Arc<RecordingUploadClient>, config: UploadPipelineConfig) -> Harness {
        let reporter = RecordingProgressReporter::new();
        let invalidator = RecordingCacheInvalidator::new();
        let pipeline =
            UploadPipeline::with_config(client.clone(), reporter.clone(), invalidator.clone(), config).unwrap();
        Harness {
            client,
            reporter,
            invalidator,
            pipeline,
        }
    }

    fn descriptions(events: &[RecordedEvent]) -> Vec<String> {
        events
            .iter()
            .filter_map(|event| match event {
                RecordedEvent::Updated(_, update) => update.description.clone(),
                RecordedEvent::Created(..) => None,
            })
            .collect()
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    #[traced_test]
    async fn test_clean_selection_uploads_without_waiting() {
        let h = harness(RecordingUploadClient::new(), UploadPipelineConfig::default());
        let index = NameCollisionIndex::new(["unrelated.txt"]);
        let destination = FolderId::from("folder-3");

        let outcome = h
            .pipeline
            .upload(numbered_files(25, 4), &index, Some(&destination))
            .await
            .unwrap();

        let UploadOutcome::Completed(report) = outcome else {
            panic!("expected a completed upload");
        };
        assert!(report.fully_succeeded());
        assert_eq!(report.files_uploaded, 25);
        assert_eq!(report.bytes_uploaded, 100);

        let batches = h.client.batches().await;
        assert_eq!(batches.len(), 3);
        assert!(batches.iter().all(|b| b.destination == Some(FolderId::from("folder-3"))));
        assert_eq!(h.client.max_in_flight(), 1);

        let records = h.reporter.records().await;
        assert_eq!(records.len(), 1);
        let record = &records[0].1;
        assert_eq!(record.label, "Uploading 25 files");
        assert_eq!(record.status, ProgressStatus::Success);
        assert_eq!(record.description, "Upload complete");
        assert!(!record.loading);
        assert!(record.auto_clear);

        assert_eq!(h.invalidator.scopes().await, CacheScope::ALL.to_vec());
        assert!(logs_contain("upload complete"));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_progress_descriptions_track_batches_and_bytes() {
        let h = harness(RecordingUploadClient::new(), UploadPipelineConfig::default());
        let index = NameCollisionIndex::default();

        let outcome = h.pipeline.upload(numbered_files(25, 4), &index, None).await.unwrap();
        assert!(matches!(outcome, UploadOutcome::Completed(_)));

        let events = h.reporter.events().await;
        let seen = descriptions(&events);

        assert!(seen.contains(&"15 remaining".to_owned()));
        assert!(seen.contains(&"5 remaining".to_owned()));
        assert!(seen.contains(&"100 B / 100 B transferred".to_owned()));
        assert_eq!(seen.last().map(String::as_str), Some("Upload complete"));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_conflicts_are_handed_back_before_any_network_call() {
        let h = harness(RecordingUploadClient::new(), UploadPipelineConfig::default());
        let index = NameCollisionIndex::new(["dup.txt"]);

        let outcome = h
            .pipeline
            .upload(vec![file("dup.txt", 8), file("new.txt", 8)], &index, None)
            .await
            .unwrap();

        let UploadOutcome::ConflictsPending(mut session) = outcome else {
            panic!("expected pending conflicts");
        };
        assert_eq!(h.client.batch_count().await, 0);
        assert!(h.reporter.records().await.is_empty());

        session.resolve(0, ConflictResolution::Replace).unwrap();
        let outcome = h.pipeline.submit(&mut session, None).await.unwrap();

        let UploadOutcome::Completed(report) = outcome else {
            panic!("expected a completed upload");
        };
        assert!(report.fully_succeeded());

        let batches = h.client.batches().await;
        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0].names, vec!["dup.txt", "new.txt"]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_skip_abandons_everything_silently() {
        let h = harness(RecordingUploadClient::new(), UploadPipelineConfig::default());
        let index = NameCollisionIndex::new(["a.txt", "b.txt"]);

        let outcome = h
            .pipeline
            .upload(vec![file("a.txt", 4), file("b.txt", 4), file("c.txt", 4)], &index, None)
            .await
            .unwrap();
        let UploadOutcome::ConflictsPending(mut session) = outcome else {
            panic!("expected pending conflicts");
        };

        session.resolve(0, ConflictResolution::Skip).unwrap();
        session.resolve(1, ConflictResolution::Replace).unwrap();
        let outcome = h.pipeline.submit(&mut session, None).await.unwrap();

        assert!(matches!(outcome, UploadOutcome::Aborted));
        assert_eq!(h.client.batch_count().await, 0);
        assert!(h.reporter.records().await.is_empty());
        assert!(h.invalidator.scopes().await.is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_omit_skipped_config_uploads_the_rest() {
        let config = UploadPipelineConfig::default().with_skip_policy(SkipPolicy::OmitSkipped);
        let h = harness(RecordingUploadClient::new(), config);
        let index = NameCollisionIndex::new(["a.txt"]);

        let outcome = h
            .pipeline
            .upload(vec![file("a.txt", 4), file("b.txt", 4)], &index, None)
            .await
            .unwrap();
        let UploadOutcome::ConflictsPending(mut session) = outcome else {
            panic!("expected pending conflicts");
        };

        session.resolve(0, ConflictResolution::Skip).unwrap();
        let outcome = h.pipeline.submit(&mut session, None).await.unwrap();

        let UploadOutcome::Completed(report) = outcome else {
            panic!("expected a completed upload");
        };
        assert_eq!(report.files_uploaded, 1);
        assert_eq!(h.client.batches().await[0].names, vec!["b.txt"]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_empty_selection_is_a_complete_noop() {
        let h = harness(RecordingUploadClient::new(), UploadPipelineConfig::default());
        let index = NameCollisionIndex::default();

        let outcome = h.pipeline.upload(vec![], &index, None).await.unwrap();

        assert!(matches!(outcome, UploadOutcome::NothingToUpload));
        assert_eq!(h.client.batch_count().await, 0);
        assert!(h.reporter.records().await.is_empty());
        assert!(h.invalidator.scopes().await.is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_server_error_text_reaches_the_progress_record() {
        let h = harness(RecordingUploadClient::failing_on([0]), UploadPipelineConfig::default());
        let index = NameCollisionIndex::default();

        let outcome = h.pipeline.upload(numbered_files(5, 4), &index, None).await.unwrap();

        let UploadOutcome::Completed(report) = outcome else {
            panic!("expected a completed upload");
        };
        assert!(!report.fully_succeeded());
        assert_eq!(report.failures.len(), 1);

        let records = h.reporter.records().await;
        assert_eq!(records.len(), 1);
        let record = &records[0].1;
        assert_eq!(record.status, ProgressStatus::Error);
        assert_eq!(record.description, "scripted failure for batch 0");
        assert!(!record.loading);
        assert!(!record.auto_clear);

        // Batches were attempted, so cached listings may be stale.
        assert_eq!(h.invalidator.scopes().await, CacheScope::ALL.to_vec());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_failure_policy_reaches_the_scheduler() {
        let halt = harness(RecordingUploadClient::failing_on([1]), UploadPipelineConfig::default());
        let index = NameCollisionIndex::default();
        let outcome = halt.pipeline.upload(numbered_files(25, 4), &index, None).await.unwrap();
        let UploadOutcome::Completed(report) = outcome else {
            panic!("expected a completed upload");
        };
        assert_eq!(report.batches_attempted, 2);

        let config = UploadPipelineConfig::default().with_failure_policy(BatchFailurePolicy::ContinueRemaining);
        let keep_going = harness(RecordingUploadClient::failing_on([1]), config);
        let outcome = keep_going
            .pipeline
            .upload(numbered_files(25, 4), &index, None)
            .await
            .unwrap();
        let UploadOutcome::Completed(report) = outcome else {
            panic!("expected a completed upload");
        };
        assert_eq!(report.batches_attempted, 3);
        assert_eq!(report.files_uploaded, 20);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_zero_chunk_size_config_is_rejected() {
        let err = UploadPipeline::with_config(
            RecordingUploadClient::new(),
            RecordingProgressReporter::new(),
            RecordingCacheInvalidator::new(),
            UploadPipelineConfig::default().with_chunk_size(0),
        )
        .map(|_| ())
        .unwrap_err();
        assert_eq!(err, UploadSessionError::InvalidChunkSize);
    }
}
