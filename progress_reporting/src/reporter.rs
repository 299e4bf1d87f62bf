use std::fmt::Debug;
use std::sync::Arc;

use async_trait::async_trait;

use crate::record::{ProgressHandle, ProgressRecord, ProgressUpdate};

/// Sink for the user-facing progress records the upload pipeline emits: one
/// record per upload invocation, created once and then patched in place
/// through its handle.
#[async_trait]
pub trait ProgressReporter: Debug + Send + Sync {
    /// Creates a new record, returning the handle all later updates use.
    async fn notify(&self, record: ProgressRecord) -> ProgressHandle;

    /// Applies a partial patch to the record behind `handle`.
    async fn update(&self, handle: ProgressHandle, update: ProgressUpdate);
}

/// Reporter that swallows everything; for callers with no notification UI.
#[derive(Debug, Default)]
pub struct NoOpProgressReporter;

impl NoOpProgressReporter {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {})
    }
}

#[async_trait]
impl ProgressReporter for NoOpProgressReporter {
    async fn notify(&self, _record: ProgressRecord) -> ProgressHandle {
        ProgressHandle::new()
    }

    async fn update(&self, _handle: ProgressHandle, _update: ProgressUpdate) {}
}
