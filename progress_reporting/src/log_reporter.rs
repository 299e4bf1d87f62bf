use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, error, info, warn};

use crate::record::{ProgressHandle, ProgressRecord, ProgressStatus, ProgressUpdate};
use crate::reporter::ProgressReporter;

/// Writes progress records to the structured log, mapping record status to
/// log level. Mid-transfer description ticks go out at debug so a normal
/// log level sees one line per upload start and one per settlement.
#[derive(Debug, Default)]
pub struct TracingProgressReporter;

impl TracingProgressReporter {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {})
    }
}

#[async_trait]
impl ProgressReporter for TracingProgressReporter {
    async fn notify(&self, record: ProgressRecord) -> ProgressHandle {
        let handle = ProgressHandle::new();
        match record.status {
            ProgressStatus::Error => error!(id = %handle, "{}: {}", record.label, record.description),
            ProgressStatus::Warn => warn!(id = %handle, "{}: {}", record.label, record.description),
            _ => info!(id = %handle, "{}", record.label),
        }
        handle
    }

    async fn update(&self, handle: ProgressHandle, update: ProgressUpdate) {
        let text = update.description.as_deref().unwrap_or_default();
        match update.status {
            Some(ProgressStatus::Success) => info!(id = %handle, "{text}"),
            Some(ProgressStatus::Error) => error!(id = %handle, "{text}"),
            Some(ProgressStatus::Warn) => warn!(id = %handle, "{text}"),
            _ => debug!(id = %handle, "{text}"),
        }
    }
}
