use std::sync::Arc;

use async_trait::async_trait;
use upload_types::{FilePayload, FolderId};

use crate::error::Result;

/// Byte-level progress of one in-flight batch submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferProgress {
    /// Bytes the transport has consumed so far, monotone per submission.
    pub bytes_loaded: u64,
    /// Total size of the submission; `None` when the transport could not
    /// size the request body up front.
    pub total_bytes: Option<u64>,
}

/// Callback receiving transfer ticks while a batch drains into the
/// transport. Invoked from body polling, so it must be cheap and must not
/// block.
pub type ProgressCallback = Arc<dyn Fn(TransferProgress) + Send + Sync + 'static>;

/// A client submitting file batches to the hosting endpoint.
///
/// One call performs one network submission carrying every file of the
/// batch; success or failure is settled per batch, never per file.
/// Implementations must not retry on their own.
#[async_trait]
pub trait UploadClient: Send + Sync {
    /// Submits `files` as one batch scoped to `destination` (`None` targets
    /// the account root). `progress`, when given, receives monotone byte
    /// totals covering the whole batch.
    async fn upload_batch(
        &self,
        destination: Option<&FolderId>,
        files: &[FilePayload],
        progress: Option<ProgressCallback>,
    ) -> Result<()>;
}
