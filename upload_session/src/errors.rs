use anyhow::anyhow;
use thiserror::Error;
use tokio::task::JoinError;
use upload_client::UploadClientError;

#[non_exhaustive]
#[derive(Error, Debug)]
pub enum UploadSessionError {
    #[error("Upload Client Error: {0}")]
    Client(#[from] UploadClientError),

    #[error("chunk size must be at least 1")]
    InvalidChunkSize,

    #[error("candidate index {index} out of bounds")]
    CandidateOutOfBounds { index: usize },

    #[error("candidate {index} does not require a resolution")]
    ResolutionNotRequired { index: usize },

    #[error("session is not ready: {unresolved} conflict(s) awaiting a decision")]
    ConflictsUnresolved { unresolved: usize },

    #[error("session already closed")]
    SessionClosed,

    #[error("Other Internal Error: {0}")]
    InternalError(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, UploadSessionError>;

// Only used for testing; be careful when using this directly outside of
// tests, as InternalError values never compare equal on their payloads.
impl PartialEq for UploadSessionError {
    fn eq(&self, other: &UploadSessionError) -> bool {
        match (self, other) {
            (UploadSessionError::Client(e1), UploadSessionError::Client(e2)) => e1 == e2,
            (e1, e2) => std::mem::discriminant(e1) == std::mem::discriminant(e2),
        }
    }
}

impl From<JoinError> for UploadSessionError {
    fn from(value: JoinError) -> Self {
        UploadSessionError::InternalError(anyhow!("{value:?}"))
    }
}
