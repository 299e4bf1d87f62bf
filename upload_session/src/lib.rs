#![cfg_attr(feature = "strict", deny(warnings))]

pub use batch_scheduler::{
    BatchEvent, BatchEventFn, BatchFailure, BatchFailurePolicy, BatchRunReport, BatchScheduler, UploadBatch,
};
pub use candidate::{CandidateFile, ConflictResolution};
pub use collision::NameCollisionIndex;
pub use conflict_session::{ConflictResolutionSession, SessionState, SkipPolicy, SubmitOutcome};
pub use constants::UPLOAD_CHUNK_SIZE;
pub use errors::{Result, UploadSessionError};
pub use invalidation::{CacheInvalidator, CacheScope, NoOpCacheInvalidator, RecordingCacheInvalidator};
pub use unique_name::UniqueNameGenerator;
pub use upload_pipeline::{UploadOutcome, UploadPipeline, UploadPipelineConfig};

mod batch_scheduler;
mod candidate;
mod collision;
mod conflict_session;
mod constants;
mod errors;
mod invalidation;
mod unique_name;
mod upload_pipeline;
