#![cfg_attr(feature = "strict", deny(warnings))]

pub use log_reporter::TracingProgressReporter;
pub use record::{ProgressHandle, ProgressRecord, ProgressStatus, ProgressUpdate};
pub use recording_reporter::{RecordedEvent, RecordingProgressReporter};
pub use reporter::{NoOpProgressReporter, ProgressReporter};
pub use transfer_text::transfer_text;

mod log_reporter;
mod record;
mod recording_reporter;
mod reporter;
mod transfer_text;
