#![cfg_attr(feature = "strict", deny(warnings))]

pub use error::{Result, UploadClientError};
pub use http_client::build_http_client;
pub use interface::{ProgressCallback, TransferProgress, UploadClient};
pub use remote_client::{RemoteClient, DEFAULT_UPLOAD_ENDPOINT};
pub use testing_utils::{RecordedBatch, RecordingUploadClient};

mod error;
mod http_client;
mod interface;
mod remote_client;
mod testing_utils;
mod upload_progress_stream;
