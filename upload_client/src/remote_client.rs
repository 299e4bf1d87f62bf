use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Body, Client};
use tracing::{debug, warn};
use upload_types::{FilePayload, FolderId, ServerErrorBody};
use url::Url;

use crate::error::{Result, UploadClientError};
use crate::http_client::build_http_client;
use crate::interface::{ProgressCallback, UploadClient};
use crate::upload_progress_stream::{BatchTransferCounter, UploadProgressStream, UPLOAD_STREAM_BLOCK_SIZE};

/// Endpoint used when nothing else is configured; local development server.
pub const DEFAULT_UPLOAD_ENDPOINT: &str = "http://localhost:8080";

/// Client for the hosting app's upload endpoint. One multipart POST per
/// batch, every file carried as a repeated `file` field, scoped to the
/// destination folder through a query parameter.
#[derive(Debug, Clone)]
pub struct RemoteClient {
    endpoint: String,
    client: Client,
}

impl RemoteClient {
    pub fn new(endpoint: &str) -> Result<Self> {
        Ok(Self {
            endpoint: endpoint.to_owned(),
            client: build_http_client()?,
        })
    }

    fn upload_url(&self, destination: Option<&FolderId>) -> Result<Url> {
        let mut url = Url::parse(&format!("{}/api/upload", self.endpoint))?;
        if let Some(folder) = destination {
            url.query_pairs_mut().append_pair("folder", folder.as_str());
        }
        Ok(url)
    }
}

#[async_trait]
impl UploadClient for RemoteClient {
    async fn upload_batch(
        &self,
        destination: Option<&FolderId>,
        files: &[FilePayload],
        progress: Option<ProgressCallback>,
    ) -> Result<()> {
        if files.is_empty() {
            return Err(UploadClientError::InvalidArguments);
        }

        let url = self.upload_url(destination)?;
        let total_bytes: u64 = files.iter().map(|f| f.size()).sum();
        let counter = BatchTransferCounter::new(total_bytes, progress);

        let mut form = Form::new();
        for file in files {
            let stream = UploadProgressStream::new(file.data().clone(), UPLOAD_STREAM_BLOCK_SIZE, counter.clone());
            let part = Part::stream_with_length(Body::wrap_stream(stream), file.size())
                .file_name(file.name().to_owned())
                .mime_str(file.content_type())?;
            form = form.part("file", part);
        }

        debug!("submitting batch of {} file(s), {total_bytes} bytes, to {url}", files.len());

        let response = self.client.post(url).multipart(form).send().await?;
        let status = response.status();

        if status.is_success() {
            counter.finish();
            debug!("batch of {} file(s) accepted with {status}", files.len());
            return Ok(());
        }

        let message = response
            .text()
            .await
            .ok()
            .and_then(|body| serde_json::from_str::<ServerErrorBody>(&body).ok())
            .and_then(|body| body.error);

        warn!("upload rejected by server ({status}): {}", message.as_deref().unwrap_or("no detail provided"));
        Err(UploadClientError::Rejected { status, message })
    }
}
