use reqwest::StatusCode;
use thiserror::Error;

#[non_exhaustive]
#[derive(Error, Debug)]
pub enum UploadClientError {
    #[error("Configuration Error: {0}")]
    ConfigurationError(String),

    #[error("Invalid Arguments")]
    InvalidArguments,

    #[error("IO Error: {0}")]
    IOError(#[from] std::io::Error),

    #[error("Other Internal Error: {0}")]
    InternalError(#[from] anyhow::Error),

    #[error("Parse Error: {0}")]
    ParseError(#[from] url::ParseError),

    #[error("Reqwest Error: {0}")]
    ReqwestError(#[from] reqwest::Error),

    #[error("upload rejected by server ({status}): {}", .message.as_deref().unwrap_or("no detail provided"))]
    Rejected {
        status: StatusCode,
        /// The `error` field of the endpoint's JSON failure body, verbatim,
        /// when the response carried one.
        message: Option<String>,
    },
}

impl UploadClientError {
    /// Server-provided failure text, when this error carried one. Callers
    /// surface it to the user unchanged.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            UploadClientError::Rejected { message, .. } => message.as_deref(),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, UploadClientError>;

impl PartialEq for UploadClientError {
    fn eq(&self, other: &UploadClientError) -> bool {
        match (self, other) {
            (UploadClientError::Rejected { status: a, .. }, UploadClientError::Rejected { status: b, .. }) => a == b,
            (e1, e2) => std::mem::discriminant(e1) == std::mem::discriminant(e2),
        }
    }
}
