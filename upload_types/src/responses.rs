use serde::{Deserialize, Serialize};

/// Body the upload endpoint returns on a non-2xx response. When `error` is
/// present it is shown to the user verbatim; success bodies are opaque to
/// the pipeline and never parsed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerErrorBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_body_with_message() {
        let body: ServerErrorBody = serde_json::from_str(r#"{"error": "quota exceeded"}"#).unwrap();
        assert_eq!(body.error.as_deref(), Some("quota exceeded"));
    }

    #[test]
    fn test_error_body_without_message() {
        let body: ServerErrorBody = serde_json::from_str("{}").unwrap();
        assert_eq!(body.error, None);

        // Unknown fields from the server are tolerated.
        let body: ServerErrorBody = serde_json::from_str(r#"{"status": 413}"#).unwrap();
        assert_eq!(body.error, None);
    }
}
