use bytes::Bytes;

/// A file staged for upload: the name it will carry in the destination
/// folder, a MIME type for the transport, and the raw content.
///
/// Content is held as [`Bytes`], so cloning a payload (including the
/// renamed copy a keep-both resolution produces) shares the underlying
/// buffer instead of duplicating it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePayload {
    name: String,
    content_type: String,
    data: Bytes,
}

impl FilePayload {
    pub fn new(name: impl Into<String>, content_type: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            content_type: content_type.into(),
            data: data.into(),
        }
    }

    /// Name of the file as it will appear in the destination folder.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// MIME type sent with the multipart part for this file.
    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    /// Raw file content.
    pub fn data(&self) -> &Bytes {
        &self.data
    }

    /// Content size in bytes.
    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }

    /// Returns a copy of this payload carrying `name` instead of the
    /// original one; the content buffer is shared.
    pub fn with_name(&self, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content_type: self.content_type.clone(),
            data: self.data.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_accessors() {
        let payload = FilePayload::new("notes.txt", "text/plain", "hello".as_bytes());

        assert_eq!(payload.name(), "notes.txt");
        assert_eq!(payload.content_type(), "text/plain");
        assert_eq!(payload.size(), 5);
        assert_eq!(payload.data().as_ref(), b"hello");
    }

    #[test]
    fn test_with_name_shares_content() {
        let payload = FilePayload::new("photo.png", "image/png", vec![7u8; 64]);
        let renamed = payload.with_name("photo[1712].png");

        assert_eq!(renamed.name(), "photo[1712].png");
        assert_eq!(renamed.content_type(), payload.content_type());
        assert_eq!(renamed.data(), payload.data());
        assert_eq!(renamed.size(), 64);
    }
}
