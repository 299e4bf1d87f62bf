/// Maximum number of files submitted to the upload endpoint in one request.
/// Selections beyond this size are split into further batches, run strictly
/// one after another.
pub const UPLOAD_CHUNK_SIZE: usize = 10;
