use upload_types::FilePayload;

/// The user's decision for one conflicting candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictResolution {
    /// Leave the existing file alone and do not upload this candidate.
    Skip,
    /// Upload under the original name, overwriting the existing file.
    Replace,
    /// Upload under a generated non-colliding name so both files survive.
    KeepBoth,
}

/// One file selected for upload, annotated with the conflict state computed
/// at intake. The conflict flag is checked once against the name index and
/// never recomputed within the session.
#[derive(Debug, Clone)]
pub struct CandidateFile {
    payload: FilePayload,
    has_conflict: bool,
    resolution: Option<ConflictResolution>,
}

impl CandidateFile {
    pub(crate) fn new(payload: FilePayload, has_conflict: bool) -> Self {
        Self {
            payload,
            has_conflict,
            resolution: None,
        }
    }

    pub fn payload(&self) -> &FilePayload {
        &self.payload
    }

    pub fn name(&self) -> &str {
        self.payload.name()
    }

    pub fn has_conflict(&self) -> bool {
        self.has_conflict
    }

    pub fn resolution(&self) -> Option<ConflictResolution> {
        self.resolution
    }

    /// True while this candidate blocks submission: it conflicts and the
    /// user has not decided yet.
    pub fn needs_resolution(&self) -> bool {
        self.has_conflict && self.resolution.is_none()
    }

    pub(crate) fn set_resolution(&mut self, resolution: ConflictResolution) {
        self.resolution = Some(resolution);
    }
}
