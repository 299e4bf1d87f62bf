use std::mem::take;

use tracing::debug;
use upload_types::FilePayload;

use crate::candidate::{CandidateFile, ConflictResolution};
use crate::collision::NameCollisionIndex;
use crate::errors::{Result, UploadSessionError};
use crate::unique_name::UniqueNameGenerator;

/// Where a resolution session stands in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No candidates were supplied.
    Idle,
    /// At least one conflicting candidate has no decision yet.
    AwaitingResolution,
    /// Every conflict has a decision; the session can be submitted.
    Ready,
    /// The final file list has been handed off. Terminal.
    Submitted,
    /// The user cancelled, or a skip abandoned the selection. Terminal.
    Aborted,
}

/// What a `Skip` decision does to the rest of the pending upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SkipPolicy {
    /// A single skipped conflict abandons the entire selection, untouched
    /// files included. This is what the current client surfaces to users,
    /// so it stays the default.
    #[default]
    AbortAll,
    /// A skip drops only the skipped candidate; everything else uploads.
    OmitSkipped,
}

/// Result of submitting a session.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// The final upload list: resolved conflicts first (renamed where the
    /// user kept both), then the untouched non-conflicting files, each
    /// group in intake order.
    Upload(Vec<FilePayload>),
    /// A skip under [`SkipPolicy::AbortAll`] discarded the whole selection.
    Aborted,
}

/// Tracks one pending upload attempt through conflict resolution.
///
/// Candidates are annotated against the destination's name index once, at
/// intake. The session then waits for a decision on every conflicting
/// candidate, individually or in bulk, before it can be submitted, and
/// materializes the final upload list on submit. The session value is owned
/// by whoever started the upload; UI layers mutate it only through the
/// resolution methods here.
#[derive(Debug)]
pub struct ConflictResolutionSession {
    candidates: Vec<CandidateFile>,
    namer: UniqueNameGenerator,
    skip_policy: SkipPolicy,
    state: SessionState,
}

// Constructors
impl ConflictResolutionSession {
    pub fn new(files: Vec<FilePayload>, index: &NameCollisionIndex) -> Self {
        Self::with_skip_policy(files, index, SkipPolicy::default())
    }

    pub fn with_skip_policy(files: Vec<FilePayload>, index: &NameCollisionIndex, skip_policy: SkipPolicy) -> Self {
        let candidates: Vec<CandidateFile> = files
            .into_iter()
            .map(|payload| {
                let has_conflict = index.has_collision(payload.name());
                CandidateFile::new(payload, has_conflict)
            })
            .collect();

        let conflicts = candidates.iter().filter(|c| c.has_conflict()).count();
        let state = if candidates.is_empty() {
            SessionState::Idle
        } else if conflicts == 0 {
            SessionState::Ready
        } else {
            SessionState::AwaitingResolution
        };

        debug!("session opened with {} candidate(s), {conflicts} conflict(s)", candidates.len());

        Self {
            candidates,
            namer: UniqueNameGenerator::new(),
            skip_policy,
            state,
        }
    }
}

impl ConflictResolutionSession {
    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn candidates(&self) -> &[CandidateFile] {
        &self.candidates
    }

    pub fn conflict_count(&self) -> usize {
        self.candidates.iter().filter(|c| c.has_conflict()).count()
    }

    /// Number of conflicting candidates still waiting on a decision.
    pub fn unresolved_count(&self) -> usize {
        self.candidates.iter().filter(|c| c.needs_resolution()).count()
    }

    pub fn is_ready(&self) -> bool {
        self.state == SessionState::Ready
    }

    /// Records the user's decision for the conflicting candidate at
    /// `index` (intake order).
    pub fn resolve(&mut self, index: usize, resolution: ConflictResolution) -> Result<()> {
        self.ensure_open()?;

        let Some(candidate) = self.candidates.get_mut(index) else {
            return Err(UploadSessionError::CandidateOutOfBounds { index });
        };
        if !candidate.has_conflict() {
            return Err(UploadSessionError::ResolutionNotRequired { index });
        }

        candidate.set_resolution(resolution);
        self.refresh_state();
        Ok(())
    }

    /// Applies one decision to every conflict still pending. Conflicts the
    /// user already decided keep their decision.
    pub fn resolve_remaining(&mut self, resolution: ConflictResolution) -> Result<()> {
        self.ensure_open()?;

        for candidate in self.candidates.iter_mut().filter(|c| c.needs_resolution()) {
            candidate.set_resolution(resolution);
        }
        self.refresh_state();
        Ok(())
    }

    /// Abandons the session from any non-terminal state and drops the
    /// candidates.
    pub fn cancel(&mut self) {
        if !self.is_closed() {
            debug!("session cancelled with {} candidate(s) pending", self.candidates.len());
            self.candidates.clear();
            self.state = SessionState::Aborted;
        }
    }

    /// Materializes the final upload list once every conflict is decided.
    ///
    /// Replace keeps the original name, keep-both uploads under a generated
    /// unique name. Under [`SkipPolicy::AbortAll`] a single skip abandons
    /// the whole selection instead.
    pub fn submit(&mut self) -> Result<SubmitOutcome> {
        match self.state {
            SessionState::Submitted | SessionState::Aborted => return Err(UploadSessionError::SessionClosed),
            SessionState::AwaitingResolution => {
                return Err(UploadSessionError::ConflictsUnresolved {
                    unresolved: self.unresolved_count(),
                });
            },
            SessionState::Idle | SessionState::Ready => {},
        }

        let candidates = take(&mut self.candidates);

        let skipped = candidates
            .iter()
            .filter(|c| c.resolution() == Some(ConflictResolution::Skip))
            .count();
        if skipped > 0 && self.skip_policy == SkipPolicy::AbortAll {
            debug!("{skipped} skip(s) under an abort-all policy; abandoning {} candidate(s)", candidates.len());
            self.state = SessionState::Aborted;
            return Ok(SubmitOutcome::Aborted);
        }

        let mut files = Vec::with_capacity(candidates.len());
        for candidate in candidates.iter().filter(|c| c.has_conflict()) {
            match candidate.resolution() {
                Some(ConflictResolution::Skip) => {},
                Some(ConflictResolution::Replace) => files.push(candidate.payload().clone()),
                Some(ConflictResolution::KeepBoth) => {
                    let unique_name = self.namer.make_unique(candidate.name());
                    files.push(candidate.payload().with_name(unique_name));
                },
                None => debug_assert!(false, "conflicting candidate without a resolution in a ready session"),
            }
        }
        for candidate in candidates.iter().filter(|c| !c.has_conflict()) {
            files.push(candidate.payload().clone());
        }

        self.state = SessionState::Submitted;
        Ok(SubmitOutcome::Upload(files))
    }

    fn is_closed(&self) -> bool {
        matches!(self.state, SessionState::Submitted | SessionState::Aborted)
    }

    fn ensure_open(&self) -> Result<()> {
        if self.is_closed() {
            return Err(UploadSessionError::SessionClosed);
        }
        Ok(())
    }

    fn refresh_state(&mut self) {
        if self.is_closed() {
            return;
        }
        self.state = if self.candidates.is_empty() {
            SessionState::Idle
        } else if self.unresolved_count() > 0 {
            SessionState::AwaitingResolution
        } else {
            SessionState::Ready
        };
    }
}
