use std::fmt::{Display, Formatter};

use ulid::Ulid;

/// Severity of a progress record as shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressStatus {
    Info,
    Success,
    Error,
    Warn,
}

/// Opaque id identifying one progress record across updates. Returned by
/// [`ProgressReporter::notify`](crate::ProgressReporter::notify) and passed
/// back on every subsequent update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProgressHandle(Ulid);

impl ProgressHandle {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        Self(Ulid::new())
    }
}

impl Display for ProgressHandle {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One user-facing notification tracking an upload invocation from start to
/// its terminal outcome.
///
/// `label` and `description` are display text only; nothing downstream keys
/// on their contents. `auto_clear` marks records the UI may dismiss on its
/// own after a short delay (successes), as opposed to errors, which stay up
/// until the user closes them.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressRecord {
    pub status: ProgressStatus,
    pub loading: bool,
    pub label: String,
    pub description: String,
    pub auto_clear: bool,
}

impl ProgressRecord {
    /// A fresh in-progress record, the shape every upload invocation opens
    /// with.
    pub fn loading(label: impl Into<String>) -> Self {
        Self {
            status: ProgressStatus::Info,
            loading: true,
            label: label.into(),
            description: String::new(),
            auto_clear: false,
        }
    }

    pub fn success(label: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            status: ProgressStatus::Success,
            loading: false,
            label: label.into(),
            description: description.into(),
            auto_clear: true,
        }
    }

    pub fn error(label: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            status: ProgressStatus::Error,
            loading: false,
            label: label.into(),
            description: description.into(),
            auto_clear: false,
        }
    }
}

/// Partial patch applied to an existing [`ProgressRecord`]; `None` fields
/// leave the record's value untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProgressUpdate {
    pub status: Option<ProgressStatus>,
    pub loading: Option<bool>,
    pub label: Option<String>,
    pub description: Option<String>,
    pub auto_clear: Option<bool>,
}

impl ProgressUpdate {
    /// A description-only tick, the shape of mid-transfer updates.
    pub fn description(text: impl Into<String>) -> Self {
        Self {
            description: Some(text.into()),
            ..Default::default()
        }
    }

    /// Terminal success patch: stops the spinner and lets the UI dismiss
    /// the record on its own.
    pub fn success(description: impl Into<String>) -> Self {
        Self {
            status: Some(ProgressStatus::Success),
            loading: Some(false),
            description: Some(description.into()),
            auto_clear: Some(true),
            ..Default::default()
        }
    }

    /// Terminal failure patch: the record persists until dismissed.
    pub fn error(description: impl Into<String>) -> Self {
        Self {
            status: Some(ProgressStatus::Error),
            loading: Some(false),
            description: Some(description.into()),
            auto_clear: Some(false),
            ..Default::default()
        }
    }

    /// Merges this patch into `record`.
    pub fn apply_to(&self, record: &mut ProgressRecord) {
        if let Some(status) = self.status {
            record.status = status;
        }
        if let Some(loading) = self.loading {
            record.loading = loading;
        }
        if let Some(label) = &self.label {
            record.label = label.clone();
        }
        if let Some(description) = &self.description {
            record.description = description.clone();
        }
        if let Some(auto_clear) = self.auto_clear {
            record.auto_clear = auto_clear;
        }
    }
}
