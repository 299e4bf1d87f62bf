use std::collections::HashSet;

/// Case-sensitive index of the file names already present in the
/// destination folder, built from the folder listing the caller has
/// already loaded.
///
/// The index is a snapshot. Names created or removed on the server after
/// intake are invisible to it and nothing re-validates before upload; the
/// server stays the final authority on what a write actually does.
#[derive(Debug, Clone, Default)]
pub struct NameCollisionIndex {
    names: HashSet<String>,
}

impl NameCollisionIndex {
    pub fn new<I, S>(existing_names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: existing_names.into_iter().map(Into::into).collect(),
        }
    }

    /// Exact, case-sensitive membership test.
    pub fn has_collision(&self, candidate_name: &str) -> bool {
        self.names.contains(candidate_name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
