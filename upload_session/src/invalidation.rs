use std::fmt::Debug;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

/// A cached view of server state that goes stale once an upload run has
/// settled and should be refetched by the surrounding application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheScope {
    /// File listing of the destination folder.
    Files,
    /// Folder listings, which carry per-folder counts and sizes.
    Folders,
    /// Account-wide storage usage totals.
    Usage,
}

impl CacheScope {
    /// Every scope an upload run can dirty, in notification order.
    pub const ALL: [CacheScope; 3] = [CacheScope::Files, CacheScope::Folders, CacheScope::Usage];
}

/// Receives data-changed signals after an upload run settles. Signalled
/// once per scope after the final batch, never per batch, and not at all
/// when nothing was submitted.
#[async_trait]
pub trait CacheInvalidator: Debug + Send + Sync {
    async fn invalidate(&self, scope: CacheScope);
}

/// Invalidator that drops every signal.
#[derive(Debug, Default)]
pub struct NoOpCacheInvalidator;

impl NoOpCacheInvalidator {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {})
    }
}

#[async_trait]
impl CacheInvalidator for NoOpCacheInvalidator {
    async fn invalidate(&self, _scope: CacheScope) {}
}

/// Records every scope it is asked to invalidate, in order.
#[derive(Debug, Default)]
pub struct RecordingCacheInvalidator {
    scopes: Mutex<Vec<CacheScope>>,
}

impl RecordingCacheInvalidator {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub async fn scopes(&self) -> Vec<CacheScope> {
        self.scopes.lock().await.clone()
    }
}

#[async_trait]
impl CacheInvalidator for RecordingCacheInvalidator {
    async fn invalidate(&self, scope: CacheScope) {
        self.scopes.lock().await.push(scope);
    }
}
