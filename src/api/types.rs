//! Shared state for the API layer.

use std::sync::Arc;

use crate::assistant::Assistant;
use crate::consent::ConsentStore;
use crate::snapshot::SnapshotBuilder;

/// Shared context handed to every route handler.
///
/// Built once at startup; the consent store is the only mutable piece
/// and lives for the process lifetime.
#[derive(Clone)]
pub struct ApiContext {
    pub consent: Arc<ConsentStore>,
    pub snapshots: Arc<SnapshotBuilder>,
    pub assistant: Arc<Assistant>,
}

impl ApiContext {
    pub fn new(
        consent: Arc<ConsentStore>,
        snapshots: Arc<SnapshotBuilder>,
        assistant: Arc<Assistant>,
    ) -> Self {
        Self {
            consent,
            snapshots,
            assistant,
        }
    }
}
