//! In-memory holder for the active snapshot.
//!
//! Only the latest snapshot is kept. Publishing swaps it in one step, and
//! readers holding the previous `Arc` keep a consistent view until they drop it.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rollcall_snapshot::Snapshot;
use tokio::sync::watch;

/// A snapshot as published.
#[derive(Debug)]
pub struct Published {
    pub snapshot: Snapshot,
    /// When the producer wrote the document (its `fileTimeUtc`).
    pub updated_at: DateTime<Utc>,
    /// When this process fetched it.
    pub refreshed_at: DateTime<Utc>,
}

/// Shared handle to the active snapshot. Cloning shares the same slot.
#[derive(Debug, Clone)]
pub struct SnapshotCache {
    current: Arc<watch::Sender<Option<Arc<Published>>>>,
}

impl SnapshotCache {
    /// Create an empty cache. Nothing is ready until the first publish.
    pub fn new() -> Self {
        let (sender, _) = watch::channel(None);
        Self {
            current: Arc::new(sender),
        }
    }

    pub fn current(&self) -> Option<Arc<Published>> {
        self.current.borrow().clone()
    }

    pub fn is_ready(&self) -> bool {
        self.current.borrow().is_some()
    }

    /// Replace the active snapshot.
    pub fn publish(&self, published: Published) -> Arc<Published> {
        let published = Arc::new(published);
        self.current.send_replace(Some(Arc::clone(&published)));
        published
    }
}

impl Default for SnapshotCache {
    fn default() -> Self {
        Self::new()
    }
}
