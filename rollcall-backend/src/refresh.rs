//! Periodic refresh of the published snapshot.
//!
//! At most one refresh is in flight; a request arriving while one runs is
//! ignored. A refresh that fails anywhere leaves the cache untouched.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use chrono::{DateTime, Utc};
use rollcall_snapshot::{Snapshot, SnapshotError};
use thiserror::Error;
use tokio::sync::{Mutex, Notify};
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

use crate::cache::{Published, SnapshotCache};
use crate::fetch::{Fetch, FetchError};

const MIN_POLL_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Debug, Error)]
pub enum RefreshError {
    #[error("fetch failed: {0}")]
    Fetch(#[from] FetchError),

    #[error("document rejected: {0}")]
    Parse(#[from] SnapshotError),

    #[error("document has no usable fileTimeUtc")]
    MissingFileTime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    Published,
    /// Another refresh was already running; this request did nothing.
    AlreadyRefreshing,
}

#[derive(Debug, Clone, Copy)]
pub struct RefreshSettings {
    pub auto_refresh: bool,
    pub wait_after_update: Duration,
    pub wait_between_refreshes: Duration,
    pub poll_interval: Duration,
}

fn elapsed(since: DateTime<Utc>, now: DateTime<Utc>) -> Duration {
    (now - since).to_std().unwrap_or(Duration::ZERO)
}

/// Whether an automatic refresh is due.
///
/// Waits until the published document is older than `wait_after_update`, and
/// never attempts more often than `wait_between_refreshes`.
pub fn should_refresh(
    settings: &RefreshSettings,
    now: DateTime<Utc>,
    published: Option<&Published>,
    last_attempt: Option<DateTime<Utc>>,
) -> bool {
    if !settings.auto_refresh {
        return false;
    }

    if let Some(published) = published {
        if elapsed(published.updated_at, now) < settings.wait_after_update {
            return false;
        }
    }

    if let Some(last_attempt) = last_attempt {
        if elapsed(last_attempt, now) < settings.wait_between_refreshes {
            return false;
        }
    }

    true
}

/// Clears the in-flight flag when a refresh ends, however it ends.
struct InFlight<'a>(&'a AtomicBool);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

pub struct Refresher<F> {
    fetcher: F,
    cache: SnapshotCache,
    settings: RefreshSettings,
    refreshing: AtomicBool,
    last_attempt: Mutex<Option<DateTime<Utc>>>,
}

impl<F: Fetch> Refresher<F> {
    pub fn new(fetcher: F, cache: SnapshotCache, settings: RefreshSettings) -> Self {
        Self {
            fetcher,
            cache,
            settings,
            refreshing: AtomicBool::new(false),
            last_attempt: Mutex::new(None),
        }
    }

    pub fn is_refreshing(&self) -> bool {
        self.refreshing.load(Ordering::Acquire)
    }

    pub async fn last_attempt(&self) -> Option<DateTime<Utc>> {
        *self.last_attempt.lock().await
    }

    /// Fetch, parse and publish a new snapshot.
    pub async fn refresh(&self, now: DateTime<Utc>) -> Result<RefreshOutcome, RefreshError> {
        if self
            .refreshing
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!("refresh already in flight, ignoring request");
            return Ok(RefreshOutcome::AlreadyRefreshing);
        }
        let _in_flight = InFlight(&self.refreshing);

        *self.last_attempt.lock().await = Some(now);

        let text = self.fetcher.fetch().await?;
        let snapshot = Snapshot::from_json(&text)?;
        let updated_at = snapshot.date_time().ok_or(RefreshError::MissingFileTime)?;

        self.cache.publish(Published {
            snapshot,
            updated_at,
            refreshed_at: now,
        });
        info!(%updated_at, "published snapshot");
        Ok(RefreshOutcome::Published)
    }

    /// Whether [`should_refresh`] allows an automatic refresh at `now`.
    pub async fn is_due(&self, now: DateTime<Utc>) -> bool {
        let last_attempt = self.last_attempt().await;
        let current = self.cache.current();
        should_refresh(&self.settings, now, current.as_deref(), last_attempt)
    }

    /// Refresh once, then keep the snapshot current until the task is dropped.
    ///
    /// Each poll tick refreshes if due; each `trigger` notification refreshes
    /// immediately (subject to the in-flight guard).
    pub async fn run(self: Arc<Self>, trigger: Arc<Notify>) {
        log_outcome(self.refresh(Utc::now()).await);

        let mut interval =
            tokio::time::interval(self.settings.poll_interval.max(MIN_POLL_INTERVAL));
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    if self.is_due(Utc::now()).await {
                        self.spawn_refresh();
                    }
                }
                _ = trigger.notified() => {
                    debug!("manual refresh requested");
                    self.spawn_refresh();
                }
            }
        }
    }

    fn spawn_refresh(self: &Arc<Self>) {
        let refresher = Arc::clone(self);
        tokio::spawn(async move {
            log_outcome(refresher.refresh(Utc::now()).await);
        });
    }
}

fn log_outcome(result: Result<RefreshOutcome, RefreshError>) {
    match result {
        Ok(_) => {}
        Err(RefreshError::Parse(err)) => warn!(%err, "rejected fetched document"),
        Err(RefreshError::MissingFileTime) => warn!("rejected document without fileTimeUtc"),
        Err(err) => error!(%err, "snapshot refresh failed"),
    }
}
