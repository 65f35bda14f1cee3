//! Store counters.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};

/// Point-in-time snapshot of a store's activity.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreStats {
    /// Actions accepted into the inbox.
    pub accepted: u64,
    /// Transitions that produced a different state.
    pub committed: u64,
    /// Transitions that produced an equal state and notified nobody.
    pub suppressed: u64,
    /// Failures delivered to error subscribers: reducer errors and
    /// follow-up limit overflows.
    pub failed: u64,
    /// Follow-up actions applied.
    pub follow_ups: u64,
    /// Follow-up actions discarded by the follow-up limit.
    pub dropped_follow_ups: u64,
    pub last_commit_at: Option<DateTime<Utc>>,
}

#[derive(Default)]
pub(crate) struct Counters {
    accepted: AtomicU64,
    committed: AtomicU64,
    suppressed: AtomicU64,
    failed: AtomicU64,
    follow_ups: AtomicU64,
    dropped_follow_ups: AtomicU64,
    last_commit_at: Mutex<Option<DateTime<Utc>>>,
}

impl Counters {
    pub(crate) fn record_accepted(&self) {
        self.accepted.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_commit(&self, at: DateTime<Utc>) {
        self.committed.fetch_add(1, Ordering::Relaxed);
        *self
            .last_commit_at
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(at);
    }

    pub(crate) fn record_suppressed(&self) {
        self.suppressed.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_failed(&self) {
        self.failed.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_follow_ups(&self, count: usize) {
        self.follow_ups.fetch_add(count as u64, Ordering::Relaxed);
    }

    pub(crate) fn record_dropped_follow_ups(&self, count: usize) {
        self.dropped_follow_ups
            .fetch_add(count as u64, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self) -> StoreStats {
        StoreStats {
            accepted: self.accepted.load(Ordering::Relaxed),
            committed: self.committed.load(Ordering::Relaxed),
            suppressed: self.suppressed.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            follow_ups: self.follow_ups.load(Ordering::Relaxed),
            dropped_follow_ups: self.dropped_follow_ups.load(Ordering::Relaxed),
            last_commit_at: *self
                .last_commit_at
                .lock()
                .unwrap_or_else(PoisonError::into_inner),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_counters_are_zero() {
        assert_eq!(Counters::default().snapshot(), StoreStats::default());
    }

    #[test]
    fn snapshot_reflects_recorded_activity() {
        let counters = Counters::default();
        let now = Utc::now();

        counters.record_accepted();
        counters.record_accepted();
        counters.record_commit(now);
        counters.record_suppressed();
        counters.record_failed();
        counters.record_follow_ups(3);
        counters.record_dropped_follow_ups(2);

        let stats = counters.snapshot();
        assert_eq!(stats.accepted, 2);
        assert_eq!(stats.committed, 1);
        assert_eq!(stats.suppressed, 1);
        assert_eq!(stats.failed, 1);
        assert_eq!(stats.follow_ups, 3);
        assert_eq!(stats.dropped_follow_ups, 2);
        assert_eq!(stats.last_commit_at, Some(now));
    }

    #[test]
    fn stats_serialize_correctly() {
        let stats = StoreStats {
            accepted: 4,
            committed: 3,
            ..StoreStats::default()
        };
        let json = serde_json::to_string(&stats).unwrap();
        let deserialized: StoreStats = serde_json::from_str(&json).unwrap();
        assert_eq!(stats, deserialized);
    }
}
