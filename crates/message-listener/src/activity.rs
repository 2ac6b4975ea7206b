//! Group activity tracking.
//!
//! signal-cli does not expose message history, so the last activity of a
//! group is whatever this process has observed on the event stream or sent
//! itself.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use chat_core::GroupDescriptor;
use chrono::{DateTime, Utc};

/// Last observed activity per group. Clones share state.
#[derive(Debug, Clone, Default)]
pub struct ActivityTracker {
    last_seen: Arc<Mutex<HashMap<String, DateTime<Utc>>>>,
}

impl ActivityTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record activity in `group_id` at `at`; older observations are ignored.
    pub fn record(&self, group_id: &str, at: DateTime<Utc>) {
        let mut seen = self.lock();
        let entry = seen.entry(group_id.to_string()).or_insert(at);
        if at > *entry {
            *entry = at;
        }
    }

    /// Last observed activity in `group_id`.
    pub fn last_seen(&self, group_id: &str) -> Option<DateTime<Utc>> {
        self.lock().get(group_id).copied()
    }

    /// Fill in `last_activity` and order groups for selection.
    ///
    /// Groups seen within `window` of `now` come first, most recent first.
    /// Groups never seen follow in name order. Groups last seen before the
    /// window are dropped.
    pub fn rank(
        &self,
        groups: Vec<GroupDescriptor>,
        window: Duration,
        now: DateTime<Utc>,
    ) -> Vec<GroupDescriptor> {
        let cutoff = chrono::Duration::from_std(window)
            .ok()
            .and_then(|w| now.checked_sub_signed(w));

        let mut ranked: Vec<GroupDescriptor> = groups
            .into_iter()
            .map(|mut group| {
                group.last_activity = self.last_seen(&group.id).or(group.last_activity);
                group
            })
            .filter(|group| match (group.last_activity, cutoff) {
                (Some(at), Some(cutoff)) => at >= cutoff,
                _ => true,
            })
            .collect();

        ranked.sort_by(|a, b| match (a.last_activity, b.last_activity) {
            (Some(x), Some(y)) => y.cmp(&x),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
        });
        ranked
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, DateTime<Utc>>> {
        self.last_seen.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
