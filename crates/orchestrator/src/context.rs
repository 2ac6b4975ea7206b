//! Rolling per-group conversation context.

use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard};

use chat_core::ContextEntry;

/// The most recent messages of one group, oldest first.
#[derive(Debug, Clone)]
pub struct ContextWindow {
    entries: VecDeque<ContextEntry>,
    capacity: usize,
}

impl ContextWindow {
    /// Create an empty window holding at most `capacity` entries (minimum 1).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append an entry, evicting the oldest one when full.
    pub fn push(&mut self, entry: ContextEntry) {
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(entry);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn iter(&self) -> impl Iterator<Item = &ContextEntry> {
        self.entries.iter()
    }

    /// Copy of the entries, oldest first.
    pub fn to_vec(&self) -> Vec<ContextEntry> {
        self.entries.iter().cloned().collect()
    }
}

/// Context windows for every group seen so far.
///
/// Thread-safe; the lock is only held for the duration of each call.
#[derive(Debug)]
pub struct ContextStore {
    capacity: usize,
    windows: Mutex<HashMap<String, ContextWindow>>,
}

impl ContextStore {
    /// Create a store whose windows hold `capacity` entries each.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            windows: Mutex::new(HashMap::new()),
        }
    }

    /// Append an entry to the group's window.
    pub fn record(&self, group_id: &str, entry: ContextEntry) {
        let capacity = self.capacity;
        self.lock()
            .entry(group_id.to_string())
            .or_insert_with(|| ContextWindow::new(capacity))
            .push(entry);
    }

    /// Current entries of the group's window, oldest first.
    pub fn snapshot(&self, group_id: &str) -> Vec<ContextEntry> {
        self.lock()
            .get(group_id)
            .map(ContextWindow::to_vec)
            .unwrap_or_default()
    }

    pub fn len(&self, group_id: &str) -> usize {
        self.lock().get(group_id).map_or(0, ContextWindow::len)
    }

    /// Drop the group's window.
    pub fn clear(&self, group_id: &str) {
        self.lock().remove(group_id);
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, ContextWindow>> {
        self.windows.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
