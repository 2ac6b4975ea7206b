//! Sliding-window rate limiter for autonomous replies.

use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

use crate::config::SafetyConfig;

/// Allows at most `max_messages` admissions per group in any trailing `window`.
///
/// Check and record happen under one lock, so concurrent callers never
/// overshoot the limit.
#[derive(Debug)]
pub struct RateLimiter {
    max_messages: usize,
    window: Duration,
    groups: Mutex<HashMap<String, VecDeque<Instant>>>,
}

impl RateLimiter {
    /// Create a limiter.
    pub fn new(max_messages: usize, window: Duration) -> Self {
        Self {
            max_messages,
            window,
            groups: Mutex::new(HashMap::new()),
        }
    }

    /// Create a limiter from the safety settings.
    pub fn from_config(config: &SafetyConfig) -> Self {
        Self::new(config.rate_limit_messages, config.rate_limit_window)
    }

    /// Admit one reply for `group_id` at `now` if the window has room.
    ///
    /// Timestamps older than the window are dropped first. A `now` earlier
    /// than the last admission is treated as that admission's time.
    pub fn try_acquire(&self, group_id: &str, now: Instant) -> bool {
        let mut groups = self.lock();
        let stamps = groups.entry(group_id.to_string()).or_default();
        let now = stamps.back().map_or(now, |last| now.max(*last));

        prune(stamps, now, self.window);
        if stamps.len() < self.max_messages {
            stamps.push_back(now);
            true
        } else {
            false
        }
    }

    /// Admissions left for `group_id` at `now`.
    pub fn remaining(&self, group_id: &str, now: Instant) -> usize {
        let mut groups = self.lock();
        let used = match groups.get_mut(group_id) {
            Some(stamps) => {
                prune(stamps, now, self.window);
                stamps.len()
            }
            None => 0,
        };
        self.max_messages.saturating_sub(used)
    }

    /// Forget every admission for `group_id`.
    pub fn reset(&self, group_id: &str) {
        self.lock().remove(group_id);
    }

    pub fn max_messages(&self) -> usize {
        self.max_messages
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, VecDeque<Instant>>> {
        self.groups.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn prune(stamps: &mut VecDeque<Instant>, now: Instant, window: Duration) {
    while let Some(oldest) = stamps.front() {
        if now.saturating_duration_since(*oldest) > window {
            stamps.pop_front();
        } else {
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn secs(s: u64) -> Duration {
        Duration::from_secs(s)
    }

    #[test]
    fn test_eleventh_call_in_window_is_denied() {
        let limiter = RateLimiter::new(10, secs(60));
        let start = Instant::now();

        for i in 0..10 {
            assert!(limiter.try_acquire("g", start + secs(i)), "call {} denied", i);
        }
        assert!(!limiter.try_acquire("g", start + secs(30)));
        assert_eq!(limiter.remaining("g", start + secs(30)), 0);
    }

    #[test]
    fn test_slot_frees_after_window() {
        let limiter = RateLimiter::new(10, secs(60));
        let start = Instant::now();

        for _ in 0..10 {
            assert!(limiter.try_acquire("g", start));
        }
        // Exactly one window later the first admission still counts.
        assert!(!limiter.try_acquire("g", start + secs(60)));
        assert!(limiter.try_acquire("g", start + secs(61)));
    }

    #[test]
    fn test_groups_are_independent() {
        let limiter = RateLimiter::new(1, secs(60));
        let now = Instant::now();

        assert!(limiter.try_acquire("a", now));
        assert!(!limiter.try_acquire("a", now));
        assert!(limiter.try_acquire("b", now));
    }

    #[test]
    fn test_reset_clears_group() {
        let limiter = RateLimiter::new(2, secs(60));
        let now = Instant::now();

        assert!(limiter.try_acquire("g", now));
        assert_eq!(limiter.remaining("g", now), 1);
        limiter.reset("g");
        assert_eq!(limiter.remaining("g", now), 2);
    }

    #[test]
    fn test_clock_going_backwards_is_clamped() {
        let limiter = RateLimiter::new(2, secs(60));
        let start = Instant::now();

        assert!(limiter.try_acquire("g", start + secs(100)));
        assert!(limiter.try_acquire("g", start));
        assert!(!limiter.try_acquire("g", start + secs(100)));
        assert!(limiter.try_acquire("g", start + secs(161)));
    }

    #[test]
    fn test_concurrent_callers_never_exceed_limit() {
        let limiter = Arc::new(RateLimiter::new(10, secs(60)));
        let now = Instant::now();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let limiter = limiter.clone();
                std::thread::spawn(move || (0..5).filter(|_| limiter.try_acquire("g", now)).count())
            })
            .collect();
        let admitted: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();

        assert_eq!(admitted, 10);
    }
}
