use dashmap::DashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

// Rate limit entry - tracks requests per client key
pub struct RateLimitEntry {
    pub count: u32,
    pub window_start: Instant,
}

/// Fixed-window limiter. A limit of zero disables it.
///
/// Entries whose window has elapsed are swept at most once per window, so
/// the map only holds clients seen in the last two windows.
pub struct RateLimiter {
    entries: DashMap<String, RateLimitEntry>,
    limit: u32,
    window: Duration,
    last_sweep: Mutex<Instant>,
}

impl RateLimiter {
    pub fn new(limit: u32, window: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            limit,
            window,
            last_sweep: Mutex::new(Instant::now()),
        }
    }

    pub fn disabled() -> Self {
        Self::new(0, Duration::ZERO)
    }

    pub fn check(&self, key: &str) -> bool {
        if self.limit == 0 {
            return true;
        }
        // must run before `entry` takes a shard lock
        self.sweep_if_due();
        let now = Instant::now();

        let mut entry = self
            .entries
            .entry(key.to_string())
            .or_insert(RateLimitEntry {
                count: 0,
                window_start: now,
            });

        if entry.window_start.elapsed() > self.window {
            entry.count = 1;
            entry.window_start = now;
            return true;
        }

        if entry.count < self.limit {
            entry.count += 1;
            return true;
        }

        false
    }

    /// Number of tracked client keys.
    pub fn tracked(&self) -> usize {
        self.entries.len()
    }

    fn sweep_if_due(&self) {
        let Ok(mut last_sweep) = self.last_sweep.try_lock() else {
            // another request is already sweeping
            return;
        };
        if last_sweep.elapsed() <= self.window {
            return;
        }
        let window = self.window;
        let before = self.entries.len();
        self.entries
            .retain(|_, entry| entry.window_start.elapsed() <= window);
        *last_sweep = Instant::now();
        tracing::debug!(
            removed = before.saturating_sub(self.entries.len()),
            "rate limit entries swept"
        );
    }
}
