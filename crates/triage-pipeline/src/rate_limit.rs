//! Sliding-window rate limiter for AI requests.
//!
//! The check-then-record pair is not atomic on its own; the orchestrator
//! serializes access behind a mutex and performs both steps under one lock.
//! Uses `tokio::time::Instant` so tests can drive the window with paused
//! virtual time.

use std::collections::VecDeque;
use std::time::Duration;

use tokio::time::Instant;

use triage_core::defaults;

/// Sliding-window request counter.
#[derive(Debug)]
pub struct RateLimiter {
    max_per_window: u32,
    window: Duration,
    timestamps: VecDeque<Instant>,
}

impl RateLimiter {
    /// Create a limiter allowing `max_per_minute` requests per 60 s window.
    pub fn new(max_per_minute: u32) -> Self {
        Self {
            max_per_window: max_per_minute,
            window: Duration::from_secs(defaults::RATE_LIMIT_WINDOW_SECS),
            timestamps: VecDeque::new(),
        }
    }

    fn evict(&mut self, now: Instant) {
        while let Some(&front) = self.timestamps.front() {
            if now.duration_since(front) >= self.window {
                self.timestamps.pop_front();
            } else {
                break;
            }
        }
    }

    /// True when another request fits in the current window.
    pub fn allow_request(&mut self) -> bool {
        self.evict(Instant::now());
        (self.timestamps.len() as u32) < self.max_per_window
    }

    /// Record a request at the current instant.
    pub fn record_request(&mut self) {
        let now = Instant::now();
        self.evict(now);
        self.timestamps.push_back(now);
    }

    /// Requests currently counted in the window.
    pub fn current_count(&mut self) -> usize {
        self.evict(Instant::now());
        self.timestamps.len()
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(defaults::RATE_LIMIT_MAX_PER_MINUTE)
    }
}
