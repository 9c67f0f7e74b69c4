//! Per-user fixed-window limiter for LLM calls.
//!
//! State is process-local. A request consumes its slot before the LLM is
//! called, and the slot is not returned if the call fails.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use tracing::debug;
use uuid::Uuid;

#[derive(Debug, Clone, Copy)]
struct Window {
    started: Instant,
    used: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateDecision {
    Allowed { remaining: u32 },
    Limited { retry_after: Duration },
}

#[derive(Debug)]
struct Windows {
    by_user: HashMap<Uuid, Window>,
    last_sweep: Instant,
}

#[derive(Debug)]
pub struct RateLimiter {
    limit: u32,
    window: Duration,
    windows: Mutex<Windows>,
}

impl RateLimiter {
    pub fn new(limit: u32, window: Duration) -> Self {
        Self {
            limit,
            window,
            windows: Mutex::new(Windows {
                by_user: HashMap::new(),
                last_sweep: Instant::now(),
            }),
        }
    }

    /// Consumes one request for `user_id` if the current window has room.
    pub fn check(&self, user_id: Uuid) -> RateDecision {
        self.check_at(user_id, Instant::now())
    }

    pub fn check_at(&self, user_id: Uuid, now: Instant) -> RateDecision {
        let span = self.window;
        let mut windows = self.windows.lock().unwrap_or_else(|e| e.into_inner());

        // Expired windows are swept at most once per window span.
        if now.saturating_duration_since(windows.last_sweep) >= span {
            windows
                .by_user
                .retain(|_, w| now.saturating_duration_since(w.started) < span);
            windows.last_sweep = now;
        }

        let window = windows.by_user.entry(user_id).or_insert(Window {
            started: now,
            used: 0,
        });
        if now.saturating_duration_since(window.started) >= span {
            *window = Window {
                started: now,
                used: 0,
            };
        }

        if window.used >= self.limit {
            let retry_after = span.saturating_sub(now.saturating_duration_since(window.started));
            debug!(%user_id, used = window.used, "llm rate limit reached");
            return RateDecision::Limited { retry_after };
        }

        window.used += 1;
        RateDecision::Allowed {
            remaining: self.limit - window.used,
        }
    }

    #[cfg(test)]
    fn tracked_users(&self) -> usize {
        self.windows
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .by_user
            .len()
    }
}
