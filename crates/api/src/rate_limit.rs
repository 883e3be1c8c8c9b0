use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

/// Sliding-window limiter keyed by client address.
///
/// Keys whose hits have all aged out are dropped at most once per window, so
/// the map only holds clients seen within the last window.
#[derive(Debug, Clone)]
pub struct WindowRateLimiter {
    inner: Arc<Mutex<WindowState>>,
    window: Duration,
    max_requests: usize,
}

#[derive(Debug, Default)]
struct WindowState {
    hits: HashMap<String, VecDeque<Instant>>,
    last_sweep: Option<Instant>,
}

impl WindowState {
    fn sweep(&mut self, now: Instant, window: Duration) {
        let due = match self.last_sweep {
            Some(last) => now.duration_since(last) >= window,
            None => true,
        };
        if !due {
            return;
        }

        self.hits.retain(|_, hits| {
            hits.back()
                .is_some_and(|newest| now.duration_since(*newest) < window)
        });
        self.last_sweep = Some(now);
    }
}

impl WindowRateLimiter {
    pub fn new(window: Duration, max_requests: usize) -> Self {
        Self {
            inner: Arc::new(Mutex::new(WindowState::default())),
            window,
            max_requests,
        }
    }

    /// Records a hit for `key`, or returns how long until the oldest hit in
    /// the window expires.
    pub fn check(&self, key: &str) -> Result<(), Duration> {
        self.check_at(key, Instant::now())
    }

    fn check_at(&self, key: &str, now: Instant) -> Result<(), Duration> {
        if self.max_requests == 0 {
            return Err(self.window);
        }

        let mut state = self.inner.lock();
        state.sweep(now, self.window);

        let hits = state.hits.entry(key.to_string()).or_default();
        while let Some(oldest) = hits.front() {
            if now.duration_since(*oldest) >= self.window {
                hits.pop_front();
            } else {
                break;
            }
        }

        // Non-empty here: max_requests > 0.
        if hits.len() >= self.max_requests {
            let retry_after = hits
                .front()
                .map(|oldest| self.window.saturating_sub(now.duration_since(*oldest)))
                .unwrap_or(self.window);
            return Err(retry_after);
        }

        hits.push_back(now);
        Ok(())
    }

    #[cfg(test)]
    fn tracked_keys(&self) -> usize {
        self.inner.lock().hits.len()
    }
}
