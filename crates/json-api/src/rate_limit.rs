//! Process-local sliding-window rate limiter.
//!
//! Counts live in this process only; a restart or a second replica starts from
//! zero.

use std::{
    sync::{Mutex, PoisonError},
    time::{Duration, Instant},
};

use rustc_hash::FxHashMap;

#[derive(Debug)]
pub(crate) struct RateLimiter {
    window: Duration,
    max_requests: usize,
    hits: Mutex<FxHashMap<String, Vec<Instant>>>,
}

impl RateLimiter {
    #[must_use]
    pub(crate) fn new(window: Duration, max_requests: usize) -> Self {
        Self {
            window,
            max_requests,
            hits: Mutex::new(FxHashMap::default()),
        }
    }

    /// Record a request from `key` at `now`, returning whether it is allowed.
    ///
    /// Rejected requests are not recorded, so a blocked client regains access
    /// once its oldest accepted request leaves the window.
    pub(crate) fn check(&self, key: &str, now: Instant) -> bool {
        let mut hits = self.hits.lock().unwrap_or_else(PoisonError::into_inner);

        let window = self.window;

        hits.retain(|_, times| {
            times.retain(|time| now.saturating_duration_since(*time) < window);
            !times.is_empty()
        });

        let times = hits.entry(key.to_string()).or_default();

        if times.len() >= self.max_requests {
            return false;
        }

        times.push(now);

        true
    }

    #[cfg(test)]
    pub(crate) fn tracked_keys(&self) -> usize {
        self.hits
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allows_up_to_the_limit_within_a_window() {
        let limiter = RateLimiter::new(Duration::from_secs(60), 3);
        let start = Instant::now();

        assert!(limiter.check("203.0.113.7", start));
        assert!(limiter.check("203.0.113.7", start + Duration::from_secs(1)));
        assert!(limiter.check("203.0.113.7", start + Duration::from_secs(2)));
        assert!(!limiter.check("203.0.113.7", start + Duration::from_secs(3)));
    }

    #[test]
    fn keys_are_limited_independently() {
        let limiter = RateLimiter::new(Duration::from_secs(60), 1);
        let now = Instant::now();

        assert!(limiter.check("203.0.113.7", now));
        assert!(limiter.check("198.51.100.2", now));
        assert!(!limiter.check("203.0.113.7", now));
    }

    #[test]
    fn requests_age_out_of_the_window() {
        let limiter = RateLimiter::new(Duration::from_secs(60), 1);
        let start = Instant::now();

        assert!(limiter.check("203.0.113.7", start));
        assert!(!limiter.check("203.0.113.7", start + Duration::from_secs(59)));
        assert!(limiter.check("203.0.113.7", start + Duration::from_secs(60)));
    }

    #[test]
    fn idle_keys_are_evicted() {
        let limiter = RateLimiter::new(Duration::from_secs(60), 5);
        let start = Instant::now();

        limiter.check("203.0.113.7", start);
        limiter.check("198.51.100.2", start);

        assert_eq!(limiter.tracked_keys(), 2);

        limiter.check("198.51.100.2", start + Duration::from_secs(120));

        assert_eq!(limiter.tracked_keys(), 1);
    }
}
