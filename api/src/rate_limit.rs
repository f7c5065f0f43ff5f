use std::{collections::HashMap, sync::Mutex};

use chrono::{DateTime, Duration, Utc};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Decision {
    Allowed,
    Limited,
}

impl Decision {
    pub fn is_limited(&self) -> bool {
        matches!(self, Decision::Limited)
    }
}

/// Sliding-window counter keyed by client IP.
///
/// Attempts older than the window stop counting, and keys with no recent
/// attempts are swept out at most once per window so the map does not grow
/// without bound.
pub struct RateLimiter {
    max_attempts: usize,
    window: Duration,
    state: Mutex<LimiterState>,
}

struct LimiterState {
    attempts: HashMap<String, Vec<DateTime<Utc>>>,
    last_sweep: DateTime<Utc>,
}

impl RateLimiter {
    pub fn new(max_attempts: usize, window: Duration) -> RateLimiter {
        RateLimiter {
            max_attempts,
            window,
            state: Mutex::new(LimiterState {
                attempts: HashMap::new(),
                last_sweep: Utc::now(),
            }),
        }
    }

    pub fn check(&self, key: &str) -> Decision {
        self.check_at(key, Utc::now())
    }

    fn check_at(&self, key: &str, now: DateTime<Utc>) -> Decision {
        // A poisoned lock just means some other request panicked partway
        // through; the map is still valid.
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        let cutoff = now - self.window;

        if now - state.last_sweep >= self.window {
            state
                .attempts
                .retain(|_, stamps| stamps.iter().any(|t| *t > cutoff));
            state.last_sweep = now;
        }

        let stamps = state.attempts.entry(key.to_string()).or_default();
        stamps.retain(|t| *t > cutoff);

        if stamps.len() >= self.max_attempts {
            // Rejected attempts are not recorded, so being limited never
            // pushes the reset time further out.
            return Decision::Limited;
        }

        stamps.push(now);
        Decision::Allowed
    }

    #[cfg(test)]
    fn tracked_keys(&self) -> usize {
        self.state.lock().unwrap().attempts.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allows_up_to_the_limit() {
        let limiter = RateLimiter::new(3, Duration::seconds(900));
        let start = Utc::now();

        for i in 0..3 {
            assert_eq!(
                limiter.check_at("1.2.3.4", start + Duration::seconds(i)),
                Decision::Allowed
            );
        }
        assert_eq!(
            limiter.check_at("1.2.3.4", start + Duration::seconds(3)),
            Decision::Limited
        );
    }

    #[test]
    fn rejected_attempts_do_not_extend_the_window() {
        let limiter = RateLimiter::new(3, Duration::seconds(900));
        let start = Utc::now();

        for _ in 0..3 {
            limiter.check_at("1.2.3.4", start);
        }
        for i in 1..=100 {
            assert_eq!(
                limiter.check_at("1.2.3.4", start + Duration::seconds(i)),
                Decision::Limited
            );
        }

        // Only the three allowed attempts count, so the window reopens
        // relative to those even after a hundred rejected tries.
        assert_eq!(
            limiter.check_at("1.2.3.4", start + Duration::seconds(901)),
            Decision::Allowed
        );
    }

    #[test]
    fn keys_are_tracked_independently() {
        let limiter = RateLimiter::new(1, Duration::seconds(900));
        let now = Utc::now();

        assert_eq!(limiter.check_at("1.1.1.1", now), Decision::Allowed);
        assert_eq!(limiter.check_at("2.2.2.2", now), Decision::Allowed);
        assert_eq!(limiter.check_at("1.1.1.1", now), Decision::Limited);
    }

    #[test]
    fn idle_keys_are_swept() {
        let limiter = RateLimiter::new(3, Duration::seconds(60));
        let start = Utc::now();

        limiter.check_at("1.1.1.1", start);
        limiter.check_at("2.2.2.2", start + Duration::seconds(30));
        assert_eq!(limiter.tracked_keys(), 2);

        limiter.check_at("2.2.2.2", start + Duration::seconds(90));
        assert_eq!(limiter.tracked_keys(), 1);
    }
}
