use governor::{
    clock::{Clock, DefaultClock},
    DefaultKeyedRateLimiter, Quota,
};
use std::num::NonZeroU32;
use std::time::Duration;

/// Per-caller request budget backed by a keyed GCRA limiter
///
/// Each key may burst up to `max_requests` and regains one request every
/// `window / max_requests`. State is per process and lost on restart; separate
/// instances do not share budgets. Construct one at start-up and hand it to
/// the router.
pub struct RateLimiter {
    limiter: DefaultKeyedRateLimiter<String>,
    clock: DefaultClock,
}

/// Outcome of a rate-limit check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allowed,
    Limited { retry_after: Duration },
}

impl RateLimiter {
    pub fn new(max_requests: u32, window: Duration) -> Self {
        let burst = NonZeroU32::new(max_requests).unwrap_or(NonZeroU32::MIN);
        let quota = Quota::with_period(window / burst.get())
            .unwrap_or_else(|| Quota::per_second(burst))
            .allow_burst(burst);

        Self {
            limiter: DefaultKeyedRateLimiter::keyed(quota),
            clock: DefaultClock::default(),
        }
    }

    /// Counts one request for `key`
    pub fn check(&self, key: &str) -> Decision {
        match self.limiter.check_key(&key.to_string()) {
            Ok(()) => Decision::Allowed,
            Err(not_until) => Decision::Limited {
                retry_after: not_until.wait_time_from(self.clock.now()),
            },
        }
    }

    /// Forgets keys whose budget has fully recovered
    pub fn retain_recent(&self) {
        self.limiter.retain_recent();
        self.limiter.shrink_to_fit();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allows_burst_then_rejects() {
        let limiter = RateLimiter::new(3, Duration::from_secs(60));

        for _ in 0..3 {
            assert_eq!(limiter.check("1.2.3.4"), Decision::Allowed);
        }

        match limiter.check("1.2.3.4") {
            Decision::Limited { retry_after } => {
                assert!(retry_after > Duration::ZERO);
                assert!(retry_after <= Duration::from_secs(20));
            }
            Decision::Allowed => panic!("fourth request should be limited"),
        }
    }

    #[test]
    fn test_keys_have_separate_budgets() {
        let limiter = RateLimiter::new(1, Duration::from_secs(60));

        assert_eq!(limiter.check("a"), Decision::Allowed);
        assert_eq!(limiter.check("b"), Decision::Allowed);
        assert!(matches!(limiter.check("a"), Decision::Limited { .. }));
    }

    #[test]
    fn test_budget_recovers_after_window() {
        let limiter = RateLimiter::new(1, Duration::from_millis(50));

        assert_eq!(limiter.check("a"), Decision::Allowed);
        assert!(matches!(limiter.check("a"), Decision::Limited { .. }));

        std::thread::sleep(Duration::from_millis(80));
        assert_eq!(limiter.check("a"), Decision::Allowed);
    }

    #[test]
    fn test_zero_budget_still_admits_one() {
        let limiter = RateLimiter::new(0, Duration::ZERO);

        assert_eq!(limiter.check("a"), Decision::Allowed);
        limiter.retain_recent();
    }
}
