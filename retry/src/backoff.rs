use std::time::Duration;

use rand::Rng;

/// Randomized exponential backoff schedule.
///
/// After the `n`-th failed attempt (1-based) the nominal wait is
/// `multiplier * 2^(n-1)`, clamped into `[min, max]`. The actual wait is
/// drawn uniformly from `[min, nominal]` so concurrent callers that failed
/// together do not retry together.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Backoff {
    pub min: Duration,
    pub multiplier: Duration,
    pub max: Duration,
}

impl Default for Backoff {
    fn default() -> Self {
        Self {
            min: Duration::from_secs(1),
            multiplier: Duration::from_secs(1),
            max: Duration::from_secs(10),
        }
    }
}

impl Backoff {
    pub fn new(min: Duration, multiplier: Duration, max: Duration) -> Self {
        Self {
            min,
            multiplier,
            max,
        }
    }

    /// A schedule that never waits. Useful in tests.
    pub fn none() -> Self {
        Self::new(Duration::ZERO, Duration::ZERO, Duration::ZERO)
    }

    /// Upper end of the wait interval after the given failed attempt.
    pub fn upper_bound(&self, attempt: u32) -> Duration {
        let factor = 2u32
            .checked_pow(attempt.saturating_sub(1))
            .unwrap_or(u32::MAX);
        let nominal = self.multiplier.checked_mul(factor).unwrap_or(Duration::MAX);
        nominal.min(self.max).max(self.min)
    }

    /// Random wait before retrying after the given failed attempt.
    pub fn delay(&self, attempt: u32) -> Duration {
        let upper = self.upper_bound(attempt);
        if upper <= self.min {
            return self.min;
        }
        rand::thread_rng().gen_range(self.min..=upper)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upper_bound_doubles_and_caps() {
        let b = Backoff::default();
        assert_eq!(b.upper_bound(1), Duration::from_secs(1));
        assert_eq!(b.upper_bound(2), Duration::from_secs(2));
        assert_eq!(b.upper_bound(3), Duration::from_secs(4));
        assert_eq!(b.upper_bound(4), Duration::from_secs(8));
        assert_eq!(b.upper_bound(5), Duration::from_secs(10));
        assert_eq!(b.upper_bound(64), Duration::from_secs(10));
    }

    #[test]
    fn test_upper_bound_respects_min() {
        let b = Backoff::new(
            Duration::from_secs(3),
            Duration::from_secs(1),
            Duration::from_secs(10),
        );
        assert_eq!(b.upper_bound(1), Duration::from_secs(3));
        assert_eq!(b.upper_bound(3), Duration::from_secs(4));
    }

    #[test]
    fn test_delay_within_bounds() {
        let b = Backoff::new(
            Duration::from_millis(10),
            Duration::from_millis(10),
            Duration::from_millis(100),
        );
        for attempt in 1..8 {
            for _ in 0..50 {
                let d = b.delay(attempt);
                assert!(d >= b.min, "attempt {attempt}: {d:?} below min");
                assert!(d <= b.upper_bound(attempt), "attempt {attempt}: {d:?} above bound");
            }
        }
    }

    #[test]
    fn test_delay_is_randomized() {
        let b = Backoff::default();
        let first = b.delay(4);
        let varied = (0..100).any(|_| b.delay(4) != first);
        assert!(varied);
    }

    #[test]
    fn test_none_never_waits() {
        let b = Backoff::none();
        assert_eq!(b.delay(1), Duration::ZERO);
        assert_eq!(b.delay(10), Duration::ZERO);
    }
}
