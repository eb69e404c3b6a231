use std::time::Duration;

use rand::{thread_rng, Rng};

/// Sleep schedule for retrying a failed step: `base`, `2 * base`, `4 * base`
/// and so on, capped at `max_sleep`.
///
/// With jitter on, each sleep is drawn from `[t / 2, t]` so that retries of
/// different queues spread out but never collapse to zero.
#[derive(Clone, Debug)]
pub struct ExponentialBackoff {
    base: Duration,
    max_sleep: Duration,
    attempts: u32,
    jitter: bool,
}

impl ExponentialBackoff {
    pub fn new(base: Duration) -> Self {
        Self {
            base,
            max_sleep: base * 32,
            attempts: 0,
            jitter: true,
        }
    }

    pub fn with_max_sleep(self, max_sleep: Duration) -> Self {
        Self { max_sleep, ..self }
    }

    pub fn with_jitter(self, jitter: bool) -> Self {
        Self { jitter, ..self }
    }

    /// Number of sleeps handed out since the last reset.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn next_sleep(&mut self) -> Duration {
        let factor = 1u32.checked_shl(self.attempts).unwrap_or(u32::MAX);
        let t = std::cmp::min(
            self.base.checked_mul(factor).unwrap_or(self.max_sleep),
            self.max_sleep,
        );
        self.attempts = self.attempts.saturating_add(1);
        if self.jitter && !t.is_zero() {
            thread_rng().gen_range(t / 2..=t)
        } else {
            t
        }
    }

    pub fn reset(&mut self) {
        self.attempts = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_doubling_until_cap() {
        let mut b = ExponentialBackoff::new(Duration::from_millis(100))
            .with_max_sleep(Duration::from_millis(1000))
            .with_jitter(false);
        let sleeps: Vec<_> = (0..6).map(|_| b.next_sleep().as_millis()).collect();
        assert_eq!(sleeps, vec![100, 200, 400, 800, 1000, 1000]);
        assert_eq!(b.attempts(), 6);
        b.reset();
        assert_eq!(b.next_sleep(), Duration::from_millis(100));
    }

    #[test]
    fn test_no_overflow_after_many_attempts() {
        let mut b = ExponentialBackoff::new(Duration::from_secs(1)).with_jitter(false);
        for _ in 0..100 {
            b.next_sleep();
        }
        assert_eq!(b.next_sleep(), Duration::from_secs(32));
    }

    #[test]
    fn test_jitter_bounds() {
        let mut b = ExponentialBackoff::new(Duration::from_millis(100));
        for _ in 0..3 {
            b.next_sleep();
        }
        let t = b.next_sleep();
        assert!(t >= Duration::from_millis(400) && t <= Duration::from_millis(800));
    }
}
