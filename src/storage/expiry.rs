//! Expiration Policy
//!
//! Pure TTL check over last-access instants.

use std::time::{Duration, Instant};

/// Decides whether an entry has outlived its time-to-live
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpirationPolicy {
    ttl: Duration,
}

impl ExpirationPolicy {
    pub fn new(ttl: Duration) -> Self {
        Self { ttl }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Expired iff `now - last_access >= ttl`
    #[inline]
    pub fn is_expired(&self, last_access: Instant, now: Instant) -> bool {
        now.saturating_duration_since(last_access) >= self.ttl
    }

    /// Time left before expiry, `None` once expired
    pub fn remaining(&self, last_access: Instant, now: Instant) -> Option<Duration> {
        self.ttl
            .checked_sub(now.saturating_duration_since(last_access))
            .filter(|left| !left.is_zero())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boundary_is_expired() {
        let policy = ExpirationPolicy::new(Duration::from_secs(2));
        let t0 = Instant::now();

        assert!(!policy.is_expired(t0, t0));
        assert!(!policy.is_expired(t0, t0 + Duration::from_millis(1999)));
        assert!(policy.is_expired(t0, t0 + Duration::from_secs(2)));
        assert!(policy.is_expired(t0, t0 + Duration::from_secs(3)));
    }

    #[test]
    fn test_clock_behind_access() {
        let policy = ExpirationPolicy::new(Duration::from_millis(10));
        let t0 = Instant::now();
        // An access stamped after `now` is simply fresh
        assert!(!policy.is_expired(t0 + Duration::from_secs(1), t0));
    }

    #[test]
    fn test_remaining() {
        let policy = ExpirationPolicy::new(Duration::from_secs(5));
        let t0 = Instant::now();

        assert_eq!(
            policy.remaining(t0, t0 + Duration::from_secs(2)),
            Some(Duration::from_secs(3))
        );
        assert_eq!(policy.remaining(t0, t0 + Duration::from_secs(5)), None);
        assert_eq!(policy.remaining(t0, t0 + Duration::from_secs(9)), None);
        assert_eq!(policy.ttl(), Duration::from_secs(5));
    }

    #[test]
    fn test_remaining_agrees_with_is_expired() {
        let policy = ExpirationPolicy::new(Duration::from_millis(50));
        let t0 = Instant::now();

        for ms in [0, 1, 49, 50, 51, 500] {
            let now = t0 + Duration::from_millis(ms);
            assert_eq!(policy.remaining(t0, now).is_none(), policy.is_expired(t0, now));
        }
    }
}
