//! Rate Limiting Infrastructure
//!
//! Failed-attempt lockout: a per-identifier counter that blocks the
//! identifier for a fixed duration once a threshold is reached.
//! Storage is left to the caller; this module is pure policy.

use chrono::{DateTime, Duration, Utc};

/// Lockout policy
#[derive(Debug, Clone)]
pub struct LockoutPolicy {
    /// Failures (inclusive) that trigger a lock
    pub threshold: u32,
    /// How long a lock lasts
    pub lock_duration: Duration,
    /// Failures older than this no longer count toward the threshold
    pub failure_window: Duration,
}

impl Default for LockoutPolicy {
    fn default() -> Self {
        Self {
            threshold: 5,
            lock_duration: Duration::minutes(10),
            failure_window: Duration::hours(1),
        }
    }
}

/// Persisted failure state for one identifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttemptRecord {
    /// Scoped key, e.g. `ip:1.2.3.4` or `phone:+233241234567`
    pub identifier: String,
    pub failure_count: u32,
    pub last_attempt_at: DateTime<Utc>,
    pub blocked_until: Option<DateTime<Utc>>,
}

/// Outcome of a lockout check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockoutStatus {
    Unlocked,
    Locked { retry_after_secs: u64 },
}

impl LockoutStatus {
    pub fn is_locked(&self) -> bool {
        matches!(self, LockoutStatus::Locked { .. })
    }

    /// Whole minutes to show the user, rounded up.
    pub fn retry_after_minutes(&self) -> u64 {
        match self {
            LockoutStatus::Unlocked => 0,
            LockoutStatus::Locked { retry_after_secs } => retry_after_secs.div_ceil(60),
        }
    }
}

impl LockoutPolicy {
    pub fn new(threshold: u32, lock_duration: Duration, failure_window: Duration) -> Self {
        Self {
            threshold,
            lock_duration,
            failure_window,
        }
    }

    /// Locked iff `now < blocked_until`. Expired locks need no reset.
    pub fn status(&self, record: Option<&AttemptRecord>, now: DateTime<Utc>) -> LockoutStatus {
        let Some(blocked_until) = record.and_then(|r| r.blocked_until) else {
            return LockoutStatus::Unlocked;
        };

        if now >= blocked_until {
            return LockoutStatus::Unlocked;
        }

        // Round partial seconds up so a caller is never told "0 seconds".
        let remaining_ms = (blocked_until - now).num_milliseconds().max(1) as u64;
        LockoutStatus::Locked {
            retry_after_secs: remaining_ms.div_ceil(1000),
        }
    }

    /// Next record after one more failure.
    ///
    /// The count restarts at 1 when the previous failure fell outside the
    /// window. Reaching the threshold sets `blocked_until = now + lock_duration`.
    pub fn register_failure(
        &self,
        identifier: &str,
        previous: Option<AttemptRecord>,
        now: DateTime<Utc>,
    ) -> AttemptRecord {
        let carried = previous
            .filter(|r| now - r.last_attempt_at <= self.failure_window)
            .map(|r| (r.failure_count, r.blocked_until));

        let (count, mut blocked_until) = match carried {
            Some((count, blocked_until)) => (count.saturating_add(1), blocked_until),
            None => (1, None),
        };

        if count >= self.threshold {
            blocked_until = Some(now + self.lock_duration);
        }

        AttemptRecord {
            identifier: identifier.to_string(),
            failure_count: count,
            last_attempt_at: now,
            blocked_until,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t0() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    fn fail_n(policy: &LockoutPolicy, n: u32, at: DateTime<Utc>) -> Option<AttemptRecord> {
        let mut record = None;
        for _ in 0..n {
            record = Some(policy.register_failure("ip:unknown", record, at));
        }
        record
    }

    #[test]
    fn test_no_record_is_unlocked() {
        let policy = LockoutPolicy::default();
        assert_eq!(policy.status(None, t0()), LockoutStatus::Unlocked);
    }

    #[test]
    fn test_four_failures_do_not_lock() {
        let policy = LockoutPolicy::default();
        let record = fail_n(&policy, 4, t0()).unwrap();
        assert_eq!(record.failure_count, 4);
        assert!(record.blocked_until.is_none());
        assert!(!policy.status(Some(&record), t0()).is_locked());
    }

    #[test]
    fn test_fifth_failure_locks_for_ten_minutes() {
        let policy = LockoutPolicy::default();
        let record = fail_n(&policy, 5, t0()).unwrap();
        assert_eq!(record.blocked_until, Some(t0() + Duration::minutes(10)));

        let status = policy.status(Some(&record), t0() + Duration::seconds(1));
        assert_eq!(status, LockoutStatus::Locked { retry_after_secs: 599 });
        assert_eq!(status.retry_after_minutes(), 10);
    }

    #[test]
    fn test_lock_expires_without_reset() {
        let policy = LockoutPolicy::default();
        let record = fail_n(&policy, 5, t0()).unwrap();

        let just_before = t0() + Duration::minutes(10) - Duration::milliseconds(1);
        assert_eq!(
            policy.status(Some(&record), just_before),
            LockoutStatus::Locked { retry_after_secs: 1 }
        );
        assert!(!policy.status(Some(&record), t0() + Duration::minutes(10)).is_locked());
        assert!(!policy.status(Some(&record), t0() + Duration::hours(3)).is_locked());
    }

    #[test]
    fn test_stale_failures_restart_count() {
        let policy = LockoutPolicy::default();
        let old = fail_n(&policy, 4, t0());

        let later = t0() + Duration::hours(2);
        let record = policy.register_failure("ip:unknown", old, later);
        assert_eq!(record.failure_count, 1);
        assert!(record.blocked_until.is_none());
    }

    #[test]
    fn test_retry_after_minutes_rounds_up() {
        assert_eq!(LockoutStatus::Locked { retry_after_secs: 61 }.retry_after_minutes(), 2);
        assert_eq!(LockoutStatus::Locked { retry_after_secs: 60 }.retry_after_minutes(), 1);
        assert_eq!(LockoutStatus::Locked { retry_after_secs: 1 }.retry_after_minutes(), 1);
        assert_eq!(LockoutStatus::Unlocked.retry_after_minutes(), 0);
    }
}
