//! System Lock Flags
//!
//! Process-wide kill switches. One row, re-read on every login and every
//! gate check.

use chrono::{DateTime, Utc};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SystemLockFlags {
    /// Only super admins may use the admin portal
    pub admin_portal_locked: bool,
    /// No provider may sign in or use an existing session
    pub provider_logins_disabled: bool,
    pub reason: Option<String>,
    pub updated_by: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Partial update requested by a super admin
#[derive(Debug, Clone, Default)]
pub struct SystemLockChange {
    pub admin_portal_locked: Option<bool>,
    pub provider_logins_disabled: Option<bool>,
    pub reason: Option<String>,
}

impl SystemLockFlags {
    pub fn apply(&mut self, change: SystemLockChange, updated_by: &str, now: DateTime<Utc>) {
        if let Some(locked) = change.admin_portal_locked {
            self.admin_portal_locked = locked;
        }
        if let Some(disabled) = change.provider_logins_disabled {
            self.provider_logins_disabled = disabled;
        }
        self.reason = change
            .reason
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty());
        self.updated_by = Some(updated_by.to_string());
        self.updated_at = Some(now);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_open() {
        let flags = SystemLockFlags::default();
        assert!(!flags.admin_portal_locked);
        assert!(!flags.provider_logins_disabled);
    }

    #[test]
    fn test_apply_partial_change() {
        let now = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
        let mut flags = SystemLockFlags {
            admin_portal_locked: true,
            ..Default::default()
        };

        flags.apply(
            SystemLockChange {
                provider_logins_disabled: Some(true),
                reason: Some("  SMS outage ".to_string()),
                ..Default::default()
            },
            "uid-super",
            now,
        );

        assert!(flags.admin_portal_locked);
        assert!(flags.provider_logins_disabled);
        assert_eq!(flags.reason.as_deref(), Some("SMS outage"));
        assert_eq!(flags.updated_by.as_deref(), Some("uid-super"));
        assert_eq!(flags.updated_at, Some(now));
    }
}
