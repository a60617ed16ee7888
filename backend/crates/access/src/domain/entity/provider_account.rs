//! Provider Account Entity
//!
//! An artisan's directory listing together with the credential used to
//! sign in to the provider portal.

use chrono::{DateTime, Utc};
use kernel::id::ProviderAccountId;
use platform::secret::HashedSecret;

use crate::domain::value_object::{LegacyPin, PhoneNumber, PrincipalId, ProviderStatus};

const DISPLAY_NAME_MAX: usize = 100;
const CATEGORY_MAX: usize = 60;
const AREA_MAX: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProfileError {
    #[error("Business name must be 2 to 100 characters")]
    DisplayName,

    #[error("Category must be 1 to 60 characters")]
    Category,

    #[error("Area must be at most 100 characters")]
    Area,
}

/// Public listing data submitted by the provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderProfile {
    pub display_name: String,
    pub category: String,
    pub area: Option<String>,
}

impl ProviderProfile {
    pub fn new(
        display_name: &str,
        category: &str,
        area: Option<&str>,
    ) -> Result<Self, ProfileError> {
        let display_name = display_name.trim();
        let name_len = display_name.chars().count();
        if !(2..=DISPLAY_NAME_MAX).contains(&name_len) {
            return Err(ProfileError::DisplayName);
        }

        let category = category.trim();
        let category_len = category.chars().count();
        if !(1..=CATEGORY_MAX).contains(&category_len) {
            return Err(ProfileError::Category);
        }

        let area = area.map(str::trim).filter(|a| !a.is_empty());
        if area.is_some_and(|a| a.chars().count() > AREA_MAX) {
            return Err(ProfileError::Area);
        }

        Ok(Self {
            display_name: display_name.to_string(),
            category: category.to_lowercase(),
            area: area.map(str::to_string),
        })
    }
}

/// What the credential verifier needs from an account
#[derive(Debug, Clone, Copy)]
pub struct StoredCredential<'a> {
    pub hash: Option<&'a HashedSecret>,
    pub legacy_plaintext: Option<&'a LegacyPin>,
}

#[derive(Debug, Clone)]
pub struct ProviderAccount {
    /// Primary key, also the session subject
    pub id: ProviderAccountId,
    /// Canonical `+233…` form
    pub phone: PhoneNumber,
    pub status: ProviderStatus,
    pub secret_hash: Option<HashedSecret>,
    pub secret_created_at: Option<DateTime<Utc>>,
    pub legacy_pin: Option<LegacyPin>,
    /// Managed-identity principal, written only by the identity resolver
    pub linked_principal_id: Option<PrincipalId>,
    pub profile: ProviderProfile,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ProviderAccount {
    /// New business submission awaiting moderation
    pub fn submit(phone: PhoneNumber, profile: ProviderProfile, now: DateTime<Utc>) -> Self {
        Self {
            id: ProviderAccountId::new(),
            phone,
            status: ProviderStatus::Pending,
            secret_hash: None,
            secret_created_at: None,
            legacy_pin: None,
            linked_principal_id: None,
            profile,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn stored_credential(&self) -> StoredCredential<'_> {
        StoredCredential {
            hash: self.secret_hash.as_ref(),
            legacy_plaintext: self.legacy_pin.as_ref(),
        }
    }

    pub fn has_credential(&self) -> bool {
        self.secret_hash.is_some() || self.legacy_pin.is_some()
    }

    /// Replace the credential; any legacy plaintext is dropped.
    pub fn set_secret(&mut self, hash: HashedSecret, now: DateTime<Utc>) {
        self.secret_hash = Some(hash);
        self.secret_created_at = Some(now);
        self.legacy_pin = None;
        self.updated_at = now;
    }

    /// Remove the credential (one-time PIN consumed).
    pub fn clear_secret(&mut self, now: DateTime<Utc>) {
        self.secret_hash = None;
        self.legacy_pin = None;
        self.updated_at = now;
    }

    /// Apply a moderation transition; returns `false` if not allowed.
    pub fn transition_to(&mut self, next: ProviderStatus, now: DateTime<Utc>) -> bool {
        if !self.status.can_transition_to(next) {
            return false;
        }
        self.status = next;
        self.updated_at = now;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use platform::secret::ClearTextSecret;

    fn now() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    fn account() -> ProviderAccount {
        ProviderAccount::submit(
            PhoneNumber::parse("0241234567").unwrap(),
            ProviderProfile::new("Kofi Electricals", "Electrician", Some("Madina")).unwrap(),
            now(),
        )
    }

    #[test]
    fn test_submission_is_pending_without_credential() {
        let account = account();
        assert_eq!(account.status, ProviderStatus::Pending);
        assert!(!account.has_credential());
        assert!(account.linked_principal_id.is_none());
        assert_eq!(account.profile.category, "electrician");
    }

    #[test]
    fn test_profile_validation() {
        assert_eq!(
            ProviderProfile::new("K", "plumber", None).unwrap_err(),
            ProfileError::DisplayName
        );
        assert_eq!(
            ProviderProfile::new("Kofi", "  ", None).unwrap_err(),
            ProfileError::Category
        );
        let profile = ProviderProfile::new("Kofi", "plumber", Some("  ")).unwrap();
        assert_eq!(profile.area, None);
    }

    #[test]
    fn test_set_secret_drops_legacy() {
        let mut account = account();
        account.legacy_pin = Some(LegacyPin::from_db("4821".to_string()));

        let hash = ClearTextSecret::new("4821".to_string())
            .unwrap()
            .hash(None)
            .unwrap();
        account.set_secret(hash, now());

        assert!(account.legacy_pin.is_none());
        assert!(account.secret_hash.is_some());
        assert_eq!(account.secret_created_at, Some(now()));
    }

    #[test]
    fn test_transition_rules() {
        let mut account = account();
        assert!(!account.transition_to(ProviderStatus::Suspended, now()));
        assert!(account.transition_to(ProviderStatus::Approved, now()));
        assert!(account.transition_to(ProviderStatus::Suspended, now()));
        assert_eq!(account.status, ProviderStatus::Suspended);
    }
}
