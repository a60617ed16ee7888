//! Repository Traits
//!
//! Interfaces for data persistence. Implementation is in infrastructure layer.
//! Method names are unique across traits so one store type can implement
//! all of them without call-site ambiguity.

use kernel::id::ProviderAccountId;
use platform::rate_limit::AttemptRecord;

use crate::domain::entity::{AdminAccount, LoginAuditEvent, ProviderAccount, SystemLockFlags};
use crate::domain::value_object::{PhoneNumber, PrincipalId};
use crate::error::AccessResult;

/// Provider account repository trait
#[trait_variant::make(ProviderAccountRepository: Send)]
pub trait LocalProviderAccountRepository {
    /// Insert a new account. Fails with `PhoneTaken` on a duplicate phone.
    async fn insert_provider(&self, account: &ProviderAccount) -> AccessResult<()>;

    async fn find_provider_by_id(
        &self,
        id: &ProviderAccountId,
    ) -> AccessResult<Option<ProviderAccount>>;

    async fn find_provider_by_linked_principal(
        &self,
        principal: &PrincipalId,
    ) -> AccessResult<Option<ProviderAccount>>;

    /// Any status; callers filter.
    async fn find_provider_by_phone(
        &self,
        phone: &PhoneNumber,
    ) -> AccessResult<Option<ProviderAccount>>;

    /// Conditional write: set the link only where it is currently null.
    /// Returns `true` if this call set it.
    async fn link_principal_if_unlinked(
        &self,
        id: &ProviderAccountId,
        principal: &PrincipalId,
    ) -> AccessResult<bool>;

    /// Persist status, credential and profile fields. Never touches the link.
    async fn update_provider(&self, account: &ProviderAccount) -> AccessResult<()>;
}

/// Administrator repository trait
#[trait_variant::make(AdminAccountRepository: Send)]
pub trait LocalAdminAccountRepository {
    async fn find_admin(&self, uid: &PrincipalId) -> AccessResult<Option<AdminAccount>>;
}

/// Failed-attempt counters
#[trait_variant::make(AttemptRepository: Send)]
pub trait LocalAttemptRepository {
    async fn load_attempts(&self, identifier: &str) -> AccessResult<Option<AttemptRecord>>;

    /// Upsert; last write wins.
    async fn save_attempts(&self, record: &AttemptRecord) -> AccessResult<()>;

    async fn clear_attempts(&self, identifier: &str) -> AccessResult<()>;
}

/// Kill switches
#[trait_variant::make(SystemLockRepository: Send)]
pub trait LocalSystemLockRepository {
    /// Defaults (all open) when no row exists.
    async fn load_system_locks(&self) -> AccessResult<SystemLockFlags>;

    async fn save_system_locks(&self, flags: &SystemLockFlags) -> AccessResult<()>;
}

/// Login audit trail
#[trait_variant::make(AuditRepository: Send)]
pub trait LocalAuditRepository {
    async fn append_audit(&self, event: &LoginAuditEvent) -> AccessResult<()>;
}

/// Everything the access use cases need from persistence
pub trait AccessStore:
    ProviderAccountRepository
    + AdminAccountRepository
    + AttemptRepository
    + SystemLockRepository
    + AuditRepository
    + Send
    + Sync
    + 'static
{
}

impl<T> AccessStore for T where
    T: ProviderAccountRepository
        + AdminAccountRepository
        + AttemptRepository
        + SystemLockRepository
        + AuditRepository
        + Send
        + Sync
        + 'static
{
}
