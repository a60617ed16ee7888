//! Entity Module

pub mod admin_account;
pub mod audit_event;
pub mod provider_account;
pub mod system_locks;

pub use admin_account::AdminAccount;
pub use audit_event::{LoginAuditEvent, LoginOutcome};
pub use provider_account::{ProfileError, ProviderAccount, ProviderProfile, StoredCredential};
pub use system_locks::{SystemLockChange, SystemLockFlags};
