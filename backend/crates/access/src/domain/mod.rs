//! Domain Layer
//!
//! Contains entities, value objects, repository traits, the identity
//! service seam, and pure domain services.

pub mod entity;
pub mod identity;
pub mod repository;
pub mod service;
pub mod value_object;

// Re-exports
pub use entity::{AdminAccount, LoginAuditEvent, ProviderAccount, SystemLockFlags};
pub use identity::{IdentityError, IdentityProvider, VerifiedIdentity};
pub use repository::{
    AccessStore, AdminAccountRepository, AttemptRepository, AuditRepository,
    ProviderAccountRepository, SystemLockRepository,
};
