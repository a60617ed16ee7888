//! Provider Identity & Access Module
//!
//! Clean Architecture structure:
//! - `domain/` - Entities, value objects, repository traits, identity seam
//! - `application/` - Use cases, session issuer, attempt ledger, access gate
//! - `infra/` - PostgreSQL store and Firebase identity client
//! - `presentation/` - HTTP handlers, DTOs, router, gate middleware
//!
//! ## Features
//! - Provider sign-in with phone number + PIN, or phone OTP
//! - Administrator sign-in with email + password (managed identity)
//! - Moderation: approve / reject / suspend / reinstate, PIN minting
//! - Kill switches: lock the admin portal, disable provider sign-in
//!
//! ## Security Model
//! - PINs hashed with Argon2id; legacy plaintext PINs migrate on login
//! - Stateless HS256 sessions scoped to one portal, in path-scoped cookies
//! - Lockout after repeated failures per client IP and per phone/email
//! - Every protected request re-reads kill switches and account state

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;


// Re-exports for convenience
pub use application::config::AccessConfig;
pub use application::context::AccessContext;
pub use error::{AccessError, AccessResult, IneligibleReason, LoginError};
pub use infra::firebase::{FirebaseConfig, FirebaseIdentityProvider, ServiceAccount};
pub use infra::postgres::PgAccessStore;
pub use presentation::router::access_router;

// Re-export kernel error types for unified error handling
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};

pub mod config {
    pub use crate::application::config::*;
}

pub mod models {
    pub use crate::domain::entity::*;
    pub use crate::domain::value_object::*;
    pub use crate::presentation::dto::*;
}
