//! Infrastructure Layer
//!
//! Database implementations and external service integrations.

pub mod firebase;
pub mod postgres;

pub use firebase::{FirebaseConfig, FirebaseIdentityProvider, ServiceAccount};
pub use postgres::PgAccessStore;
