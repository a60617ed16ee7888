//! Presentation Layer
//!
//! HTTP handlers, DTOs, router, and middleware.

pub mod dto;
pub mod handlers;
pub mod middleware;
pub mod router;

pub use handlers::Client;
pub use middleware::{LOGIN_PATH_HEADER, require_admin_session, require_provider_session};
pub use router::access_router;
