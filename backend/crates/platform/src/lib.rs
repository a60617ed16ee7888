//! Platform Crate - Technical Infrastructure
//!
//! This crate provides shared technical foundations:
//! - Cryptographic utilities (random digits, key decoding, constant-time compare)
//! - Secret hashing (Argon2id PHC strings with optional pepper)
//! - Cookie management
//! - Client identification from request headers
//! - Failed-attempt lockout policy
//! - Clock abstraction and bounded external calls

pub mod client;
pub mod clock;
pub mod cookie;
pub mod crypto;
pub mod deadline;
pub mod rate_limit;
pub mod secret;
