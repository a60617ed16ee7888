//! Domain Services

pub mod verifier;

pub use verifier::{CredentialVerifier, Verification};
