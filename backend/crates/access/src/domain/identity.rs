//! Managed Identity Service
//!
//! Password and phone-OTP authentication are delegated to an external
//! identity service. The implementation lives in `infra::firebase`.

use crate::domain::value_object::{Email, PhoneNumber, PrincipalId};

#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    /// Wrong email/password, or the user is disabled upstream
    #[error("invalid credentials")]
    InvalidCredentials,

    /// ID token malformed, expired, revoked or for another project
    #[error("invalid identity token: {0}")]
    InvalidToken(String),

    /// Network failure, timeout, 5xx or upstream throttling
    #[error("identity service unavailable: {0}")]
    Unavailable(String),

    /// Missing keys or project settings
    #[error("identity service misconfigured: {0}")]
    Misconfigured(String),

    /// Response we could not interpret
    #[error("unexpected identity service response: {0}")]
    Unexpected(String),
}

/// Principal proven by an ID token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedIdentity {
    pub principal: PrincipalId,
    /// Present for phone-authenticated principals
    pub phone: Option<PhoneNumber>,
}

#[trait_variant::make(IdentityProvider: Send)]
pub trait LocalIdentityProvider {
    /// Email/password sign-in. Returns the principal on success.
    async fn sign_in_with_password(
        &self,
        email: &Email,
        password: &str,
    ) -> Result<PrincipalId, IdentityError>;

    /// Look up the principal registered for a phone number, creating one if
    /// none exists.
    async fn principal_for_phone(&self, phone: &PhoneNumber) -> Result<PrincipalId, IdentityError>;

    /// Verify an ID token issued to a client after phone-OTP sign-in.
    async fn verify_id_token(&self, id_token: &str) -> Result<VerifiedIdentity, IdentityError>;
}
