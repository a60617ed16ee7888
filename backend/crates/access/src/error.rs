//! Access Error Types
//!
//! Two layers:
//! - [`AccessError`]: internal, detailed, used throughout the crate.
//! - [`LoginError`]: the closed set a sign-in caller may observe. Internal
//!   detail (unknown account, link conflicts, store failures) is collapsed
//!   here so responses never reveal which part of a login failed.
//!
//! Both render through `kernel::error::AppError`.

use std::time::Duration;

use axum::response::{IntoResponse, Response};
use derive_more::Display;
use kernel::error::{app_error::AppError, kind::ErrorKind};
use platform::secret::SecretHashError;
use thiserror::Error;

use crate::domain::entity::ProfileError;
use crate::domain::identity::IdentityError;
use crate::domain::value_object::{email::EmailError, phone::PhoneError, pin::PinError};

/// Access-specific result type alias
pub type AccessResult<T> = Result<T, AccessError>;

/// Why an identified account may not sign in right now
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum IneligibleReason {
    #[display("pending_approval")]
    PendingApproval,
    #[display("rejected")]
    Rejected,
    #[display("suspended")]
    Suspended,
    #[display("no_pin_configured")]
    NoPinConfigured,
    #[display("provider_logins_disabled")]
    ProviderLoginsDisabled,
    #[display("admin_portal_locked")]
    AdminPortalLocked,
    #[display("admin_inactive")]
    AdminInactive,
    #[display("not_an_administrator")]
    NotAnAdministrator,
    #[display("needs_reconciliation")]
    NeedsReconciliation,
}

impl IneligibleReason {
    /// User-facing explanation
    pub const fn message(&self) -> &'static str {
        use IneligibleReason::*;
        match self {
            PendingApproval => "Your business listing is still awaiting approval.",
            Rejected => "Your business listing was not approved.",
            Suspended => "Your provider account is suspended. Contact FixAm support.",
            NoPinConfigured => "No PIN is set for this account. Ask FixAm support for a new PIN.",
            ProviderLoginsDisabled => "Provider sign-in is temporarily disabled.",
            AdminPortalLocked => "The admin portal is temporarily locked.",
            AdminInactive => "This administrator account is deactivated.",
            NotAnAdministrator => "This account does not have admin access.",
            NeedsReconciliation => {
                "This account needs attention from FixAm support before you can sign in."
            }
        }
    }
}

// ============================================================================
// Internal error
// ============================================================================

#[derive(Debug, Error)]
pub enum AccessError {
    /// No account matched (never created implicitly)
    #[error("Account not found")]
    AccountNotFound,

    /// Account exists but carries neither a hash nor a legacy PIN
    #[error("No credential configured")]
    NoCredentialConfigured,

    /// Account already linked to a different principal
    #[error("Account {account_id} is linked to another principal")]
    LinkConflict { account_id: String },

    #[error("Account not eligible: {0}")]
    NotEligible(IneligibleReason),

    #[error("{0}")]
    InvalidPhone(#[from] PhoneError),

    #[error("{0}")]
    InvalidEmail(#[from] EmailError),

    #[error("{0}")]
    InvalidPin(#[from] PinError),

    #[error("{0}")]
    InvalidProfile(#[from] ProfileError),

    #[error("Invalid request: {0}")]
    InvalidInput(String),

    /// Current PIN did not match on a PIN change
    #[error("Current PIN is incorrect")]
    WrongCurrentPin,

    #[error("A provider with this phone number already exists")]
    PhoneTaken,

    #[error("Cannot move provider from {from} to {to}")]
    InvalidTransition { from: String, to: String },

    #[error("Not authenticated")]
    Unauthenticated,

    #[error("Forbidden: {0}")]
    Forbidden(&'static str),

    #[error("Timed out after {0:?}")]
    Timeout(Duration),

    #[error("Identity service error: {0}")]
    Identity(#[from] IdentityError),

    #[error("Hashing error: {0}")]
    Hashing(#[from] SecretHashError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AccessError {
    /// Store or identity-service failure a client may retry.
    pub fn is_unavailable(&self) -> bool {
        match self {
            AccessError::Timeout(_) => true,
            AccessError::Identity(IdentityError::Unavailable(_)) => true,
            AccessError::Database(e) => matches!(
                e,
                sqlx::Error::Io(_)
                    | sqlx::Error::Tls(_)
                    | sqlx::Error::PoolTimedOut
                    | sqlx::Error::PoolClosed
                    | sqlx::Error::WorkerCrashed
            ),
            _ => false,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        if self.is_unavailable() {
            return ErrorKind::ServiceUnavailable;
        }
        match self {
            AccessError::AccountNotFound => ErrorKind::NotFound,
            AccessError::NoCredentialConfigured
            | AccessError::NotEligible(_)
            | AccessError::LinkConflict { .. }
            | AccessError::Forbidden(_) => ErrorKind::Forbidden,
            AccessError::InvalidPhone(_)
            | AccessError::InvalidEmail(_)
            | AccessError::InvalidInput(_) => ErrorKind::BadRequest,
            AccessError::InvalidPin(_) | AccessError::InvalidProfile(_) => {
                ErrorKind::UnprocessableEntity
            }
            AccessError::WrongCurrentPin | AccessError::Unauthenticated => {
                ErrorKind::Unauthorized
            }
            AccessError::PhoneTaken | AccessError::InvalidTransition { .. } => {
                ErrorKind::Conflict
            }
            AccessError::Identity(IdentityError::InvalidCredentials)
            | AccessError::Identity(IdentityError::InvalidToken(_)) => ErrorKind::Unauthorized,
            AccessError::Timeout(_)
            | AccessError::Identity(_)
            | AccessError::Hashing(_)
            | AccessError::Database(_)
            | AccessError::Internal(_) => ErrorKind::InternalServerError,
        }
    }

    /// Convert to AppError. Server-side detail never reaches the client.
    pub fn to_app_error(&self) -> AppError {
        let kind = self.kind();
        match kind {
            ErrorKind::ServiceUnavailable => {
                AppError::service_unavailable("Service temporarily unavailable")
                    .with_action("Please try again in a moment")
            }
            ErrorKind::InternalServerError => AppError::internal("Internal server error"),
            _ => match self {
                AccessError::NotEligible(reason) => AppError::forbidden(reason.message()),
                AccessError::LinkConflict { .. } => {
                    AppError::forbidden(IneligibleReason::NeedsReconciliation.message())
                }
                _ => AppError::new(kind, self.to_string()),
            },
        }
    }

    /// Log the error with appropriate level
    pub(crate) fn log(&self) {
        match self {
            AccessError::Database(e) => {
                tracing::error!(error = %e, "Access database error");
            }
            AccessError::Internal(msg) => {
                tracing::error!(message = %msg, "Access internal error");
            }
            AccessError::Hashing(e) => {
                tracing::error!(error = %e, "Secret hashing error");
            }
            AccessError::Identity(e) => {
                tracing::warn!(error = %e, "Identity service error");
            }
            AccessError::Timeout(limit) => {
                tracing::warn!(limit_ms = limit.as_millis() as u64, "External call timed out");
            }
            AccessError::LinkConflict { account_id } => {
                tracing::warn!(account_id = %account_id, "Principal link conflict needs reconciliation");
            }
            _ => {
                tracing::debug!(error = %self, "Access error");
            }
        }
    }
}

impl IntoResponse for AccessError {
    fn into_response(self) -> Response {
        self.log();
        self.to_app_error().into_response()
    }
}

// ============================================================================
// Login error (closed set)
// ============================================================================

/// Every way a sign-in may fail, as seen by the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LoginError {
    #[error("Invalid credentials")]
    InvalidCredential,

    #[error("Too many attempts")]
    Locked { retry_after_secs: u64 },

    #[error("Account not eligible: {0}")]
    AccountNotEligible(IneligibleReason),

    #[error("Service unavailable")]
    ServiceUnavailable,
}

impl LoginError {
    pub fn retry_after_minutes(&self) -> u64 {
        match self {
            LoginError::Locked { retry_after_secs } => retry_after_secs.div_ceil(60),
            _ => 0,
        }
    }

    pub fn to_app_error(&self) -> AppError {
        match self {
            LoginError::InvalidCredential => AppError::unauthorized("Invalid credentials")
                .with_action("Check your details and try again"),
            LoginError::Locked { retry_after_secs } => {
                let minutes = self.retry_after_minutes();
                let unit = if minutes == 1 { "minute" } else { "minutes" };
                AppError::too_many_requests("Too many failed attempts")
                    .with_action(format!("Try again in {minutes} {unit}"))
                    .with_retry_after(*retry_after_secs)
            }
            LoginError::AccountNotEligible(reason) => AppError::forbidden(reason.message()),
            LoginError::ServiceUnavailable => {
                AppError::service_unavailable("Sign-in is temporarily unavailable")
                    .with_action("Please try again in a moment")
            }
        }
    }
}

impl From<AccessError> for LoginError {
    fn from(err: AccessError) -> Self {
        match err {
            AccessError::AccountNotFound
            | AccessError::WrongCurrentPin
            | AccessError::InvalidPhone(_)
            | AccessError::InvalidEmail(_)
            | AccessError::Identity(IdentityError::InvalidCredentials)
            | AccessError::Identity(IdentityError::InvalidToken(_)) => LoginError::InvalidCredential,
            AccessError::NoCredentialConfigured => {
                LoginError::AccountNotEligible(IneligibleReason::NoPinConfigured)
            }
            AccessError::LinkConflict { .. } => {
                err.log();
                LoginError::AccountNotEligible(IneligibleReason::NeedsReconciliation)
            }
            AccessError::NotEligible(reason) => LoginError::AccountNotEligible(reason),
            other => {
                other.log();
                LoginError::ServiceUnavailable
            }
        }
    }
}

impl IntoResponse for LoginError {
    fn into_response(self) -> Response {
        match self {
            LoginError::ServiceUnavailable => tracing::warn!("Sign-in unavailable"),
            LoginError::Locked { retry_after_secs } => {
                tracing::warn!(retry_after_secs, "Sign-in attempt while locked out")
            }
            _ => tracing::debug!(error = %self, "Sign-in rejected"),
        }
        self.to_app_error().into_response()
    }
}
