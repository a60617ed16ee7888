//! API DTOs (Data Transfer Objects)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::application::gate::AuthorizedPrincipal;
use crate::domain::entity::{AdminAccount, ProviderAccount, SystemLockChange, SystemLockFlags};
use crate::domain::value_object::{Portal, ProviderStatus, Role};

// ============================================================================
// Provider Submission
// ============================================================================

/// Business submission request
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitProviderRequest {
    pub phone: String,
    pub display_name: String,
    pub category: String,
    pub area: Option<String>,
}

/// Provider account as shown to its owner and to administrators.
/// Never carries credential material.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderView {
    pub id: String,
    pub phone: String,
    pub status: ProviderStatus,
    pub display_name: String,
    pub category: String,
    pub area: Option<String>,
    pub has_pin: bool,
    pub pin_created_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<&ProviderAccount> for ProviderView {
    fn from(account: &ProviderAccount) -> Self {
        Self {
            id: account.id.to_string(),
            phone: account.phone.as_str().to_string(),
            status: account.status,
            display_name: account.profile.display_name.clone(),
            category: account.profile.category.clone(),
            area: account.profile.area.clone(),
            has_pin: account.has_credential(),
            pin_created_at: account.secret_created_at,
            created_at: account.created_at,
        }
    }
}

// ============================================================================
// Provider Login
// ============================================================================

/// Phone + PIN login request
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderLoginRequest {
    pub phone: String,
    pub pin: String,
}

/// Phone-OTP login request
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OtpLoginRequest {
    pub id_token: String,
}

/// Provider login response (session travels in the cookie)
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderLoginResponse {
    pub provider: ProviderView,
    pub expires_at: i64,
}

/// PIN change request
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePinRequest {
    #[serde(default)]
    pub current_pin: String,
    pub new_pin: String,
}

// ============================================================================
// Admin Login
// ============================================================================

/// Admin login request
#[derive(Debug, Clone, Deserialize)]
pub struct AdminLoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminView {
    pub uid: String,
    pub email: String,
    pub role: Role,
}

impl From<&AdminAccount> for AdminView {
    fn from(admin: &AdminAccount) -> Self {
        Self {
            uid: admin.uid.as_str().to_string(),
            email: admin.email.as_str().to_string(),
            role: admin.role,
        }
    }
}

/// Admin login response (session travels in the cookie)
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminLoginResponse {
    pub admin: AdminView,
    pub expires_at: i64,
}

/// Admitted principal, as returned by `/me`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PrincipalResponse {
    pub subject: String,
    pub contact: String,
    pub role: Role,
    pub portal: Portal,
}

impl From<AuthorizedPrincipal> for PrincipalResponse {
    fn from(p: AuthorizedPrincipal) -> Self {
        Self {
            subject: p.subject,
            contact: p.contact,
            role: p.role,
            portal: p.portal,
        }
    }
}

// ============================================================================
// Moderation
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct SetStatusRequest {
    pub status: ProviderStatus,
}

/// Moderation result. `pin` is present once, when a PIN was minted.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModerationResponse {
    pub provider: ProviderView,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pin: Option<String>,
}

// ============================================================================
// System Locks
// ============================================================================

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemLocksResponse {
    pub admin_portal_locked: bool,
    pub provider_logins_disabled: bool,
    pub reason: Option<String>,
    pub updated_by: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<SystemLockFlags> for SystemLocksResponse {
    fn from(flags: SystemLockFlags) -> Self {
        Self {
            admin_portal_locked: flags.admin_portal_locked,
            provider_logins_disabled: flags.provider_logins_disabled,
            reason: flags.reason,
            updated_by: flags.updated_by,
            updated_at: flags.updated_at,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSystemLocksRequest {
    pub admin_portal_locked: Option<bool>,
    pub provider_logins_disabled: Option<bool>,
    pub reason: Option<String>,
}

impl From<UpdateSystemLocksRequest> for SystemLockChange {
    fn from(req: UpdateSystemLocksRequest) -> Self {
        Self {
            admin_portal_locked: req.admin_portal_locked,
            provider_logins_disabled: req.provider_logins_disabled,
            reason: req.reason,
        }
    }
}
