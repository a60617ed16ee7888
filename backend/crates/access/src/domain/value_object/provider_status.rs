//! Provider Status
//!
//! Moderation lifecycle of a provider account. Only `Approved` may
//! authenticate.
//!
//! ```text
//! Pending ──approve──▶ Approved ──suspend──▶ Suspended
//!    │                    ▲                      │
//!    └──reject──▶ Rejected┘◀──────reinstate──────┘
//! ```

use derive_more::Display;
use serde::{Deserialize, Serialize};

use crate::error::IneligibleReason;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderStatus {
    #[default]
    #[display("pending")]
    Pending,
    #[display("approved")]
    Approved,
    #[display("rejected")]
    Rejected,
    #[display("suspended")]
    Suspended,
}

impl ProviderStatus {
    #[inline]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::Suspended => "suspended",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "pending" => Some(Self::Pending),
            "approved" => Some(Self::Approved),
            "rejected" => Some(Self::Rejected),
            "suspended" => Some(Self::Suspended),
            _ => None,
        }
    }

    #[inline]
    pub const fn can_authenticate(&self) -> bool {
        matches!(self, Self::Approved)
    }

    /// Why an account in this status may not sign in (`None` when it may).
    pub const fn ineligible_reason(&self) -> Option<IneligibleReason> {
        match self {
            Self::Approved => None,
            Self::Pending => Some(IneligibleReason::PendingApproval),
            Self::Rejected => Some(IneligibleReason::Rejected),
            Self::Suspended => Some(IneligibleReason::Suspended),
        }
    }

    pub const fn can_transition_to(&self, next: ProviderStatus) -> bool {
        use ProviderStatus::*;
        matches!(
            (self, next),
            (Pending, Approved)
                | (Pending, Rejected)
                | (Rejected, Approved)
                | (Approved, Suspended)
                | (Suspended, Approved)
                | (Suspended, Rejected)
        )
    }
}
