//! Login Audit Event
//!
//! Append-only record of sign-in attempts. Writes are best-effort.

use chrono::{DateTime, Utc};
use derive_more::Display;
use kernel::id::AuditEventId;
use platform::client::ClientInfo;

use crate::domain::value_object::Portal;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum LoginOutcome {
    #[display("success")]
    Success,
    #[display("invalid_credential")]
    InvalidCredential,
    #[display("locked")]
    Locked,
    #[display("not_eligible")]
    NotEligible,
    #[display("unavailable")]
    Unavailable,
}

impl LoginOutcome {
    pub const fn code(&self) -> &'static str {
        match self {
            LoginOutcome::Success => "success",
            LoginOutcome::InvalidCredential => "invalid_credential",
            LoginOutcome::Locked => "locked",
            LoginOutcome::NotEligible => "not_eligible",
            LoginOutcome::Unavailable => "unavailable",
        }
    }
}

#[derive(Debug, Clone)]
pub struct LoginAuditEvent {
    pub id: AuditEventId,
    pub portal: Portal,
    /// Masked phone or email
    pub identifier: String,
    pub client_ip: Option<String>,
    pub user_agent: Option<String>,
    pub outcome: LoginOutcome,
    pub occurred_at: DateTime<Utc>,
}

impl LoginAuditEvent {
    pub fn new(
        portal: Portal,
        identifier: String,
        client: &ClientInfo,
        outcome: LoginOutcome,
        occurred_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: AuditEventId::new(),
            portal,
            identifier,
            client_ip: client.ip.map(|ip| ip.to_string()),
            user_agent: client.user_agent.clone(),
            outcome,
            occurred_at,
        }
    }
}
