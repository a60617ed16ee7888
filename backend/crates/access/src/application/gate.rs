//! Access Gate
//!
//! Per-request admission for protected routes. Kill switches and account
//! state are re-read on every call, so a suspension or lock takes effect on
//! the next request regardless of token lifetime.

use derive_more::Display;
use kernel::id::ProviderAccountId;
use serde::Serialize;

use crate::application::context::AccessContext;
use crate::domain::entity::SystemLockFlags;
use crate::domain::repository::AccessStore;
use crate::domain::value_object::{Portal, PrincipalId, Role};
use crate::error::{AccessResult, IneligibleReason};

/// Identity attached to an admitted request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthorizedPrincipal {
    /// Provider account id or administrator uid
    pub subject: String,
    /// Phone (provider) or email (admin)
    pub contact: String,
    /// Current role from the store
    pub role: Role,
    pub portal: Portal,
}

/// Why a request was turned away
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum Denial {
    #[display("no_session")]
    NoSession,
    #[display("invalid_session")]
    InvalidSession,
    #[display("not_eligible:{_0}")]
    NotEligible(IneligibleReason),
}

impl Denial {
    /// Kill-switch denials are temporary; the session stays usable once
    /// the switch is off.
    pub fn clears_cookie(&self) -> bool {
        match self {
            Denial::NoSession => false,
            Denial::InvalidSession => true,
            Denial::NotEligible(reason) => !matches!(
                reason,
                IneligibleReason::ProviderLoginsDisabled | IneligibleReason::AdminPortalLocked
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    Admitted(AuthorizedPrincipal),
    Denied(Denial),
}

pub struct AccessGate<'a, S, I> {
    ctx: &'a AccessContext<S, I>,
}

impl<'a, S, I> AccessGate<'a, S, I>
where
    S: AccessStore,
    I: Send + Sync + 'static,
{
    pub fn new(ctx: &'a AccessContext<S, I>) -> Self {
        Self { ctx }
    }

    /// Store failures propagate; everything else is a decision.
    pub async fn authorize(&self, token: Option<&str>, portal: Portal) -> AccessResult<GateDecision> {
        let flags = self.ctx.within(self.ctx.store.load_system_locks()).await?;

        if portal == Portal::Provider && flags.provider_logins_disabled {
            return Ok(deny(Denial::NotEligible(
                IneligibleReason::ProviderLoginsDisabled,
            )));
        }

        let token = token.filter(|t| !t.is_empty());
        let claims = token.and_then(|t| self.ctx.sessions.validate_for(t, portal));

        // A locked admin portal turns away everything but a valid super_admin token.
        if portal == Portal::Admin
            && flags.admin_portal_locked
            && !claims.as_ref().is_some_and(|c| c.role.is_super_admin())
        {
            return Ok(deny(Denial::NotEligible(IneligibleReason::AdminPortalLocked)));
        }

        if token.is_none() {
            return Ok(deny(Denial::NoSession));
        }
        let Some(claims) = claims else {
            return Ok(deny(Denial::InvalidSession));
        };

        match portal {
            Portal::Provider => self.admit_provider(&claims.sub).await,
            Portal::Admin => self.admit_admin(&claims.sub, claims.role, &flags).await,
        }
    }

    async fn admit_provider(&self, subject: &str) -> AccessResult<GateDecision> {
        let Ok(id) = ProviderAccountId::parse(subject) else {
            return Ok(deny(Denial::InvalidSession));
        };
        let Some(account) = self
            .ctx
            .within(self.ctx.store.find_provider_by_id(&id))
            .await?
        else {
            return Ok(deny(Denial::InvalidSession));
        };

        if let Some(reason) = account.status.ineligible_reason() {
            return Ok(deny(Denial::NotEligible(reason)));
        }

        Ok(GateDecision::Admitted(AuthorizedPrincipal {
            subject: account.id.to_string(),
            contact: account.phone.as_str().to_string(),
            role: Role::Provider,
            portal: Portal::Provider,
        }))
    }

    async fn admit_admin(
        &self,
        subject: &str,
        token_role: Role,
        flags: &SystemLockFlags,
    ) -> AccessResult<GateDecision> {
        let portal_locked = Denial::NotEligible(IneligibleReason::AdminPortalLocked);
        if flags.admin_portal_locked && !token_role.is_super_admin() {
            return Ok(deny(portal_locked));
        }

        let Some(uid) = PrincipalId::new(subject) else {
            return Ok(deny(Denial::InvalidSession));
        };
        let Some(admin) = self.ctx.within(self.ctx.store.find_admin(&uid)).await? else {
            return Ok(deny(Denial::NotEligible(
                IneligibleReason::NotAnAdministrator,
            )));
        };

        if !admin.active {
            return Ok(deny(Denial::NotEligible(IneligibleReason::AdminInactive)));
        }
        // A demoted super admin loses the bypass immediately.
        if flags.admin_portal_locked && !admin.is_super_admin() {
            return Ok(deny(portal_locked));
        }

        Ok(GateDecision::Admitted(AuthorizedPrincipal {
            subject: admin.uid.as_str().to_string(),
            contact: admin.email.as_str().to_string(),
            role: admin.role,
            portal: Portal::Admin,
        }))
    }
}

fn deny(denial: Denial) -> GateDecision {
    tracing::debug!(denial = %denial, "Access denied");
    GateDecision::Denied(denial)
}
