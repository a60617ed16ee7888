//! Admin Login Use Case
//!
//! Email + password, verified by the identity service. The admin record in
//! the store decides whether the principal may use the portal and with
//! which role.

use platform::client::ClientInfo;
use platform::rate_limit::LockoutStatus;

use crate::application::context::AccessContext;
use crate::application::ledger::{self, AttemptLedger};
use crate::application::provider_login::outcome_of;
use crate::application::session::IssuedSession;
use crate::domain::entity::{AdminAccount, LoginAuditEvent, LoginOutcome};
use crate::domain::identity::{IdentityError, IdentityProvider};
use crate::domain::repository::AccessStore;
use crate::domain::value_object::{Email, Portal};
use crate::error::{AccessError, IneligibleReason, LoginError};

/// Admin login input
pub struct AdminLoginInput {
    pub email: String,
    pub password: String,
}

/// Admin login output
#[derive(Debug)]
pub struct AdminLoginOutput {
    pub session: IssuedSession,
    pub admin: AdminAccount,
}

/// Admin login use case
pub struct AdminLoginUseCase<S, I> {
    ctx: AccessContext<S, I>,
}

impl<S, I> AdminLoginUseCase<S, I>
where
    S: AccessStore,
    I: IdentityProvider + Send + Sync + 'static,
{
    pub fn new(ctx: AccessContext<S, I>) -> Self {
        Self { ctx }
    }

    pub async fn execute(
        &self,
        input: AdminLoginInput,
        client: &ClientInfo,
    ) -> Result<AdminLoginOutput, LoginError> {
        let email = Email::new(input.email).ok();
        let audit_identifier = email
            .as_ref()
            .map(Email::masked)
            .unwrap_or_else(|| "invalid-email".to_string());

        let result = self.login(email, &input.password, client).await;

        let outcome = match &result {
            Ok(_) => LoginOutcome::Success,
            Err(e) => outcome_of(e),
        };
        self.ctx
            .audit(LoginAuditEvent::new(
                Portal::Admin,
                audit_identifier,
                client,
                outcome,
                self.ctx.clock.now(),
            ))
            .await;

        result
    }

    async fn login(
        &self,
        email: Option<Email>,
        password: &str,
        client: &ClientInfo,
    ) -> Result<AdminLoginOutput, LoginError> {
        let flags = self.ctx.within(self.ctx.store.load_system_locks()).await?;

        let mut keys = vec![ledger::ip_key(client)];
        if let Some(email) = &email {
            keys.push(ledger::email_key(email));
        }

        let ledger = AttemptLedger::new(&self.ctx);
        if let LockoutStatus::Locked { retry_after_secs } = ledger.check_lockout(&keys).await? {
            return Err(LoginError::Locked { retry_after_secs });
        }

        let Some(email) = email.filter(|_| !password.is_empty()) else {
            return Err(ledger.fail_login(&keys).await);
        };

        let uid = match self
            .ctx
            .within(self.ctx.identity.sign_in_with_password(&email, password))
            .await
        {
            Ok(uid) => uid,
            Err(AccessError::Identity(IdentityError::InvalidCredentials)) => {
                return Err(ledger.fail_login(&keys).await);
            }
            Err(e) => return Err(e.into()),
        };

        let admin = self
            .ctx
            .within(self.ctx.store.find_admin(&uid))
            .await?
            .ok_or(LoginError::AccountNotEligible(
                IneligibleReason::NotAnAdministrator,
            ))?;

        if !admin.active {
            return Err(LoginError::AccountNotEligible(IneligibleReason::AdminInactive));
        }
        if flags.admin_portal_locked && !admin.is_super_admin() {
            return Err(LoginError::AccountNotEligible(
                IneligibleReason::AdminPortalLocked,
            ));
        }

        ledger.record_success(&keys).await;

        let session = self
            .ctx
            .sessions
            .issue(admin.uid.as_str(), admin.role, Portal::Admin)?;

        tracing::info!(uid = %admin.uid, role = %admin.role, "Administrator signed in");

        Ok(AdminLoginOutput { session, admin })
    }
}
