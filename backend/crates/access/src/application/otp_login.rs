//! Provider OTP Login Use Case
//!
//! The client completes phone-OTP sign-in against the identity service and
//! hands over the resulting ID token. The token proves the principal; the
//! resolver maps it to a provider account.

use platform::client::ClientInfo;
use platform::rate_limit::LockoutStatus;

use crate::application::context::AccessContext;
use crate::application::ledger::{self, AttemptLedger};
use crate::application::provider_login::{ProviderLoginOutput, outcome_of};
use crate::application::resolver::IdentityResolver;
use crate::domain::entity::{LoginAuditEvent, LoginOutcome};
use crate::domain::identity::{IdentityError, IdentityProvider};
use crate::domain::repository::AccessStore;
use crate::domain::value_object::{PhoneNumber, Portal, Role};
use crate::error::{AccessError, IneligibleReason, LoginError};

pub struct OtpLoginUseCase<S, I> {
    ctx: AccessContext<S, I>,
}

impl<S, I> OtpLoginUseCase<S, I>
where
    S: AccessStore,
    I: IdentityProvider + Send + Sync + 'static,
{
    pub fn new(ctx: AccessContext<S, I>) -> Self {
        Self { ctx }
    }

    pub async fn execute(
        &self,
        id_token: &str,
        client: &ClientInfo,
    ) -> Result<ProviderLoginOutput, LoginError> {
        let result = self.login(id_token, client).await;

        let (identifier, outcome) = match &result {
            Ok(out) => (out.account.phone.masked(), LoginOutcome::Success),
            Err(e) => ("otp".to_string(), outcome_of(e)),
        };
        self.ctx
            .audit(LoginAuditEvent::new(
                Portal::Provider,
                identifier,
                client,
                outcome,
                self.ctx.clock.now(),
            ))
            .await;

        result
    }

    async fn login(
        &self,
        id_token: &str,
        client: &ClientInfo,
    ) -> Result<ProviderLoginOutput, LoginError> {
        let flags = self.ctx.within(self.ctx.store.load_system_locks()).await?;
        if flags.provider_logins_disabled {
            return Err(LoginError::AccountNotEligible(
                IneligibleReason::ProviderLoginsDisabled,
            ));
        }

        let keys = vec![ledger::ip_key(client)];
        let ledger = AttemptLedger::new(&self.ctx);
        if let LockoutStatus::Locked { retry_after_secs } = ledger.check_lockout(&keys).await? {
            return Err(LoginError::Locked { retry_after_secs });
        }

        let verified = match self
            .ctx
            .within(self.ctx.identity.verify_id_token(id_token))
            .await
        {
            Ok(verified) => verified,
            Err(AccessError::Identity(IdentityError::InvalidToken(reason))) => {
                tracing::debug!(reason = %reason, "Rejected OTP ID token");
                return Err(ledger.fail_login(&keys).await);
            }
            Err(e) => return Err(e.into()),
        };

        let phone: Option<&PhoneNumber> = verified.phone.as_ref();
        let account = match IdentityResolver::new(&self.ctx)
            .resolve(&verified.principal, phone)
            .await
        {
            Ok(account) => account,
            Err(AccessError::AccountNotFound) => {
                tracing::debug!(
                    phone = %phone.map(PhoneNumber::masked).unwrap_or_default(),
                    "OTP principal has no provider account"
                );
                return Err(LoginError::InvalidCredential);
            }
            Err(e) => return Err(e.into()),
        };

        if let Some(reason) = account.status.ineligible_reason() {
            return Err(LoginError::AccountNotEligible(reason));
        }

        ledger.record_success(&keys).await;

        let session = self.ctx.sessions.issue(
            &account.id.to_string(),
            Role::Provider,
            Portal::Provider,
        )?;

        tracing::info!(provider_id = %account.id, "Provider signed in with OTP");

        Ok(ProviderLoginOutput { session, account })
    }
}
