//! Provider PIN Login Use Case
//!
//! Phone number + PIN. Order of checks:
//! kill switch, lockout, account lookup, PIN, status, principal, session.

use platform::client::ClientInfo;
use platform::rate_limit::LockoutStatus;
use platform::secret::ClearTextSecret;

use crate::application::context::AccessContext;
use crate::application::ledger::{self, AttemptLedger};
use crate::application::resolver::IdentityResolver;
use crate::application::session::IssuedSession;
use crate::domain::entity::{LoginAuditEvent, LoginOutcome, ProviderAccount};
use crate::domain::identity::IdentityProvider;
use crate::domain::repository::AccessStore;
use crate::domain::service::{CredentialVerifier, Verification};
use crate::domain::value_object::{PhoneNumber, PinPolicy, Portal, ProviderStatus, Role};
use crate::error::{AccessError, IneligibleReason, LoginError};

/// Provider login input
pub struct ProviderLoginInput {
    /// Phone number in any accepted local or international form
    pub phone: String,
    pub pin: String,
}

/// Provider login output
#[derive(Debug)]
pub struct ProviderLoginOutput {
    pub session: IssuedSession,
    pub account: ProviderAccount,
}

/// Provider login use case
pub struct ProviderLoginUseCase<S, I> {
    ctx: AccessContext<S, I>,
}

impl<S, I> ProviderLoginUseCase<S, I>
where
    S: AccessStore,
    I: IdentityProvider + Send + Sync + 'static,
{
    pub fn new(ctx: AccessContext<S, I>) -> Self {
        Self { ctx }
    }

    pub async fn execute(
        &self,
        input: ProviderLoginInput,
        client: &ClientInfo,
    ) -> Result<ProviderLoginOutput, LoginError> {
        let phone = PhoneNumber::parse(&input.phone).ok();
        let audit_identifier = phone
            .as_ref()
            .map(PhoneNumber::masked)
            .unwrap_or_else(|| "invalid-phone".to_string());

        let result = self.login(phone, input.pin, client).await;

        let outcome = match &result {
            Ok(_) => LoginOutcome::Success,
            Err(e) => outcome_of(e),
        };
        self.ctx
            .audit(LoginAuditEvent::new(
                Portal::Provider,
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
        phone: Option<PhoneNumber>,
        pin: String,
        client: &ClientInfo,
    ) -> Result<ProviderLoginOutput, LoginError> {
        let flags = self.ctx.within(self.ctx.store.load_system_locks()).await?;
        if flags.provider_logins_disabled {
            return Err(LoginError::AccountNotEligible(
                IneligibleReason::ProviderLoginsDisabled,
            ));
        }

        let mut keys = vec![ledger::ip_key(client)];
        if let Some(phone) = &phone {
            keys.push(ledger::phone_key(phone));
        }

        let ledger = AttemptLedger::new(&self.ctx);
        if let LockoutStatus::Locked { retry_after_secs } = ledger.check_lockout(&keys).await? {
            return Err(LoginError::Locked { retry_after_secs });
        }

        let (Some(phone), Ok(secret)) = (phone, ClearTextSecret::new(pin)) else {
            return Err(ledger.fail_login(&keys).await);
        };

        let Some(mut account) = self
            .ctx
            .within(self.ctx.store.find_provider_by_phone(&phone))
            .await?
        else {
            tracing::debug!(phone = %phone.masked(), "Login for unknown provider phone");
            return Err(ledger.fail_login(&keys).await);
        };

        let verifier = CredentialVerifier::new(self.ctx.config.pepper());
        let verification = match verifier.verify(&secret, account.stored_credential()) {
            Ok(verification) => verification,
            Err(AccessError::NoCredentialConfigured) => {
                // Counts like a wrong PIN; only approved accounts learn why.
                let err = ledger.fail_login(&keys).await;
                if err == LoginError::InvalidCredential
                    && account.status == ProviderStatus::Approved
                {
                    return Err(LoginError::AccountNotEligible(
                        IneligibleReason::NoPinConfigured,
                    ));
                }
                return Err(err);
            }
            Err(e) => return Err(e.into()),
        };
        if verification == Verification::Mismatch {
            return Err(ledger.fail_login(&keys).await);
        }

        if let Some(reason) = account.status.ineligible_reason() {
            return Err(LoginError::AccountNotEligible(reason));
        }

        if verification == Verification::MatchNeedsMigration {
            self.migrate_secret(&mut account, &secret).await;
        }

        let principal = self
            .ctx
            .within(self.ctx.identity.principal_for_phone(&phone))
            .await?;

        let mut resolved = IdentityResolver::new(&self.ctx)
            .resolve(&principal, Some(&phone))
            .await?;
        if resolved.id != account.id {
            tracing::warn!(
                provider_id = %account.id,
                resolved_id = %resolved.id,
                "Phone principal resolves to a different provider"
            );
            return Err(AccessError::LinkConflict {
                account_id: account.id.to_string(),
            }
            .into());
        }

        ledger.record_success(&keys).await;

        if self.ctx.config.pin_policy == PinPolicy::OneTime {
            resolved.clear_secret(self.ctx.clock.now());
            self.ctx
                .within(self.ctx.store.update_provider(&resolved))
                .await?;
        }

        let session = self.ctx.sessions.issue(
            &resolved.id.to_string(),
            Role::Provider,
            Portal::Provider,
        )?;

        tracing::info!(provider_id = %resolved.id, "Provider signed in");

        Ok(ProviderLoginOutput {
            session,
            account: resolved,
        })
    }

    /// Rehash a legacy or outdated credential. A failed write only delays
    /// the migration to the next login.
    async fn migrate_secret(&self, account: &mut ProviderAccount, secret: &ClearTextSecret) {
        let hash = match secret.hash(self.ctx.config.pepper()) {
            Ok(hash) => hash,
            Err(e) => {
                tracing::error!(error = %e, provider_id = %account.id, "Failed to rehash PIN");
                return;
            }
        };
        account.set_secret(hash, self.ctx.clock.now());

        match self.ctx.within(self.ctx.store.update_provider(account)).await {
            Ok(()) => tracing::info!(provider_id = %account.id, "Migrated provider PIN to current hash"),
            Err(e) => {
                tracing::warn!(error = %e, provider_id = %account.id, "Failed to persist migrated PIN")
            }
        }
    }
}

pub(crate) fn outcome_of(err: &LoginError) -> LoginOutcome {
    match err {
        LoginError::InvalidCredential => LoginOutcome::InvalidCredential,
        LoginError::Locked { .. } => LoginOutcome::Locked,
        LoginError::AccountNotEligible(_) => LoginOutcome::NotEligible,
        LoginError::ServiceUnavailable => LoginOutcome::Unavailable,
    }
}
