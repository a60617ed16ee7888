//! Provider Self-Service Use Cases
//!
//! Business submission (public) and the provider's own account.

use kernel::id::ProviderAccountId;
use platform::secret::ClearTextSecret;

use crate::application::context::AccessContext;
use crate::application::gate::AuthorizedPrincipal;
use crate::domain::entity::{ProviderAccount, ProviderProfile};
use crate::domain::repository::AccessStore;
use crate::domain::service::{CredentialVerifier, Verification};
use crate::domain::value_object::{PhoneNumber, Pin};
use crate::error::{AccessError, AccessResult};

/// Business submission input
pub struct SubmitProviderInput {
    pub phone: String,
    pub display_name: String,
    pub category: String,
    pub area: Option<String>,
}

pub struct ChangePinInput {
    /// Ignored when the account has no stored PIN
    pub current_pin: String,
    pub new_pin: String,
}

pub struct ProviderAccountUseCase<S, I> {
    ctx: AccessContext<S, I>,
}

impl<S, I> ProviderAccountUseCase<S, I>
where
    S: AccessStore,
    I: Send + Sync + 'static,
{
    pub fn new(ctx: AccessContext<S, I>) -> Self {
        Self { ctx }
    }

    /// Create a pending listing. No credential exists until approval.
    pub async fn submit(&self, input: SubmitProviderInput) -> AccessResult<ProviderAccount> {
        let phone = PhoneNumber::parse(&input.phone)?;
        let profile = ProviderProfile::new(
            &input.display_name,
            &input.category,
            input.area.as_deref(),
        )?;

        let account = ProviderAccount::submit(phone, profile, self.ctx.clock.now());
        self.ctx
            .within(self.ctx.store.insert_provider(&account))
            .await?;

        tracing::info!(
            provider_id = %account.id,
            phone = %account.phone.masked(),
            category = %account.profile.category,
            "Provider submitted for review"
        );

        Ok(account)
    }

    /// The account behind an admitted provider session.
    pub async fn me(&self, principal: &AuthorizedPrincipal) -> AccessResult<ProviderAccount> {
        let id = ProviderAccountId::parse(&principal.subject)
            .map_err(|_| AccessError::Unauthenticated)?;
        self.ctx
            .within(self.ctx.store.find_provider_by_id(&id))
            .await?
            .ok_or(AccessError::AccountNotFound)
    }

    /// Rotate the PIN after proving the current one. An account whose
    /// one-time PIN was consumed sets its first chosen PIN without one.
    pub async fn change_pin(
        &self,
        principal: &AuthorizedPrincipal,
        input: ChangePinInput,
    ) -> AccessResult<()> {
        let mut account = self.me(principal).await?;

        if account.has_credential() {
            let current = ClearTextSecret::new(input.current_pin)
                .map_err(|_| AccessError::WrongCurrentPin)?;
            let verification = CredentialVerifier::new(self.ctx.config.pepper())
                .verify(&current, account.stored_credential())?;
            if verification == Verification::Mismatch {
                tracing::info!(provider_id = %account.id, "PIN change with wrong current PIN");
                return Err(AccessError::WrongCurrentPin);
            }
        } else {
            // One-time PIN already consumed: the session is the proof.
            tracing::info!(provider_id = %account.id, "Provider choosing a PIN after one-time sign-in");
        }

        let new_pin = Pin::new(input.new_pin)?;
        let hash = new_pin.secret().hash(self.ctx.config.pepper())?;
        account.set_secret(hash, self.ctx.clock.now());

        self.ctx
            .within(self.ctx.store.update_provider(&account))
            .await?;

        tracing::info!(provider_id = %account.id, "Provider changed PIN");
        Ok(())
    }
}
