//! Moderation Use Cases
//!
//! Administrators approve, reject, suspend and reinstate providers.
//! Approval and PIN resets mint a PIN that is handed over exactly once,
//! in the response; only its hash is stored.

use kernel::id::ProviderAccountId;

use crate::application::context::AccessContext;
use crate::application::gate::AuthorizedPrincipal;
use crate::domain::entity::ProviderAccount;
use crate::domain::repository::AccessStore;
use crate::domain::value_object::{Pin, ProviderStatus};
use crate::error::{AccessError, AccessResult};

/// Result of a moderation action
#[derive(Debug)]
pub struct ModerationOutput {
    pub account: ProviderAccount,
    /// Present when a PIN was minted
    pub minted_pin: Option<Pin>,
}

pub struct ModerationUseCase<S, I> {
    ctx: AccessContext<S, I>,
}

impl<S, I> ModerationUseCase<S, I>
where
    S: AccessStore,
    I: Send + Sync + 'static,
{
    pub fn new(ctx: AccessContext<S, I>) -> Self {
        Self { ctx }
    }

    /// Approve a pending or rejected listing and mint its PIN.
    pub async fn approve(
        &self,
        admin: &AuthorizedPrincipal,
        id: &ProviderAccountId,
    ) -> AccessResult<ModerationOutput> {
        let mut account = self.load(id).await?;
        if account.status == ProviderStatus::Suspended {
            return Err(invalid_transition(account.status, ProviderStatus::Approved));
        }
        self.transition(&mut account, ProviderStatus::Approved)?;

        let pin = self.mint_into(&mut account)?;
        self.save(&account).await?;

        tracing::info!(
            provider_id = %account.id,
            admin = %admin.subject,
            "Provider approved"
        );

        Ok(ModerationOutput {
            account,
            minted_pin: Some(pin),
        })
    }

    /// Reject, suspend or reinstate. Reinstating keeps the existing PIN,
    /// minting one only if the account has none.
    pub async fn set_status(
        &self,
        admin: &AuthorizedPrincipal,
        id: &ProviderAccountId,
        next: ProviderStatus,
    ) -> AccessResult<ModerationOutput> {
        let mut account = self.load(id).await?;
        let previous = account.status;
        self.transition(&mut account, next)?;

        let minted_pin = if next == ProviderStatus::Approved && !account.has_credential() {
            Some(self.mint_into(&mut account)?)
        } else {
            None
        };
        self.save(&account).await?;

        tracing::info!(
            provider_id = %account.id,
            admin = %admin.subject,
            from = previous.code(),
            to = next.code(),
            "Provider status changed"
        );

        Ok(ModerationOutput {
            account,
            minted_pin,
        })
    }

    /// Replace the PIN, e.g. when the provider lost it.
    pub async fn reset_pin(
        &self,
        admin: &AuthorizedPrincipal,
        id: &ProviderAccountId,
    ) -> AccessResult<ModerationOutput> {
        let mut account = self.load(id).await?;
        let pin = self.mint_into(&mut account)?;
        self.save(&account).await?;

        tracing::info!(provider_id = %account.id, admin = %admin.subject, "Provider PIN reset");

        Ok(ModerationOutput {
            account,
            minted_pin: Some(pin),
        })
    }

    async fn load(&self, id: &ProviderAccountId) -> AccessResult<ProviderAccount> {
        self.ctx
            .within(self.ctx.store.find_provider_by_id(id))
            .await?
            .ok_or(AccessError::AccountNotFound)
    }

    async fn save(&self, account: &ProviderAccount) -> AccessResult<()> {
        self.ctx
            .within(self.ctx.store.update_provider(account))
            .await
    }

    fn transition(&self, account: &mut ProviderAccount, next: ProviderStatus) -> AccessResult<()> {
        let from = account.status;
        if account.transition_to(next, self.ctx.clock.now()) {
            Ok(())
        } else {
            Err(invalid_transition(from, next))
        }
    }

    fn mint_into(&self, account: &mut ProviderAccount) -> AccessResult<Pin> {
        let pin = Pin::mint(self.ctx.config.pin_length);
        let hash = pin.secret().hash(self.ctx.config.pepper())?;
        account.set_secret(hash, self.ctx.clock.now());
        Ok(pin)
    }
}

fn invalid_transition(from: ProviderStatus, to: ProviderStatus) -> AccessError {
    AccessError::InvalidTransition {
        from: from.code().to_string(),
        to: to.code().to_string(),
    }
}
