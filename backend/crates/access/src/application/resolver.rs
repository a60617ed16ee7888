//! Identity Resolver
//!
//! Maps a managed-identity principal (and optionally its phone number) to
//! exactly one provider account. Strategies are tried in order; a hit
//! through the link or phone strategies records the link if it is still
//! empty. A record linked to a different principal is never overwritten.

use kernel::id::ProviderAccountId;

use crate::application::context::AccessContext;
use crate::domain::entity::ProviderAccount;
use crate::domain::repository::AccessStore;
use crate::domain::value_object::{PhoneNumber, PrincipalId, ProviderStatus};
use crate::error::{AccessError, AccessResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolveStrategy {
    /// The principal id is the account's primary key
    PrincipalAsPrimaryKey,
    /// The account's recorded link equals the principal
    LinkedPrincipal,
    /// Canonical phone match on an approved account
    ApprovedPhone,
}

pub const DEFAULT_STRATEGIES: [ResolveStrategy; 3] = [
    ResolveStrategy::PrincipalAsPrimaryKey,
    ResolveStrategy::LinkedPrincipal,
    ResolveStrategy::ApprovedPhone,
];

impl ResolveStrategy {
    /// Whether a hit through this strategy records the link.
    pub const fn self_heals(&self) -> bool {
        !matches!(self, ResolveStrategy::PrincipalAsPrimaryKey)
    }

    pub async fn try_resolve<S, I>(
        &self,
        ctx: &AccessContext<S, I>,
        principal: &PrincipalId,
        phone: Option<&PhoneNumber>,
    ) -> AccessResult<Option<ProviderAccount>>
    where
        S: AccessStore,
        I: Send + Sync + 'static,
    {
        match self {
            ResolveStrategy::PrincipalAsPrimaryKey => {
                let Ok(id) = ProviderAccountId::parse(principal.as_str()) else {
                    return Ok(None);
                };
                ctx.within(ctx.store.find_provider_by_id(&id)).await
            }
            ResolveStrategy::LinkedPrincipal => {
                ctx.within(ctx.store.find_provider_by_linked_principal(principal))
                    .await
            }
            ResolveStrategy::ApprovedPhone => {
                let Some(phone) = phone else {
                    return Ok(None);
                };
                let account = ctx.within(ctx.store.find_provider_by_phone(phone)).await?;
                Ok(account.filter(|a| a.status == ProviderStatus::Approved))
            }
        }
    }
}

pub struct IdentityResolver<'a, S, I> {
    ctx: &'a AccessContext<S, I>,
    strategies: &'a [ResolveStrategy],
}

impl<'a, S, I> IdentityResolver<'a, S, I>
where
    S: AccessStore,
    I: Send + Sync + 'static,
{
    pub fn new(ctx: &'a AccessContext<S, I>) -> Self {
        Self {
            ctx,
            strategies: &DEFAULT_STRATEGIES,
        }
    }

    pub fn with_strategies(ctx: &'a AccessContext<S, I>, strategies: &'a [ResolveStrategy]) -> Self {
        Self { ctx, strategies }
    }

    /// Never creates an account: no match is [`AccessError::AccountNotFound`].
    pub async fn resolve(
        &self,
        principal: &PrincipalId,
        phone: Option<&PhoneNumber>,
    ) -> AccessResult<ProviderAccount> {
        for strategy in self.strategies {
            let Some(account) = strategy.try_resolve(self.ctx, principal, phone).await? else {
                continue;
            };

            tracing::debug!(
                provider_id = %account.id,
                strategy = ?strategy,
                "Resolved provider account"
            );

            if strategy.self_heals() {
                return self.heal(account, principal).await;
            }
            return Ok(account);
        }

        Err(AccessError::AccountNotFound)
    }

    async fn heal(
        &self,
        mut account: ProviderAccount,
        principal: &PrincipalId,
    ) -> AccessResult<ProviderAccount> {
        match &account.linked_principal_id {
            Some(linked) if linked == principal => return Ok(account),
            Some(_) => return Err(link_conflict(&account)),
            None => {}
        }

        let linked = self
            .ctx
            .within(
                self.ctx
                    .store
                    .link_principal_if_unlinked(&account.id, principal),
            )
            .await?;

        if linked {
            tracing::info!(provider_id = %account.id, "Linked identity principal to provider");
            account.linked_principal_id = Some(principal.clone());
            return Ok(account);
        }

        // Lost a race: someone linked it between our read and write.
        let current = self
            .ctx
            .within(self.ctx.store.find_provider_by_id(&account.id))
            .await?
            .ok_or(AccessError::AccountNotFound)?;

        match &current.linked_principal_id {
            Some(linked) if linked == principal => Ok(current),
            _ => Err(link_conflict(&current)),
        }
    }
}

fn link_conflict(account: &ProviderAccount) -> AccessError {
    AccessError::LinkConflict {
        account_id: account.id.to_string(),
    }
}
