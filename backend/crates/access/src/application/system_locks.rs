//! Kill Switch Use Cases

use crate::application::context::AccessContext;
use crate::application::gate::AuthorizedPrincipal;
use crate::domain::entity::{SystemLockChange, SystemLockFlags};
use crate::domain::repository::AccessStore;
use crate::error::{AccessError, AccessResult};

pub struct SystemLocksUseCase<S, I> {
    ctx: AccessContext<S, I>,
}

impl<S, I> SystemLocksUseCase<S, I>
where
    S: AccessStore,
    I: Send + Sync + 'static,
{
    pub fn new(ctx: AccessContext<S, I>) -> Self {
        Self { ctx }
    }

    pub async fn get(&self) -> AccessResult<SystemLockFlags> {
        self.ctx.within(self.ctx.store.load_system_locks()).await
    }

    /// Super admins only.
    pub async fn update(
        &self,
        admin: &AuthorizedPrincipal,
        change: SystemLockChange,
    ) -> AccessResult<SystemLockFlags> {
        if !admin.role.is_super_admin() {
            return Err(AccessError::Forbidden("Only a super admin can change system locks"));
        }

        let mut flags = self.get().await?;
        flags.apply(change, &admin.subject, self.ctx.clock.now());
        self.ctx
            .within(self.ctx.store.save_system_locks(&flags))
            .await?;

        tracing::warn!(
            admin = %admin.subject,
            admin_portal_locked = flags.admin_portal_locked,
            provider_logins_disabled = flags.provider_logins_disabled,
            reason = flags.reason.as_deref().unwrap_or(""),
            "System locks updated"
        );

        Ok(flags)
    }
}
