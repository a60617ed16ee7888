//! Shared Use-Case Context
//!
//! Everything a use case needs, cheap to clone into handlers.

use std::future::Future;
use std::sync::Arc;

use platform::clock::Clock;
use platform::deadline::{DeadlineError, bounded};

use crate::application::config::AccessConfig;
use crate::application::session::SessionIssuer;
use crate::domain::entity::LoginAuditEvent;
use crate::domain::repository::AccessStore;
use crate::error::{AccessError, AccessResult};

pub struct AccessContext<S, I> {
    pub store: Arc<S>,
    pub identity: Arc<I>,
    pub clock: Arc<dyn Clock>,
    pub config: Arc<AccessConfig>,
    pub sessions: Arc<SessionIssuer>,
}

// S and I need not be Clone.
impl<S, I> Clone for AccessContext<S, I> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            identity: self.identity.clone(),
            clock: self.clock.clone(),
            config: self.config.clone(),
            sessions: self.sessions.clone(),
        }
    }
}

impl<S, I> AccessContext<S, I>
where
    S: AccessStore,
    I: Send + Sync + 'static,
{
    pub fn new(store: Arc<S>, identity: Arc<I>, clock: Arc<dyn Clock>, config: AccessConfig) -> Self {
        let config = Arc::new(config);
        let sessions = Arc::new(SessionIssuer::new(config.clone(), clock.clone()));
        Self {
            store,
            identity,
            clock,
            config,
            sessions,
        }
    }

    /// Run a store or identity-service call under the external timeout.
    pub(crate) async fn within<T, E, F>(&self, fut: F) -> AccessResult<T>
    where
        F: Future<Output = Result<T, E>>,
        E: Into<AccessError>,
    {
        bounded(self.config.external_timeout, fut)
            .await
            .map_err(|e| match e {
                DeadlineError::Elapsed(limit) => AccessError::Timeout(limit),
                DeadlineError::Inner(e) => e.into(),
            })
    }

    /// Best-effort audit write. Failures are logged and dropped.
    pub(crate) async fn audit(&self, event: LoginAuditEvent) {
        if let Err(e) = self.within(self.store.append_audit(&event)).await {
            tracing::warn!(
                error = %e,
                portal = %event.portal,
                outcome = %event.outcome,
                "Failed to write login audit event"
            );
        }
    }
}
