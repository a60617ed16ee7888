//! Attempt Ledger
//!
//! Persisted failure counters behind the login lockout. A login touches
//! several scoped identifiers at once (client IP plus phone or email); the
//! attempt is locked if any of them is.

use platform::client::ClientInfo;
use platform::rate_limit::LockoutStatus;

use crate::application::context::AccessContext;
use crate::domain::repository::AccessStore;
use crate::domain::value_object::{Email, PhoneNumber};
use crate::error::{AccessResult, LoginError};

/// Scoped ledger key
pub fn ip_key(client: &ClientInfo) -> String {
    format!("ip:{}", client.ip_or_unknown())
}

pub fn phone_key(phone: &PhoneNumber) -> String {
    format!("phone:{}", phone.as_str())
}

pub fn email_key(email: &Email) -> String {
    format!("email:{}", email.as_str())
}

fn locked_secs(status: LockoutStatus) -> u64 {
    match status {
        LockoutStatus::Unlocked => 0,
        LockoutStatus::Locked { retry_after_secs } => retry_after_secs,
    }
}

/// Key prefix only; the rest may be a phone number.
fn scope(identifier: &str) -> &str {
    identifier.split(':').next().unwrap_or(identifier)
}

pub struct AttemptLedger<'a, S, I> {
    ctx: &'a AccessContext<S, I>,
}

impl<'a, S, I> AttemptLedger<'a, S, I>
where
    S: AccessStore,
    I: Send + Sync + 'static,
{
    pub fn new(ctx: &'a AccessContext<S, I>) -> Self {
        Self { ctx }
    }

    /// Longest remaining lock across `identifiers`.
    pub async fn check_lockout(&self, identifiers: &[String]) -> AccessResult<LockoutStatus> {
        let now = self.ctx.clock.now();
        let mut longest = LockoutStatus::Unlocked;

        for identifier in identifiers {
            let record = self
                .ctx
                .within(self.ctx.store.load_attempts(identifier))
                .await?;
            let status = self.ctx.config.lockout.status(record.as_ref(), now);

            if locked_secs(status) > locked_secs(longest) {
                longest = status;
            }
        }

        Ok(longest)
    }

    /// Count one failure against every identifier. Returns the resulting
    /// lockout, which is `Locked` once the threshold is reached.
    pub async fn record_failure(&self, identifiers: &[String]) -> AccessResult<LockoutStatus> {
        let now = self.ctx.clock.now();
        let policy = &self.ctx.config.lockout;
        let mut worst = LockoutStatus::Unlocked;

        for identifier in identifiers {
            let previous = self
                .ctx
                .within(self.ctx.store.load_attempts(identifier))
                .await?;
            let record = policy.register_failure(identifier, previous, now);
            self.ctx
                .within(self.ctx.store.save_attempts(&record))
                .await?;

            let status = policy.status(Some(&record), now);
            if locked_secs(status) > locked_secs(worst) {
                worst = status;
            }

            tracing::debug!(
                scope = scope(identifier),
                failure_count = record.failure_count,
                locked = status.is_locked(),
                "Recorded failed attempt"
            );
        }

        Ok(worst)
    }

    /// Record a failed login and pick the error to report: `Locked` once
    /// this failure reaches the threshold.
    pub async fn fail_login(&self, identifiers: &[String]) -> LoginError {
        match self.record_failure(identifiers).await {
            Ok(LockoutStatus::Locked { retry_after_secs }) => LoginError::Locked { retry_after_secs },
            Ok(LockoutStatus::Unlocked) => LoginError::InvalidCredential,
            Err(e) => e.into(),
        }
    }

    /// Forget every identifier. Failures are logged; the caller has already
    /// authenticated.
    pub async fn record_success(&self, identifiers: &[String]) {
        for identifier in identifiers {
            if let Err(e) = self
                .ctx
                .within(self.ctx.store.clear_attempts(identifier))
                .await
            {
                tracing::warn!(error = %e, scope = scope(identifier), "Failed to clear attempt record");
            }
        }
    }
}
