//! PostgreSQL Repository Implementations

use chrono::{DateTime, Utc};
use kernel::id::ProviderAccountId;
use platform::rate_limit::AttemptRecord;
use platform::secret::HashedSecret;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::entity::{
    AdminAccount, LoginAuditEvent, ProviderAccount, ProviderProfile, SystemLockFlags,
};
use crate::domain::repository::{
    AdminAccountRepository, AttemptRepository, AuditRepository, ProviderAccountRepository,
    SystemLockRepository,
};
use crate::domain::value_object::{
    Email, LegacyPin, PhoneNumber, PrincipalId, ProviderStatus, Role,
};
use crate::error::{AccessError, AccessResult};

/// Postgres SQLSTATE for unique_violation
const UNIQUE_VIOLATION: &str = "23505";

/// PostgreSQL-backed access store
#[derive(Clone)]
pub struct PgAccessStore {
    pool: PgPool,
}

impl PgAccessStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Drop attempt records whose last failure is older than `cutoff` and
    /// whose lock, if any, has expired.
    pub async fn cleanup_stale_attempts(&self, cutoff: DateTime<Utc>) -> AccessResult<u64> {
        let deleted = sqlx::query(
            r#"
            DELETE FROM login_attempts
            WHERE last_attempt_at < $1
              AND (blocked_until IS NULL OR blocked_until < $1)
            "#,
        )
        .bind(cutoff)
        .execute(&self.pool)
        .await?
        .rows_affected();

        tracing::info!(attempts_deleted = deleted, "Cleaned up stale login attempts");

        Ok(deleted)
    }
}

// ============================================================================
// Provider Account Repository Implementation
// ============================================================================

const PROVIDER_COLUMNS: &str = r#"
    id,
    phone,
    status,
    secret_hash,
    secret_created_at,
    legacy_pin,
    linked_principal_id,
    display_name,
    category,
    area,
    created_at,
    updated_at
"#;

fn select_provider(filter: &str) -> String {
    format!("SELECT {PROVIDER_COLUMNS} FROM provider_accounts WHERE {filter}")
}

impl ProviderAccountRepository for PgAccessStore {
    async fn insert_provider(&self, account: &ProviderAccount) -> AccessResult<()> {
        let result = sqlx::query(
            r#"
            INSERT INTO provider_accounts (
                id,
                phone,
                status,
                secret_hash,
                secret_created_at,
                legacy_pin,
                linked_principal_id,
                display_name,
                category,
                area,
                created_at,
                updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#,
        )
        .bind(account.id.as_uuid())
        .bind(account.phone.as_str())
        .bind(account.status.code())
        .bind(account.secret_hash.as_ref().map(HashedSecret::as_phc_string))
        .bind(account.secret_created_at)
        .bind(account.legacy_pin.as_ref().map(LegacyPin::as_str))
        .bind(account.linked_principal_id.as_ref().map(PrincipalId::as_str))
        .bind(&account.profile.display_name)
        .bind(&account.profile.category)
        .bind(account.profile.area.as_deref())
        .bind(account.created_at)
        .bind(account.updated_at)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(e)) if e.code().as_deref() == Some(UNIQUE_VIOLATION) => {
                Err(AccessError::PhoneTaken)
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn find_provider_by_id(
        &self,
        id: &ProviderAccountId,
    ) -> AccessResult<Option<ProviderAccount>> {
        let row = sqlx::query_as::<_, ProviderRow>(&select_provider("id = $1"))
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;

        row.map(ProviderRow::into_account).transpose()
    }

    async fn find_provider_by_linked_principal(
        &self,
        principal: &PrincipalId,
    ) -> AccessResult<Option<ProviderAccount>> {
        let row = sqlx::query_as::<_, ProviderRow>(&select_provider("linked_principal_id = $1"))
            .bind(principal.as_str())
            .fetch_optional(&self.pool)
            .await?;

        row.map(ProviderRow::into_account).transpose()
    }

    async fn find_provider_by_phone(
        &self,
        phone: &PhoneNumber,
    ) -> AccessResult<Option<ProviderAccount>> {
        let row = sqlx::query_as::<_, ProviderRow>(&select_provider("phone = $1"))
            .bind(phone.as_str())
            .fetch_optional(&self.pool)
            .await?;

        row.map(ProviderRow::into_account).transpose()
    }

    async fn link_principal_if_unlinked(
        &self,
        id: &ProviderAccountId,
        principal: &PrincipalId,
    ) -> AccessResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE provider_accounts
            SET linked_principal_id = $2, updated_at = NOW()
            WHERE id = $1 AND linked_principal_id IS NULL
            "#,
        )
        .bind(id.as_uuid())
        .bind(principal.as_str())
        .execute(&self.pool)
        .await;

        match result {
            Ok(r) => Ok(r.rows_affected() == 1),
            // Principal already linked to another account
            Err(sqlx::Error::Database(e)) if e.code().as_deref() == Some(UNIQUE_VIOLATION) => {
                Ok(false)
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn update_provider(&self, account: &ProviderAccount) -> AccessResult<()> {
        sqlx::query(
            r#"
            UPDATE provider_accounts
            SET
                status = $2,
                secret_hash = $3,
                secret_created_at = $4,
                legacy_pin = $5,
                display_name = $6,
                category = $7,
                area = $8,
                updated_at = $9
            WHERE id = $1
            "#,
        )
        .bind(account.id.as_uuid())
        .bind(account.status.code())
        .bind(account.secret_hash.as_ref().map(HashedSecret::as_phc_string))
        .bind(account.secret_created_at)
        .bind(account.legacy_pin.as_ref().map(LegacyPin::as_str))
        .bind(&account.profile.display_name)
        .bind(&account.profile.category)
        .bind(account.profile.area.as_deref())
        .bind(account.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

// ============================================================================
// Admin Account Repository Implementation
// ============================================================================

impl AdminAccountRepository for PgAccessStore {
    async fn find_admin(&self, uid: &PrincipalId) -> AccessResult<Option<AdminAccount>> {
        let row = sqlx::query_as::<_, AdminRow>(
            r#"
            SELECT uid, email, role, active
            FROM admin_accounts
            WHERE uid = $1
            "#,
        )
        .bind(uid.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(AdminRow::into_admin).transpose()
    }
}

// ============================================================================
// Attempt Repository Implementation
// ============================================================================

impl AttemptRepository for PgAccessStore {
    async fn load_attempts(&self, identifier: &str) -> AccessResult<Option<AttemptRecord>> {
        let row = sqlx::query_as::<_, AttemptRow>(
            r#"
            SELECT identifier, failure_count, last_attempt_at, blocked_until
            FROM login_attempts
            WHERE identifier = $1
            "#,
        )
        .bind(identifier)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(AttemptRow::into_record))
    }

    async fn save_attempts(&self, record: &AttemptRecord) -> AccessResult<()> {
        sqlx::query(
            r#"
            INSERT INTO login_attempts (identifier, failure_count, last_attempt_at, blocked_until)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (identifier) DO UPDATE SET
                failure_count = EXCLUDED.failure_count,
                last_attempt_at = EXCLUDED.last_attempt_at,
                blocked_until = EXCLUDED.blocked_until
            "#,
        )
        .bind(&record.identifier)
        .bind(record.failure_count.min(i32::MAX as u32) as i32)
        .bind(record.last_attempt_at)
        .bind(record.blocked_until)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn clear_attempts(&self, identifier: &str) -> AccessResult<()> {
        sqlx::query("DELETE FROM login_attempts WHERE identifier = $1")
            .bind(identifier)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}

// ============================================================================
// System Lock Repository Implementation
// ============================================================================

impl SystemLockRepository for PgAccessStore {
    async fn load_system_locks(&self) -> AccessResult<SystemLockFlags> {
        let row = sqlx::query_as::<_, SystemLockRow>(
            r#"
            SELECT
                admin_portal_locked,
                provider_logins_disabled,
                reason,
                updated_by,
                updated_at
            FROM system_locks
            WHERE id = 1
            "#,
        )
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(SystemLockRow::into_flags).unwrap_or_default())
    }

    async fn save_system_locks(&self, flags: &SystemLockFlags) -> AccessResult<()> {
        sqlx::query(
            r#"
            INSERT INTO system_locks (
                id,
                admin_portal_locked,
                provider_logins_disabled,
                reason,
                updated_by,
                updated_at
            ) VALUES (1, $1, $2, $3, $4, $5)
            ON CONFLICT (id) DO UPDATE SET
                admin_portal_locked = EXCLUDED.admin_portal_locked,
                provider_logins_disabled = EXCLUDED.provider_logins_disabled,
                reason = EXCLUDED.reason,
                updated_by = EXCLUDED.updated_by,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(flags.admin_portal_locked)
        .bind(flags.provider_logins_disabled)
        .bind(flags.reason.as_deref())
        .bind(flags.updated_by.as_deref())
        .bind(flags.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

// ============================================================================
// Audit Repository Implementation
// ============================================================================

impl AuditRepository for PgAccessStore {
    async fn append_audit(&self, event: &LoginAuditEvent) -> AccessResult<()> {
        sqlx::query(
            r#"
            INSERT INTO login_audit_events (
                id,
                portal,
                identifier,
                client_ip,
                user_agent,
                outcome,
                occurred_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(event.id.as_uuid())
        .bind(event.portal.code())
        .bind(&event.identifier)
        .bind(event.client_ip.as_deref())
        .bind(event.user_agent.as_deref())
        .bind(event.outcome.code())
        .bind(event.occurred_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

// ============================================================================
// Row Types for sqlx mapping
// ============================================================================

#[derive(sqlx::FromRow)]
struct ProviderRow {
    id: Uuid,
    phone: String,
    status: String,
    secret_hash: Option<String>,
    secret_created_at: Option<DateTime<Utc>>,
    legacy_pin: Option<String>,
    linked_principal_id: Option<String>,
    display_name: String,
    category: String,
    area: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ProviderRow {
    fn into_account(self) -> AccessResult<ProviderAccount> {
        let status = ProviderStatus::from_code(&self.status)
            .ok_or_else(|| AccessError::Internal(format!("Invalid provider status: {}", self.status)))?;

        let secret_hash = self
            .secret_hash
            .map(HashedSecret::from_phc_string)
            .transpose()?;

        Ok(ProviderAccount {
            id: ProviderAccountId::from_uuid(self.id),
            phone: PhoneNumber::from_db(self.phone),
            status,
            secret_hash,
            secret_created_at: self.secret_created_at,
            legacy_pin: self.legacy_pin.filter(|p| !p.is_empty()).map(LegacyPin::from_db),
            linked_principal_id: self.linked_principal_id.map(PrincipalId::from_db),
            profile: ProviderProfile {
                display_name: self.display_name,
                category: self.category,
                area: self.area,
            },
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct AdminRow {
    uid: String,
    email: String,
    role: String,
    active: bool,
}

impl AdminRow {
    fn into_admin(self) -> AccessResult<AdminAccount> {
        let role = Role::from_code(&self.role)
            .filter(|r| *r != Role::Provider)
            .ok_or_else(|| AccessError::Internal(format!("Invalid admin role: {}", self.role)))?;

        Ok(AdminAccount {
            uid: PrincipalId::from_db(self.uid),
            email: Email::from_db(self.email),
            role,
            active: self.active,
        })
    }
}

#[derive(sqlx::FromRow)]
struct AttemptRow {
    identifier: String,
    failure_count: i32,
    last_attempt_at: DateTime<Utc>,
    blocked_until: Option<DateTime<Utc>>,
}

impl AttemptRow {
    fn into_record(self) -> AttemptRecord {
        AttemptRecord {
            identifier: self.identifier,
            failure_count: self.failure_count.max(0) as u32,
            last_attempt_at: self.last_attempt_at,
            blocked_until: self.blocked_until,
        }
    }
}

#[derive(sqlx::FromRow)]
struct SystemLockRow {
    admin_portal_locked: bool,
    provider_logins_disabled: bool,
    reason: Option<String>,
    updated_by: Option<String>,
    updated_at: Option<DateTime<Utc>>,
}

impl SystemLockRow {
    fn into_flags(self) -> SystemLockFlags {
        SystemLockFlags {
            admin_portal_locked: self.admin_portal_locked,
            provider_logins_disabled: self.provider_logins_disabled,
            reason: self.reason,
            updated_by: self.updated_by,
            updated_at: self.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use platform::crypto::random_digits;
    use sqlx::postgres::PgPoolOptions;

    async fn store() -> PgAccessStore {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
        let pool = PgPoolOptions::new()
            .max_connections(2)
            .connect(&url)
            .await
            .expect("Failed to connect");
        sqlx::migrate!("../../../database/migrations")
            .run(&pool)
            .await
            .expect("Failed to migrate");
        PgAccessStore::new(pool)
    }

    async fn approved_provider(store: &PgAccessStore) -> ProviderAccount {
        let phone = PhoneNumber::parse(&format!("+23324{}", random_digits(7))).unwrap();
        let profile = ProviderProfile::new("Ama Plumbing", "plumber", Some("Tema")).unwrap();
        let mut account = ProviderAccount::submit(phone, profile, Utc::now());
        account.status = ProviderStatus::Approved;
        store.insert_provider(&account).await.unwrap();
        account
    }

    fn principal() -> PrincipalId {
        PrincipalId::new(Uuid::new_v4().to_string()).unwrap()
    }

    #[tokio::test]
    #[ignore] // Requires PostgreSQL
    async fn test_link_is_written_once() {
        let store = store().await;
        let account = approved_provider(&store).await;
        let (first, second) = (principal(), principal());

        assert!(store.link_principal_if_unlinked(&account.id, &first).await.unwrap());
        assert!(!store.link_principal_if_unlinked(&account.id, &second).await.unwrap());

        let stored = store.find_provider_by_id(&account.id).await.unwrap().unwrap();
        assert_eq!(stored.linked_principal_id, Some(first.clone()));
        let by_link = store
            .find_provider_by_linked_principal(&first)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(by_link.id, account.id);
    }

    #[tokio::test]
    #[ignore] // Requires PostgreSQL
    async fn test_principal_linked_elsewhere_is_not_written() {
        let store = store().await;
        let owner = approved_provider(&store).await;
        let other = approved_provider(&store).await;
        let shared = principal();

        assert!(store.link_principal_if_unlinked(&owner.id, &shared).await.unwrap());
        // Unique violation on linked_principal_id
        assert!(!store.link_principal_if_unlinked(&other.id, &shared).await.unwrap());

        let stored = store.find_provider_by_id(&other.id).await.unwrap().unwrap();
        assert!(stored.linked_principal_id.is_none());
    }

    #[tokio::test]
    #[ignore] // Requires PostgreSQL
    async fn test_update_never_touches_link() {
        let store = store().await;
        let mut account = approved_provider(&store).await;
        let linked = principal();
        store.link_principal_if_unlinked(&account.id, &linked).await.unwrap();

        account.status = ProviderStatus::Suspended;
        store.update_provider(&account).await.unwrap();

        let stored = store.find_provider_by_id(&account.id).await.unwrap().unwrap();
        assert_eq!(stored.status, ProviderStatus::Suspended);
        assert_eq!(stored.linked_principal_id, Some(linked));
    }
}
