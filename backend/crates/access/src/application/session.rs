//! Session Issuer
//!
//! Stateless, portal-scoped session credentials: HS256-signed JWTs.
//! Expiry is checked against the injected clock, not the wall clock, so
//! lifetimes are testable without sleeping.

use std::sync::Arc;

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use platform::clock::Clock;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::application::config::AccessConfig;
use crate::domain::value_object::{Portal, Role};
use crate::error::{AccessError, AccessResult};

/// Claims carried by a session token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Provider account id or administrator uid
    pub sub: String,
    pub role: Role,
    pub portal: Portal,
    pub iat: i64,
    pub exp: i64,
    pub iss: String,
    pub jti: String,
}

/// Freshly minted token
#[derive(Debug, Clone)]
pub struct IssuedSession {
    pub token: String,
    pub claims: SessionClaims,
}

pub struct SessionIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    issuer: String,
    config: Arc<AccessConfig>,
    clock: Arc<dyn Clock>,
}

impl SessionIssuer {
    pub fn new(config: Arc<AccessConfig>, clock: Arc<dyn Clock>) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_issuer(&[config.issuer.as_str()]);
        validation.set_required_spec_claims(&["sub", "exp", "iat", "iss"]);

        Self {
            encoding: EncodingKey::from_secret(&config.session_secret),
            decoding: DecodingKey::from_secret(&config.session_secret),
            validation,
            issuer: config.issuer.clone(),
            config,
            clock,
        }
    }

    /// Mint a token for `subject`. The role must belong to the portal.
    pub fn issue(&self, subject: &str, role: Role, portal: Portal) -> AccessResult<IssuedSession> {
        if !role.belongs_to(portal) {
            return Err(AccessError::Internal(format!(
                "role {role} cannot hold a {portal} session"
            )));
        }

        let now = self.clock.now().timestamp();
        let ttl = self.config.session_ttl(portal).as_secs() as i64;
        let claims = SessionClaims {
            sub: subject.to_string(),
            role,
            portal,
            iat: now,
            exp: now + ttl,
            iss: self.issuer.clone(),
            jti: Uuid::new_v4().to_string(),
        };

        let token = jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| AccessError::Internal(format!("session signing failed: {e}")))?;

        Ok(IssuedSession { token, claims })
    }

    /// Any failure (signature, structure, issuer, expiry, role/portal
    /// mismatch) yields `None`.
    pub fn validate(&self, token: &str) -> Option<SessionClaims> {
        let data =
            jsonwebtoken::decode::<SessionClaims>(token, &self.decoding, &self.validation).ok()?;
        let claims = data.claims;

        if claims.exp <= self.clock.now().timestamp() {
            return None;
        }
        if !claims.role.belongs_to(claims.portal) || claims.sub.is_empty() {
            return None;
        }

        Some(claims)
    }

    /// Like [`validate`](Self::validate), restricted to one portal.
    pub fn validate_for(&self, token: &str, portal: Portal) -> Option<SessionClaims> {
        self.validate(token).filter(|c| c.portal == portal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration};
    use platform::clock::FixedClock;

    fn setup() -> (SessionIssuer, Arc<FixedClock>) {
        let clock = Arc::new(FixedClock::new(
            DateTime::from_timestamp(1_700_000_000, 0).unwrap(),
        ));
        let issuer = SessionIssuer::new(
            Arc::new(AccessConfig::with_random_secret()),
            clock.clone(),
        );
        (issuer, clock)
    }

    #[test]
    fn test_issue_and_validate() {
        let (issuer, _) = setup();
        let session = issuer
            .issue("acc-1", Role::Provider, Portal::Provider)
            .unwrap();

        let claims = issuer.validate(&session.token).unwrap();
        assert_eq!(claims, session.claims);
        assert_eq!(claims.exp - claims.iat, 7 * 24 * 3600);
        assert_eq!(claims.iss, "fixam");
    }

    #[test]
    fn test_provider_token_rejected_by_admin_portal() {
        let (issuer, _) = setup();
        let session = issuer
            .issue("acc-1", Role::Provider, Portal::Provider)
            .unwrap();

        assert!(issuer.validate_for(&session.token, Portal::Admin).is_none());
        assert!(issuer.validate_for(&session.token, Portal::Provider).is_some());
    }

    #[test]
    fn test_expiry_uses_clock() {
        let (issuer, clock) = setup();
        let session = issuer.issue("uid-1", Role::Admin, Portal::Admin).unwrap();

        clock.advance(Duration::hours(2) - Duration::seconds(1));
        assert!(issuer.validate(&session.token).is_some());

        clock.advance(Duration::seconds(1));
        assert!(issuer.validate(&session.token).is_none());
    }

    #[test]
    fn test_foreign_signature_rejected() {
        let (issuer, clock) = setup();
        let other = SessionIssuer::new(Arc::new(AccessConfig::with_random_secret()), clock);
        let session = other.issue("uid-1", Role::SuperAdmin, Portal::Admin).unwrap();

        assert!(issuer.validate(&session.token).is_none());
        assert!(issuer.validate("not.a.token").is_none());
        assert!(issuer.validate("").is_none());
    }

    #[test]
    fn test_role_must_match_portal() {
        let (issuer, _) = setup();
        assert!(issuer.issue("uid-1", Role::Admin, Portal::Provider).is_err());
    }

    #[test]
    fn test_wrong_issuer_rejected() {
        let (issuer, clock) = setup();
        let config = AccessConfig {
            issuer: "someone-else".to_string(),
            ..(*issuer.config).clone()
        };
        let foreign = SessionIssuer::new(Arc::new(config), clock);
        let session = foreign
            .issue("acc-1", Role::Provider, Portal::Provider)
            .unwrap();

        assert!(issuer.validate(&session.token).is_none());
    }
}
