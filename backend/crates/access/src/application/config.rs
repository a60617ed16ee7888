//! Application Configuration
//!
//! Configuration for the Access application layer.

use std::fmt;
use std::time::Duration;

use platform::cookie::CookieConfig;
use platform::rate_limit::LockoutPolicy;

/// Re-export SameSite from platform
pub use platform::cookie::SameSite;

use crate::domain::value_object::{PinPolicy, Portal};

/// Access application configuration
#[derive(Clone)]
pub struct AccessConfig {
    /// Session signing key (HS256, 32 bytes)
    pub session_secret: [u8; 32],
    /// `iss` claim written and required on every session
    pub issuer: String,
    /// Provider session lifetime (7 days)
    pub provider_session_ttl: Duration,
    /// Admin session lifetime (2 hours)
    pub admin_session_ttl: Duration,
    pub provider_cookie_name: String,
    pub admin_cookie_name: String,
    /// Cookie path scoping the provider session
    pub provider_cookie_path: String,
    /// Cookie path scoping the admin session
    pub admin_cookie_path: String,
    /// Whether to require Secure cookie
    pub cookie_secure: bool,
    /// SameSite policy
    pub cookie_same_site: SameSite,
    /// Failed-attempt lockout
    pub lockout: LockoutPolicy,
    /// Digits in a minted PIN
    pub pin_length: usize,
    pub pin_policy: PinPolicy,
    /// PIN pepper (optional, application-wide secret)
    pub pin_pepper: Option<Vec<u8>>,
    /// Upper bound on every store and identity-service call
    pub external_timeout: Duration,
    /// Where the gate sends unauthenticated provider requests
    pub provider_login_path: String,
    /// Where the gate sends unauthenticated admin requests
    pub admin_login_path: String,
}

impl Default for AccessConfig {
    fn default() -> Self {
        Self {
            session_secret: [0u8; 32],
            issuer: "fixam".to_string(),
            provider_session_ttl: Duration::from_secs(7 * 24 * 3600), // 7 days
            admin_session_ttl: Duration::from_secs(2 * 3600),         // 2 hours
            provider_cookie_name: "fixam_provider_session".to_string(),
            admin_cookie_name: "fixam_admin_session".to_string(),
            provider_cookie_path: "/api/provider".to_string(),
            admin_cookie_path: "/api/admin".to_string(),
            cookie_secure: true,
            cookie_same_site: SameSite::Lax,
            lockout: LockoutPolicy::default(),
            pin_length: 4,
            pin_policy: PinPolicy::Reusable,
            pin_pepper: None,
            external_timeout: Duration::from_secs(5),
            provider_login_path: "/provider/login".to_string(),
            admin_login_path: "/admin/login".to_string(),
        }
    }
}

impl AccessConfig {
    /// Create config with a random session secret (for development)
    pub fn with_random_secret() -> Self {
        use rand::RngCore;
        let mut secret = [0u8; 32];
        rand::rng().fill_bytes(&mut secret);
        Self {
            session_secret: secret,
            ..Default::default()
        }
    }

    /// Create config for development (insecure cookie)
    pub fn development() -> Self {
        Self {
            cookie_secure: false,
            ..Self::with_random_secret()
        }
    }

    /// Get PIN pepper as slice
    pub fn pepper(&self) -> Option<&[u8]> {
        self.pin_pepper.as_deref()
    }

    pub fn session_ttl(&self, portal: Portal) -> Duration {
        match portal {
            Portal::Admin => self.admin_session_ttl,
            Portal::Provider => self.provider_session_ttl,
        }
    }

    pub fn login_path(&self, portal: Portal) -> &str {
        match portal {
            Portal::Admin => &self.admin_login_path,
            Portal::Provider => &self.provider_login_path,
        }
    }

    /// Session cookie for a portal. Max-Age follows the session lifetime.
    pub fn cookie(&self, portal: Portal) -> CookieConfig {
        let (name, path) = match portal {
            Portal::Admin => (&self.admin_cookie_name, &self.admin_cookie_path),
            Portal::Provider => (&self.provider_cookie_name, &self.provider_cookie_path),
        };
        CookieConfig {
            name: name.clone(),
            secure: self.cookie_secure,
            http_only: true,
            same_site: self.cookie_same_site,
            path: path.clone(),
            max_age_secs: Some(self.session_ttl(portal).as_secs() as i64),
        }
    }
}

impl fmt::Debug for AccessConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessConfig")
            .field("session_secret", &"[REDACTED]")
            .field("issuer", &self.issuer)
            .field("provider_session_ttl", &self.provider_session_ttl)
            .field("admin_session_ttl", &self.admin_session_ttl)
            .field("provider_cookie_name", &self.provider_cookie_name)
            .field("admin_cookie_name", &self.admin_cookie_name)
            .field("cookie_secure", &self.cookie_secure)
            .field("cookie_same_site", &self.cookie_same_site)
            .field("lockout", &self.lockout)
            .field("pin_length", &self.pin_length)
            .field("pin_policy", &self.pin_policy)
            .field("pin_pepper", &self.pin_pepper.as_ref().map(|_| "[REDACTED]"))
            .field("external_timeout", &self.external_timeout)
            .finish()
    }
}
