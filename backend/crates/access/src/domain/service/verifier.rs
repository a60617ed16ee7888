//! Credential Verifier
//!
//! Checks a presented PIN against an account's stored credential.

use platform::crypto::constant_time_eq;
use platform::secret::ClearTextSecret;

use crate::domain::entity::StoredCredential;
use crate::error::{AccessError, AccessResult};

/// Outcome of a verification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verification {
    Match,
    /// Correct, but stored as legacy plaintext or with outdated hash
    /// parameters. The caller rehashes and persists immediately.
    MatchNeedsMigration,
    Mismatch,
}

impl Verification {
    pub fn is_match(&self) -> bool {
        !matches!(self, Verification::Mismatch)
    }
}

pub struct CredentialVerifier<'a> {
    pepper: Option<&'a [u8]>,
}

impl<'a> CredentialVerifier<'a> {
    pub fn new(pepper: Option<&'a [u8]>) -> Self {
        Self { pepper }
    }

    /// A stored hash always wins over legacy plaintext.
    ///
    /// Fails with [`AccessError::NoCredentialConfigured`] when the account
    /// has neither.
    pub fn verify(
        &self,
        secret: &ClearTextSecret,
        stored: StoredCredential<'_>,
    ) -> AccessResult<Verification> {
        if let Some(hash) = stored.hash {
            return Ok(match (hash.verify(secret, self.pepper), hash.needs_rehash()) {
                (false, _) => Verification::Mismatch,
                (true, false) => Verification::Match,
                (true, true) => Verification::MatchNeedsMigration,
            });
        }

        if let Some(legacy) = stored.legacy_plaintext {
            if constant_time_eq(secret.as_str().as_bytes(), legacy.as_bytes()) {
                tracing::warn!("Legacy plaintext PIN matched; migrating to hashed storage");
                return Ok(Verification::MatchNeedsMigration);
            }
            return Ok(Verification::Mismatch);
        }

        Err(AccessError::NoCredentialConfigured)
    }
}
