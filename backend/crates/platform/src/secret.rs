//! Secret Hashing and Verification
//!
//! Short shared secrets (PINs, passcodes) hashed with:
//! - Argon2id (memory-hard, OWASP recommended parameters)
//! - Per-hash random salt, PHC string storage format
//! - Optional application-wide pepper
//! - Zeroization of clear text on drop
//!
//! Policy (length, alphabet) is the caller's concern; this module only
//! rejects input that can never be a sensible secret.

use std::fmt;

use argon2::{
    Argon2, Params, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString,
};
use rand::rngs::OsRng;
use thiserror::Error;
use unicode_normalization::UnicodeNormalization;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

/// Upper bound on accepted secret length (code points)
pub const MAX_SECRET_LENGTH: usize = 128;

// ============================================================================
// Error Types
// ============================================================================

/// Clear text rejected before hashing
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SecretInputError {
    #[error("Secret cannot be empty or contain only whitespace")]
    EmptyOrWhitespace,

    #[error("Secret must be at most {max} characters (got {actual})")]
    TooLong { max: usize, actual: usize },

    #[error("Secret contains invalid control characters")]
    InvalidCharacter,
}

/// Hashing/verification errors
#[derive(Debug, Error)]
pub enum SecretHashError {
    #[error("Secret hashing failed: {0}")]
    HashingFailed(String),

    #[error("Invalid secret hash format")]
    InvalidHashFormat,
}

// ============================================================================
// Clear Text Secret (Zeroized on drop)
// ============================================================================

/// Clear text secret with automatic memory zeroization
///
/// - Implements `Zeroize` and `ZeroizeOnDrop`
/// - Does not implement `Clone`
/// - Debug output is redacted
///
/// ```rust
/// use platform::secret::ClearTextSecret;
///
/// let pin = ClearTextSecret::new("1234".to_string()).unwrap();
/// let hashed = pin.hash(None).unwrap();
/// assert!(hashed.verify(&pin, None));
/// ```
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct ClearTextSecret(String);

impl ClearTextSecret {
    /// NFKC-normalizes, then rejects empty, overlong, or control-character input.
    pub fn new(raw: String) -> Result<Self, SecretInputError> {
        let mut raw = raw;
        let normalized: String = raw.nfkc().collect();
        raw.zeroize();

        if normalized.trim().is_empty() {
            return Err(SecretInputError::EmptyOrWhitespace);
        }

        let char_count = normalized.chars().count();
        if char_count > MAX_SECRET_LENGTH {
            return Err(SecretInputError::TooLong {
                max: MAX_SECRET_LENGTH,
                actual: char_count,
            });
        }

        if normalized.chars().any(|c| c.is_control()) {
            return Err(SecretInputError::InvalidCharacter);
        }

        Ok(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub(crate) fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    fn peppered(&self, pepper: Option<&[u8]>) -> Zeroizing<Vec<u8>> {
        let mut bytes = Zeroizing::new(self.as_bytes().to_vec());
        if let Some(p) = pepper {
            bytes.extend_from_slice(p);
        }
        bytes
    }

    /// Hash using Argon2id with default (m=19456, t=2, p=1) parameters.
    pub fn hash(&self, pepper: Option<&[u8]>) -> Result<HashedSecret, SecretHashError> {
        let salt = SaltString::generate(&mut OsRng);

        let hash = Argon2::default()
            .hash_password(&self.peppered(pepper), &salt)
            .map_err(|e| SecretHashError::HashingFailed(e.to_string()))?;

        Ok(HashedSecret {
            hash: hash.to_string(),
        })
    }
}

impl fmt::Debug for ClearTextSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ClearTextSecret")
            .field(&"[REDACTED]")
            .finish()
    }
}

// ============================================================================
// Hashed Secret (Safe to store)
// ============================================================================

/// Hashed secret in PHC string format (`$argon2id$v=19$m=...,t=...,p=...$salt$hash`)
#[derive(Clone, PartialEq, Eq)]
pub struct HashedSecret {
    hash: String,
}

impl HashedSecret {
    /// Create from PHC string (e.g., from database)
    pub fn from_phc_string(s: impl Into<String>) -> Result<Self, SecretHashError> {
        let hash = s.into();
        PasswordHash::new(&hash).map_err(|_| SecretHashError::InvalidHashFormat)?;
        Ok(Self { hash })
    }

    pub fn as_phc_string(&self) -> &str {
        &self.hash
    }

    /// Verify a secret against this hash.
    ///
    /// `pepper` must match the one used during hashing. Argon2 compares the
    /// derived output in constant time.
    pub fn verify(&self, secret: &ClearTextSecret, pepper: Option<&[u8]>) -> bool {
        let parsed_hash = match PasswordHash::new(&self.hash) {
            Ok(h) => h,
            Err(_) => return false,
        };

        Argon2::default()
            .verify_password(&secret.peppered(pepper), &parsed_hash)
            .is_ok()
    }

    /// True when the hash is not Argon2id or uses parameters other than the
    /// current defaults.
    pub fn needs_rehash(&self) -> bool {
        let parsed_hash = match PasswordHash::new(&self.hash) {
            Ok(h) => h,
            Err(_) => return true,
        };

        if parsed_hash.algorithm != argon2::Algorithm::Argon2id.ident() {
            return true;
        }

        let current = Params::default();
        match Params::try_from(&parsed_hash) {
            Ok(params) => {
                params.m_cost() != current.m_cost()
                    || params.t_cost() != current.t_cost()
                    || params.p_cost() != current.p_cost()
            }
            Err(_) => true,
        }
    }
}

impl fmt::Debug for HashedSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HashedSecret")
            .field("hash", &"[HASH]")
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
